use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Reads a `Duration` written as whole milliseconds.
pub fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Reads a `Duration` written as whole seconds.
pub fn deserialize_duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

/// Writes a `Duration` as whole milliseconds.
pub fn serialize_duration_to_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Writes a `Duration` as whole seconds.
pub fn serialize_duration_to_seconds<S>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

/// Custom deserializer for the campaign tag list.
///
/// Accepts either a YAML/JSON list or a single comma-separated string, which
/// is what an environment variable override produces. Blank entries are
/// dropped and surrounding whitespace is trimmed.
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagsRepr {
        List(Vec<String>),
        Joined(String),
    }

    let raw = match TagsRepr::deserialize(deserializer)? {
        TagsRepr::List(tags) => tags,
        TagsRepr::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(raw.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect())
}
