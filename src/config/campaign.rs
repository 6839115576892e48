//! Campaign definition: target tags and the sale period.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use super::{AppConfigError, deserialize_tags};
use crate::models::{TimeWindow, WindowMode};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

/// Configuration of the promotional campaign being monitored.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CampaignConfig {
    /// Order tags identifying campaign orders.
    #[serde(deserialize_with = "deserialize_tags")]
    pub target_tags: Vec<String>,

    /// Sale start date, `YYYY-MM-DD`.
    pub start_date: String,

    /// Sale start time, `HH:MM`.
    pub start_time: String,

    /// Sale end date, `YYYY-MM-DD`.
    pub end_date: String,

    /// Sale end time, `HH:MM`.
    pub end_time: String,

    /// IANA zone in which the dates and times above are expressed.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Whether queries use the fixed campaign period or grow up to "now".
    #[serde(default)]
    pub window_mode: WindowMode,
}

impl CampaignConfig {
    /// Parses the configured timezone.
    pub fn tz(&self) -> Result<Tz, AppConfigError> {
        self.timezone.parse::<Tz>().map_err(|_| AppConfigError::UnknownTimezone(self.timezone.clone()))
    }

    /// Derives the UTC campaign window from the local dates and times.
    pub fn time_window(&self) -> Result<TimeWindow, AppConfigError> {
        let tz = self.tz()?;
        let start = localize(&tz, &self.start_date, &self.start_time)?;
        let end = localize(&tz, &self.end_date, &self.end_time)?;
        Ok(TimeWindow::new(start, end, self.window_mode)?)
    }
}

fn parse_local(date: &str, time: &str) -> Result<NaiveDateTime, AppConfigError> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| AppConfigError::InvalidDateTime(format!("date '{date}': {e}")))?;
    let time = NaiveTime::parse_from_str(time, TIME_FORMAT)
        .map_err(|e| AppConfigError::InvalidDateTime(format!("time '{time}': {e}")))?;
    Ok(date.and_time(time))
}

fn localize(tz: &Tz, date: &str, time: &str) -> Result<DateTime<Utc>, AppConfigError> {
    let naive = parse_local(date, time)?;
    // Ambiguous local times (DST fold) resolve to the earlier instant.
    tz.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc)).ok_or_else(|| {
        AppConfigError::NonexistentLocalTime { local: naive.to_string(), timezone: tz.name().to_string() }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(start: (&str, &str), end: (&str, &str), timezone: &str) -> CampaignConfig {
        CampaignConfig {
            target_tags: vec!["sale".into()],
            start_date: start.0.into(),
            start_time: start.1.into(),
            end_date: end.0.into(),
            end_time: end.1.into(),
            timezone: timezone.into(),
            window_mode: WindowMode::Fixed,
        }
    }

    #[test]
    fn test_time_window_converts_local_times_to_utc() {
        let config = campaign(("2024-10-01", "10:00"), ("2024-10-02", "04:00"), "Asia/Kolkata");
        let window = config.time_window().unwrap();
        assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 10, 1, 4, 30, 0).unwrap());
        assert_eq!(window.end(), Utc.with_ymd_and_hms(2024, 10, 1, 22, 30, 0).unwrap());
    }

    #[test]
    fn test_time_window_rejects_bad_date() {
        let config = campaign(("2024/10/01", "10:00"), ("2024-10-02", "04:00"), "Asia/Kolkata");
        assert!(matches!(config.time_window(), Err(AppConfigError::InvalidDateTime(_))));
    }

    #[test]
    fn test_time_window_rejects_bad_time() {
        let config = campaign(("2024-10-01", "25:00"), ("2024-10-02", "04:00"), "Asia/Kolkata");
        assert!(matches!(config.time_window(), Err(AppConfigError::InvalidDateTime(_))));
    }

    #[test]
    fn test_time_window_rejects_unknown_timezone() {
        let config = campaign(("2024-10-01", "10:00"), ("2024-10-02", "04:00"), "Mars/Olympus");
        assert!(matches!(config.time_window(), Err(AppConfigError::UnknownTimezone(_))));
    }

    #[test]
    fn test_time_window_rejects_reversed_period() {
        let config = campaign(("2024-10-02", "10:00"), ("2024-10-01", "10:00"), "UTC");
        assert!(matches!(config.time_window(), Err(AppConfigError::Window(_))));
    }

    #[test]
    fn test_time_window_rejects_time_in_dst_gap() {
        // Clocks jump from 02:00 to 03:00 in New York on 2024-03-10.
        let config = campaign(("2024-03-10", "02:30"), ("2024-03-11", "00:00"), "America/New_York");
        assert!(matches!(
            config.time_window(),
            Err(AppConfigError::NonexistentLocalTime { .. })
        ));
    }
}
