//! Builder for filter expressions in the upstream order query language.

use std::fmt;

use crate::models::QueryRange;

/// A filter selecting paid orders created within a range, optionally
/// restricted to orders carrying at least one of a set of tags.
///
/// Renders as
/// `(tag:a OR tag:b) AND created_at:>'<start>' AND created_at:<='<end>' AND financial_status:paid`,
/// with the tag clause omitted when no tags are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilter {
    tags: Vec<String>,
    start_iso: String,
    end_iso: String,
}

impl OrderFilter {
    /// All paid orders created in `(range.start, range.end]`.
    pub fn paid(range: &QueryRange) -> Self {
        Self { tags: Vec::new(), start_iso: range.start_iso(), end_iso: range.end_iso() }
    }

    /// Restricts the filter to orders carrying any of `tags`.
    pub fn tagged<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the filter carries a tag clause.
    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }
}

impl fmt::Display for OrderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.tags.is_empty() {
            let tag_clause =
                self.tags.iter().map(|t| format!("tag:{t}")).collect::<Vec<_>>().join(" OR ");
            write!(f, "({tag_clause}) AND ")?;
        }
        write!(
            f,
            "created_at:>'{}' AND created_at:<='{}' AND financial_status:paid",
            self.start_iso, self.end_iso
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn range() -> QueryRange {
        QueryRange {
            start: Utc.with_ymd_and_hms(2024, 10, 1, 4, 30, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 10, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_paid_filter() {
        let filter = OrderFilter::paid(&range());
        assert!(!filter.is_tagged());
        assert_eq!(
            filter.to_string(),
            "created_at:>'2024-10-01T04:30:00+00:00' AND created_at:<='2024-10-01T12:30:00+00:00' \
             AND financial_status:paid"
        );
    }

    #[test]
    fn test_tagged_filter_puts_tag_clause_first() {
        let filter = OrderFilter::paid(&range()).tagged(["diwali", "flash"]);
        assert!(filter.is_tagged());
        assert_eq!(
            filter.to_string(),
            "(tag:diwali OR tag:flash) AND created_at:>'2024-10-01T04:30:00+00:00' \
             AND created_at:<='2024-10-01T12:30:00+00:00' AND financial_status:paid"
        );
    }

    #[test]
    fn test_tagged_with_empty_list_is_untagged() {
        let filter = OrderFilter::paid(&range()).tagged(Vec::<String>::new());
        assert_eq!(filter, OrderFilter::paid(&range()));
    }
}
