/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Calendar year (UTC) of a millisecond timestamp
pub fn year_of_millis(millis: i64) -> i32 {
    use chrono::Datelike;
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.year())
        .unwrap_or(1970)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_of_millis() {
        // 2025-03-01T00:00:00Z
        assert_eq!(year_of_millis(1_740_787_200_000), 2025);
        assert_eq!(year_of_millis(0), 1970);
    }

    #[test]
    fn test_now_millis_is_recent() {
        assert!(now_millis() > 1_700_000_000_000);
    }
}
