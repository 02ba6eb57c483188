use time::OffsetDateTime;

/// Wall-clock epoch milliseconds, as stored in documents.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
