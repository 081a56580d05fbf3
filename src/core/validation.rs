//! Validation of identifiers and query arguments

/// Validate a queue or group identifier.
///
/// Names are non-empty and carry no surrounding whitespace. `@` is rejected
/// because it separates queue from group in consumer session keys.
pub fn validate_name(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} name must not be empty", kind));
    }
    if value.trim() != value {
        return Err(format!(
            "{} name '{}' must not start or end with whitespace",
            kind, value
        ));
    }
    if value.contains('@') {
        return Err(format!("{} name '{}' must not contain '@'", kind, value));
    }
    Ok(())
}

/// Largest number of intervals a single metrics query may ask for
pub const MAX_METRICS_BUCKETS: u32 = 10_000;

/// Validate a metrics window `[start, end)` split into `buckets` intervals
pub fn validate_window(start: i64, end: i64, buckets: u32) -> Result<(), String> {
    if start >= end {
        return Err(format!(
            "Window start {} must be before window end {}",
            start, end
        ));
    }
    if buckets == 0 {
        return Err("Bucket count must be greater than 0".to_string());
    }
    if buckets > MAX_METRICS_BUCKETS {
        return Err(format!(
            "Bucket count {} exceeds the limit of {}",
            buckets, MAX_METRICS_BUCKETS
        ));
    }
    Ok(())
}
