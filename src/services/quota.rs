//! Effective-limit resolution.
//!
//! Per-user quota blobs are JSON objects mapping limit names to integers.
//! They are written by the user-management collaborator and read-only
//! here. Malformed blobs never fail a request; they silently fall back to
//! the system default.

use std::collections::HashMap;

/// Quota key capping a single task's timeout, in seconds.
pub const MAX_EXECUTION_TIME: &str = "max_execution_time";
/// Quota key capping task submissions per identity per UTC day.
pub const MAX_EXECUTIONS_PER_DAY: &str = "max_executions_per_day";

/// Resolve the effective limit for `key`: the identity-specific value when
/// present and positive, else `system_default`.
pub fn effective_limit(quota_blob: Option<&str>, key: &str, system_default: i64) -> i64 {
    let Some(blob) = quota_blob else {
        return system_default;
    };

    match serde_json::from_str::<HashMap<String, i64>>(blob) {
        Ok(map) => match map.get(key) {
            Some(&value) if value > 0 => value,
            _ => system_default,
        },
        Err(_) => system_default,
    }
}

/// Clamp a requested timeout to the identity's effective cap. A missing or
/// non-positive request takes the cap itself.
pub fn effective_timeout(requested: Option<u32>, cap: u32) -> u32 {
    match requested {
        Some(t) if t > 0 && t < cap => t,
        _ => cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_when_positive() {
        let blob = r#"{"max_executions_per_day": 50}"#;
        assert_eq!(effective_limit(Some(blob), MAX_EXECUTIONS_PER_DAY, 1000), 50);
    }

    #[test]
    fn absent_key_falls_back() {
        let blob = r#"{"max_execution_time": 60}"#;
        assert_eq!(effective_limit(Some(blob), MAX_EXECUTIONS_PER_DAY, 1000), 1000);
        assert_eq!(effective_limit(Some(blob), MAX_EXECUTION_TIME, 300), 60);
    }

    #[test]
    fn non_positive_values_fall_back() {
        assert_eq!(
            effective_limit(Some(r#"{"max_executions_per_day": 0}"#), MAX_EXECUTIONS_PER_DAY, 1000),
            1000
        );
        assert_eq!(
            effective_limit(Some(r#"{"max_executions_per_day": -5}"#), MAX_EXECUTIONS_PER_DAY, 1000),
            1000
        );
    }

    #[test]
    fn malformed_blob_falls_back_silently() {
        assert_eq!(effective_limit(Some("not json"), MAX_EXECUTIONS_PER_DAY, 1000), 1000);
        assert_eq!(effective_limit(Some(r#"["array"]"#), MAX_EXECUTIONS_PER_DAY, 1000), 1000);
        assert_eq!(
            effective_limit(Some(r#"{"max_executions_per_day": "ten"}"#), MAX_EXECUTIONS_PER_DAY, 1000),
            1000
        );
        assert_eq!(effective_limit(None, MAX_EXECUTIONS_PER_DAY, 1000), 1000);
    }

    #[test]
    fn timeout_clamped_to_cap() {
        assert_eq!(effective_timeout(Some(60), 300), 60);
        assert_eq!(effective_timeout(Some(900), 300), 300);
        assert_eq!(effective_timeout(Some(0), 300), 300);
        assert_eq!(effective_timeout(None, 300), 300);
    }
}
