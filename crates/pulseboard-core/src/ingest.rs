//! Normalization and validation of inbound metric batches.
//!
//! A webhook body may be a single record or an array of records;
//! [`normalize_payload`] flattens both shapes into one ordered sequence before
//! any validation runs. [`validate_batch`] then checks every record and fails
//! on the first violation, so no partial batch ever reaches storage.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::content::Platform;

/// The nine numeric metric fields a record may carry, in wire order.
pub const METRIC_FIELDS: [&str; 9] = [
    "followers",
    "reach",
    "impressions",
    "engagement_rate",
    "likes",
    "comments",
    "shares",
    "saves",
    "profile_visits",
];

/// Composite uniqueness key for a stored insight, scoped to one account.
///
/// Upserting on this key is what makes ingestion idempotent: resubmitting a
/// record for the same platform and day overwrites rather than duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsightKey {
    pub platform: Platform,
    pub date: NaiveDate,
}

/// One validated, normalized metric record. Omitted metrics default to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub key: InsightKey,
    pub followers: i64,
    pub reach: i64,
    pub impressions: i64,
    pub engagement_rate: f64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub saves: i64,
    pub profile_visits: i64,
}

/// Why a single record was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Each record must be an object")]
    NotAnObject,
    #[error("Invalid platform. Must be one of: instagram, tiktok")]
    InvalidPlatform,
    #[error("Invalid date. Must be in YYYY-MM-DD format")]
    InvalidDate,
    #[error("Field \"{0}\" must be a number")]
    NonNumericMetric(&'static str),
}

/// A batch rejected at record `index` (0-based) for `reason`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Record {index}: {reason}")]
pub struct BatchError {
    pub index: usize,
    pub reason: ValidationError,
}

/// Flattens a webhook body into an ordered batch: an array is used as-is, any
/// other value is treated as a one-element batch.
#[must_use]
pub fn normalize_payload(body: Value) -> Vec<Value> {
    match body {
        Value::Array(records) => records,
        other => vec![other],
    }
}

/// Validates every record in order; the first invalid record aborts the batch.
///
/// # Errors
///
/// Returns [`BatchError`] naming the 0-based index of the first invalid record
/// and the specific violation.
pub fn validate_batch(records: &[Value]) -> Result<Vec<MetricRecord>, BatchError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            validate_record(record).map_err(|reason| BatchError { index, reason })
        })
        .collect()
}

/// Validates one record and normalizes it, defaulting omitted metrics to zero.
///
/// # Errors
///
/// Returns [`ValidationError`] for a non-object record, an unknown platform, a
/// date outside the `YYYY-MM-DD` pattern (or not a real calendar day), or a
/// metric field that is present but not a JSON number.
pub fn validate_record(record: &Value) -> Result<MetricRecord, ValidationError> {
    let obj = record.as_object().ok_or(ValidationError::NotAnObject)?;

    let platform = obj
        .get("platform")
        .and_then(Value::as_str)
        .and_then(Platform::parse)
        .ok_or(ValidationError::InvalidPlatform)?;

    let date = obj
        .get("date")
        .and_then(Value::as_str)
        .filter(|s| matches_date_pattern(s))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .ok_or(ValidationError::InvalidDate)?;

    for field in METRIC_FIELDS {
        if let Some(v) = obj.get(field) {
            if !v.is_number() {
                return Err(ValidationError::NonNumericMetric(field));
            }
        }
    }

    Ok(MetricRecord {
        key: InsightKey { platform, date },
        followers: count_metric(obj, "followers"),
        reach: count_metric(obj, "reach"),
        impressions: count_metric(obj, "impressions"),
        engagement_rate: rate_metric(obj, "engagement_rate"),
        likes: count_metric(obj, "likes"),
        comments: count_metric(obj, "comments"),
        shares: count_metric(obj, "shares"),
        saves: count_metric(obj, "saves"),
        profile_visits: count_metric(obj, "profile_visits"),
    })
}

/// Joins the distinct platforms of a batch in first-seen order with ", ",
/// the format stored on audit rows.
#[must_use]
pub fn joined_platforms(records: &[MetricRecord]) -> String {
    let mut seen: Vec<Platform> = Vec::new();
    for record in records {
        if !seen.contains(&record.key.platform) {
            seen.push(record.key.platform);
        }
    }
    seen.iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Literal `YYYY-MM-DD` shape check: four digits, hyphen, two digits, hyphen,
/// two digits.
fn matches_date_pattern(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}

// Integer-column metrics round to the nearest whole number, the same coercion
// the database would apply.
#[allow(clippy::cast_possible_truncation)]
fn count_metric(obj: &Map<String, Value>, field: &str) -> i64 {
    match obj.get(field) {
        Some(v) => v
            .as_i64()
            .unwrap_or_else(|| v.as_f64().map_or(0, |f| f.round() as i64)),
        None => 0,
    }
}

fn rate_metric(obj: &Map<String, Value>, field: &str) -> f64 {
    obj.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_record() -> Value {
        json!({
            "platform": "instagram",
            "date": "2024-05-01",
            "followers": 1000,
            "likes": 50
        })
    }

    #[test]
    fn normalize_wraps_bare_object() {
        let batch = normalize_payload(valid_record());
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn normalize_keeps_array_order() {
        let batch = normalize_payload(json!([
            {"platform": "tiktok", "date": "2024-05-02"},
            {"platform": "instagram", "date": "2024-05-01"}
        ]));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0]["platform"], "tiktok");
    }

    #[test]
    fn normalize_wraps_scalar_as_single_invalid_record() {
        let batch = normalize_payload(json!("not a record"));
        assert_eq!(batch.len(), 1);
        assert_eq!(
            validate_batch(&batch),
            Err(BatchError {
                index: 0,
                reason: ValidationError::NotAnObject
            })
        );
    }

    #[test]
    fn valid_record_defaults_omitted_metrics_to_zero() {
        let record = validate_record(&valid_record()).expect("valid");
        assert_eq!(record.key.platform, Platform::Instagram);
        assert_eq!(record.key.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(record.followers, 1000);
        assert_eq!(record.likes, 50);
        assert_eq!(record.reach, 0);
        assert_eq!(record.impressions, 0);
        assert!((record.engagement_rate - 0.0).abs() < f64::EPSILON);
        assert_eq!(record.comments, 0);
        assert_eq!(record.shares, 0);
        assert_eq!(record.saves, 0);
        assert_eq!(record.profile_visits, 0);
    }

    #[test]
    fn engagement_rate_keeps_fractional_precision() {
        let record = validate_record(&json!({
            "platform": "tiktok",
            "date": "2024-06-15",
            "engagement_rate": 4.25
        }))
        .expect("valid");
        assert!((record.engagement_rate - 4.25).abs() < f64::EPSILON);
    }

    #[test]
    fn fractional_count_rounds() {
        let record = validate_record(&json!({
            "platform": "instagram",
            "date": "2024-06-15",
            "likes": 50.6
        }))
        .expect("valid");
        assert_eq!(record.likes, 51);
    }

    #[test]
    fn missing_platform_is_invalid() {
        let err = validate_record(&json!({"date": "2024-05-01"})).unwrap_err();
        assert_eq!(err, ValidationError::InvalidPlatform);
        assert_eq!(
            err.to_string(),
            "Invalid platform. Must be one of: instagram, tiktok"
        );
    }

    #[test]
    fn unknown_platform_is_invalid() {
        let err = validate_record(&json!({"platform": "facebook", "date": "2024-05-01"}))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidPlatform);
    }

    #[test]
    fn missing_date_is_invalid() {
        let err = validate_record(&json!({"platform": "instagram"})).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate);
        assert_eq!(
            err.to_string(),
            "Invalid date. Must be in YYYY-MM-DD format"
        );
    }

    #[test]
    fn malformed_date_is_invalid() {
        for bad in ["05/01/2024", "2024-5-1", "2024-05-01T00:00:00Z", "20240501"] {
            let err = validate_record(&json!({"platform": "instagram", "date": bad}))
                .unwrap_err();
            assert_eq!(err, ValidationError::InvalidDate, "date: {bad}");
        }
    }

    #[test]
    fn impossible_calendar_day_is_invalid() {
        let err = validate_record(&json!({"platform": "instagram", "date": "2024-02-31"}))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate);
    }

    #[test]
    fn non_numeric_metric_names_the_field() {
        let err = validate_record(&json!({
            "platform": "instagram",
            "date": "2024-05-01",
            "reach": "lots"
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::NonNumericMetric("reach"));
        assert_eq!(err.to_string(), "Field \"reach\" must be a number");
    }

    #[test]
    fn null_metric_is_rejected() {
        let err = validate_record(&json!({
            "platform": "instagram",
            "date": "2024-05-01",
            "saves": null
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::NonNumericMetric("saves"));
    }

    #[test]
    fn batch_error_reports_first_invalid_index() {
        let batch = vec![
            valid_record(),
            json!({"platform": "instagram"}),
            json!({"platform": "nope", "date": "2024-05-03"}),
        ];
        let err = validate_batch(&batch).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.reason, ValidationError::InvalidDate);
        assert_eq!(
            err.to_string(),
            "Record 1: Invalid date. Must be in YYYY-MM-DD format"
        );
    }

    #[test]
    fn batch_preserves_record_order() {
        let batch = vec![
            json!({"platform": "tiktok", "date": "2024-05-02"}),
            json!({"platform": "instagram", "date": "2024-05-01"}),
        ];
        let records = validate_batch(&batch).expect("valid batch");
        assert_eq!(records[0].key.platform, Platform::Tiktok);
        assert_eq!(records[1].key.platform, Platform::Instagram);
    }

    #[test]
    fn joined_platforms_dedupes_in_first_seen_order() {
        let batch = vec![
            json!({"platform": "tiktok", "date": "2024-05-01"}),
            json!({"platform": "instagram", "date": "2024-05-01"}),
            json!({"platform": "tiktok", "date": "2024-05-02"}),
        ];
        let records = validate_batch(&batch).expect("valid batch");
        assert_eq!(joined_platforms(&records), "tiktok, instagram");
    }

    #[test]
    fn joined_platforms_single() {
        let records = validate_batch(&[valid_record()]).expect("valid");
        assert_eq!(joined_platforms(&records), "instagram");
    }
}
