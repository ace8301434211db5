use chrono::{DateTime, NaiveDateTime, Utc};
use pulse_core::{NormalizeError, RawRecord, RecordPayload, Sample};
use serde_json::Value;

/// Field names accepted for the numeric measurement, in precedence order.
/// Producers in the wild emit `sentiment` and `temperature` rather than a
/// canonical `value`.
const VALUE_FIELDS: [&str; 3] = ["value", "sentiment", "temperature"];

/// Turn a raw source payload into a canonical [`Sample`].
///
/// Pure: no logging, no side effects — the caller decides how to surface a
/// failure. Bytes are decoded as UTF-8 and then, like text, parsed as a JSON
/// object. `timestamp` and a numeric value field are required; `category`
/// defaults to `"other"`.
pub fn normalize(record: &RawRecord) -> Result<Sample, NormalizeError> {
    let parsed;
    let object = match &record.payload {
        RecordPayload::Structured(value) => value,
        RecordPayload::Text(text) => {
            parsed = parse_json(text)?;
            &parsed
        }
        RecordPayload::Bytes(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| NormalizeError::MalformedPayload(format!("invalid UTF-8: {e}")))?;
            parsed = parse_json(text)?;
            &parsed
        }
    };

    let fields = object
        .as_object()
        .ok_or_else(|| NormalizeError::MalformedPayload("not a JSON object".to_string()))?;

    let timestamp = fields
        .get("timestamp")
        .ok_or(NormalizeError::IncompleteRecord("timestamp"))
        .and_then(parse_timestamp)?;

    let value = VALUE_FIELDS
        .iter()
        .find_map(|key| fields.get(*key))
        .ok_or(NormalizeError::IncompleteRecord("value"))
        .and_then(parse_value)?;

    let category = fields
        .get("category")
        .and_then(Value::as_str)
        .unwrap_or("other");

    Ok(Sample::new(timestamp, value, category))
}

fn parse_json(text: &str) -> Result<Value, NormalizeError> {
    serde_json::from_str(text).map_err(|e| NormalizeError::MalformedPayload(e.to_string()))
}

fn parse_value(raw: &Value) -> Result<f64, NormalizeError> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| NormalizeError::MalformedPayload(format!("value out of range: {n}"))),
        // Producers occasionally quote numerics.
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| NormalizeError::MalformedPayload(format!("non-numeric value: {s:?}"))),
        other => Err(NormalizeError::MalformedPayload(format!(
            "non-numeric value: {other}"
        ))),
    }
}

/// Tolerant timestamp parsing: epoch seconds (int or float), ISO-8601 with or
/// without a trailing zone marker, and the producer's `"YYYY-MM-DD HH:MM:SS"`
/// naive format. Naive timestamps are treated as UTC.
fn parse_timestamp(raw: &Value) -> Result<DateTime<Utc>, NormalizeError> {
    if let Some(epoch) = raw.as_f64() {
        return DateTime::from_timestamp_millis((epoch * 1_000.0) as i64)
            .ok_or_else(|| NormalizeError::InvalidTimestamp(epoch.to_string()));
    }
    let text = raw
        .as_str()
        .ok_or_else(|| NormalizeError::InvalidTimestamp(raw.to_string()))?;
    parse_timestamp_str(text)
}

fn parse_timestamp_str(text: &str) -> Result<DateTime<Utc>, NormalizeError> {
    // Zoned ISO-8601 ("Z" or an explicit offset).
    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Ok(zoned.with_timezone(&Utc));
    }
    // Naive variants, with and without fractional seconds.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    // Last resort: truncate subsecond noise and retry the naive formats.
    if let Some(head) = text.get(..19) {
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(head, format) {
                return Ok(naive.and_utc());
            }
        }
    }
    Err(NormalizeError::InvalidTimestamp(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn text_record(json: &str) -> RawRecord {
        RawRecord::text(json)
    }

    #[test]
    fn parses_well_formed_record() {
        let record = text_record(
            r#"{"timestamp": "2025-01-11T18:15:00Z", "value": 225.0, "category": "tech"}"#,
        );
        let sample = normalize(&record).unwrap();
        assert_eq!(
            sample.timestamp,
            Utc.with_ymd_and_hms(2025, 1, 11, 18, 15, 0).unwrap()
        );
        assert_eq!(sample.value, 225.0);
        assert_eq!(sample.category, "tech");
    }

    #[test]
    fn parsing_is_idempotent() {
        let record = text_record(r#"{"timestamp": "2025-01-11T18:15:00Z", "value": 225.0}"#);
        let a = normalize(&record).unwrap();
        let b = normalize(&record).unwrap();
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a, b);
    }

    #[test]
    fn bytes_payloads_are_decoded_first() {
        let record = RawRecord::bytes(
            br#"{"timestamp": "2025-01-11 18:15:00", "sentiment": 0.62}"#.to_vec(),
        );
        let sample = normalize(&record).unwrap();
        assert_eq!(sample.value, 0.62);
        assert_eq!(sample.category, "other");
    }

    #[test]
    fn structured_payloads_skip_decoding() {
        let record = RawRecord::structured(json!({
            "timestamp": 1736619300.5,
            "temperature": 225.0,
            "category": "smoker",
        }));
        let sample = normalize(&record).unwrap();
        assert_eq!(sample.value, 225.0);
        assert_eq!(sample.timestamp.timestamp_millis(), 1_736_619_300_500);
    }

    #[test]
    fn naive_timestamps_are_treated_as_utc() {
        let a = normalize(&text_record(
            r#"{"timestamp": "2025-01-11 18:15:00", "value": 1.0}"#,
        ))
        .unwrap();
        let b = normalize(&text_record(
            r#"{"timestamp": "2025-01-11T18:15:00Z", "value": 1.0}"#,
        ))
        .unwrap();
        assert_eq!(a.timestamp, b.timestamp);
    }

    #[test]
    fn subsecond_noise_is_truncated_as_a_fallback() {
        let record = text_record(
            r#"{"timestamp": "2025-01-11T18:15:00.123456789+junk", "value": 1.0}"#,
        );
        let sample = normalize(&record).unwrap();
        assert_eq!(
            sample.timestamp,
            Utc.with_ymd_and_hms(2025, 1, 11, 18, 15, 0).unwrap()
        );
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let record = RawRecord::bytes(vec![0xff, 0xfe, 0x01]);
        assert!(matches!(
            normalize(&record),
            Err(NormalizeError::MalformedPayload(_))
        ));
    }

    #[test]
    fn broken_json_is_malformed() {
        let record = text_record("{not json");
        assert!(matches!(
            normalize(&record),
            Err(NormalizeError::MalformedPayload(_))
        ));
    }

    #[test]
    fn non_object_json_is_malformed() {
        let record = text_record("[1, 2, 3]");
        assert!(matches!(
            normalize(&record),
            Err(NormalizeError::MalformedPayload(_))
        ));
    }

    #[test]
    fn missing_timestamp_is_incomplete() {
        let record = text_record(r#"{"value": 1.0}"#);
        assert_eq!(
            normalize(&record),
            Err(NormalizeError::IncompleteRecord("timestamp"))
        );
    }

    #[test]
    fn missing_value_is_incomplete() {
        let record = text_record(r#"{"timestamp": "2025-01-11T18:15:00Z"}"#);
        assert_eq!(
            normalize(&record),
            Err(NormalizeError::IncompleteRecord("value"))
        );
    }

    #[test]
    fn garbage_timestamp_is_invalid() {
        let record = text_record(r#"{"timestamp": "yesterday-ish", "value": 1.0}"#);
        assert!(matches!(
            normalize(&record),
            Err(NormalizeError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn value_field_aliases_in_precedence_order() {
        let record = text_record(
            r#"{"timestamp": "2025-01-11T18:15:00Z", "value": 1.0, "sentiment": 2.0}"#,
        );
        assert_eq!(normalize(&record).unwrap().value, 1.0);
    }

    #[test]
    fn quoted_numeric_values_are_accepted() {
        let record = text_record(r#"{"timestamp": "2025-01-11T18:15:00Z", "value": "0.75"}"#);
        assert_eq!(normalize(&record).unwrap().value, 0.75);
    }
}
