//! Opaque pagination cursors.
//!
//! Generalises the two-part (`createdAt`, `did`) keyset cursor pattern to an
//! arbitrary N-tuple of sort field values plus a trailing `cid` tiebreaker,
//! base64url-encoded instead of `::`-delimited so field values containing
//! the delimiter don't corrupt the cursor.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value as JsonValue;
use skydex_core::Record;

use crate::error::QueryError;
use crate::field::FieldResolver;
use crate::order::SortSpec;
use crate::value::Value;

/// A cursor decoded back into its constituent field values, in the same
/// order they were encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedCursor {
    pub values: Vec<Value>,
    pub cid: String,
}

/// Encodes and decodes opaque pagination cursors.
///
/// The wire format is `base64url(value1|value2|...|valueN|cid)` with no
/// padding. Each value is stringified by tag so the decoder can round-trip
/// without a schema: `t:<text>`, `i:<integer>`, `b:0`/`b:1`, `n` for null.
pub struct CursorCodec;

const TEXT_TAG: char = 't';
const INTEGER_TAG: char = 'i';
const BOOLEAN_TAG: char = 'b';
const NULL_TAG: char = 'n';
const FIELD_DELIMITER: char = '|';

impl CursorCodec {
    /// Project a Record's sort-field values, in `spec` order, as cursor
    /// values — table columns read directly, JSON fields are stringified
    /// per the rules in [`Self::stringify_json`].
    pub fn project(record: &Record, spec: &SortSpec) -> Vec<Value> {
        spec.fields
            .iter()
            .map(|field| {
                if FieldResolver::is_table_column(&field.name) {
                    Self::table_column_value(record, &field.name)
                } else if FieldResolver::is_actor_handle(&field.name) {
                    Value::Null
                } else {
                    match record.json_path(&field.name) {
                        Some(value) => Self::stringify_json(value),
                        None => Value::text("NULL"),
                    }
                }
            })
            .collect()
    }

    fn table_column_value(record: &Record, name: &str) -> Value {
        match name {
            "uri" => Value::text(record.uri.clone()),
            "cid" => Value::text(record.cid.clone()),
            "did" => Value::text(record.did.clone()),
            "collection" => Value::text(record.collection.clone()),
            "rkey" => Value::text(record.rkey.clone()),
            "indexed_at" => Value::text(record.indexed_at.to_rfc3339()),
            _ => Value::text("NULL"),
        }
    }

    /// Stringify a JSON value per the cursor encoding rules: strings as-is,
    /// numbers in decimal notation, booleans as `"true"`/`"false"`, and
    /// null (or any non-scalar) as the literal `"NULL"`.
    fn stringify_json(value: &JsonValue) -> Value {
        match value {
            JsonValue::String(s) => Value::text(s.clone()),
            JsonValue::Number(n) => Value::text(n.to_string()),
            JsonValue::Bool(b) => Value::text(if *b { "true" } else { "false" }),
            _ => Value::text("NULL"),
        }
    }

    pub fn encode(values: &[Value], cid: &str) -> String {
        let mut parts: Vec<String> = values.iter().map(Self::encode_value).collect();
        parts.push(format!("{TEXT_TAG}:{}", Self::escape(cid)));
        let raw = parts.join(&FIELD_DELIMITER.to_string());
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    pub fn decode(cursor: &str) -> Result<DecodedCursor, QueryError> {
        let raw = URL_SAFE_NO_PAD
            .decode(cursor.as_bytes())
            .map_err(|_| QueryError::InvalidCursor)?;
        let raw = String::from_utf8(raw).map_err(|_| QueryError::InvalidCursor)?;

        let mut parts = Self::split_unescaped(&raw);
        if parts.is_empty() {
            return Err(QueryError::InvalidCursor);
        }
        let cid_part = parts.pop().ok_or(QueryError::InvalidCursor)?;
        let cid = Self::decode_text(&cid_part)?;

        let values = parts
            .iter()
            .map(|part| Self::decode_value(part))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DecodedCursor { values, cid })
    }

    /// Escape `\` and the field delimiter `|` so a value that happens to
    /// contain a literal `|` (legitimate indexed JSON text can) doesn't get
    /// mistaken for a field boundary on decode.
    fn escape(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                FIELD_DELIMITER => out.push_str("\\|"),
                _ => out.push(c),
            }
        }
        out
    }

    fn unescape(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Split on `|`, skipping delimiters that were escaped with `\` by
    /// [`Self::escape`]. The returned pieces still carry their escape
    /// sequences; callers unescape after stripping the tag prefix.
    fn split_unescaped(raw: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if c == FIELD_DELIMITER {
                parts.push(std::mem::take(&mut current));
            } else {
                current.push(c);
            }
        }
        parts.push(current);
        parts
    }

    fn encode_value(value: &Value) -> String {
        match value {
            Value::Text(s) => format!("{TEXT_TAG}:{}", Self::escape(s)),
            Value::Integer(n) => format!("{INTEGER_TAG}:{n}"),
            Value::Boolean(b) => format!("{BOOLEAN_TAG}:{}", if *b { 1 } else { 0 }),
            Value::Null => format!("{NULL_TAG}:"),
        }
    }

    fn decode_value(part: &str) -> Result<Value, QueryError> {
        let (tag, rest) = part.split_once(':').ok_or(QueryError::InvalidCursor)?;
        match tag.chars().next() {
            Some(TEXT_TAG) => Ok(Value::Text(Self::unescape(rest))),
            Some(INTEGER_TAG) => rest.parse::<i64>().map(Value::Integer).map_err(|_| QueryError::InvalidCursor),
            Some(BOOLEAN_TAG) => match rest {
                "0" => Ok(Value::Boolean(false)),
                "1" => Ok(Value::Boolean(true)),
                _ => Err(QueryError::InvalidCursor),
            },
            Some(NULL_TAG) => Ok(Value::Null),
            _ => Err(QueryError::InvalidCursor),
        }
    }

    fn decode_text(part: &str) -> Result<String, QueryError> {
        match Self::decode_value(part)? {
            Value::Text(s) => Ok(s),
            _ => Err(QueryError::InvalidCursor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{SortDirection, SortField};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_record() -> Record {
        Record {
            uri: "at://did:plc:abc/app.bsky.feed.post/1".into(),
            cid: "bafyabc".into(),
            did: "did:plc:abc".into(),
            collection: "app.bsky.feed.post".into(),
            json: json!({"age": 30, "verified": true}),
            indexed_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            rkey: "1".into(),
        }
    }

    // P5 (cursor round-trip): project(r, S) encodes and decodes back unchanged.
    #[test]
    fn project_then_round_trip_preserves_values() {
        let record = sample_record();
        let spec = SortSpec::new(vec![
            SortField {
                name: "did".to_string(),
                direction: SortDirection::Ascending,
            },
            SortField {
                name: "age".to_string(),
                direction: SortDirection::Descending,
            },
        ]);

        let values = CursorCodec::project(&record, &spec);
        let encoded = CursorCodec::encode(&values, &record.cid);
        let decoded = CursorCodec::decode(&encoded).unwrap();

        assert_eq!(decoded.values, values);
        assert_eq!(decoded.cid, record.cid);
        assert_eq!(values, vec![Value::text("did:plc:abc"), Value::text("30")]);
    }

    #[test]
    fn project_missing_json_path_yields_null_literal() {
        let record = sample_record();
        let spec = SortSpec::new(vec![SortField {
            name: "missingField".to_string(),
            direction: SortDirection::Ascending,
        }]);
        let values = CursorCodec::project(&record, &spec);
        assert_eq!(values, vec![Value::text("NULL")]);
    }

    #[test]
    fn project_boolean_json_field_stringifies_lowercase() {
        let record = sample_record();
        let spec = SortSpec::new(vec![SortField {
            name: "verified".to_string(),
            direction: SortDirection::Ascending,
        }]);
        let values = CursorCodec::project(&record, &spec);
        assert_eq!(values, vec![Value::text("true")]);
    }

    #[test]
    fn round_trips_single_field() {
        let encoded = CursorCodec::encode(&[Value::text("2024-01-01T00:00:00Z")], "bafyabc");
        let decoded = CursorCodec::decode(&encoded).unwrap();
        assert_eq!(decoded.values, vec![Value::text("2024-01-01T00:00:00Z")]);
        assert_eq!(decoded.cid, "bafyabc");
    }

    #[test]
    fn round_trips_multi_field_mixed_types() {
        let values = vec![Value::Integer(42), Value::text("rock"), Value::Boolean(true)];
        let encoded = CursorCodec::encode(&values, "bafycid");
        let decoded = CursorCodec::decode(&encoded).unwrap();
        assert_eq!(decoded.values, values);
        assert_eq!(decoded.cid, "bafycid");
    }

    #[test]
    fn round_trips_null_field() {
        let encoded = CursorCodec::encode(&[Value::Null], "cid1");
        let decoded = CursorCodec::decode(&encoded).unwrap();
        assert_eq!(decoded.values, vec![Value::Null]);
    }

    #[test]
    fn delimiter_in_value_does_not_corrupt_cursor() {
        let encoded = CursorCodec::encode(&[Value::text("a|b|c")], "cid1");
        let decoded = CursorCodec::decode(&encoded).unwrap();
        assert_eq!(decoded.values, vec![Value::text("a|b|c")]);
        assert_eq!(decoded.cid, "cid1");
    }

    #[test]
    fn cursor_is_url_safe() {
        let encoded = CursorCodec::encode(&[Value::text("needs/padding==")], "cid");
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn garbage_input_is_invalid_cursor() {
        assert!(matches!(CursorCodec::decode("not valid base64!!"), Err(QueryError::InvalidCursor)));
    }

    #[test]
    fn malformed_tag_is_invalid_cursor() {
        let raw = URL_SAFE_NO_PAD.encode(b"x:nope|t:cid");
        assert!(matches!(CursorCodec::decode(&raw), Err(QueryError::InvalidCursor)));
    }

    #[test]
    fn non_integer_payload_for_integer_tag_is_invalid() {
        let raw = URL_SAFE_NO_PAD.encode(b"i:notanumber|t:cid");
        assert!(matches!(CursorCodec::decode(&raw), Err(QueryError::InvalidCursor)));
    }
}
