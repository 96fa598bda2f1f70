//! Lenient reading of record fields.
//!
//! The mobile app stores whatever its input widgets produced, so a numeric
//! field may arrive as a string, a number, a boolean or something else
//! entirely. Nothing here fails: unreadable values read as zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw record field as stored.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FieldValue(pub Value);

impl FieldValue {
    /// Leading-integer reading used for duration components and counts.
    ///
    /// - `"7"` -> 7, `" 8h"` -> 8, `"7.5"` -> 7, `"-3"` -> -3
    /// - numbers are truncated toward zero
    /// - anything without leading digits -> 0
    pub fn leading_int(&self) -> i64 {
        match &self.0 {
            Value::String(s) => parse_leading_int(s),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Whole-value decimal reading used for activity minutes.
    ///
    /// - `"30"` -> 30.0, `" 12.5 "` -> 12.5, `""` -> 0.0
    /// - `"12abc"` and non-finite values -> 0.0
    /// - booleans read as 1.0 / 0.0
    pub fn decimal(&self) -> f64 {
        let parsed = match &self.0 {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(0.0)
                }
            }
            Value::Bool(b) => f64::from(u8::from(*b)),
            _ => 0.0,
        };
        if parsed.is_finite() { parsed } else { 0.0 }
    }

    /// Whether the field holds anything at all: non-empty string, non-zero
    /// number, `true`, or a structured value.
    pub fn is_present(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Whether a categorical rating was given. The app writes the literal
    /// string `"null"` when the user skipped the question.
    pub fn is_rated(&self) -> bool {
        self.is_present() && self.0.as_str() != Some("null")
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative { -magnitude } else { magnitude }
}

/// Sum of `hours * 60 + minutes`, each read with [`FieldValue::leading_int`];
/// missing parts count as zero.
pub fn minutes_of(hours: Option<&FieldValue>, minutes: Option<&FieldValue>) -> i64 {
    let h = hours.map(FieldValue::leading_int).unwrap_or(0);
    let m = minutes.map(FieldValue::leading_int).unwrap_or(0);
    h.saturating_mul(60).saturating_add(m)
}
