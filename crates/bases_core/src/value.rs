//! Closed attribute value type shared by every evaluation and formatting site.
//!
//! Truthiness, emptiness, stringification and ordering are defined here once;
//! callers never re-derive coercions on their own.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A calendar date, optionally carrying a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Day(NaiveDate),
    Instant(NaiveDateTime),
}

impl DateValue {
    pub fn instant(&self) -> NaiveDateTime {
        match self {
            DateValue::Day(day) => day.and_hms_opt(0, 0, 0).unwrap_or_default(),
            DateValue::Instant(instant) => *instant,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            DateValue::Day(day) => *day,
            DateValue::Instant(instant) => instant.date(),
        }
    }

    /// `MM/DD/YYYY`, the display form used for date-named columns.
    pub fn to_us_date(&self) -> String {
        self.date().format("%m/%d/%Y").to_string()
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            DateValue::Instant(instant) => write!(f, "{}", instant.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses the ISO shapes front-matter dates are written in.
pub fn parse_iso_date(input: &str) -> Option<DateValue> {
    let s = input.trim();
    let bytes = s.as_bytes();
    // Cheap shape check before handing the text to chrono: `YYYY-MM-DD...`
    if bytes.len() < 10
        || !bytes[..4].iter().all(u8::is_ascii_digit)
        || bytes[4] != b'-'
        || bytes[7] != b'-'
    {
        return None;
    }
    if s.len() == 10 {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(DateValue::Day);
    }
    for format in ISO_DATETIME_FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(s, format) {
            return Some(DateValue::Instant(instant));
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| DateValue::Instant(dt.naive_local()))
}

/// Parses any date text a cell may hold: ISO forms plus `MM/DD/YYYY` and `YYYY/MM/DD`.
pub fn parse_date(input: &str) -> Option<DateValue> {
    if let Some(date) = parse_iso_date(input) {
        return Some(date);
    }
    let s = input.trim();
    ["%m/%d/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .map(DateValue::Day)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(DateValue),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose truthiness: null, false, zero, NaN and the empty string are false.
    /// Sequences and mappings are true even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Date(_) | Value::List(_) | Value::Map(_) => true,
        }
    }

    /// Emptiness as checked by `.isEmpty()`: null, `""` and the empty list.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Bool(_) | Value::Number(_) | Value::Date(_) | Value::Map(_) => false,
        }
    }

    /// Booleans, plus their textual spellings.
    pub fn as_loose_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Map(_) => "object",
        }
    }

    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.to_string(),
            Value::List(items) => items
                .iter()
                .map(Value::to_display_string)
                .collect::<Vec<_>>()
                .join(", "),
            Value::Map(_) => self.to_json().to_string(),
        }
    }

    /// Display-string equality, as used by `== "literal"` conditions.
    pub fn loose_eq_str(&self, literal: &str) -> bool {
        self.to_display_string() == literal
    }

    /// Total order used for sorting.
    ///
    /// Texts that parse as ISO dates order as dates. Values of different kinds
    /// order by kind (booleans, numbers, dates, texts, lists, mappings) and
    /// null always orders last.
    pub fn compare(&self, other: &Value) -> Ordering {
        let left = self.date_normalized();
        let right = other.date_normalized();
        compare_normalized(left.as_ref().unwrap_or(self), right.as_ref().unwrap_or(other))
    }

    fn date_normalized(&self) -> Option<Value> {
        match self {
            Value::Text(s) => parse_iso_date(s).map(Value::Date),
            _ => None,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::Date(_) => 2,
            Value::Text(_) => 3,
            Value::List(_) => 4,
            Value::Map(_) => 5,
            Value::Null => 6,
        }
    }

    /// Converts a JSON value (front-matter is parsed YAML converted to JSON).
    /// ISO-shaped strings become dates.
    pub fn from_json(value: &serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or_default(),
            serde_json::Value::String(s) => match parse_iso_date(s) {
                Some(date) => Value::Date(date),
                None => Value::Text(s.clone()),
            },
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.to_string()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn compare_normalized(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
        (Value::Date(a), Value::Date(b)) => a.instant().cmp(&b.instant()),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ord = x.compare(y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Map(_), Value::Map(_)) => left.to_display_string().cmp(&right.to_display_string()),
        _ => left.kind_rank().cmp(&right.kind_rank()),
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_loose_rules() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(Value::from("false").is_truthy());
        assert!(Value::List(Vec::new()).is_truthy());
        assert!(Value::from(2.5).is_truthy());
    }

    #[test]
    fn emptiness_covers_null_text_and_lists() {
        assert!(Value::Null.is_empty_value());
        assert!(Value::from("").is_empty_value());
        assert!(Value::List(Vec::new()).is_empty_value());
        assert!(!Value::from(" ").is_empty_value());
        assert!(!Value::from(0.0).is_empty_value());
        assert!(!Value::List(vec![Value::Null]).is_empty_value());
        assert!(!Value::Map(BTreeMap::new()).is_empty_value());
    }

    #[test]
    fn numbers_display_without_trailing_fraction() {
        assert_eq!(Value::from(3.0).to_display_string(), "3");
        assert_eq!(Value::from(-12.0).to_display_string(), "-12");
        assert_eq!(Value::from(2.5).to_display_string(), "2.5");
    }

    #[test]
    fn lists_and_dates_display() {
        let list = Value::List(vec![Value::from("a"), Value::from(1.0), Value::Null]);
        assert_eq!(list.to_display_string(), "a, 1, ");
        let date = parse_iso_date("2024-03-09").expect("iso date");
        assert_eq!(Value::Date(date).to_display_string(), "2024-03-09");
        assert_eq!(date.to_us_date(), "03/09/2024");
    }

    #[test]
    fn parses_date_shapes() {
        assert!(matches!(parse_iso_date("2024-01-02"), Some(DateValue::Day(_))));
        assert!(matches!(
            parse_iso_date("2024-01-02T10:30:00"),
            Some(DateValue::Instant(_))
        ));
        assert!(matches!(
            parse_iso_date("2024-01-02T10:30:00+02:00"),
            Some(DateValue::Instant(_))
        ));
        assert!(parse_iso_date("2024").is_none());
        assert!(parse_iso_date("not a date").is_none());
        assert!(parse_iso_date("2024-13-45").is_none());
        assert!(parse_date("12/31/2023").is_some());
    }

    #[test]
    fn json_conversion_detects_dates() {
        let json = serde_json::json!({
            "due": "2024-05-06",
            "title": "Plan",
            "tags": ["a", "b"],
            "count": 3
        });
        let value = Value::from_json(&json);
        assert!(matches!(value.get("due"), Some(Value::Date(_))));
        assert_eq!(value.get("title"), Some(&Value::from("Plan")));
        assert_eq!(value.get("count"), Some(&Value::from(3.0)));
    }

    #[test]
    fn compare_orders_within_kind() {
        assert_eq!(Value::from(2.0).compare(&Value::from(10.0)), Ordering::Less);
        assert_eq!(Value::from("b").compare(&Value::from("a")), Ordering::Greater);
        let early = Value::from("2023-01-01");
        let late = Value::Date(parse_iso_date("2024-01-01").expect("date"));
        assert_eq!(early.compare(&late), Ordering::Less);
    }

    #[test]
    fn null_orders_last() {
        assert_eq!(Value::Null.compare(&Value::from(1.0)), Ordering::Greater);
        assert_eq!(Value::from("z").compare(&Value::Null), Ordering::Less);
        assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn loose_bool_accepts_text_spellings() {
        assert_eq!(Value::from("TRUE").as_loose_bool(), Some(true));
        assert_eq!(Value::from(false).as_loose_bool(), Some(false));
        assert_eq!(Value::from("yes").as_loose_bool(), None);
    }
}
