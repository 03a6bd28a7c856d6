//! Lenient field parsing for master data.
//!
//! The master data is exported from a spreadsheet, so integers may arrive
//! as floats (`20.0`), numbers as strings (`"20"`) and booleans as `0/1`
//! or `"TRUE"`. These helpers are used through `#[serde(deserialize_with)]`.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

pub fn value_as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    number.filter(|f| f.is_finite())
}

pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}

fn non_negative(value: &Value) -> Option<f64> {
    value_as_f64(value).filter(|f| *f >= 0.0)
}

pub fn u32_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    non_negative(&value)
        .map(|f| f as u32)
        .ok_or_else(|| de::Error::custom(format!("expected a non-negative number, got {value}")))
}

pub fn u64_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    non_negative(&value)
        .map(|f| f as u64)
        .ok_or_else(|| de::Error::custom(format!("expected a non-negative number, got {value}")))
}

pub fn f64_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_as_f64(&value).ok_or_else(|| de::Error::custom(format!("expected a number, got {value}")))
}

/// Blank cells and unparsable values count as absent.
pub fn opt_u32_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(non_negative(&value).map(|f| f as u32))
}

pub fn bool_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_as_bool(&value).ok_or_else(|| de::Error::custom(format!("expected a boolean, got {value}")))
}

/// Accepts `"1,2, 3"`, `[1, 2, 3]`, `["1", "2"]` or a single number.
pub fn id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let ids = match &value {
        Value::String(s) => s
            .split(',')
            .filter_map(|part| part.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u32)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(non_negative)
            .map(|f| f as u32)
            .collect(),
        Value::Null => Vec::new(),
        other => non_negative(other).map(|f| vec![f as u32]).unwrap_or_default(),
    };
    Ok(ids)
}
