//! MySQL type mappings.
//!
//! This module converts MySQL result rows into JSON maps.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies the driver's column type name into a logical category
//! 2. Category-specific decoders handle the actual value extraction
//!
//! Statements are sent over the text protocol, so every value arrives as text on
//! the wire. Typed decoding is tried first; anything the typed decoders reject
//! (zero dates, negative TIME values, YEAR, BIT) falls back to the raw text.

use crate::models::ColumnMetadata;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Column, Decode, Row, Type, TypeInfo};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for MySQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Binary,
    Json,
    Date,
    DateTime,
    Time,
    Unknown,
}

/// Classify a MySQL type name (as reported by the driver) into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    // TINYINT, SMALLINT, MEDIUMINT, INT, BIGINT and their UNSIGNED variants
    if lower.contains("int") && lower != "point" {
        return TypeCategory::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "json" {
        return TypeCategory::Json;
    }

    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }

    match lower.as_str() {
        "date" => TypeCategory::Date,
        "datetime" | "timestamp" => TypeCategory::DateTime,
        "time" => TypeCategory::Time,
        // VARCHAR, CHAR, TEXT, ENUM, SET, YEAR, BIT, ...
        _ => TypeCategory::Unknown,
    }
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Decode binary data to JSON value.
///
/// If `decode_binary` is true, attempts to decode as UTF-8 text first.
/// Falls back to base64 encoding if not valid UTF-8 or if `decode_binary` is false.
pub fn decode_binary_value(bytes: &[u8], decode_binary: bool) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    if decode_binary {
        match std::str::from_utf8(bytes) {
            Ok(s) => JsonValue::String(s.to_string()),
            Err(_) => JsonValue::String(STANDARD.encode(bytes)),
        }
    } else {
        JsonValue::String(STANDARD.encode(bytes))
    }
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    /// Convert with binary columns shown as text when they are valid UTF-8.
    ///
    /// MySQL reports many `SHOW` and `information_schema` columns as binary,
    /// so text is the useful default.
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        self.to_json_map_with_options(true)
    }
    fn to_json_map_with_options(&self, decode_binary: bool) -> serde_json::Map<String, JsonValue>;
    fn get_column_metadata(&self) -> Vec<ColumnMetadata>;
}

impl RowToJson for MySqlRow {
    fn to_json_map_with_options(&self, decode_binary: bool) -> serde_json::Map<String, JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name);
                let value = decode_column(self, idx, type_name, category, decode_binary);
                (col.name().to_string(), value)
            })
            .collect()
    }

    fn get_column_metadata(&self) -> Vec<ColumnMetadata> {
        self.columns()
            .iter()
            .map(|col| {
                ColumnMetadata::new(
                    col.name(),
                    col.type_info().name(),
                    !col.type_info().is_null(),
                )
            })
            .collect()
    }
}

// =============================================================================
// Decoders
// =============================================================================

fn decode_column(
    row: &MySqlRow,
    idx: usize,
    type_name: &str,
    category: TypeCategory,
    decode_binary: bool,
) -> JsonValue {
    match category {
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Boolean => decode_boolean(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Binary => decode_binary_col(row, idx, decode_binary),
        TypeCategory::Json => decode_json(row, idx),
        TypeCategory::Date => decode_date(row, idx),
        TypeCategory::DateTime => decode_datetime(row, idx),
        TypeCategory::Time => decode_time(row, idx),
        TypeCategory::Unknown => decode_text(row, idx, type_name),
    }
}

fn decode_decimal(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.0),
        Ok(None) => JsonValue::Null,
        Err(e) => {
            tracing::error!("Failed to decode DECIMAL: {:?}", e);
            JsonValue::Null
        }
    }
}

fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
    // Check NULL first
    if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Null;
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<u32>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<u16>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<u8>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    raw_text(row, idx)
}

fn decode_boolean(row: &MySqlRow, idx: usize) -> JsonValue {
    row.try_get::<Option<bool>, _>(idx)
        .ok()
        .flatten()
        .map(JsonValue::Bool)
        .unwrap_or(JsonValue::Null)
}

fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
        return serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
        return serde_json::Number::from_f64(v as f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    JsonValue::Null
}

fn decode_binary_col(row: &MySqlRow, idx: usize, decode_binary: bool) -> JsonValue {
    row.try_get::<Option<Vec<u8>>, _>(idx)
        .ok()
        .flatten()
        .map(|v| decode_binary_value(&v, decode_binary))
        .unwrap_or(JsonValue::Null)
}

fn decode_json(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<JsonValue>, _>(idx) {
        Ok(Some(v)) => v,
        Ok(None) => JsonValue::Null,
        Err(_) => raw_text(row, idx),
    }
}

fn decode_date(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.format("%Y-%m-%d").to_string()),
        Ok(None) => JsonValue::Null,
        Err(_) => raw_text(row, idx),
    }
}

fn decode_datetime(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Ok(None) => JsonValue::Null,
        Err(_) => raw_text(row, idx),
    }
}

fn decode_time(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<chrono::NaiveTime>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.format("%H:%M:%S%.f").to_string()),
        Ok(None) => JsonValue::Null,
        Err(_) => raw_text(row, idx),
    }
}

fn decode_text(row: &MySqlRow, idx: usize, type_name: &str) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
        // Check if this might be JSON
        if type_name.to_lowercase().contains("json") {
            if let Ok(json) = serde_json::from_str::<JsonValue>(&v) {
                return json;
            }
        }
        return JsonValue::String(v);
    }
    raw_text(row, idx)
}

/// Read the value exactly as the server sent it, skipping the type check.
fn raw_text(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get_unchecked::<Option<Vec<u8>>, _>(idx) {
        Ok(Some(bytes)) => decode_binary_value(&bytes, true),
        _ => JsonValue::Null,
    }
}
