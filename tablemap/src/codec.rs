//! Conversion between mapped values and SQL data.
//!
//! Strings are stored with `'` replaced by [`QUOTE_PLACEHOLDER`], reads apply the inverse.
//! `CHAR` columns hold a single character and keep the quote as is.

use crate::{
    error::Result, ColumnDescriptor, FromValue, Row, Table, TypeSchema, Value, DATETIME_FORMAT,
};

/// Stored form of a single quote
pub const QUOTE_PLACEHOLDER: &str = "&#39;";

/// Replace every `'` with the placeholder
///
/// # Examples
///
/// ```
/// use tablemap::codec::{escape, unescape};
///
/// assert_eq!(escape("it's"), "it&#39;s");
/// assert_eq!(unescape(&escape("it's")), "it's");
/// ```
pub fn escape(s: &str) -> String {
    s.replace('\'', QUOTE_PLACEHOLDER)
}

pub fn unescape(s: &str) -> String {
    s.replace(QUOTE_PLACEHOLDER, "'")
}

/// Convert a value to the form it is written in.
///
/// Booleans become integers, date-times, uuids and decimals become text, strings are escaped.
pub fn encode_value(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::I64(b as i64),
        Value::DateTime(dt) => Value::Str(dt.format(DATETIME_FORMAT).to_string()),
        Value::Uuid(uuid) => Value::Str(uuid.to_string()),
        Value::Decimal(d) => Value::Str(d.to_string()),
        Value::Str(s) => Value::Str(escape(&s)),
        v => v,
    }
}

/// Convert a value to the form it is written in `col`
pub fn encode_column(col: &ColumnDescriptor, value: Value) -> Value {
    match value {
        Value::Str(s) if matches!(col.runtime_type(), Ok(ty) if !ty.is_escaped()) => Value::Str(s),
        v => encode_value(v),
    }
}

/// Render an encoded value as SQL literal, every non-null scalar is quoted
///
/// Backslashes and quotes left in the text are escaped the MySQL way.
///
/// # Examples
///
/// ```
/// use tablemap::{codec::literal, Value};
///
/// assert_eq!(literal(&Value::I64(2)), "'2'");
/// assert_eq!(literal(&Value::Null), "NULL");
/// assert_eq!(literal(&Value::Bytes(vec![0xca, 0xfe])), "X'CAFE'");
/// assert_eq!(literal(&Value::Str(r"C:\".into())), r"'C:\\'");
/// ```
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::Bytes(bytes) => format!(
            "X'{}'",
            bytes.iter().map(|b| format!("{:02X}", b)).collect::<String>()
        ),
        v => format!(
            "'{}'",
            plain_text(v)
                .unwrap_or_default()
                .replace('\\', r"\\")
                .replace('\'', "''")
        ),
    }
}

/// Substitute `?` placeholders outside quoted literals with `params`, for logging
pub fn render(sql: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut params = params.iter();
    let mut in_quote = false;

    for c in sql.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                out.push(c);
            }
            '?' if !in_quote => match params.next() {
                Some(v) => out.push_str(&literal(v)),
                None => out.push(c),
            },
            _ => out.push(c),
        }
    }

    out
}

/// Decode one row, failing on the first missing or unconvertible column
pub fn try_decode<T: Table>(row: &Row, schema: &TypeSchema) -> Result<T> {
    let mut prepared = Row::default();

    for col in schema.columns() {
        let value = row.value(&col.name).ok_or_else(|| {
            crate::error::decode!(
                "Column `{}` of `{}` missing from row",
                col.name,
                schema.table()
            )
        })?;

        let ty = col.runtime_type().ok();
        let value = match value {
            Value::Null => Value::Null,
            v if ty.map_or(false, |ty| ty.is_textual()) => {
                let text = plain_text(v).ok_or_else(|| {
                    crate::error::decode!("Column `{}` holds no text: {:?}", col.name, v)
                })?;
                if ty.map_or(false, |ty| ty.is_escaped()) {
                    Value::Str(unescape(&text))
                } else {
                    Value::Str(text)
                }
            }
            v => v.clone(),
        };

        prepared.set(col.name.clone(), value);
    }

    T::from_row(&prepared)
}

/// Decode one row, a failure is logged and yields `T::default()`
pub fn decode<T: Table>(row: &Row, schema: &TypeSchema) -> T {
    match try_decode(row, schema) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Decode row of `{}` failed, use default: {}", schema.table(), e);
            T::default()
        }
    }
}

/// Text form of a scalar value
fn plain_text(v: &Value) -> Option<String> {
    let text = match v {
        Value::Null => return None,
        Value::Bool(b) => (*b as i64).to_string(),
        Value::U8(n) => n.to_string(),
        Value::I8(n) => n.to_string(),
        Value::U16(n) => n.to_string(),
        Value::I16(n) => n.to_string(),
        Value::U32(n) => n.to_string(),
        Value::I32(n) => n.to_string(),
        Value::U64(n) => n.to_string(),
        Value::I64(n) => n.to_string(),
        Value::F32(n) => n.to_string(),
        Value::F64(n) => n.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        Value::Uuid(uuid) => uuid.to_string(),
        Value::Str(_) | Value::Bytes(_) => String::from_value(v).ok()?,
    };

    Some(text)
}
