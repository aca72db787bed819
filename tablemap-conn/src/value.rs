use std::{borrow::Cow, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use tablemap_error::Result;
use uuid::Uuid;

/// Text layout of date-time values on the wire, `yyyy-MM-dd HH:mm:ss.fff`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

macro_rules! impl_to_value_base {
    ($ty:ty, $enum_field:ident) => {
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::$enum_field(self.clone())
            }
        }
    };
}

macro_rules! impl_from_for_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    v.to_value()
                }
            }
        )+
    };
}

macro_rules! impl_from_value_integer {
    ($ty:ty) => {
        impl FromValue for $ty {
            type Output = $ty;

            fn from_value(v: &Value) -> Result<Self::Output> {
                let n: i128 = match v {
                    Value::Bool(v) => *v as i128,
                    Value::U8(v) => *v as i128,
                    Value::I8(v) => *v as i128,
                    Value::U16(v) => *v as i128,
                    Value::I16(v) => *v as i128,
                    Value::U32(v) => *v as i128,
                    Value::I32(v) => *v as i128,
                    Value::U64(v) => *v as i128,
                    Value::I64(v) => *v as i128,
                    Value::Str(_) | Value::Bytes(_) => parse_text(v, stringify!($ty))?,
                    _ => {
                        return Err(tablemap_error::from_value!(
                            "Invalid value: {:?}, output type: {}",
                            v,
                            stringify!($ty)
                        ))
                    }
                };

                <$ty>::try_from(n).map_err(|_| {
                    tablemap_error::out_of_range!("Value {} out of range of {}", n, stringify!($ty))
                })
            }
        }
    };
}

macro_rules! impl_from_value_float {
    ($ty:ty) => {
        impl FromValue for $ty {
            type Output = $ty;

            fn from_value(v: &Value) -> Result<Self::Output> {
                match v {
                    Value::F32(v) => Ok(*v as $ty),
                    Value::F64(v) => Ok(*v as $ty),
                    Value::Decimal(d) => d.to_f64().map(|f| f as $ty).ok_or_else(|| {
                        tablemap_error::out_of_range!("Decimal {} out of range of {}", d, stringify!($ty))
                    }),
                    Value::Str(_) | Value::Bytes(_) => parse_text(v, stringify!($ty)),
                    _ => Ok(i64::from_value(v).map_err(|_| {
                        tablemap_error::from_value!(
                            "Invalid value: {:?}, output type: {}",
                            v,
                            stringify!($ty)
                        )
                    })? as $ty),
                }
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Str(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text of a textual value; bytes must be valid utf-8
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Str(s) => Some(Cow::Borrowed(s)),
            Self::Bytes(b) => std::str::from_utf8(b).ok().map(Cow::Borrowed),
            _ => None,
        }
    }
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl_to_value_base! {bool, Bool}
impl_to_value_base! {u8, U8}
impl_to_value_base! {i8, I8}
impl_to_value_base! {u16, U16}
impl_to_value_base! {i16, I16}
impl_to_value_base! {u32, U32}
impl_to_value_base! {i32, I32}
impl_to_value_base! {u64, U64}
impl_to_value_base! {i64, I64}
impl_to_value_base! {f32, F32}
impl_to_value_base! {f64, F64}
impl_to_value_base! {Decimal, Decimal}
impl_to_value_base! {String, Str}
impl_to_value_base! {Vec<u8>, Bytes}
impl_to_value_base! {NaiveDateTime, DateTime}
impl_to_value_base! {Uuid, Uuid}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        if let Some(v) = self {
            T::to_value(v)
        } else {
            Value::Null
        }
    }
}

impl_from_for_value! {bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64}
impl_from_for_value! {Decimal, String, Vec<u8>, NaiveDateTime, Uuid, char, &str}

impl<T: ToValue> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.to_value()
    }
}

pub trait FromValue {
    type Output;

    fn from_value(v: &Value) -> Result<Self::Output>;
}

impl<T: FromValue> FromValue for Option<T> {
    type Output = Option<<T as FromValue>::Output>;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(v)?)),
        }
    }
}

impl FromValue for bool {
    type Output = bool;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Bool(v) => Ok(*v),
            Value::Str(_) | Value::Bytes(_) => {
                let text = text_of(v, "bool")?;
                match text.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    other => Ok(other.parse::<i64>().map_err(|_| {
                        tablemap_error::from_value!("Invalid value: {:?}, output type: bool", v)
                    })? != 0),
                }
            }
            _ => Ok(i64::from_value(v)
                .map_err(|_| tablemap_error::from_value!("Invalid value: {:?}, output type: bool", v))?
                != 0),
        }
    }
}

impl_from_value_integer! {u8}
impl_from_value_integer! {i8}
impl_from_value_integer! {u16}
impl_from_value_integer! {i16}
impl_from_value_integer! {u32}
impl_from_value_integer! {i32}
impl_from_value_integer! {u64}
impl_from_value_integer! {i64}

impl_from_value_float! {f32}
impl_from_value_float! {f64}

impl FromValue for String {
    type Output = String;

    fn from_value(v: &Value) -> Result<Self::Output> {
        Ok(text_of(v, "String")?.into_owned())
    }
}

impl FromValue for char {
    type Output = char;

    fn from_value(v: &Value) -> Result<Self::Output> {
        let text = text_of(v, "char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(tablemap_error::from_value!(
                "Expect exactly one character, got `{}`",
                text
            )),
        }
    }
}

impl FromValue for Vec<u8> {
    type Output = Vec<u8>;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Bytes(v) => Ok(v.clone()),
            Value::Str(v) => Ok(v.clone().into_bytes()),
            _ => Err(tablemap_error::from_value!(
                "Invalid value: {:?}, output type: Vec<u8>",
                v
            )),
        }
    }
}

impl FromValue for Decimal {
    type Output = Decimal;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Decimal(d) => Ok(*d),
            Value::F32(f) => Decimal::try_from(*f)
                .map_err(|e| tablemap_error::from_value!("Float {} to decimal: {}", f, e)),
            Value::F64(f) => Decimal::try_from(*f)
                .map_err(|e| tablemap_error::from_value!("Float {} to decimal: {}", f, e)),
            Value::Str(_) | Value::Bytes(_) => parse_text(v, "Decimal"),
            _ => Ok(Decimal::from(i64::from_value(v).map_err(|_| {
                tablemap_error::from_value!("Invalid value: {:?}, output type: Decimal", v)
            })?)),
        }
    }
}

impl FromValue for NaiveDateTime {
    type Output = NaiveDateTime;

    fn from_value(v: &Value) -> Result<Self::Output> {
        if let Value::DateTime(dt) = v {
            return Ok(*dt);
        }

        let text = text_of(v, "NaiveDateTime")?;
        let text = text.trim();
        for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Ok(dt);
            }
        }

        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| tablemap_error::from_value!("Invalid date time `{}`", text))
    }
}

impl FromValue for Uuid {
    type Output = Uuid;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Uuid(u) => Ok(*u),
            Value::Bytes(b) if std::str::from_utf8(b).is_err() => Uuid::from_slice(b)
                .map_err(|e| tablemap_error::from_value!("Invalid uuid bytes: {}", e)),
            _ => {
                let text = text_of(v, "Uuid")?;
                Uuid::parse_str(text.trim())
                    .map_err(|e| tablemap_error::from_value!("Invalid uuid `{}`: {}", text, e))
            }
        }
    }
}

fn text_of<'a>(v: &'a Value, output: &str) -> Result<Cow<'a, str>> {
    v.as_text().ok_or_else(|| {
        tablemap_error::from_value!("Invalid value: {:?}, output type: {}", v, output)
    })
}

fn parse_text<T: FromStr>(v: &Value, output: &str) -> Result<T> {
    let text = text_of(v, output)?;
    text.trim().parse::<T>().map_err(|_| {
        tablemap_error::from_value!("Cannot parse `{}` as {}", text, output)
    })
}
