use crate::{error::Result, ColumnDescriptor, Row, Value};

/// Static schema description of a mapped type.
///
/// Normally generated by `#[derive(Table)]`; a hand-written impl works the same way.
pub trait Table: Default + Send + Sync + Sized {
    /// Table name, `None` when the type never declared one
    const TABLE_NAME: Option<&'static str>;

    /// Column descriptors in declaration order, ignored fields excluded
    fn columns() -> Result<Vec<ColumnDescriptor>>;

    /// Column values in the same order as `columns()`
    fn to_values(&self) -> Vec<(&'static str, Value)>;

    /// Build a value from a row that holds every described column
    fn from_row(row: &Row) -> Result<Self>;
}

/// Integer-backed enum stored in an `INT` column
pub trait SqlEnum: Sized {
    fn to_i64(&self) -> i64;
    fn from_i64(v: i64) -> Result<Self>;
}

/// Implement `SqlEnum` for a field-less enum
///
/// # Examples
///
/// ```
/// use tablemap::SqlEnum;
///
/// #[derive(Debug, PartialEq)]
/// enum Rank {
///     Bronze,
///     Silver,
///     Gold,
/// }
///
/// tablemap::impl_sql_enum!(Rank { Bronze = 0, Silver = 1, Gold = 2 });
///
/// assert_eq!(Rank::Gold.to_i64(), 2);
/// assert_eq!(Rank::from_i64(1).unwrap(), Rank::Silver);
/// assert!(Rank::from_i64(7).is_err());
/// ```
#[macro_export]
macro_rules! impl_sql_enum {
    ($ty:ident { $($variant:ident = $value:expr),* $(,)? }) => {
        impl $crate::SqlEnum for $ty {
            fn to_i64(&self) -> i64 {
                match self {
                    $($ty::$variant => $value,)*
                }
            }

            fn from_i64(v: i64) -> $crate::error::Result<Self> {
                $(
                    if v == $value {
                        return Ok($ty::$variant);
                    }
                )*

                Err($crate::error::from_value!(
                    "`{}` is not a valid {}",
                    v,
                    stringify!($ty)
                ))
            }
        }
    };
}
