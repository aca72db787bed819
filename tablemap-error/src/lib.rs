pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection: `{0}`")]
    Connection(String),
    #[error("Timeout: `{0}`")]
    Timeout(String),
    #[error("Database: `{0}`")]
    Database(String),
    #[error("Runtime: `{0}`")]
    Runtime(String),
    #[error("Cancelled: `{0}`")]
    Cancelled(String),
    #[error("FromValue: `{0}`")]
    FromValue(String),
    #[error("Decode: `{0}`")]
    Decode(String),
    #[error("OutOfRange: `{0}`")]
    OutOfRange(String),
    #[error("QueryBuilder: `{0}`")]
    QueryBuilder(String),
    #[error("Argument: `{0}`")]
    Argument(String),
    #[error("MissingSchemaName: `{0}`")]
    MissingSchemaName(String),
    #[error("UnsupportedType: `{0}`")]
    UnsupportedType(String),
    #[error("UnsupportedSqlType: `{0}`")]
    UnsupportedSqlType(String),
    #[error("MissingPredicate: `{0}`")]
    MissingPredicate(String),
}

impl Error {
    /// Errors raised by the database or the row data rather than by the caller.
    ///
    /// The engine logs these and reports a failed result instead of returning them.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::Connection(_)
                | Self::Timeout(_)
                | Self::Database(_)
                | Self::Runtime(_)
                | Self::FromValue(_)
                | Self::Decode(_)
                | Self::OutOfRange(_)
        )
    }
}

#[macro_export]
macro_rules! connection {
    ($($arg:tt)*) => { $crate::Error::Connection(format!($($arg)*)) };
}

#[macro_export]
macro_rules! timeout {
    ($($arg:tt)*) => { $crate::Error::Timeout(format!($($arg)*)) };
}

#[macro_export]
macro_rules! database {
    ($($arg:tt)*) => { $crate::Error::Database(format!($($arg)*)) };
}

#[macro_export]
macro_rules! runtime {
    ($($arg:tt)*) => { $crate::Error::Runtime(format!($($arg)*)) };
}

#[macro_export]
macro_rules! cancelled {
    ($($arg:tt)*) => { $crate::Error::Cancelled(format!($($arg)*)) };
}

#[macro_export]
macro_rules! from_value {
    ($($arg:tt)*) => { $crate::Error::FromValue(format!($($arg)*)) };
}

#[macro_export]
macro_rules! decode {
    ($($arg:tt)*) => { $crate::Error::Decode(format!($($arg)*)) };
}

#[macro_export]
macro_rules! out_of_range {
    ($($arg:tt)*) => { $crate::Error::OutOfRange(format!($($arg)*)) };
}

#[macro_export]
macro_rules! query_builder {
    ($($arg:tt)*) => { $crate::Error::QueryBuilder(format!($($arg)*)) };
}

#[macro_export]
macro_rules! argument {
    ($($arg:tt)*) => { $crate::Error::Argument(format!($($arg)*)) };
}

#[macro_export]
macro_rules! missing_schema_name {
    ($($arg:tt)*) => { $crate::Error::MissingSchemaName(format!($($arg)*)) };
}

#[macro_export]
macro_rules! unsupported_type {
    ($($arg:tt)*) => { $crate::Error::UnsupportedType(format!($($arg)*)) };
}

#[macro_export]
macro_rules! unsupported_sql_type {
    ($($arg:tt)*) => { $crate::Error::UnsupportedSqlType(format!($($arg)*)) };
}

#[macro_export]
macro_rules! missing_predicate {
    ($($arg:tt)*) => { $crate::Error::MissingPredicate(format!($($arg)*)) };
}
