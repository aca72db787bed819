mod column_type;
mod connection;
mod drivers;
mod info;
mod value;

use std::collections::HashMap;

pub use column_type::ColumnType;
pub use connection::{Connection, Connector, UrlConnector};
pub use info::{check_identifier, ColumnDescriptor, TypeSchema};
pub use value::{FromValue, ToValue, Value, DATETIME_FORMAT};

pub mod driver {
    #[cfg(feature = "mysql")]
    pub use mysql_lib as mysql;
}

use tablemap_error::Result;

#[async_trait::async_trait]
pub trait Driver: Sync + Send {
    /// Execute one statement, returns affected rows
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64>;
    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>>;
    /// Close the underlying connection, closing twice is a no-op
    async fn close(&self) -> Result<()>;
    fn is_open(&self) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub(crate) values: HashMap<String, Value>,
}

impl Row {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get<T: FromValue<Output = T>>(&self, column: &str) -> Result<T> {
        if let Some(v) = self.value(column) {
            Ok(T::from_value(v)?)
        } else {
            Err(tablemap_error::out_of_range!(
                "Column `{}` not found, row has {} columns",
                column,
                self.values.len()
            ))
        }
    }

    /// Raw value of a column, names match case-insensitively like MySQL's
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.values.get(column).or_else(|| {
            self.values
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(column))
                .map(|(_, v)| v)
        })
    }

    pub fn set<S: ToString>(&mut self, column: S, value: Value) {
        self.values.insert(column.to_string(), value);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: ToString> FromIterator<(S, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_row_get() {
        let row: Row = [("Id", Value::Str("a".into())), ("Score", Value::I64(5))]
            .into_iter()
            .collect();

        assert_eq!(row.get::<String>("Id").unwrap(), "a");
        assert_eq!(row.get::<i32>("score").unwrap(), 5);
        assert!(matches!(
            row.get::<i32>("missing"),
            Err(tablemap_error::Error::OutOfRange(_))
        ));
    }
}
