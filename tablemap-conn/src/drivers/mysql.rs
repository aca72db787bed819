use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use mysql_lib::prelude::Queryable;
use tablemap_error::Result;
use tokio::task::spawn_blocking;

use super::join_error;
use crate::{Driver, Row, Value, DATETIME_FORMAT};

pub struct MysqlConnProxy {
    conn: Arc<Mutex<Option<mysql_lib::Conn>>>,
}

impl MysqlConnProxy {
    pub fn new(conn: mysql_lib::Conn) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let url = url.to_string();
        let conn = spawn_blocking(move || {
            let opts = mysql_lib::Opts::from_url(&url)
                .map_err(|e| tablemap_error::connection!("Invalid mysql url: {}", e))?;

            log::trace!("Open mysql connection");
            mysql_lib::Conn::new(opts)
                .map_err(|e| tablemap_error::connection!("Mysql connect error: {}", e))
        })
        .await
        .map_err(join_error)??;

        Ok(Self::new(conn))
    }
}

#[async_trait::async_trait]
impl Driver for MysqlConnProxy {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        let sql_string = sql.to_string();
        let conn = self.conn.clone();
        let affected = spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| tablemap_error::connection!("MysqlConnProxy lock error: {}", e))?;
            let conn = guard
                .as_mut()
                .ok_or_else(|| tablemap_error::connection!("Mysql connection is closed"))?;

            if params.is_empty() {
                // DDL and SHOW go through the text protocol
                log::trace!("Execute `{}`", sql_string);
                conn.query_drop(&sql_string).map_err(|e| {
                    tablemap_error::database!("Execute error: {}, sql: `{}`", e, sql_string)
                })?;
            } else {
                log::trace!("Prepare execute `{}`", sql_string);
                let stmt = conn.prep(&sql_string).map_err(|e| {
                    tablemap_error::database!("Prepare error: {}, sql: `{}`", e, sql_string)
                })?;

                log::trace!("Execute {:?}", params);
                conn.exec_drop(&stmt, params).map_err(|e| {
                    tablemap_error::database!("Execute error: {}, sql: `{}`", e, sql_string)
                })?;
            }

            Result::Ok(conn.affected_rows())
        })
        .await
        .map_err(join_error)??;

        Ok(affected)
    }

    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let sql_string = sql.to_string();
        let conn = self.conn.clone();
        let rows = spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| tablemap_error::connection!("MysqlConnProxy lock error: {}", e))?;
            let conn = guard
                .as_mut()
                .ok_or_else(|| tablemap_error::connection!("Mysql connection is closed"))?;

            if params.is_empty() {
                log::trace!("Query `{}`", sql_string);
                let result = conn.query_iter(&sql_string).map_err(|e| {
                    tablemap_error::database!("Query error: {}, sql: `{}`", e, sql_string)
                })?;
                collect_rows(result)
            } else {
                log::trace!("Prepare query `{}`", sql_string);
                let stmt = conn.prep(&sql_string).map_err(|e| {
                    tablemap_error::database!("Prepare query error: {}, sql: `{}`", e, sql_string)
                })?;

                log::trace!("Query {:?}", params);
                let result = conn.exec_iter(&stmt, params).map_err(|e| {
                    tablemap_error::database!("Query error: {}, sql: `{}`", e, sql_string)
                })?;
                collect_rows(result)
            }
        })
        .await
        .map_err(join_error)??;

        Ok(rows)
    }

    async fn close(&self) -> Result<()> {
        let conn = self.conn.clone();
        spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| tablemap_error::connection!("MysqlConnProxy lock error: {}", e))?;

            // Dropping the connection sends COM_QUIT
            if guard.take().is_some() {
                log::trace!("Mysql connection closed");
            }

            Result::Ok(())
        })
        .await
        .map_err(join_error)??;

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.conn.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }
}

fn collect_rows<I>(result: I) -> Result<Vec<Row>>
where
    I: Iterator<Item = std::result::Result<mysql_lib::Row, mysql_lib::Error>>,
{
    let mut rows = Vec::<Row>::new();
    for res in result {
        let mysql_row = res.map_err(|e| tablemap_error::database!("Get row error: {}", e))?;
        let row = mysql_row_to_row(mysql_row)?;
        log::trace!("Append row: {:?}", row);
        rows.push(row);
    }

    Ok(rows)
}

fn mysql_row_to_row(src: mysql_lib::Row) -> Result<Row> {
    let mut values = HashMap::new();
    let cols = src.columns_ref();
    for i in 0..src.len() {
        let column_name = cols
            .get(i)
            .ok_or(tablemap_error::database!(
                "Cannot get column name of index {}",
                i
            ))?
            .name_str()
            .to_string();

        if let Some(mysql_value) = src.as_ref(i) {
            let value = match mysql_value {
                mysql_lib::Value::NULL => Value::Null,
                mysql_lib::Value::Bytes(v) => Value::Bytes(v.clone()),
                mysql_lib::Value::Int(v) => Value::I64(*v),
                mysql_lib::Value::UInt(v) => Value::U64(*v),
                mysql_lib::Value::Float(v) => Value::F32(*v),
                mysql_lib::Value::Double(v) => Value::F64(*v),
                mysql_lib::Value::Date(year, month, day, hour, min, sec, micros) => {
                    let dt = NaiveDate::from_ymd_opt(*year as i32, *month as u32, *day as u32)
                        .and_then(|d| {
                            d.and_hms_micro_opt(*hour as u32, *min as u32, *sec as u32, *micros)
                        });
                    match dt {
                        Some(dt) => Value::DateTime(dt),
                        // Zero dates like 0000-00-00 have no chrono form
                        None => Value::Null,
                    }
                }
                mysql_lib::Value::Time(..) => Value::Str(mysql_value.as_sql(true)),
            };

            values.insert(column_name, value);
        }
    }

    Ok(Row { values })
}

impl From<Value> for mysql_lib::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::NULL,
            Value::Bool(v) => Self::Int(v as _),
            Value::U8(v) => Self::UInt(v as _),
            Value::I8(v) => Self::Int(v as _),
            Value::U16(v) => Self::UInt(v as _),
            Value::I16(v) => Self::Int(v as _),
            Value::U32(v) => Self::UInt(v as _),
            Value::I32(v) => Self::Int(v as _),
            Value::U64(v) => Self::UInt(v as _),
            Value::I64(v) => Self::Int(v as _),
            Value::F32(v) => Self::Float(v),
            Value::F64(v) => Self::Double(v),
            Value::Decimal(v) => Self::Bytes(v.to_string().into_bytes()),
            Value::Str(v) => Self::Bytes(v.into_bytes()),
            Value::Bytes(v) => Self::Bytes(v),
            Value::DateTime(v) => Self::Bytes(v.format(DATETIME_FORMAT).to_string().into_bytes()),
            Value::Uuid(v) => Self::Bytes(v.hyphenated().to_string().into_bytes()),
        }
    }
}
