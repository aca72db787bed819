use crate::{codec, error::Result, Connection, Row, Statement, Value};

/// Connection of a single engine operation.
///
/// Failed statements are logged together with their rendered sql text.
pub(crate) struct Session {
    conn: Connection,
}

impl Session {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        let text = codec::render(sql, &params);
        self.conn
            .execute(sql, params)
            .await
            .map_err(|e| log_failure(&text, e))
    }

    pub async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let text = codec::render(sql, &params);
        self.conn
            .query(sql, params)
            .await
            .map_err(|e| log_failure(&text, e))
    }

    #[inline]
    pub async fn execute_statement(&self, stmt: Statement) -> Result<u64> {
        self.execute(&stmt.sql, stmt.params).await
    }

    #[inline]
    pub async fn query_statement(&self, stmt: Statement) -> Result<Vec<Row>> {
        self.query(&stmt.sql, stmt.params).await
    }
}

fn log_failure(sql: &str, e: crate::error::Error) -> crate::error::Error {
    if e.is_operational() {
        log::error!("Statement `{}` failed: {}", sql, e);
    }
    e
}
