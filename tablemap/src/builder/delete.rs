use tablemap_query::QueryBuilder;

use crate::{error::Result, Options, Value};

use super::{encode_params, Statement, ToStatement};

/// `DELETE`, refuses to run without a predicate
pub struct DeleteBuilder {
    table: String,
    predicate: String,
    params: Vec<Value>,
}

impl DeleteBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            predicate: String::new(),
            params: vec![],
        }
    }

    pub fn predicate(mut self, predicate: &str, params: Vec<Value>) -> Self {
        self.predicate = predicate.into();
        self.params = params;
        self
    }
}

impl ToStatement for DeleteBuilder {
    fn to_statement(&self, _options: &Options) -> Result<Statement> {
        let sql = QueryBuilder::delete(&self.table)
            .predicate(&self.predicate)
            .build()?;

        Ok(Statement::new(sql, encode_params(&self.params)))
    }
}
