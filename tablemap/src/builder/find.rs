use tablemap_query::QueryBuilder;

use crate::{error::Result, Options, Value};

use super::{encode_params, Statement, ToStatement};

/// `SELECT *` with optional predicate and limit
pub struct FindBuilder {
    table: String,
    predicate: String,
    params: Vec<Value>,
    limit: Option<u64>,
}

impl FindBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            predicate: String::new(),
            params: vec![],
            limit: None,
        }
    }

    pub fn predicate(mut self, predicate: &str, params: Vec<Value>) -> Self {
        self.predicate = predicate.into();
        self.params = params;
        self
    }

    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }
}

impl ToStatement for FindBuilder {
    fn to_statement(&self, _options: &Options) -> Result<Statement> {
        let mut builder = QueryBuilder::select(&self.table);
        builder.column("*").predicate(&self.predicate);
        if let Some(limit) = self.limit {
            builder.limit(limit);
        }

        Ok(Statement::new(builder.build()?, encode_params(&self.params)))
    }
}
