use std::marker::PhantomData;

use tablemap_query::QueryBuilder;

use crate::{codec, error::Result, Options, Table, TypeSchema, Value};

use super::{bind, encode_params, Statement, ToStatement};

/// `UPDATE` of a full value or of explicit columns, a predicate is mandatory
pub struct UpdateBuilder<'a, T: Table> {
    schema: &'a TypeSchema,
    assignments: Vec<(String, Value)>,
    predicate: String,
    params: Vec<Value>,
    _marker: PhantomData<T>,
}

impl<'a, T: Table> UpdateBuilder<'a, T> {
    pub fn new(schema: &'a TypeSchema) -> Self {
        Self {
            schema,
            assignments: vec![],
            predicate: String::new(),
            params: vec![],
            _marker: PhantomData,
        }
    }

    /// Set every writable column from `value`
    pub fn value(mut self, value: &T) -> Self {
        for (name, v) in value.to_values() {
            if let Some(col) = self.schema.column(name) {
                if !col.should_auto_increment {
                    self.assignments.push((col.name.clone(), v));
                }
            }
        }
        self
    }

    /// Set one column, it must exist in the schema
    pub fn set<S: ToString>(mut self, column: S, value: Value) -> Self {
        self.assignments.push((column.to_string(), value));
        self
    }

    pub fn predicate(mut self, predicate: &str, params: Vec<Value>) -> Self {
        self.predicate = predicate.into();
        self.params = params;
        self
    }
}

impl<'a, T: Table> ToStatement for UpdateBuilder<'a, T> {
    fn to_statement(&self, options: &Options) -> Result<Statement> {
        let mut builder = QueryBuilder::update(self.schema.table());
        let mut params = vec![];

        for (name, value) in &self.assignments {
            let col = self.schema.column(name).ok_or_else(|| {
                crate::error::argument!("Table `{}` has no column `{}`", self.schema.table(), name)
            })?;
            let placeholder = bind(codec::encode_column(col, value.clone()), options, &mut params);
            builder.set(&col.name, placeholder);
        }

        let sql = builder.predicate(&self.predicate).build()?;
        params.extend(encode_params(&self.params));

        Ok(Statement::new(sql, params))
    }
}
