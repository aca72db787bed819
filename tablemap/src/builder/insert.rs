use std::marker::PhantomData;

use tablemap_query::QueryBuilder;

use crate::{codec, error::Result, Options, Table, TypeSchema, Value};

use super::{bind, Statement, ToStatement};

/// One `INSERT` statement for any number of values
pub struct InsertBuilder<'a, T: Table> {
    schema: &'a TypeSchema,
    rows: Vec<Vec<(&'static str, Value)>>,
    _marker: PhantomData<T>,
}

impl<'a, T: Table> InsertBuilder<'a, T> {
    pub fn new(schema: &'a TypeSchema) -> Self {
        Self {
            schema,
            rows: vec![],
            _marker: PhantomData,
        }
    }

    pub fn value(mut self, value: &T) -> Self {
        self.rows.push(value.to_values());
        self
    }

    pub fn values<'v, I>(self, values: I) -> Self
    where
        I: IntoIterator<Item = &'v T>,
        T: 'v,
    {
        values.into_iter().fold(self, |this, v| this.value(v))
    }
}

impl<'a, T: Table> ToStatement for InsertBuilder<'a, T> {
    fn to_statement(&self, options: &Options) -> Result<Statement> {
        // Autoincrement columns are left to the database
        let columns = self.schema.writable_columns().collect::<Vec<_>>();

        let mut builder = QueryBuilder::insert(self.schema.table());
        builder.columns(columns.iter().map(|col| &col.name));

        let mut params = vec![];
        for row in &self.rows {
            let mut tuple = vec![];
            for col in &columns {
                let value = row
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(&col.name))
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| {
                        crate::error::argument!(
                            "Value of `{}` has no column `{}`",
                            self.schema.table(),
                            col.name
                        )
                    })?;
                tuple.push(bind(codec::encode_column(col, value), options, &mut params));
            }
            builder.values(tuple);
        }

        Ok(Statement::new(builder.build()?, params))
    }
}
