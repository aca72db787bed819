mod delete;
mod find;
mod insert;
mod update;

pub use delete::DeleteBuilder;
pub use find::FindBuilder;
pub use insert::InsertBuilder;
pub use update::UpdateBuilder;

use crate::{codec, error::Result, Options, Value};

/// Sql text with its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new<S: ToString>(sql: S, params: Vec<Value>) -> Self {
        Self {
            sql: sql.to_string(),
            params,
        }
    }
}

pub trait ToStatement {
    fn to_statement(&self, options: &Options) -> Result<Statement>;
}

/// Placeholder or literal for one encoded data value
fn bind(value: Value, options: &Options, params: &mut Vec<Value>) -> String {
    if options.inline_literals {
        codec::literal(&value)
    } else {
        params.push(value);
        "?".into()
    }
}

/// Predicate parameters are always bound, strings escaped like stored data
fn encode_params(params: &[Value]) -> Vec<Value> {
    params.iter().cloned().map(codec::encode_value).collect()
}
