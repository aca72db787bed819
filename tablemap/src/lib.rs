mod blocking;
mod builder;
pub mod codec;
mod connection;
mod engine;
mod extract;
mod options;
pub mod reconcile;
mod table;

pub use async_trait::async_trait;
pub use tablemap_error as error;
pub use tablemap_macro::Table;
pub use tablemap_query as query;

pub use tablemap_conn::{
    ColumnDescriptor, ColumnType, Connection, Connector, Driver, FromValue, Row, ToValue,
    TypeSchema, UrlConnector, Value, DATETIME_FORMAT,
};

pub use blocking::BlockingEngine;
pub use builder::{DeleteBuilder, FindBuilder, InsertBuilder, Statement, ToStatement, UpdateBuilder};
pub use engine::Engine;
pub use extract::{extract, extract_for};
pub use options::Options;
pub use reconcile::Reconciliation;
pub use table::{SqlEnum, Table};
