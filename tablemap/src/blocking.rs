use tokio::runtime::{Builder, Runtime};

use crate::{error::Result, Connector, Engine, Options, Reconciliation, Table, Value};

/// Blocking facade over [`Engine`], driven by an owned current-thread runtime.
///
/// Must not be used from inside another tokio runtime.
pub struct BlockingEngine {
    engine: Engine,
    runtime: Runtime,
}

impl BlockingEngine {
    pub fn new<C: Connector + 'static>(connector: C) -> Result<Self> {
        Self::from_engine(Engine::new(connector))
    }

    pub fn from_url(url: &str) -> Result<Self> {
        Self::from_engine(Engine::from_url(url))
    }

    pub fn from_engine(engine: Engine) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| crate::error::runtime!("Build runtime failed: {}", e))?;

        Ok(Self { engine, runtime })
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.engine = self.engine.with_options(options);
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn ensure_table<T: Table>(&self) -> Result<Reconciliation> {
        self.runtime.block_on(self.engine.ensure_table::<T>())
    }

    pub fn table_exists<T: Table>(&self) -> Result<bool> {
        self.runtime.block_on(self.engine.table_exists::<T>())
    }

    pub fn get_rows<T: Table>(
        &self,
        predicate: &str,
        params: Vec<Value>,
        limit: Option<u64>,
    ) -> Result<Vec<T>> {
        self.runtime
            .block_on(self.engine.get_rows::<T>(predicate, params, limit))
    }

    pub fn get_rows_from<T: Table>(
        &self,
        table: &str,
        predicate: &str,
        params: Vec<Value>,
        limit: Option<u64>,
    ) -> Result<Vec<T>> {
        self.runtime
            .block_on(self.engine.get_rows_from::<T>(table, predicate, params, limit))
    }

    pub fn get_row<T: Table>(&self, predicate: &str, params: Vec<Value>) -> Result<Option<T>> {
        self.runtime
            .block_on(self.engine.get_row::<T>(predicate, params))
    }

    pub fn get_row_from<T: Table>(
        &self,
        table: &str,
        predicate: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>> {
        self.runtime
            .block_on(self.engine.get_row_from::<T>(table, predicate, params))
    }

    pub fn insert_row<T: Table>(&self, value: &T) -> Result<bool> {
        self.runtime.block_on(self.engine.insert_row(value))
    }

    pub fn insert_rows<T: Table>(&self, values: &[T]) -> Result<bool> {
        self.runtime.block_on(self.engine.insert_rows(values))
    }

    pub fn update_row<T: Table>(
        &self,
        value: &T,
        predicate: &str,
        params: Vec<Value>,
    ) -> Result<bool> {
        self.runtime
            .block_on(self.engine.update_row(value, predicate, params))
    }

    pub fn update_columns<T: Table>(
        &self,
        columns: Vec<(&str, Value)>,
        predicate: &str,
        params: Vec<Value>,
    ) -> Result<bool> {
        self.runtime
            .block_on(self.engine.update_columns::<T>(columns, predicate, params))
    }

    pub fn delete_rows<T: Table>(&self, predicate: &str, params: Vec<Value>) -> Result<bool> {
        self.runtime
            .block_on(self.engine.delete_rows::<T>(predicate, params))
    }
}
