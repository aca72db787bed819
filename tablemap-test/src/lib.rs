mod memory;

use std::future::Future;

use tablemap::Engine;

pub use memory::{Executed, MemoryConnector, MemoryDatabase};

/// Fresh database plus an engine connected to it
pub fn setup() -> (MemoryDatabase, Engine) {
    env_logger::try_init().ok();

    let db = MemoryDatabase::new();
    let engine = db.engine();

    (db, engine)
}

pub async fn run_test<Fn, Fut>(f: Fn)
where
    Fn: FnOnce(MemoryDatabase, Engine) -> Fut,
    Fut: Future<Output = ()>,
{
    let (db, engine) = setup();

    f(db, engine).await;
}
