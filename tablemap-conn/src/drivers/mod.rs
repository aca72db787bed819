#[cfg(feature = "mysql")]
pub mod mysql;

/// A cancelled blocking task is surfaced, never folded into a database error
#[cfg(feature = "mysql")]
pub(crate) fn join_error(e: tokio::task::JoinError) -> tablemap_error::Error {
    if e.is_cancelled() {
        tablemap_error::cancelled!("Blocking task cancelled: {}", e)
    } else {
        tablemap_error::runtime!("Tokio join error: {}", e)
    }
}
