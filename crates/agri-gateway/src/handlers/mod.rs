pub mod predict;
pub mod system;

use agri_core::{AgriError, AgriResult};

/// Run CPU-bound inference on the blocking pool. A panic or cancelled task
/// becomes `Internal`.
pub(crate) async fn blocking<T, F>(job: F) -> AgriResult<T>
where
    F: FnOnce() -> AgriResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| AgriError::Internal(format!("inference task failed: {e}")))?
}
