use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::task::{Context, Poll};

use tokio::runtime::{Handle, Runtime};
use tokio::task::{JoinError, JoinHandle};

use crate::error::Result;

/// Create a new tokio runtime for requests issued outside of one
fn create_managed_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .thread_name("ajaxkit-reqwest")
        .worker_threads(1)
        .enable_all()
        .build()
}

fn managed_runtime(cell: &OnceLock<Runtime>) -> Result<&Runtime> {
    if let Some(runtime) = cell.get() {
        return Ok(runtime);
    }
    let runtime = create_managed_runtime()?;
    Ok(cell.get_or_init(|| runtime))
}

/// Runs `task` on the current tokio runtime, or on the managed one when there is none.
pub(crate) async fn execute_with_runtime<F, Fut, T>(
    managed: &OnceLock<Runtime>,
    task: F,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    if Handle::try_current().is_ok() {
        return Ok(task().await);
    }
    let runtime = managed_runtime(managed)?;
    Ok(AbortOnDrop(runtime.spawn(task())).await?)
}

/// Dropping the caller's future aborts the spawned exchange.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = std::result::Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
