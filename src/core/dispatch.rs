//! Dispatch Policy
//!
//! Chooses where network I/O and claim/JSON processing run. `Inline` runs work on the
//! caller's task, which suits single-threaded hosts; `Runtime` hands it to a tokio
//! runtime handle.

use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};

use crate::error::{ClientResult, NetworkError, OidcError};

/// Execution context for one class of work.
#[derive(Clone, Debug, Default)]
pub enum Dispatch {
    /// Run on the calling task.
    #[default]
    Inline,
    /// Run on the given runtime. I/O is spawned as a task, compute work via `spawn_blocking`.
    Runtime(Handle),
}

/// Execution contexts for I/O-bound and compute-bound work.
#[derive(Clone, Debug, Default)]
pub struct DispatchPolicy {
    pub io: Dispatch,
    pub compute: Dispatch,
}

impl DispatchPolicy {
    /// Everything on the caller's task.
    pub fn inline() -> Self {
        Self::default()
    }

    /// Both classes of work on `handle`.
    pub fn runtime(handle: Handle) -> Self {
        Self {
            io: Dispatch::Runtime(handle.clone()),
            compute: Dispatch::Runtime(handle),
        }
    }

    /// Both classes of work on the runtime the caller is currently inside.
    pub fn current() -> Self {
        Self::runtime(Handle::current())
    }

    /// Run an I/O future. Dropping the returned future aborts a spawned task.
    pub async fn run_io<F, T>(&self, future: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        match &self.io {
            Dispatch::Inline => future.await,
            Dispatch::Runtime(handle) => {
                let task = AbortOnDrop(handle.spawn(future));
                task.join().await
            }
        }
    }

    /// Run a blocking-friendly computation.
    pub async fn run_compute<F, T>(&self, work: F) -> ClientResult<T>
    where
        F: FnOnce() -> ClientResult<T> + Send + 'static,
        T: Send + 'static,
    {
        match &self.compute {
            Dispatch::Inline => work(),
            Dispatch::Runtime(handle) => handle.spawn_blocking(work).await.map_err(interrupted)?,
        }
    }
}

struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> AbortOnDrop<ClientResult<T>> {
    async fn join(mut self) -> ClientResult<T> {
        (&mut self.0).await.map_err(interrupted)?
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn interrupted(error: JoinError) -> OidcError {
    NetworkError::Interrupted {
        message: error.to_string(),
    }
    .into()
}
