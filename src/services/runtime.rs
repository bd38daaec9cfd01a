//! Tokio Runtime Bridge
//!
//! The command-line front end is synchronous, while the editing session and
//! the option fetches need tokio. This module owns the shared runtime.
//!
//! ## Pattern
//!
//! ```text
//! main (sync)
//!       │
//!       ▼
//! block_on(async { session.run().await })
//!       │
//!       ▼
//! tokio::Runtime (multi-thread)
//! ```

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::error::Result;

/// Global tokio runtime instance
static TOKIO_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get or initialize the global tokio runtime
fn get_runtime() -> Result<&'static Runtime> {
    if let Some(runtime) = TOKIO_RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .thread_name("rando-worker")
        .build()?;
    Ok(TOKIO_RUNTIME.get_or_init(|| runtime))
}

/// Block on a future synchronously
///
/// **Warning**: This blocks the current thread. Call it from `main` only,
/// never from inside a task already running on the runtime.
pub fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = T>,
{
    Ok(get_runtime()?.block_on(future))
}

/// Spawn a detached task with a name (for debugging)
///
/// Used for the stdin reader of the interactive session.
pub fn spawn_named_in_tokio<F>(name: &'static str, future: F) -> Result<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::debug!("Spawning tokio task: {}", name);
    Ok(get_runtime()?.spawn(async move {
        future.await;
        tracing::debug!("Tokio task completed: {}", name);
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_returns_value() {
        let value = block_on(async { 40 + 2 }).expect("runtime");
        assert_eq!(value, 42);
    }

    #[test]
    fn test_spawn_named_in_tokio() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();

        let handle = spawn_named_in_tokio("flag", async move {
            flag_clone.store(true, Ordering::SeqCst);
        })
        .expect("runtime");

        block_on(handle).expect("runtime").expect("task completed");
        assert!(flag.load(Ordering::SeqCst));
    }
}
