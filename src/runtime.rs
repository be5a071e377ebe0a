//! Component runtime: runs the bot's channels as concurrent tasks.
//!
//! A [`Component`] captures everything it needs (dispatcher handle, tokens)
//! at construction and is handed to [`spawn_components`]. Any component
//! error cancels the shared [`CancellationToken`] so its siblings stop too.

use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::AppError;

// ── Component ─────────────────────────────────────────────────────────────────

pub type ComponentFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// An independently runnable unit, e.g. one chat channel.
pub trait Component: Send + 'static {
    /// Stable identifier used in log lines.
    fn id(&self) -> &str;

    /// Consume the component and return its run loop. The loop should exit
    /// once `shutdown` is cancelled.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture;
}

// ── RuntimeHandle ─────────────────────────────────────────────────────────────

/// Resolves when every spawned component has exited.
pub struct RuntimeHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl RuntimeHandle {
    /// First component error, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Comms(format!("runtime task panicked: {e}"))),
        }
    }
}

// ── spawn_components ──────────────────────────────────────────────────────────

/// Spawn each component on the Tokio pool.
///
/// On the first error or panic `shutdown` is cancelled; remaining components
/// are drained and the first error is returned from [`RuntimeHandle::join`].
pub fn spawn_components(
    components: Vec<Box<dyn Component>>,
    shutdown: CancellationToken,
) -> RuntimeHandle {
    let inner = tokio::spawn(async move {
        let mut set: JoinSet<Result<(), AppError>> = JoinSet::new();
        for component in components {
            debug!(component = component.id(), "spawning component");
            set.spawn(component.run(shutdown.clone()));
        }

        let mut first_err: Option<AppError> = None;
        while let Some(res) = set.join_next().await {
            match res {
                Err(e) => {
                    error!("component panicked: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| AppError::Comms(format!("component panicked: {e}")));
                }
                Ok(Err(e)) => {
                    error!("component error: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert(e);
                }
                Ok(Ok(())) => {}
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    });

    RuntimeHandle { inner }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Waiter;

    impl Component for Waiter {
        fn id(&self) -> &str {
            "waiter"
        }

        fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
            Box::pin(async move {
                shutdown.cancelled().await;
                Ok(())
            })
        }
    }

    struct Failing;

    impl Component for Failing {
        fn id(&self) -> &str {
            "failing"
        }

        fn run(self: Box<Self>, _shutdown: CancellationToken) -> ComponentFuture {
            Box::pin(async { Err(AppError::Comms("boom".into())) })
        }
    }

    #[tokio::test]
    async fn empty_runtime_finishes() {
        let handle = spawn_components(Vec::new(), CancellationToken::new());
        assert!(handle.join().await.is_ok());
    }

    #[tokio::test]
    async fn cancellation_stops_components() {
        let token = CancellationToken::new();
        let handle = spawn_components(vec![Box::new(Waiter)], token.clone());
        token.cancel();
        assert!(handle.join().await.is_ok());
    }

    #[tokio::test]
    async fn error_cancels_siblings_and_is_returned() {
        let token = CancellationToken::new();
        let handle = spawn_components(vec![Box::new(Waiter), Box::new(Failing)], token.clone());
        let err = handle.join().await.unwrap_err();
        assert!(matches!(err, AppError::Comms(ref m) if m == "boom"));
        assert!(token.is_cancelled());
    }
}
