//! Runtime helper for spawning the dedicated ingress receive-loop thread.

use std::future::Future;
use std::io;
use std::thread;
use tokio::runtime::Builder;

pub(crate) const DEFAULT_INGRESS_RUNTIME_THREAD_NAME: &str = "udp-ingress-run";

/// Handle over one spawned ingress runtime thread.
pub(crate) struct IngressLoopHandle {
    worker_thread: String,
    join: thread::JoinHandle<()>,
}

impl IngressLoopHandle {
    /// Returns the worker runtime thread label for diagnostics.
    pub(crate) fn worker_thread(&self) -> &str {
        &self.worker_thread
    }

    /// True once the receive loop has exited and the thread has finished.
    pub(crate) fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Spawns a named thread hosting a current-thread runtime for the ingress loop.
///
/// The loop future is created on the spawned thread so the socket and broker
/// hand-off tasks live entirely on the worker's runtime.
pub(crate) fn spawn_ingress_loop<F, Fut>(
    thread_name: String,
    run_loop: F,
) -> io::Result<IngressLoopHandle>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()>,
{
    let worker_thread = thread_name.clone();
    let join = thread::Builder::new().name(thread_name).spawn(move || {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to create ingress Tokio runtime");

        runtime.block_on(run_loop());
    })?;

    Ok(IngressLoopHandle {
        worker_thread,
        join,
    })
}
