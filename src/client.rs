//! Client: owner of the worker that drives every request.

use std::io;
use std::sync::{Arc, Condvar, Mutex};

use tokio::runtime;
use tracing::debug;

use crate::http::request::Request;

/// Factory for [`Request`]s and owner of the reactor they run on.
///
/// One client owns one tokio runtime with a single dedicated worker thread;
/// every request created here runs its whole chain on that thread, so
/// per-request state never needs cross-thread synchronization beyond the
/// cancellation flag. Dropping the client without [`close`](Client::close)
/// tears the runtime down without draining, which can discard callbacks of
/// requests still in flight; `close()` is the orderly way out.
#[derive(Debug)]
pub struct Client {
    runtime: runtime::Runtime,
    pending: Arc<PendingTasks>,
}

impl Client {
    /// Start the worker. Fails if the runtime cannot be built.
    pub fn new() -> io::Result<Self> {
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("courier-io")
            .enable_all()
            .build()?;

        Ok(Client {
            runtime,
            pending: Arc::new(PendingTasks::new()),
        })
    }

    /// New request bound to this client's worker. `id` is opaque to the
    /// library and comes back out through [`Request::id`] and log fields.
    ///
    /// The client keeps no reference to the request; the caller decides how
    /// long it lives and when (if ever) it executes.
    pub fn create_request(&self, id: u64) -> Request {
        Request::new(self.runtime.handle().clone(), Arc::clone(&self.pending), id)
    }

    /// Shut down after draining.
    ///
    /// Blocks until every executed request chain has delivered its callback,
    /// then joins the worker thread. In-flight requests are NOT cancelled;
    /// with no timeouts in the protocol, a request that never finishes keeps
    /// this call blocked until somebody cancels it.
    pub fn close(self) {
        debug!("client closing, draining outstanding requests");
        self.pending.wait_idle();
        // Dropping the runtime joins the worker thread.
    }
}

/// Count of request chains that were scheduled but have not yet delivered
/// their callback. `close()` blocks on this reaching zero.
#[derive(Debug)]
pub(crate) struct PendingTasks {
    count: Mutex<usize>,
    drained: Condvar,
}

impl PendingTasks {
    pub(crate) fn new() -> Self {
        PendingTasks {
            count: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    /// Register one chain. The returned guard travels into the chain's task;
    /// dropping it, however the task ends, is what counts the chain as done.
    pub(crate) fn begin(tasks: &Arc<PendingTasks>) -> TaskGuard {
        *tasks.count.lock().unwrap() += 1;
        TaskGuard(Arc::clone(tasks))
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock().unwrap();
        while *count > 0 {
            count = self.drained.wait(count).unwrap();
        }
    }
}

pub(crate) struct TaskGuard(Arc<PendingTasks>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let mut count = self.0.count.lock().unwrap();
        *count -= 1;
        if *count == 0 {
            self.0.drained.notify_all();
        }
    }
}
