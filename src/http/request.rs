//! HTTP GET request state machine.

use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, lookup_host};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::client::PendingTasks;
use crate::error::RequestError;
use crate::http::parser;
use crate::http::response::Response;

/// Completion callback: receives the originating request, the response as
/// far as it was populated, and the error if the request did not succeed.
pub type Callback = Box<dyn FnOnce(&Request, &Response, Option<RequestError>) + Send + 'static>;

/// Port used when `set_port` is never called.
pub const DEFAULT_PORT: u16 = 80;

const READ_BUFFER_SIZE: usize = 8192;

#[derive(Debug, Clone)]
struct Target {
    host: String,
    port: u16,
    path: String,
}

/// One in-flight step of the request chain. The socket and the read buffer
/// travel forward through the variants as the chain advances; the terminal
/// state is reached by returning out of the driver loop.
enum Step {
    Resolving,
    Connecting(Vec<SocketAddr>),
    Sending(TcpStream),
    ReadingStatusLine(TcpStream, BytesMut),
    ReadingHeaders(TcpStream, BytesMut),
    ReadingBody(TcpStream, BytesMut),
}

/// A single HTTP/1.1 GET over its own TCP connection.
///
/// Created through [`Client::create_request`](crate::client::Client::create_request).
/// Configure it with the setters, then call [`execute`](Request::execute);
/// the completion callback fires exactly once on the client's worker thread.
/// Handles are cheap to clone and all clones refer to the same request, so
/// one can be kept around solely to [`cancel`](Request::cancel) from another
/// thread.
#[derive(Clone)]
pub struct Request {
    inner: Arc<Inner>,
}

struct Inner {
    id: u64,
    target: Mutex<Target>,
    callback: Mutex<Option<Callback>>,
    cancelled: AtomicBool,
    abort: Notify,
    started: AtomicBool,
    executor: Handle,
    pending: Arc<PendingTasks>,
}

impl Request {
    pub(crate) fn new(executor: Handle, pending: Arc<PendingTasks>, id: u64) -> Self {
        Request {
            inner: Arc::new(Inner {
                id,
                target: Mutex::new(Target {
                    host: String::new(),
                    port: DEFAULT_PORT,
                    path: String::new(),
                }),
                callback: Mutex::new(None),
                cancelled: AtomicBool::new(false),
                abort: Notify::new(),
                started: AtomicBool::new(false),
                executor,
                pending,
            }),
        }
    }

    /// Caller-assigned id, useful for correlating callback output.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn host(&self) -> String {
        self.inner.target.lock().unwrap().host.clone()
    }

    pub fn port(&self) -> u16 {
        self.inner.target.lock().unwrap().port
    }

    pub fn path(&self) -> String {
        self.inner.target.lock().unwrap().path.clone()
    }

    pub fn set_host(&self, host: impl Into<String>) {
        self.inner.target.lock().unwrap().host = host.into();
    }

    /// Defaults to [`DEFAULT_PORT`] when never called.
    pub fn set_port(&self, port: u16) {
        self.inner.target.lock().unwrap().port = port;
    }

    pub fn set_path(&self, path: impl Into<String>) {
        self.inner.target.lock().unwrap().path = path.into();
    }

    /// Install the completion callback. Must be called before `execute()`;
    /// calling it again replaces the previous callback.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: FnOnce(&Request, &Response, Option<RequestError>) + Send + 'static,
    {
        *self.inner.callback.lock().unwrap() = Some(Box::new(callback));
    }

    /// Schedule the request on the client's worker and return immediately.
    ///
    /// The chain resolves the host, connects, sends the GET and parses the
    /// reply, one asynchronous operation at a time. The callback fires
    /// exactly once when the chain ends, whether by success, failure or
    /// cancellation, and always on the worker thread.
    ///
    /// # Panics
    ///
    /// Panics if host or path is empty, the port is zero, no callback was
    /// set, or `execute()` was already called on this request.
    pub fn execute(&self) {
        let target = self.inner.target.lock().unwrap().clone();
        assert!(!target.host.is_empty(), "host must be set before execute()");
        assert!(target.port != 0, "port must be non-zero");
        assert!(!target.path.is_empty(), "path must be set before execute()");
        assert!(
            self.inner.callback.lock().unwrap().is_some(),
            "callback must be set before execute()"
        );
        assert!(
            !self.inner.started.swap(true, Ordering::SeqCst),
            "execute() may only be called once"
        );

        debug!(
            id = self.inner.id,
            host = %target.host,
            port = target.port,
            path = %target.path,
            "request scheduled"
        );

        let guard = PendingTasks::begin(&self.inner.pending);
        let inner = Arc::clone(&self.inner);
        self.inner.executor.spawn(async move {
            let _guard = guard;
            Inner::run(inner, target).await;
        });
    }

    /// Ask the request to stop.
    ///
    /// Callable from any thread at any time, and idempotent. The step in
    /// flight, if any, is woken and aborted; otherwise the flag alone keeps
    /// any further step from starting. The callback still fires (with a
    /// cancelled error) and is always delivered on the worker, never on the
    /// thread calling `cancel()`. Once the callback has fired this becomes a
    /// no-op.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        // A permit is stored when nothing is waiting yet, so a step that is
        // just about to suspend still observes the abort.
        self.inner.abort.notify_one();
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.inner.target.lock().unwrap();
        f.debug_struct("Request")
            .field("id", &self.inner.id)
            .field("host", &target.host)
            .field("port", &target.port)
            .field("path", &target.path)
            .field("cancelled", &self.inner.cancelled.load(Ordering::SeqCst))
            .finish()
    }
}

impl Inner {
    async fn run(inner: Arc<Inner>, target: Target) {
        let mut response = Response::new();
        let outcome = inner.drive(&target, &mut response).await;

        match &outcome {
            Ok(()) => debug!(id = inner.id, status = response.status(), "request finished"),
            Err(e) => debug!(id = inner.id, error = %e, "request finished"),
        }

        let callback = inner.callback.lock().unwrap().take();
        if let Some(callback) = callback {
            let request = Request {
                inner: Arc::clone(&inner),
            };
            callback(&request, &response, outcome.err());
        }
    }

    /// Advance through the steps until the body is fully read or something
    /// stops the chain. This is the single exit path back to `run`, which
    /// makes the callback fire exactly once.
    async fn drive(&self, target: &Target, response: &mut Response) -> Result<(), RequestError> {
        let mut step = Step::Resolving;

        loop {
            // Checked on entry to every step, before any I/O is issued.
            self.check_cancelled()?;

            step = match step {
                Step::Resolving => {
                    trace!(id = self.id, host = %target.host, port = target.port, "resolving");
                    let addrs = self
                        .until_cancelled(async {
                            lookup_host((target.host.as_str(), target.port))
                                .await
                                .map(|addrs| addrs.collect::<Vec<_>>())
                                .map_err(RequestError::Resolve)
                        })
                        .await?;
                    Step::Connecting(addrs)
                }
                Step::Connecting(addrs) => {
                    let sock = self
                        .until_cancelled(async {
                            connect_any(&addrs).await.map_err(RequestError::Connect)
                        })
                        .await?;
                    trace!(id = self.id, "connection established");
                    Step::Sending(sock)
                }
                Step::Sending(mut sock) => {
                    let wire = compose_get(&target.host, &target.path);
                    self.until_cancelled(async {
                        sock.write_all(&wire).await.map_err(RequestError::Write)?;
                        // Half-close tells the server the request is complete.
                        sock.shutdown().await.map_err(RequestError::Write)
                    })
                    .await?;
                    Step::ReadingStatusLine(sock, BytesMut::with_capacity(READ_BUFFER_SIZE))
                }
                Step::ReadingStatusLine(mut sock, mut buf) => {
                    let line_end = self
                        .until_cancelled(async {
                            read_until(&mut sock, &mut buf, b"\r\n")
                                .await
                                .map_err(RequestError::Read)
                        })
                        .await?;
                    let line = buf.split_to(line_end + 2);
                    let (code, message) = parser::parse_status_line(&line[..line_end])?;
                    response.set_status(code, message);
                    Step::ReadingHeaders(sock, buf)
                }
                Step::ReadingHeaders(mut sock, mut buf) => {
                    let block_end = self
                        .until_cancelled(async {
                            read_until(&mut sock, &mut buf, b"\r\n\r\n")
                                .await
                                .map_err(RequestError::Read)
                        })
                        .await?;
                    let block = buf.split_to(block_end + 4);
                    for (name, value) in parser::parse_header_block(&block) {
                        response.add_header(name, value);
                    }
                    Step::ReadingBody(sock, buf)
                }
                Step::ReadingBody(mut sock, mut buf) => {
                    self.until_cancelled(async {
                        loop {
                            // Anything already buffered past the header
                            // block belongs to the body.
                            response.append_body(&buf);
                            buf.clear();
                            let n = sock.read_buf(&mut buf).await.map_err(RequestError::Read)?;
                            if n == 0 {
                                // EOF is how the server marks the end of the
                                // body; this is the success path.
                                return Ok(());
                            }
                        }
                    })
                    .await?;
                    return Ok(());
                }
            };
        }
    }

    fn check_cancelled(&self) -> Result<(), RequestError> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(RequestError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Race `op` against cancellation. The abort branch wins ties, so a
    /// cancel that lands while the step is suspended ends it right here.
    async fn until_cancelled<T>(
        &self,
        op: impl Future<Output = Result<T, RequestError>>,
    ) -> Result<T, RequestError> {
        tokio::select! {
            biased;
            _ = self.abort.notified() => Err(RequestError::Cancelled),
            result = op => result,
        }
    }
}

/// Exact bytes sent for a GET: request line, mandatory Host header, blank
/// line terminator. Nothing else is ever sent.
fn compose_get(host: &str, path: &str) -> Vec<u8> {
    format!("GET {path} HTTP/1.1\r\nHost: {host}\r\n\r\n").into_bytes()
}

/// Try each resolved address in order; the first successful connection wins.
async fn connect_any(addrs: &[SocketAddr]) -> io::Result<TcpStream> {
    let mut last_err = None;
    for &addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(sock) => return Ok(sock),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "no addresses to connect to")
    }))
}

/// Read from `sock` into `buf` until `delim` is present, returning the index
/// of its first byte. Data already in `buf` is consulted before any read is
/// issued. EOF before the delimiter is an error here.
async fn read_until(sock: &mut TcpStream, buf: &mut BytesMut, delim: &[u8]) -> io::Result<usize> {
    loop {
        if let Some(pos) = parser::find_delimiter(buf, delim) {
            return Ok(pos);
        }
        let n = sock.read_buf(buf).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before delimiter",
            ));
        }
    }
}
