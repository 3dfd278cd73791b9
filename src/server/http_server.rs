use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::request::Request;
use super::service::AppService;
use crate::error::RequestParseError;

/// How long a worker waits for a request before re-checking the shutdown flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// HTTP server: a `tiny_http` listener drained by a fixed pool of workers
///
/// `tiny_http` owns the sockets: it reads complete heads and bodies and keeps
/// connections alive. Each worker pulls whole requests off the listener and
/// runs them through the [`AppService`].
pub struct HttpServer {
    server: Arc<tiny_http::Server>,
    addr: SocketAddr,
}

/// Handle to a running HTTP server
///
/// Provides methods for waiting until the server is ready, stopping it,
/// or joining the worker threads.
pub struct ServerHandle {
    addr: SocketAddr,
    server: Arc<tiny_http::Server>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the server is listening on
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// Polls the server address by attempting TCP connections until successful.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` error if the server doesn't become ready within ~250ms (50 attempts × 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop the workers and wait for them to finish
    ///
    /// Requests already being handled run to completion. The listening
    /// socket closes once the last worker has exited.
    pub fn stop(self) {
        let ServerHandle {
            addr,
            server,
            shutdown,
            workers,
        } = self;
        shutdown.store(true, Ordering::SeqCst);
        for _ in &workers {
            server.unblock();
        }
        for worker in workers {
            if worker.join().is_err() {
                error!(addr = %addr, "Worker thread panicked");
            }
        }
        info!(addr = %addr, "HTTP server stopped");
    }

    /// Wait for every worker thread to complete
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread panicked.
    pub fn join(self) -> thread::Result<()> {
        for worker in self.workers {
            worker.join()?;
        }
        Ok(())
    }
}

impl HttpServer {
    /// Bind the listening socket
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be bound.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let server = tiny_http::Server::http(addr).map_err(io::Error::other)?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| io::Error::other("listener is not bound to an IP address"))?;
        Ok(Self {
            server: Arc::new(server),
            addr,
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start `config.workers` worker threads
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned. Workers started
    /// before the failure are told to shut down.
    pub fn start(self, service: AppService) -> io::Result<ServerHandle> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_count = service.config().workers;
        let mut workers = Vec::with_capacity(worker_count);

        for id in 0..worker_count {
            let server = Arc::clone(&self.server);
            let service = service.clone();
            let flag = Arc::clone(&shutdown);
            let spawned = thread::Builder::new()
                .name(format!("pigeon-worker-{}", id))
                .spawn(move || worker_loop(&server, &service, &flag));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    error!(worker = id, error = %err, "Failed to spawn worker thread");
                    shutdown.store(true, Ordering::SeqCst);
                    return Err(err);
                }
            }
        }

        info!(addr = %self.addr, workers = worker_count, "HTTP server started");
        Ok(ServerHandle {
            addr: self.addr,
            server: self.server,
            shutdown,
            workers,
        })
    }

    /// Serve on the worker pool until the process exits
    ///
    /// # Errors
    ///
    /// Returns an error if the workers cannot be started or one of them panics.
    pub fn run(self, service: AppService) -> io::Result<()> {
        self.start(service)?
            .join()
            .map_err(|_| io::Error::other("worker thread panicked"))
    }
}

fn worker_loop(server: &tiny_http::Server, service: &AppService, shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::SeqCst) {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => serve(service, request),
            Ok(None) => {}
            Err(err) => {
                if !shutdown.load(Ordering::SeqCst) {
                    warn!(error = %err, "Failed to receive request");
                }
            }
        }
    }
    debug!("Worker exiting");
}

fn serve(service: &AppService, mut request: tiny_http::Request) {
    let response = match read_request(&mut request, service.config().max_body_size) {
        Ok(parsed) => service.respond(&parsed),
        Err(err) => service.reject(&err),
    };
    let remote = request.remote_addr().copied();
    if let Err(err) = request.respond(response.into_transport()) {
        warn!(peer = ?remote, error = %err, "Failed to write response");
    }
}

/// Convert a transport request into a [`Request`], reading at most
/// `max_body_size` body bytes.
fn read_request(
    request: &mut tiny_http::Request,
    max_body_size: usize,
) -> Result<Request, RequestParseError> {
    let too_large = RequestParseError::BodyTooLarge {
        limit: max_body_size,
    };
    if request.body_length().is_some_and(|len| len > max_body_size) {
        return Err(too_large);
    }

    let limit = u64::try_from(max_body_size)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let mut body = Vec::new();
    request
        .as_reader()
        .take(limit)
        .read_to_end(&mut body)
        .map_err(|err| RequestParseError::Malformed {
            reason: format!("failed to read body: {}", err),
        })?;
    if body.len() > max_body_size {
        return Err(too_large);
    }

    let headers: Vec<(String, String)> = request
        .headers()
        .iter()
        .map(|h| (h.field.as_str().as_str().to_string(), h.value.as_str().to_string()))
        .collect();
    let version = request.http_version();
    let version = format!("HTTP/{}.{}", version.0, version.1);

    Request::from_parts(
        &request.method().to_string(),
        request.url(),
        version,
        headers,
        body,
    )
}
