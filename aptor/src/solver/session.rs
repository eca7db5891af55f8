//! Blocking solver session worker.
//!
//! One worker thread per session owns the TCP stream. The controller
//! thread pushes command lines into the command queue; the worker pops one
//! at a time, writes it, blocks for exactly one reply buffer, and pushes
//! the decoded text into the response queue. Each queue has one producer
//! and one consumer; FIFO order is preserved end to end.
//!
//! # Failure semantics
//!
//! A connect failure logs and ends the session before the loop starts. A
//! failed send or receive logs and yields a best-effort (possibly empty)
//! answer so positional matching stays intact; the worker never terminates
//! itself over a single failed exchange. Only an unusable handle - the
//! peer closing the stream - breaks the loop early. Nothing is ever
//! raised to the controller thread.
//!
//! # Shutdown
//!
//! Cooperative only. The shutdown flag is checked between exchanges; a
//! hung solver stalls the session indefinitely (no timeouts by design).

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use std::{fmt, io};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, error, info, warn};

use super::endpoint::SolverEndpoint;
use super::link::{SessionError, SessionFactory, SolverLink};

/// Tuning knobs for the session worker.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sleep interval while the command queue is empty.
    ///
    /// Bounded polling only; correctness does not depend on latency.
    pub idle_poll: Duration,

    /// Size of the single reply buffer per exchange.
    pub reply_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_poll: Duration::from_secs(1),
            reply_buffer: 4096,
        }
    }
}

/// State shared between the controller thread and the worker thread.
///
/// The queues are single-producer/single-consumer; the flags are written
/// by one side and read by the other.
struct SessionShared {
    /// Produced by the controller, consumed by the worker.
    commands: Mutex<VecDeque<String>>,
    /// Produced by the worker, consumed by the controller.
    answers: Mutex<VecDeque<String>>,
    /// Set by the worker when it observes an empty command queue; cleared
    /// by the controller on enqueue.
    input_queue_empty: AtomicBool,
    /// Set by the controller to request cooperative shutdown.
    shutdown: AtomicBool,
    /// Set by the worker once it has exited and closed the connection.
    finished: AtomicBool,
}

/// A live connection to the solver with its dedicated worker thread.
///
/// Dropping the session requests shutdown and joins the worker.
pub struct SolverSession {
    shared: Arc<SessionShared>,
    worker: Option<JoinHandle<()>>,
}

impl SolverSession {
    /// Spawn the worker thread for `endpoint`.
    ///
    /// Returns immediately; connection setup happens on the worker. A
    /// failed connect is observable only as `is_finished()` turning true
    /// without any answers arriving.
    pub fn connect(endpoint: SolverEndpoint, config: SessionConfig) -> Self {
        let shared = Arc::new(SessionShared {
            commands: Mutex::new(VecDeque::new()),
            answers: Mutex::new(VecDeque::new()),
            input_queue_empty: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        });
        let worker_shared = Arc::clone(&shared);

        let worker = thread::Builder::new()
            .name("solver-session".to_string())
            .spawn(move || run_worker(worker_shared, endpoint, config))
            .expect("Failed to spawn solver session thread");

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Wait for the worker thread to finish.
    fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl SolverLink for SolverSession {
    fn add_command(&self, line: String) {
        self.shared.input_queue_empty.store(false, Ordering::Relaxed);
        self.shared.commands.lock().unwrap().push_back(line);
    }

    fn next_answer(&self) -> Option<String> {
        self.shared.answers.lock().unwrap().pop_front()
    }

    fn clear_answers(&self) {
        self.shared.answers.lock().unwrap().clear();
    }

    fn input_queue_empty(&self) -> bool {
        self.shared.input_queue_empty.load(Ordering::Relaxed)
    }

    fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Relaxed)
    }

    fn request_shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for SolverSession {
    fn drop(&mut self) {
        self.request_shutdown();
        self.join();
    }
}

impl fmt::Debug for SolverSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverSession")
            .field("finished", &self.is_finished())
            .field("input_queue_empty", &self.input_queue_empty())
            .finish()
    }
}

/// Production [`SessionFactory`] opening TCP sessions to one endpoint.
#[derive(Debug, Clone)]
pub struct TcpSessionFactory {
    endpoint: SolverEndpoint,
    config: SessionConfig,
}

impl TcpSessionFactory {
    /// Factory with default session tuning.
    pub fn new(endpoint: SolverEndpoint) -> Self {
        Self::with_config(endpoint, SessionConfig::default())
    }

    /// Factory with custom session tuning.
    pub fn with_config(endpoint: SolverEndpoint, config: SessionConfig) -> Self {
        Self { endpoint, config }
    }
}

impl SessionFactory for TcpSessionFactory {
    fn open(&self) -> Result<Box<dyn SolverLink>, SessionError> {
        Ok(Box::new(SolverSession::connect(
            self.endpoint.clone(),
            self.config.clone(),
        )))
    }
}

/// Worker entry point: connect, run the exchange loop, mark finished.
fn run_worker(shared: Arc<SessionShared>, endpoint: SolverEndpoint, config: SessionConfig) {
    match open_stream(&endpoint) {
        Ok(stream) => {
            info!(%endpoint, "connected to solver");
            exchange_loop(&shared, stream, &config);
        }
        Err(e) => {
            error!(%endpoint, error = %e, "unable to connect to solver");
        }
    }
    info!(%endpoint, "solver session worker shutting down");
    shared.finished.store(true, Ordering::Relaxed);
}

/// Resolve the target and open the stream, binding locally first if asked.
fn open_stream(endpoint: &SolverEndpoint) -> io::Result<TcpStream> {
    let Some(local) = endpoint.local else {
        return TcpStream::connect((endpoint.host.as_str(), endpoint.port));
    };

    let target = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()?
        .find(|addr| addr.is_ipv4() == local.is_ipv4())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no resolved address matches the local bind family",
            )
        })?;

    let socket = Socket::new(Domain::for_address(target), Type::STREAM, Some(Protocol::TCP))?;
    socket.bind(&local.into())?;
    socket.connect(&target.into())?;
    Ok(socket.into())
}

fn exchange_loop(shared: &SessionShared, mut stream: TcpStream, config: &SessionConfig) {
    while !shared.shutdown.load(Ordering::Relaxed) {
        let command = shared.commands.lock().unwrap().pop_front();
        let Some(command) = command else {
            shared.input_queue_empty.store(true, Ordering::Relaxed);
            thread::sleep(config.idle_poll);
            continue;
        };

        match exchange(&mut stream, &command, config.reply_buffer) {
            Ok(answer) => {
                shared.answers.lock().unwrap().push_back(answer);
            }
            Err(ExchangeError::Recoverable(e)) => {
                // Best-effort empty answer keeps positional matching intact.
                warn!(%command, error = %e, "solver exchange failed");
                shared.answers.lock().unwrap().push_back(String::new());
            }
            Err(ExchangeError::HandleGone) => {
                error!(%command, "solver closed the connection");
                break;
            }
        }
    }
}

enum ExchangeError {
    /// Send or receive failed but the handle may still work.
    Recoverable(io::Error),
    /// The stream is unusable; the session is over.
    HandleGone,
}

/// Send one command and block for exactly one reply buffer.
fn exchange(stream: &mut TcpStream, command: &str, reply_buffer: usize) -> Result<String, ExchangeError> {
    debug!(%command, "sending");
    if let Err(e) = stream.write_all(command.as_bytes()) {
        return Err(ExchangeError::Recoverable(e));
    }

    let mut buffer = vec![0u8; reply_buffer];
    match stream.read(&mut buffer) {
        Ok(0) => Err(ExchangeError::HandleGone),
        Ok(len) => {
            let answer = String::from_utf8_lossy(&buffer[..len]).into_owned();
            debug!(%command, %answer, "received");
            Ok(answer)
        }
        Err(e) => Err(ExchangeError::Recoverable(e)),
    }
}
