//! The seam between the computation controller and the transport.

use std::io;

use thiserror::Error;

use super::endpoint::SolverEndpoint;

/// Failure to open a solver session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session could not be opened at all.
    #[error("failed to open solver session to {endpoint}: {source}")]
    Open {
        endpoint: SolverEndpoint,
        #[source]
        source: io::Error,
    },
}

/// Controller-side view of one solver session.
///
/// Implemented by [`SolverSession`](super::SolverSession) for production
/// and by scripted doubles in tests. Every method is non-blocking; the
/// controller is driven by an external tick and must never stall the host.
///
/// Commands are delivered in enqueue order and answers are matched by
/// position, so callers must consume the answer to a command before
/// enqueueing another command whose answer they need for sequencing.
pub trait SolverLink: Send {
    /// Append one command to the outgoing queue.
    ///
    /// Clears the input-queue-empty flag before enqueueing. Must not be
    /// called after [`request_shutdown`](Self::request_shutdown).
    fn add_command(&self, line: String);

    /// Pop the oldest buffered answer, or `None` when nothing is buffered.
    fn next_answer(&self) -> Option<String>;

    /// Discard all buffered answers.
    ///
    /// Used when transitioning protocol phases so a stale answer cannot be
    /// misread as the reply to a newer command.
    fn clear_answers(&self);

    /// Whether the worker has observed an empty command queue since the
    /// last enqueue.
    fn input_queue_empty(&self) -> bool;

    /// Whether the worker has exited and closed the connection.
    fn is_finished(&self) -> bool;

    /// Ask the worker to stop after the current exchange.
    ///
    /// Cooperative: observed between exchanges only, never by closing an
    /// in-flight call.
    fn request_shutdown(&self);
}

/// Opens solver sessions on demand.
///
/// The controller opens one fresh session per computation; injecting the
/// factory keeps the controller testable without a network.
pub trait SessionFactory: Send {
    /// Open a new session with a fresh worker.
    fn open(&self) -> Result<Box<dyn SolverLink>, SessionError>;
}
