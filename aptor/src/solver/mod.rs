//! Solver link - wire protocol and the blocking session worker.
//!
//! The external trajectory solver answers a line-oriented plain-text
//! protocol over TCP: one request produces exactly one response, framed
//! only by the transport's read/write calls. Answers carry no request ids;
//! they are matched to commands purely by position, so command order is
//! everything.
//!
//! # Components
//!
//! - [`SolverEndpoint`] - Target address/port plus optional local bind
//! - [`SolverCommand`] - Typed requests with their exact wire rendering
//! - [`response`] - Strict positional parsers for solver answers
//! - [`SolverLink`] / [`SessionFactory`] - The seam the computation
//!   controller talks through (production impl or test double)
//! - [`SolverSession`] - The worker thread owning the socket and the two
//!   FIFO queues
//!
//! # Threading
//!
//! Exactly one worker thread exists per session. The controller side never
//! blocks: it pushes commands and polls answers; the worker drains the
//! command queue over the socket with blocking I/O and fills the response
//! queue. The two queues plus three single-writer flags are the only state
//! shared across the boundary.

mod command;
mod endpoint;
mod link;
pub mod response;
mod session;

pub use command::SolverCommand;
pub use endpoint::SolverEndpoint;
pub use link::{SessionError, SessionFactory, SolverLink};
pub use response::ResponseError;
pub use session::{SessionConfig, SolverSession, TcpSessionFactory};
