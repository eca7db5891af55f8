//! Solver endpoint addressing.

use std::net::SocketAddr;

/// Where to reach the solver, and optionally where to connect from.
///
/// Immutable for the lifetime of one session. The target host is resolved
/// by the session worker when it opens the connection, so a hostname is
/// fine; the local bind address must already be concrete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverEndpoint {
    /// Target host name or address.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Optional local address/port to bind before connecting.
    pub local: Option<SocketAddr>,
}

impl SolverEndpoint {
    /// Endpoint without a local bind.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            local: None,
        }
    }

    /// Bind the connecting socket to `local` first.
    pub fn with_local(mut self, local: SocketAddr) -> Self {
        self.local = Some(local);
        self
    }
}

impl std::fmt::Display for SolverEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
