//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use aptor::ascent::AscentError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// The computation could not start or did not complete
    Compute(AscentError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {self}");

        if let CliError::Compute(AscentError::SessionEnded) = self {
            eprintln!();
            eprintln!("The solver connection dropped. Make sure the solver is");
            eprintln!("running and reachable at the given host and port.");
        }

        process::exit(1);
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "failed to initialize logging: {e}"),
            CliError::Compute(e) => write!(f, "{e}"),
        }
    }
}

impl From<AscentError> for CliError {
    fn from(e: AscentError) -> Self {
        CliError::Compute(e)
    }
}
