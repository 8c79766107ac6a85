use std::{error::Error, fmt};

use crate::session::Phase;

/// The crate's result type.
pub type Result<T> = std::result::Result<T, ClientErr>;

/// Client session failures.
///
/// `InvalidEndpoint`, `SessionBusy` and `NoTrainingSamples` are synchronous
/// rejections returned to the caller before any state change. `Model` and
/// `Connection` are produced by the external capabilities; the session
/// controller catches them at its boundary and converts them into failure
/// reports, so they never reach the invoking context.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientErr {
    /// The endpoint string is not a valid `host:port` pair.
    InvalidEndpoint {
        given: String,
        reason: &'static str,
    },
    /// Another operation is already running on this session.
    SessionBusy { phase: Phase },
    /// Training was requested while the training sequence is empty.
    NoTrainingSamples,
    /// The model runtime failed during evaluate or fit.
    Model(String),
    /// The remote training session could not be established or broke down.
    Connection { endpoint: String, detail: String },
}

impl fmt::Display for ClientErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientErr::InvalidEndpoint { given, reason } => {
                write!(f, "invalid endpoint {given:?}: {reason}")
            }
            ClientErr::SessionBusy { phase } => {
                write!(f, "session is busy: {phase}")
            }
            ClientErr::NoTrainingSamples => {
                write!(f, "the store holds no training samples")
            }
            ClientErr::Model(detail) => write!(f, "model error: {detail}"),
            ClientErr::Connection { endpoint, detail } => {
                write!(f, "connection to {endpoint} failed: {detail}")
            }
        }
    }
}

impl Error for ClientErr {}
