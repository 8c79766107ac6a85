use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::Mutex;

use crate::{endpoint::Endpoint, error::Result};

/// Stream of human-readable progress events produced by a remote session.
///
/// The remote server drives the rounds; the first `Err` item ends the
/// session as a failure, the end of the stream ends it normally.
pub type RemoteEvents = BoxStream<'static, Result<String>>;

/// Transport boundary to the coordinating server.
///
/// `connect` hands the local model over for remote-driven train/evaluate
/// rounds. This crate never interprets the round protocol; it only
/// supervises the connection lifecycle and forwards event messages.
#[async_trait]
pub trait TrainingService<M>: Send + Sync + 'static {
    /// Opens a remote session against `endpoint`.
    ///
    /// # Errors
    /// Returns `ClientErr::Connection` when the endpoint is unreachable or
    /// the handshake fails.
    async fn connect(&self, endpoint: &Endpoint, model: Arc<Mutex<M>>) -> Result<RemoteEvents>;
}
