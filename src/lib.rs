pub mod data;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod progress;
pub mod service;
pub mod session;

pub use data::{FloatMatrix, Sample, SampleStore, random_samples};
pub use endpoint::Endpoint;
pub use error::{ClientErr, Result};
pub use model::{Evaluation, ModelClient, SampleSpec};
pub use progress::{ChannelSink, ProgressSink};
pub use service::{RemoteEvents, TrainingService};
pub use session::{Phase, SessionController};
