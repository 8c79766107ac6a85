mod store;
mod synthetic;

pub use store::{Sample, SampleStore};
pub use synthetic::random_samples;

/// Row-major 2D feature tensor used by the demo model and tests.
pub type FloatMatrix = Vec<Vec<f32>>;
