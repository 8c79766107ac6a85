use std::num::NonZeroUsize;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{data::Sample, error::Result};

/// Outcome of a single evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
}

/// On-device model runtime boundary.
///
/// Implementations own the numeric work: forward/backward passes, weight
/// handling, tensor shape checks. The session controller only sequences
/// calls into this trait and reports what comes back.
#[async_trait]
pub trait ModelClient: Send + Sync + 'static {
    type Features: Clone + Send + Sync + 'static;
    type Label: Clone + Send + Sync + 'static;

    /// Runs a forward pass over `samples` and returns aggregate metrics.
    ///
    /// An empty slice is allowed; the degenerate loss (NaN, zero, ...) is
    /// the implementation's choice.
    ///
    /// # Errors
    /// Returns `ClientErr::Model` on malformed input or internal failure.
    async fn evaluate(
        &self,
        samples: &[Sample<Self::Features, Self::Label>],
    ) -> Result<Evaluation>;

    /// Trains for `epochs` epochs over `samples`, yielding one loss per
    /// epoch as soon as it is available.
    ///
    /// The stream is finite and not restartable; an `Err` item ends it.
    fn fit<'a>(
        &'a mut self,
        epochs: NonZeroUsize,
        samples: &'a [Sample<Self::Features, Self::Label>],
    ) -> BoxStream<'a, Result<f32>>;
}

/// Per-model adaptation bundle a concrete model client is constructed
/// with, alongside its opaque model blob and per-layer sizes.
///
/// Different models use different tensor layouts and loss/accuracy
/// definitions, so these stay plain function references instead of being
/// hard-coded or subclassed away.
pub struct SampleSpec<F, L> {
    /// Flattens one feature tensor into the model's input layout.
    pub feature_adapter: fn(&F) -> Vec<f32>,
    /// Flattens one label tensor into the model's target layout.
    pub label_adapter: fn(&L) -> Vec<f32>,
    /// Allocates the output buffers for a batch of `n` predictions.
    pub output_shaper: fn(n: usize) -> Vec<Vec<f32>>,
    /// Aggregate loss over (expected, predicted) batches.
    pub loss_fn: fn(&[Vec<f32>], &[Vec<f32>]) -> f32,
    /// Aggregate accuracy over (expected, predicted) batches.
    pub accuracy_fn: fn(&[Vec<f32>], &[Vec<f32>]) -> f32,
}

// Manual impls keep F and L free of Copy/Clone bounds; every field is a
// function pointer.
impl<F, L> Clone for SampleSpec<F, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F, L> Copy for SampleSpec<F, L> {}

/// Mean negative log-likelihood for one-hot expected outputs.
///
/// Returns NaN for an empty batch.
pub fn negative_log_likelihood_loss(expected: &[Vec<f32>], predicted: &[Vec<f32>]) -> f32 {
    const EPS: f32 = 1e-7;

    if expected.is_empty() {
        return f32::NAN;
    }

    let total: f32 = expected
        .iter()
        .zip(predicted)
        .map(|(e, p)| {
            let class = argmax(e);
            -p.get(class).copied().unwrap_or(0.0).max(EPS).ln()
        })
        .sum();
    total / expected.len() as f32
}

/// Fraction of samples whose arg-max class matches the prediction.
///
/// Returns NaN for an empty batch.
pub fn classifier_accuracy(expected: &[Vec<f32>], predicted: &[Vec<f32>]) -> f32 {
    if expected.is_empty() {
        return f32::NAN;
    }

    let hits = expected
        .iter()
        .zip(predicted)
        .filter(|(e, p)| argmax(e) == argmax(p))
        .count();
    hits as f32 / expected.len() as f32
}

/// Stand-in for models without a meaningful accuracy metric.
pub fn placeholder_accuracy(_expected: &[Vec<f32>], _predicted: &[Vec<f32>]) -> f32 {
    f32::NAN
}

fn argmax(xs: &[f32]) -> usize {
    xs.iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nll_is_zero_for_perfect_predictions() {
        let expected = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let predicted = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let loss = negative_log_likelihood_loss(&expected, &predicted);
        assert!(loss.abs() < 1e-6, "got {loss}");
    }

    #[test]
    fn nll_grows_for_wrong_predictions() {
        let expected = vec![vec![0.0, 1.0]];
        let confident = negative_log_likelihood_loss(&expected, &[vec![0.1, 0.9]]);
        let wrong = negative_log_likelihood_loss(&expected, &[vec![0.9, 0.1]]);
        assert!(wrong > confident);
    }

    #[test]
    fn accuracy_counts_argmax_matches() {
        let expected = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let predicted = vec![vec![0.2, 0.8], vec![0.3, 0.7]];
        assert_eq!(classifier_accuracy(&expected, &predicted), 0.5);
    }

    #[test]
    fn empty_batches_are_nan() {
        assert!(negative_log_likelihood_loss(&[], &[]).is_nan());
        assert!(classifier_accuracy(&[], &[]).is_nan());
        assert!(placeholder_accuracy(&[], &[]).is_nan());
    }
}
