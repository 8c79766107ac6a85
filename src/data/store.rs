/// One labeled example, generic over the feature and label tensor types.
///
/// Immutable once created; shape checks belong to the model runtime that
/// consumes it, not to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<F, L> {
    pub features: F,
    pub label: L,
}

/// In-memory store of the participant's local examples.
///
/// Two disjoint sequences, training and test, both append-only until an
/// explicit `reset`. Insertion order is preserved so batching stays
/// reproducible. No locking here; the session controller serializes
/// access.
#[derive(Debug, Clone)]
pub struct SampleStore<F, L> {
    training: Vec<Sample<F, L>>,
    test: Vec<Sample<F, L>>,
}

impl<F, L> SampleStore<F, L> {
    pub fn new() -> Self {
        Self {
            training: Vec::new(),
            test: Vec::new(),
        }
    }

    /// Appends one example to the designated sequence. Never fails.
    pub fn add(&mut self, features: F, label: L, training: bool) {
        let sample = Sample { features, label };
        if training {
            self.training.push(sample);
        } else {
            self.test.push(sample);
        }
    }

    pub fn training_count(&self) -> usize {
        self.training.len()
    }

    pub fn test_count(&self) -> usize {
        self.test.len()
    }

    pub fn len(&self) -> usize {
        self.training.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.training.is_empty() && self.test.is_empty()
    }

    /// Training examples in insertion order.
    pub fn training_samples(&self) -> &[Sample<F, L>] {
        &self.training
    }

    /// Test examples in insertion order.
    pub fn test_samples(&self) -> &[Sample<F, L>] {
        &self.test
    }

    /// Clears both sequences. Idempotent.
    pub fn reset(&mut self) {
        self.training.clear();
        self.test.clear();
    }
}

impl<F, L> Default for SampleStore<F, L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_samples_by_designation() {
        let mut store = SampleStore::new();
        store.add(vec![1.0f32], 0.0f32, true);
        store.add(vec![2.0], 1.0, false);
        store.add(vec![3.0], 0.0, true);

        assert_eq!(store.training_count(), 2);
        assert_eq!(store.test_count(), 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut store = SampleStore::new();
        for i in 0..5 {
            store.add(i, i * 10, true);
        }

        let features: Vec<i32> = store.training_samples().iter().map(|s| s.features).collect();
        assert_eq!(features, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut store = SampleStore::new();
        store.add(1.0f32, 2.0f32, true);
        store.add(3.0, 4.0, false);

        store.reset();
        store.reset();

        assert_eq!(store.training_count(), 0);
        assert_eq!(store.test_count(), 0);
        assert!(store.is_empty());
    }
}
