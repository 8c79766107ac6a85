use rand::Rng;

use super::{FloatMatrix, store::Sample};

/// Generates `count` uniformly random samples for smoke testing a model
/// before any real dataset is loaded.
///
/// # Args
/// * `count` - Number of samples to generate.
/// * `rows`, `cols` - Shape of each feature matrix.
/// * `label_len` - Length of each label vector.
pub fn random_samples(
    count: usize,
    rows: usize,
    cols: usize,
    label_len: usize,
) -> Vec<Sample<FloatMatrix, Vec<f32>>> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| Sample {
            features: (0..rows)
                .map(|_| (0..cols).map(|_| rng.random::<f32>()).collect())
                .collect(),
            label: (0..label_len).map(|_| rng.random::<f32>()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_the_requested_shape() {
        let samples = random_samples(3, 7, 8, 1);
        assert_eq!(samples.len(), 3);
        for sample in &samples {
            assert_eq!(sample.features.len(), 7);
            assert!(sample.features.iter().all(|row| row.len() == 8));
            assert_eq!(sample.label.len(), 1);
        }
    }
}
