// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples and splits them into two sets:
//   - Training set:   used to fit the model weights
//   - Validation set: used to measure performance on unseen rows
//
// Extracted CSVs are frequently sorted by label (all benign rows,
// then all malicious rows), so the split is always preceded by a
// Fisher-Yates shuffle.
//
// The RNG is passed in. Callers seed it from TrainingContext so
// the same dataset and seed always produce the same split.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation (SliceRandom, SeedableRng)

use rand::{seq::SliceRandom, Rng};

/// Shuffle `samples` with `rng` and split into (train, validation).
///
/// # Arguments
/// * `samples`        - All available samples (consumed by this function)
/// * `train_fraction` - Proportion for training, e.g. 0.8 = 80%
/// * `rng`            - Source of randomness for the shuffle
pub fn split_train_val<T, R: Rng + ?Sized>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    rng:            &mut R,
) -> (Vec<T>, Vec<T>) {
    samples.shuffle(rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
    let split_at = split_at.min(total);

    // samples = [0..split_at], val = [split_at..total]
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.8, &mut rng());
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize>  = (0..50).collect();
        let (mut train, val)   = split_train_val(items, 0.7, &mut rng());
        train.extend(val);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.8, &mut rng());
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_same_seed_same_split() {
        let (a, _) = split_train_val((0..30).collect::<Vec<u32>>(), 0.5, &mut rng());
        let (b, _) = split_train_val((0..30).collect::<Vec<u32>>(), 0.5, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fraction_is_clamped() {
        let (train, val) = split_train_val((0..10).collect::<Vec<u8>>(), 1.5, &mut rng());
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
