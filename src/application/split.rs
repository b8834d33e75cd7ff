//! Seeded, stratified train/test partitioning.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::training::TrainingError;

/// Row indices of the two partitions, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split `labels` so every class keeps its proportion in both partitions.
///
/// The test set holds `ceil(n * test_size)` rows in total, shared between
/// classes by largest remainder of their proportional share. Every class
/// keeps at least one row in each partition. Classes are visited in
/// ascending label order and shuffled from a single seeded stream, so the
/// same labels, fraction and seed always give the same split.
///
/// # Errors
/// Returns `TrainingError::Split` if `test_size` is outside (0, 1), a class
/// has fewer than two rows, or either partition would be smaller than the
/// number of classes.
pub fn stratified_split<L: Ord + Copy>(
    labels: &[L],
    test_size: f64,
    seed: u64,
) -> Result<SplitIndices, TrainingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::Split(format!(
            "test size {test_size} must be in (0, 1)"
        )));
    }

    let mut classes: Vec<L> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let members: Vec<Vec<usize>> = classes
        .iter()
        .map(|&class| {
            labels
                .iter()
                .enumerate()
                .filter(|&(_, &l)| l == class)
                .map(|(i, _)| i)
                .collect()
        })
        .collect();
    let counts: Vec<usize> = members.iter().map(Vec::len).collect();
    if counts.iter().any(|&c| c < 2) {
        return Err(TrainingError::Split(
            "the least populated class has only 1 member; stratification needs at least 2"
                .to_string(),
        ));
    }

    let n = labels.len();
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test < classes.len() || n - n_test < classes.len() {
        return Err(TrainingError::Split(format!(
            "{n} rows cannot give {n_test} test rows with every one of {} classes in both partitions",
            classes.len()
        )));
    }

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n);
    let mut test = Vec::with_capacity(n_test);

    for (mut rows, n_class_test) in members.into_iter().zip(allocate(&counts, n_test)) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..n_class_test]);
        train.extend_from_slice(&rows[n_class_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

/// Share `total` test rows between classes of the given sizes.
///
/// Starts from the floor of each proportional share, clamped to
/// `[1, count - 1]`, then moves single rows by largest (or smallest)
/// remainder until the shares sum to `total`. Ties go to the earlier class.
/// Callers guarantee `classes <= total <= n - classes`.
fn allocate(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let expected: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * total as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = counts
        .iter()
        .zip(&expected)
        .map(|(&c, &e)| (e.floor() as usize).clamp(1, c - 1))
        .collect();

    let remainder = |alloc: &[usize], k: usize| expected[k] - alloc[k] as f64;
    loop {
        let sum: usize = alloc.iter().sum();
        if sum == total {
            return alloc;
        }
        let candidates = (0..counts.len()).filter(|&k| {
            if sum < total {
                alloc[k] < counts[k] - 1
            } else {
                alloc[k] > 1
            }
        });
        let pick = if sum < total {
            candidates.fold(None, |best: Option<usize>, k| match best {
                Some(b) if remainder(&alloc, b) >= remainder(&alloc, k) => Some(b),
                _ => Some(k),
            })
        } else {
            candidates.fold(None, |best: Option<usize>, k| match best {
                Some(b) if remainder(&alloc, b) <= remainder(&alloc, k) => Some(b),
                _ => Some(k),
            })
        };
        match pick {
            Some(k) if sum < total => alloc[k] += 1,
            Some(k) => alloc[k] -= 1,
            None => return alloc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<u8> {
        let mut y = vec![0u8; 50];
        y.extend(vec![1u8; 30]);
        y.extend(vec![2u8; 20]);
        y
    }

    #[test]
    fn test_proportions_preserved() {
        let y = labels();
        let split = stratified_split(&y, 0.2, 42).unwrap();

        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
        for (class, expected) in [(0u8, 10), (1, 6), (2, 4)] {
            let n = split.test.iter().filter(|&&i| y[i] == class).count();
            assert_eq!(n, expected);
        }
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let y = labels();
        let split = stratified_split(&y, 0.2, 7).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let y = labels();
        assert_eq!(
            stratified_split(&y, 0.2, 42).unwrap(),
            stratified_split(&y, 0.2, 42).unwrap()
        );
        assert_ne!(
            stratified_split(&y, 0.2, 42).unwrap(),
            stratified_split(&y, 0.2, 43).unwrap()
        );
    }

    #[test]
    fn test_test_size_is_rounded_up_overall() {
        // 21 rows at 0.2: ceil(4.2) = 5 held out, not 1 + 1 + 1
        let y: Vec<u8> = [0u8, 1, 2].iter().flat_map(|&c| vec![c; 7]).collect();
        let split = stratified_split(&y, 0.2, 42).unwrap();

        assert_eq!(split.test.len(), 5);
        assert_eq!(split.train.len(), 16);
        for class in 0u8..3 {
            let n = split.test.iter().filter(|&&i| y[i] == class).count();
            assert!((1..=2).contains(&n));
        }
    }

    #[test]
    fn test_allocate_matches_total() {
        assert_eq!(allocate(&[7, 7, 7], 5), vec![2, 2, 1]);
        assert_eq!(allocate(&[50, 30, 20], 20), vec![10, 6, 4]);
        assert_eq!(allocate(&[2, 2, 16], 3), vec![1, 1, 1]);
        assert_eq!(allocate(&[2, 2, 2], 3), vec![1, 1, 1]);
    }

    #[test]
    fn test_too_few_rows_for_both_partitions() {
        // ceil(4 * 0.2) = 1 test row for 2 classes
        assert!(matches!(
            stratified_split(&[0u8, 0, 1, 1], 0.2, 42),
            Err(TrainingError::Split(_))
        ));
    }

    #[test]
    fn test_small_class_keeps_one_in_each_partition() {
        let y = vec![0u8, 0, 0, 0, 0, 0, 0, 0, 1, 1];
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test.iter().filter(|&&i| y[i] == 1).count(), 1);
        assert_eq!(split.train.iter().filter(|&&i| y[i] == 1).count(), 1);
    }

    #[test]
    fn test_rejects_singleton_class_and_bad_fraction() {
        assert!(matches!(
            stratified_split(&[0u8, 0, 1], 0.2, 42),
            Err(TrainingError::Split(_))
        ));
        assert!(stratified_split(&[0u8, 0], 1.0, 42).is_err());
        assert!(stratified_split(&[0u8, 0], 0.0, 42).is_err());
    }
}
