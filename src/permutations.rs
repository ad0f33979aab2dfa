//! Permutation generation.
//!
//! Candidates are produced lazily by stepping a vector of position indices
//! through lexicographic order. Elements are permuted by position, so equal
//! values still produce distinct (but equal-looking) candidates.

use crate::error::{BogoError, Result};

/// Checked `n!`. Returns `None` once the result no longer fits in a `u64`.
pub fn factorial(n: usize) -> Option<u64> {
    (1..=n as u64).try_fold(1u64, |acc, k| acc.checked_mul(k))
}

/// Number of tasks a pass over `n` elements will spawn.
pub fn permutation_count(n: usize) -> Result<usize> {
    factorial(n)
        .and_then(|count| usize::try_from(count).ok())
        .ok_or(BogoError::TooManyPermutations { size: n })
}

/// Lazy iterator over every ordering of a slice.
///
/// Emission order is deterministic: calling [`permutations`] again on the
/// same input yields the same sequence.
#[derive(Debug, Clone)]
pub struct Permutations<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    exhausted: bool,
    /// `None` when N! overflows `usize`.
    remaining: Option<usize>,
}

/// Enumerate all `items.len()!` orderings of `items`.
pub fn permutations<T: Clone>(items: &[T]) -> Permutations<'_, T> {
    Permutations {
        items,
        indices: (0..items.len()).collect(),
        exhausted: false,
        remaining: permutation_count(items.len()).ok(),
    }
}

/// Step `indices` to the next lexicographic arrangement.
/// Returns `false` when `indices` was already the last one.
fn advance(indices: &mut [usize]) -> bool {
    let n = indices.len();
    if n < 2 {
        return false;
    }

    // Rightmost ascent.
    let mut i = n - 1;
    while i > 0 && indices[i - 1] >= indices[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let pivot = i - 1;

    let mut j = n - 1;
    while indices[j] <= indices[pivot] {
        j -= 1;
    }
    indices.swap(pivot, j);
    indices[i..].reverse();
    true
}

impl<T: Clone> Iterator for Permutations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.exhausted {
            return None;
        }
        let candidate = self.indices.iter().map(|&i| self.items[i].clone()).collect();
        self.exhausted = !advance(&mut self.indices);
        self.remaining = self.remaining.map(|r| r.saturating_sub(1));
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(r) => (r, Some(r)),
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), Some(1));
        assert_eq!(factorial(1), Some(1));
        assert_eq!(factorial(3), Some(6));
        assert_eq!(factorial(6), Some(720));
        assert_eq!(factorial(20), Some(2_432_902_008_176_640_000));
        assert_eq!(factorial(21), None);
    }

    #[test]
    fn test_permutation_count_overflow() {
        assert_eq!(permutation_count(4).unwrap(), 24);
        assert!(matches!(
            permutation_count(40),
            Err(BogoError::TooManyPermutations { size: 40 })
        ));
    }

    #[test]
    fn test_three_elements_lexicographic() {
        let perms: Vec<Vec<u32>> = permutations(&[1, 2, 3]).collect();
        assert_eq!(
            perms,
            vec![
                vec![1, 2, 3],
                vec![1, 3, 2],
                vec![2, 1, 3],
                vec![2, 3, 1],
                vec![3, 1, 2],
                vec![3, 2, 1],
            ]
        );
    }

    #[test]
    fn test_single_element() {
        let perms: Vec<Vec<u32>> = permutations(&[7]).collect();
        assert_eq!(perms, vec![vec![7]]);
    }

    #[test]
    fn test_all_distinct_and_complete() {
        let input: Vec<u32> = vec![4, 1, 6, 2, 5, 3];
        let perms: Vec<Vec<u32>> = permutations(&input).collect();
        assert_eq!(perms.len(), 720);

        let unique: HashSet<Vec<u32>> = perms.iter().cloned().collect();
        assert_eq!(unique.len(), 720);

        for perm in &perms {
            let mut sorted = perm.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
        }
    }

    #[test]
    fn test_duplicates_are_permuted_by_position() {
        let perms: Vec<Vec<u32>> = permutations(&[1, 1, 2]).collect();
        assert_eq!(perms.len(), 6);
        assert_eq!(perms.iter().filter(|p| **p == vec![1, 1, 2]).count(), 2);
    }

    #[test]
    fn test_restartable() {
        let input = ['c', 'a', 'b', 'd'];
        let first: Vec<Vec<char>> = permutations(&input).collect();
        let second: Vec<Vec<char>> = permutations(&input).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_size_hint_tracks_remaining() {
        let input = [1, 2, 3, 4];
        let mut iter = permutations(&input);
        assert_eq!(iter.size_hint(), (24, Some(24)));
        iter.next();
        iter.next();
        assert_eq!(iter.size_hint(), (22, Some(22)));
        assert_eq!(iter.count(), 22);
    }
}
