//! Sortedness predicate.
//!
//! Every task in a pass runs exactly this check on its own candidate.

/// Check if a slice is sorted in non-decreasing order.
///
/// Empty and single-element slices are trivially sorted.
#[inline]
pub fn is_sorted<T: PartialOrd>(data: &[T]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}
