//! Random sampling for working through long lists in small batches.

use rand::seq::index;
use rand::Rng;

/// Pick up to `count` items uniformly at random, without replacement.
///
/// Returns everything (in original order) when the list is no longer than
/// `count`, and nothing when `count` is zero.
pub fn random_sample<T>(items: Vec<T>, count: usize) -> Vec<T> {
    sample_with(&mut rand::rng(), items, count)
}

/// [`random_sample`] with an explicit random source.
pub fn sample_with<T, R: Rng + ?Sized>(rng: &mut R, items: Vec<T>, count: usize) -> Vec<T> {
    if count == 0 {
        return Vec::new();
    }
    if items.len() <= count {
        return items;
    }

    let mut picked = index::sample(rng, items.len(), count).into_vec();
    picked.sort_unstable();

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect()
}
