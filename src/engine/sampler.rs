use rand::Rng;
use rand::seq::SliceRandom;

/// Draw `min(n, list.len())` distinct elements in random order. The input
/// is left untouched.
pub fn sample<T: Clone, R: Rng + ?Sized>(list: &[T], n: usize, rng: &mut R) -> Vec<T> {
    let mut pool = list.to_vec();
    let amount = n.min(pool.len());
    let (picked, _) = pool.partial_shuffle(rng, amount);
    picked.to_vec()
}

/// A freshly shuffled copy of the whole list.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(list: &[T], rng: &mut R) -> Vec<T> {
    sample(list, list.len(), rng)
}

/// A uniformly chosen index into a list of `len` elements.
pub fn pick_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    (len > 0).then(|| rng.gen_range(0..len))
}
