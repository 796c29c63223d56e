//! The `workload` module drives any [`DoubleEnded`] container through the
//! access patterns used to compare growth policies: filling from either
//! end (with or without a reservation), steady-state FIFO traffic, a
//! zigzag that drains from the opposite end, and random access
//! (traversal, shuffling, sorting).
//!
//! Each filling pattern exists in two flavours: the plain driver, meant
//! to be timed, and a `*_load_factor` variant that samples
//! [`DoubleEnded::load_factor`] after every step and returns the mean.
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use smallvec::SmallVec;

use crate::contract::DoubleEnded;
use crate::error::Result;
use crate::QUEUE_PRELOAD;

/// Workload elements carry an integer key that sorting compares and
/// traversal increments.
pub trait Element: Copy + Default {
    fn with_key(key: i32) -> Self;

    fn key(&self) -> i32;

    #[inline(always)]
    fn bump(&mut self) {
        *self = Self::with_key(self.key().wrapping_add(1));
    }
}

impl Element for i32 {
    #[inline(always)]
    fn with_key(key: i32) -> Self {
        key
    }

    #[inline(always)]
    fn key(&self) -> i32 {
        *self
    }
}

/// A payload of `N` words; only the first one is the key.  The other
/// words only add weight to each copy.  Payloads order by key first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Payload<const N: usize> {
    words: [i32; N],
}

pub type Small = Payload<1>;
pub type Medium = Payload<10>;
pub type Large = Payload<100>;

impl<const N: usize> Default for Payload<N> {
    fn default() -> Self {
        Payload { words: [0; N] }
    }
}

impl<const N: usize> Element for Payload<N> {
    #[inline(always)]
    fn with_key(key: i32) -> Self {
        let mut ret = Self::default();
        if let Some(first) = ret.words.first_mut() {
            *first = key;
        }
        ret
    }

    #[inline(always)]
    fn key(&self) -> i32 {
        self.words.first().copied().unwrap_or(0)
    }

    #[inline(always)]
    fn bump(&mut self) {
        if let Some(first) = self.words.first_mut() {
            *first = first.wrapping_add(1);
        }
    }
}

/// Accumulates load factor samples.
#[derive(Clone, Copy, Debug, Default)]
struct LoadFactorMeter {
    total: f64,
    samples: usize,
    unsupported: bool,
}

impl LoadFactorMeter {
    #[inline(always)]
    fn sample<C: DoubleEnded>(&mut self, container: &C) {
        match container.load_factor() {
            Some(load) => {
                self.total += load;
                self.samples += 1;
            }
            None => self.unsupported = true,
        }
    }

    fn mean(&self, workload: &str) -> Option<f64> {
        if self.unsupported || self.samples == 0 {
            return None;
        }

        let mean = self.total / self.samples as f64;
        log::debug!(
            "mean load factor. workload={} samples={} mean={:.4}",
            workload,
            self.samples,
            mean
        );
        Some(mean)
    }
}

/// Keys saturate at `i32::MAX` for positions that don't fit.
#[inline(always)]
fn key_for(i: usize) -> i32 {
    i32::try_from(i).unwrap_or(i32::MAX)
}

fn fill_back_observed<C, F>(n: usize, reserve: bool, mut observe: F) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
    F: FnMut(&C),
{
    let mut container = C::default();
    if reserve {
        container.reserve_back(n)?;
    }

    for i in 0..n {
        container.try_push_back(C::Item::with_key(key_for(i)))?;
        observe(&container);
    }

    Ok(container)
}

fn fill_front_observed<C, F>(n: usize, reserve: bool, mut observe: F) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
    F: FnMut(&C),
{
    let mut container = C::default();
    if reserve {
        container.reserve_front(n)?;
    }

    for i in 0..n {
        container.try_push_front(C::Item::with_key(key_for(i)))?;
        observe(&container);
    }

    Ok(container)
}

fn queue_observed<C, F>(n: usize, mut observe: F) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
    F: FnMut(&C),
{
    let mut container = C::default();
    for i in 0..QUEUE_PRELOAD {
        container.try_push_back(C::Item::with_key(key_for(i)))?;
    }

    for i in 0..n {
        if i % 2 == 0 {
            container.try_push_back(C::Item::with_key(key_for(QUEUE_PRELOAD + i)))?;
        } else {
            container.pop_front()?;
        }
        observe(&container);
    }

    Ok(container)
}

fn zigzag_observed<C, F>(n: usize, mut observe: F) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
    F: FnMut(&C),
{
    let quarter = n / 4;
    let mut container = C::default();

    for i in 0..quarter {
        container.try_push_back(C::Item::with_key(key_for(i)))?;
        observe(&container);
    }
    for i in 0..quarter {
        container.try_push_front(C::Item::with_key(key_for(i)))?;
        observe(&container);
    }
    for _ in 0..2 * quarter {
        container.pop_back()?;
        observe(&container);
    }
    for i in 0..quarter {
        container.try_push_front(C::Item::with_key(key_for(i)))?;
        observe(&container);
    }
    for i in 0..quarter {
        container.try_push_back(C::Item::with_key(key_for(i)))?;
        observe(&container);
    }
    for _ in 0..2 * quarter {
        container.pop_front()?;
        observe(&container);
    }

    Ok(container)
}

/// Pushes `n` elements (keys `0..n`) to the back of a fresh container.
pub fn fill_back<C>(n: usize) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    fill_back_observed(n, false, |_| ())
}

/// Like [`fill_back`], after reserving room for all `n` elements.
pub fn fill_back_reserved<C>(n: usize) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    fill_back_observed(n, true, |_| ())
}

/// Pushes `n` elements (keys `0..n`) to the front of a fresh container,
/// so the container ends up holding keys `n - 1` down to `0`.
pub fn fill_front<C>(n: usize) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    fill_front_observed(n, false, |_| ())
}

/// Like [`fill_front`], after reserving room for all `n` elements.
pub fn fill_front_reserved<C>(n: usize) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    fill_front_observed(n, true, |_| ())
}

/// Preloads [`QUEUE_PRELOAD`] elements, then alternates `push_back` and
/// `pop_front` for `n` steps, starting with a push.
pub fn queue<C>(n: usize) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    queue_observed(n, |_| ())
}

/// Pushes `n / 4` elements to each end, pops all `2 * (n / 4)` from the
/// back, then does the same in mirror image.  Ends empty; when `n` is
/// not a multiple of 4, the remainder is never pushed, so nothing is
/// popped for it either.
pub fn zigzag<C>(n: usize) -> Result<C>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    zigzag_observed(n, |_| ())
}

/// Increments the key of every element, through indexed access.
pub fn traverse<C>(container: &mut C) -> Result<()>
where
    C: DoubleEnded,
    C::Item: Element,
{
    for idx in 0..container.len() {
        container.get_mut(idx)?.bump();
    }

    Ok(())
}

/// Shuffles `container` in place (Fisher-Yates), deterministically for a
/// given `seed`.
pub fn shuffle<C>(container: &mut C, seed: u64) -> Result<()>
where
    C: DoubleEnded,
    C::Item: Copy,
{
    let mut rng = StdRng::seed_from_u64(seed);
    for i in (1..container.len()).rev() {
        let j = rng.random_range(0..=i);
        container.swap(i, j)?;
    }

    Ok(())
}

/// Sorts `container` by key with an in-place Lomuto quicksort, through
/// indexed access only.
pub fn quicksort<C>(container: &mut C) -> Result<()>
where
    C: DoubleEnded,
    C::Item: Element,
{
    // Half-open ranges still to partition.
    let mut pending: SmallVec<[(usize, usize); 32]> = SmallVec::new();
    pending.push((0, container.len()));

    while let Some((lo, hi)) = pending.pop() {
        if hi - lo < 2 {
            continue;
        }

        let last = hi - 1;
        let pivot = container.get(last)?.key();
        let mut store = lo;
        for idx in lo..last {
            if container.get(idx)?.key() < pivot {
                container.swap(idx, store)?;
                store += 1;
            }
        }
        container.swap(store, last)?;

        pending.push((lo, store));
        pending.push((store + 1, hi));
    }

    Ok(())
}

/// Mean load factor over [`fill_back`], or `None` if the container
/// can't report one.
pub fn fill_back_load_factor<C>(n: usize) -> Result<Option<f64>>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    let mut meter = LoadFactorMeter::default();
    fill_back_observed::<C, _>(n, false, |c| meter.sample(c))?;
    Ok(meter.mean("fill_back"))
}

/// Mean load factor over [`fill_front`].
pub fn fill_front_load_factor<C>(n: usize) -> Result<Option<f64>>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    let mut meter = LoadFactorMeter::default();
    fill_front_observed::<C, _>(n, false, |c| meter.sample(c))?;
    Ok(meter.mean("fill_front"))
}

/// Mean load factor over the `n` steady-state steps of [`queue`]; the
/// preload is not sampled.
pub fn queue_load_factor<C>(n: usize) -> Result<Option<f64>>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    let mut meter = LoadFactorMeter::default();
    queue_observed::<C, _>(n, |c| meter.sample(c))?;
    Ok(meter.mean("queue"))
}

/// Mean load factor over every step of [`zigzag`].
pub fn zigzag_load_factor<C>(n: usize) -> Result<Option<f64>>
where
    C: DoubleEnded + Default,
    C::Item: Element,
{
    let mut meter = LoadFactorMeter::default();
    zigzag_observed::<C, _>(n, |c| meter.sample(c))?;
    Ok(meter.mean("zigzag"))
}

#[cfg(test)]
fn keys<C>(container: &C) -> Vec<i32>
where
    C: DoubleEnded,
    C::Item: Element + Clone,
{
    container
        .snapshot()
        .expect("in bounds")
        .iter()
        .map(Element::key)
        .collect()
}

#[test]
fn test_key_for_saturates_miri() {
    assert_eq!(key_for(7), 7);
    assert_eq!(key_for(i32::MAX as usize), i32::MAX);
    assert_eq!(key_for(i32::MAX as usize + 1), i32::MAX);
    assert_eq!(key_for(usize::MAX), i32::MAX);
}

#[test]
fn test_payload_miri() {
    let mut large = Large::with_key(7);
    assert_eq!(large.key(), 7);
    large.bump();
    assert_eq!(large.key(), 8);
    assert_eq!(Large::default().key(), 0);

    let mut small = 41i32;
    small.bump();
    assert_eq!(small, 42);

    assert_eq!(Payload::<0>::with_key(3).key(), 0);
}

#[test]
fn test_fill_miri() {
    use crate::DequeConservative;
    use crate::QueueNaive;

    let back: QueueNaive<Small> = fill_back(5).expect("small allocation");
    assert_eq!(keys(&back), [0, 1, 2, 3, 4]);

    let front: DequeConservative<Small> = fill_front_reserved(5).expect("small allocation");
    assert_eq!(keys(&front), [4, 3, 2, 1, 0]);

    let front: Vec<i32> = fill_front(3).expect("small allocation");
    assert_eq!(front, [2, 1, 0]);

    let back: Vec<Medium> = fill_back_reserved(3).expect("small allocation");
    assert_eq!(keys(&back), [0, 1, 2]);
}

#[test]
fn test_queue_and_zigzag() {
    use crate::DequeReclaiming;
    use crate::QueueConservative;

    let container: QueueConservative<i32> = queue(11).expect("small allocation");
    assert_eq!(container.len(), QUEUE_PRELOAD + 1);
    assert_eq!(container.front(), Some(&5));
    assert_eq!(container.back(), Some(&((QUEUE_PRELOAD + 10) as i32)));

    let container: DequeReclaiming<i32> = zigzag(40).expect("small allocation");
    assert!(container.is_empty());

    // Not a multiple of 4: the leftovers are ignored.
    let container: Vec<i32> = zigzag(7).expect("small allocation");
    assert!(container.is_empty());
}

#[test]
fn test_traverse_shuffle_sort_miri() {
    use crate::DequeNaive;

    let mut container: DequeNaive<Small> = fill_front(50).expect("small allocation");
    traverse(&mut container).expect("in bounds");
    assert_eq!(keys(&container), (1..=50).rev().collect::<Vec<_>>());

    shuffle(&mut container, 42).expect("in bounds");
    let mut shuffled = keys(&container);
    assert_ne!(shuffled, (1..=50).rev().collect::<Vec<_>>());
    shuffled.sort();
    assert_eq!(shuffled, (1..=50).collect::<Vec<_>>());

    quicksort(&mut container).expect("in bounds");
    assert_eq!(keys(&container), (1..=50).collect::<Vec<_>>());
}

#[test]
fn test_shuffle_is_deterministic_miri() {
    let mut a: Vec<i32> = fill_back(20).expect("small allocation");
    let mut b: std::collections::VecDeque<i32> = fill_back(20).expect("small allocation");

    shuffle(&mut a, 7).expect("in bounds");
    shuffle(&mut b, 7).expect("in bounds");
    assert_eq!(keys(&a), keys(&b));
}

#[test]
fn test_quicksort_duplicates_miri() {
    let mut container: Vec<i32> = vec![3, 1, 3, 0, 1, 3, 2];
    quicksort(&mut container).expect("in bounds");
    assert_eq!(container, [0, 1, 1, 2, 3, 3, 3]);

    let mut empty: Vec<i32> = Vec::new();
    quicksort(&mut empty).expect("in bounds");
    shuffle(&mut empty, 0).expect("in bounds");
}

#[test]
fn test_load_factor_means() {
    use crate::QueueNaive;
    use crate::QueueReclaiming;
    use std::collections::LinkedList;

    // Naive never keeps slack while filling.
    assert_eq!(
        fill_back_load_factor::<QueueNaive<Small>>(100).expect("small allocation"),
        Some(1.0)
    );

    let reclaiming = fill_back_load_factor::<QueueReclaiming<Small>>(100)
        .expect("small allocation")
        .expect("has a load factor");
    assert!((0.5..1.0).contains(&reclaiming));

    assert_eq!(
        queue_load_factor::<LinkedList<Small>>(10).expect("no allocation failure"),
        None
    );
    assert_eq!(
        zigzag_load_factor::<QueueReclaiming<Small>>(0).expect("nothing to do"),
        None
    );
}
