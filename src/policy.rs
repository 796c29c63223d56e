//! The `policy` module defines how a [`Region`] makes room for new
//! elements.  The same three policies drive both container topologies:
//!
//! - [`Naive`] never keeps slack: it reallocates to exactly the size it
//!   needs, and removals from the start shift the remaining elements down.
//! - [`Reclaiming`] doubles on overflow and reuses the slots vacated by
//!   removals from the start; live data only moves while reallocating.
//! - [`Conservative`] also reuses vacated slots, but only doubles once the
//!   region is sufficiently full; until then, it shifts the live range
//!   inside the existing buffer.
//!
//! Policies are plain values stored in each container, so a
//! [`Conservative`] threshold can be tuned per container.
//!
//! An empty region is all slack, so [`Reclaiming`] and [`Conservative`]
//! satisfy an overflow on an empty region by moving its (empty) live
//! range to the opposite end of the buffer, without allocating.
//!
//! Growth at one end never takes slack away from the other end: a
//! reallocation adds all its new slots on the overflowing side and keeps
//! the gap on the opposite side, and an in-place shift splits the free
//! slots between both sides.  Pushes that alternate between the two ends
//! thus stay amortised O(1).
use std::fmt::Debug;

use crate::error::DequeError;
use crate::error::Result;
use crate::region::Extent;
use crate::region::Region;
use crate::DEFAULT_LOAD_FACTOR_THRESHOLD;

/// A [`GrowthPolicy`] decides, for one region, whether an overflow is
/// resolved by reallocating (and to what capacity), or by shifting the
/// live range in place.
///
/// After `grow_end` returns `Ok`, the region has at least one free slot
/// after its live range.  After `grow_start` returns `Ok`, the region
/// has a free slot before its live range, or (for policies that never
/// keep leading slack) a free slot after it, so the container may shift
/// everything up by one.
pub trait GrowthPolicy: Clone + Debug + Default {
    /// Short human-readable name, for logs and bench labels.
    const NAME: &'static str;

    /// Makes room for one push after the live range.
    fn grow_end<T: Copy + Default>(&self, region: &mut Region<T>) -> Result<()>;

    /// Makes room for one push before the live range.
    fn grow_start<T: Copy + Default>(&self, region: &mut Region<T>) -> Result<()>;

    /// Removes the first live element of `region`, if any.
    fn release_start<T: Copy + Default>(&self, region: &mut Region<T>) -> Option<T>;

    /// Makes room for `additional` pushes after the live range.  No-op
    /// when the room is already there.
    fn reserve_end<T: Copy + Default>(&self, region: &mut Region<T>, additional: usize)
        -> Result<()>;

    /// Makes room for `additional` pushes before the live range.  No-op
    /// when the room is already there.
    fn reserve_start<T: Copy + Default>(
        &self,
        region: &mut Region<T>,
        additional: usize,
    ) -> Result<()>;
}

/// Returns twice `capacity`, or an allocation failure on overflow.
#[inline(always)]
fn doubled(capacity: usize) -> Result<usize> {
    capacity
        .checked_mul(2)
        .ok_or(DequeError::AllocationFailed {
            capacity: usize::MAX,
        })
}

/// Returns the capacity needed to hold `additional` more elements.
#[inline(always)]
fn required(extent: Extent, additional: usize) -> Result<usize> {
    extent
        .size
        .checked_add(additional)
        .ok_or(DequeError::AllocationFailed {
            capacity: usize::MAX,
        })
}

/// Reallocates `region` to `capacity`, with the new slots after the
/// live range; the leading gap is kept.
#[inline(always)]
fn reallocate_keeping_leading<T: Copy + Default>(
    region: &mut Region<T>,
    capacity: usize,
) -> Result<()> {
    let offset = region.offset();
    region.reallocate(capacity, offset)
}

/// Reallocates `region` to `capacity`, with the new slots before the
/// live range; the trailing gap is kept.
#[inline(always)]
fn reallocate_keeping_trailing<T: Copy + Default>(
    region: &mut Region<T>,
    capacity: usize,
) -> Result<()> {
    let offset = capacity - region.trailing() - region.size();
    region.reallocate(capacity, offset)
}

/// Reallocates to exactly the required size, keeps no slack, and never
/// leaves a gap before the live range.
///
/// Front pushes on a region with free trailing slots are handled by
/// shifting everything up one slot, and front removals shift everything
/// down one slot, so the offset stays at 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Naive;

impl GrowthPolicy for Naive {
    const NAME: &'static str = "naive";

    fn grow_end<T: Copy + Default>(&self, region: &mut Region<T>) -> Result<()> {
        if region.trailing() > 0 {
            return Ok(());
        }

        let capacity = required(region.extent(), 1)?;
        region.reallocate(capacity, 0)
    }

    fn grow_start<T: Copy + Default>(&self, region: &mut Region<T>) -> Result<()> {
        // Any free slot will do: the container shifts the live range up.
        if region.leading() > 0 || region.trailing() > 0 {
            return Ok(());
        }

        let capacity = required(region.extent(), 1)?;
        region.reallocate(capacity, 0)
    }

    fn release_start<T: Copy + Default>(&self, region: &mut Region<T>) -> Option<T> {
        region.pop_start_shifting()
    }

    fn reserve_end<T: Copy + Default>(
        &self,
        region: &mut Region<T>,
        additional: usize,
    ) -> Result<()> {
        if region.trailing() >= additional {
            return Ok(());
        }

        let capacity = required(region.extent(), additional)?;
        region.reallocate(capacity, 0)
    }

    fn reserve_start<T: Copy + Default>(
        &self,
        region: &mut Region<T>,
        additional: usize,
    ) -> Result<()> {
        // Front pushes shift into trailing slots, so any free slot counts.
        if region.leading() + region.trailing() >= additional {
            return Ok(());
        }

        let capacity = required(region.extent(), additional)?;
        region.reallocate(capacity, 0)
    }
}

/// Doubles on overflow, and reuses the slack left behind by removals at
/// the start of the region.  A doubling puts all the new slots on the
/// overflowing side.  Capacity is never given back.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reclaiming;

impl GrowthPolicy for Reclaiming {
    const NAME: &'static str = "reclaiming";

    fn grow_end<T: Copy + Default>(&self, region: &mut Region<T>) -> Result<()> {
        if region.trailing() > 0 {
            return Ok(());
        }

        if region.is_empty() {
            region.move_empty_to(0);
            return Ok(());
        }

        let capacity = doubled(region.capacity())?;
        reallocate_keeping_leading(region, capacity)
    }

    fn grow_start<T: Copy + Default>(&self, region: &mut Region<T>) -> Result<()> {
        if region.leading() > 0 {
            return Ok(());
        }

        if region.is_empty() {
            region.move_empty_to(region.capacity());
            return Ok(());
        }

        let capacity = doubled(region.capacity())?;
        reallocate_keeping_trailing(region, capacity)
    }

    fn release_start<T: Copy + Default>(&self, region: &mut Region<T>) -> Option<T> {
        region.pop_start()
    }

    fn reserve_end<T: Copy + Default>(
        &self,
        region: &mut Region<T>,
        additional: usize,
    ) -> Result<()> {
        if region.trailing() >= additional {
            return Ok(());
        }

        if region.is_empty() {
            region.move_empty_to(0);
            if region.trailing() >= additional {
                return Ok(());
            }
        }

        let needed = required(region.extent(), additional)?
            .checked_add(region.leading())
            .ok_or(DequeError::AllocationFailed {
                capacity: usize::MAX,
            })?;
        let capacity = doubled(region.capacity())?.max(needed);
        reallocate_keeping_leading(region, capacity)
    }

    fn reserve_start<T: Copy + Default>(
        &self,
        region: &mut Region<T>,
        additional: usize,
    ) -> Result<()> {
        if region.leading() >= additional {
            return Ok(());
        }

        if region.is_empty() {
            region.move_empty_to(region.capacity());
            if region.leading() >= additional {
                return Ok(());
            }
        }

        let needed = required(region.extent(), additional)?
            .checked_add(region.trailing())
            .ok_or(DequeError::AllocationFailed {
                capacity: usize::MAX,
            })?;
        let capacity = doubled(region.capacity())?.max(needed);
        reallocate_keeping_trailing(region, capacity)
    }
}

/// Which side of the threshold triggers doubling.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Boundary {
    /// Double when `load_factor >= threshold`.
    #[default]
    Inclusive,
    /// Double when `load_factor > threshold`.
    Exclusive,
}

/// Reuses vacated slack like [`Reclaiming`], but on overflow only
/// doubles when the region is at least `threshold` full.  Emptier
/// regions recentre their live range in place instead, so that both
/// ends get half of the free slots.  Reservations shift as little as
/// they can, or allocate exactly what they need.
#[derive(Clone, Copy, Debug)]
pub struct Conservative {
    threshold: f64,
    boundary: Boundary,
}

impl Default for Conservative {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_FACTOR_THRESHOLD, Boundary::Inclusive)
    }
}

impl Conservative {
    /// Creates a policy that doubles once the load factor reaches
    /// `threshold` (inclusively or not, according to `boundary`).
    ///
    /// Panics if `threshold` is not finite.
    pub fn new(threshold: f64, boundary: Boundary) -> Self {
        assert!(
            threshold.is_finite(),
            "load factor threshold must be finite. threshold={}",
            threshold
        );

        Self {
            threshold,
            boundary,
        }
    }

    #[inline(always)]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline(always)]
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Determines whether an overflowing region with this extent should
    /// double rather than shift.  A completely full region has nowhere to
    /// shift to, so it always doubles.
    #[inline(always)]
    pub fn should_double(&self, extent: Extent) -> bool {
        if extent.size == extent.capacity {
            return true;
        }

        let load = extent.load_factor();
        match self.boundary {
            Boundary::Inclusive => load >= self.threshold,
            Boundary::Exclusive => load > self.threshold,
        }
    }
}

impl GrowthPolicy for Conservative {
    const NAME: &'static str = "conservative";

    fn grow_end<T: Copy + Default>(&self, region: &mut Region<T>) -> Result<()> {
        if region.trailing() > 0 {
            return Ok(());
        }

        if region.is_empty() {
            region.move_empty_to(0);
            return Ok(());
        }

        if self.should_double(region.extent()) {
            let capacity = doubled(region.capacity())?;
            reallocate_keeping_leading(region, capacity)
        } else {
            // Round down: at least one free slot ends up trailing.
            let free = region.capacity() - region.size();
            region.shift_to(free / 2);
            Ok(())
        }
    }

    fn grow_start<T: Copy + Default>(&self, region: &mut Region<T>) -> Result<()> {
        if region.leading() > 0 {
            return Ok(());
        }

        if region.is_empty() {
            region.move_empty_to(region.capacity());
            return Ok(());
        }

        if self.should_double(region.extent()) {
            let capacity = doubled(region.capacity())?;
            reallocate_keeping_trailing(region, capacity)
        } else {
            // Round up: at least one free slot ends up leading.
            let free = region.capacity() - region.size();
            region.shift_to(free - free / 2);
            Ok(())
        }
    }

    fn release_start<T: Copy + Default>(&self, region: &mut Region<T>) -> Option<T> {
        region.pop_start()
    }

    fn reserve_end<T: Copy + Default>(
        &self,
        region: &mut Region<T>,
        additional: usize,
    ) -> Result<()> {
        if region.trailing() >= additional {
            return Ok(());
        }

        let capacity = required(region.extent(), additional)?;
        if capacity <= region.capacity() {
            region.shift_to(region.capacity() - capacity);
            Ok(())
        } else {
            region.reallocate(capacity, 0)
        }
    }

    fn reserve_start<T: Copy + Default>(
        &self,
        region: &mut Region<T>,
        additional: usize,
    ) -> Result<()> {
        if region.leading() >= additional {
            return Ok(());
        }

        let capacity = required(region.extent(), additional)?;
        if capacity <= region.capacity() {
            region.shift_to(additional);
            Ok(())
        } else {
            region.reallocate(capacity, additional)
        }
    }
}

#[cfg(test)]
fn filled_region(capacity: usize, offset: usize, values: &[u32]) -> Region<u32> {
    let mut region = Region::new();
    region.reallocate(capacity, offset).expect("small allocation");
    for value in values {
        region.push_end(*value);
    }
    region
}

#[test]
fn test_naive_grows_exactly_miri() {
    let mut region = Region::<u32>::new();

    for i in 0..5u32 {
        Naive.grow_end(&mut region).expect("small allocation");
        region.push_end(i);
        assert_eq!(region.capacity(), (i + 1) as usize);
        assert_eq!(region.load_factor(), 1.0);
    }

    assert_eq!(region.live(), &[0, 1, 2, 3, 4]);
    // Every push after the first reallocates and copies everything.
    assert_eq!(region.copied_elements(), 1 + 2 + 3 + 4);

    assert_eq!(Naive.release_start(&mut region), Some(0));
    assert_eq!(region.offset(), 0);
    assert_eq!(region.live(), &[1, 2, 3, 4]);
}

#[test]
fn test_naive_reserve_miri() {
    let mut region = filled_region(2, 0, &[1, 2]);

    Naive.reserve_end(&mut region, 3).expect("small allocation");
    assert_eq!(region.capacity(), 5);
    assert_eq!(region.live(), &[1, 2]);

    let copied = region.copied_elements();
    Naive.reserve_end(&mut region, 3).expect("no-op");
    Naive.reserve_start(&mut region, 3).expect("no-op");
    assert_eq!(region.capacity(), 5);
    assert_eq!(region.copied_elements(), copied);

    Naive.reserve_start(&mut region, 4).expect("small allocation");
    assert_eq!(region.capacity(), 6);
    assert_eq!(region.offset(), 0);
}

#[test]
fn test_reclaiming_doubles_miri() {
    let mut region = Region::<u32>::new();

    for i in 0..9u32 {
        Reclaiming.grow_end(&mut region).expect("small allocation");
        region.push_end(i);
    }

    assert_eq!(region.capacity(), 16);
    assert_eq!(region.copied_elements(), 1 + 2 + 4 + 8);

    // Popping the start leaves slack behind, which grow_start reuses.
    assert_eq!(Reclaiming.release_start(&mut region), Some(0));
    assert_eq!(region.leading(), 1);
    Reclaiming.grow_start(&mut region).expect("no-op");
    region.push_start(42);
    assert_eq!(region.capacity(), 16);
    assert_eq!(region.live()[0], 42);
    assert_eq!(region.copied_elements(), 15);
}

#[test]
fn test_reclaiming_grow_start_keeps_trailing_slack_miri() {
    let mut region = filled_region(4, 0, &[1, 2, 3]);

    Reclaiming.grow_start(&mut region).expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 8, size: 3, offset: 4 });
    assert_eq!(region.trailing(), 1);
    assert_eq!(region.live(), &[1, 2, 3]);

    // And the other way around: grow_end keeps the leading gap.
    let mut region = filled_region(4, 1, &[1, 2, 3]);
    Reclaiming.grow_end(&mut region).expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 8, size: 3, offset: 1 });
}

#[cfg(test)]
fn alternate_ends<P: GrowthPolicy>(policy: &P, pushes: usize) -> Region<u32> {
    let mut region = Region::new();

    for i in 0..pushes {
        if i % 2 == 0 {
            policy.grow_end(&mut region).expect("small allocation");
            region.push_end(i as u32);
        } else {
            policy.grow_start(&mut region).expect("small allocation");
            region.push_start(i as u32);
        }

        assert!(
            region.capacity() <= 4 * region.size(),
            "capacity={} size={}",
            region.capacity(),
            region.size()
        );
    }

    region
}

#[test]
fn test_alternating_ends_stay_linear() {
    for pushes in [1, 2, 3, 10, 100, 4000] {
        let reclaiming = alternate_ends(&Reclaiming, pushes);
        assert!(reclaiming.copied_elements() <= 2 * pushes);

        let conservative = alternate_ends(&Conservative::default(), pushes);
        assert!(conservative.copied_elements() <= 2 * pushes);

        // Recentres more often before doubling.
        let lenient = alternate_ends(&Conservative::new(0.75, Boundary::Exclusive), pushes);
        assert!(lenient.copied_elements() <= 4 * pushes);
    }
}

#[test]
fn test_conservative_sparse_alternation_stays_linear() {
    let policy = Conservative::default();
    let mut region = Region::<u32>::new();
    for i in 0..64 {
        policy.grow_end(&mut region).expect("small allocation");
        region.push_end(i);
    }
    // A quarter full, with all the slack at the start.
    for _ in 0..48 {
        policy.release_start(&mut region).expect("non-empty");
    }

    let copied = region.copied_elements();
    let steps = 1000u32;
    for i in 0..steps {
        // Drift towards the end, then back towards the start.
        if i < steps / 2 {
            policy.grow_end(&mut region).expect("no allocation");
            region.push_end(i);
            policy.release_start(&mut region).expect("non-empty");
        } else {
            policy.grow_start(&mut region).expect("no allocation");
            region.push_start(i);
            region.pop_end().expect("non-empty");
        }
    }

    // Each recentring copies 16 elements and leaves 24 free slots on
    // each side.
    assert_eq!(region.capacity(), 64);
    assert_eq!(region.size(), 16);
    assert!(region.copied_elements() - copied <= steps as usize);
}

#[test]
fn test_reclaiming_reserve_miri() {
    let mut region = filled_region(4, 1, &[1, 2]);

    // Already room for one at the end.
    Reclaiming.reserve_end(&mut region, 1).expect("no-op");
    assert_eq!(region.extent(), Extent { capacity: 4, size: 2, offset: 1 });

    // Doubling is enough for 3, and the leading slot stays.
    Reclaiming.reserve_end(&mut region, 3).expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 8, size: 2, offset: 1 });

    // But not for 20: 20 in front, 2 live, 5 trailing.
    Reclaiming.reserve_start(&mut region, 20).expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 27, size: 2, offset: 20 });
    assert_eq!(region.trailing(), 5);
    assert_eq!(region.live(), &[1, 2]);
}

#[test]
fn test_reclaiming_reserve_repositions_empty_region_miri() {
    let mut region = filled_region(4, 0, &[]);
    region.move_empty_to(4);

    Reclaiming.reserve_end(&mut region, 4).expect("no allocation");
    assert_eq!(region.extent(), Extent { capacity: 4, size: 0, offset: 0 });

    Reclaiming.reserve_start(&mut region, 3).expect("no allocation");
    assert_eq!(region.extent(), Extent { capacity: 4, size: 0, offset: 4 });

    // Too small even when empty.
    Reclaiming.reserve_end(&mut region, 5).expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 8, size: 0, offset: 0 });
    assert_eq!(region.copied_elements(), 0);
}

#[test]
fn test_conservative_shifts_when_sparse_miri() {
    // capacity 8, 3 live at the very end: load 0.375 < 0.5, recentre.
    let mut region = filled_region(8, 5, &[1, 2, 3]);

    Conservative::default()
        .grow_end(&mut region)
        .expect("no allocation");
    assert_eq!(region.extent(), Extent { capacity: 8, size: 3, offset: 2 });
    assert_eq!(region.trailing(), 3);
    assert_eq!(region.live(), &[1, 2, 3]);
}

#[test]
fn test_conservative_doubles_when_dense_miri() {
    // capacity 8, 5 live at the end: load 0.625 >= 0.5, double.
    let mut region = filled_region(8, 3, &[1, 2, 3, 4, 5]);

    Conservative::default()
        .grow_end(&mut region)
        .expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 16, size: 5, offset: 3 });
    assert_eq!(region.live(), &[1, 2, 3, 4, 5]);
}

#[test]
fn test_conservative_boundary_miri() {
    let half = Extent {
        capacity: 8,
        size: 4,
        offset: 4,
    };

    assert!(Conservative::new(0.5, Boundary::Inclusive).should_double(half));
    assert!(!Conservative::new(0.5, Boundary::Exclusive).should_double(half));
    assert!(Conservative::new(0.4, Boundary::Exclusive).should_double(half));
    assert!(!Conservative::new(0.75, Boundary::Inclusive).should_double(half));

    // Full regions always double, whatever the threshold.
    let full = Extent {
        capacity: 4,
        size: 4,
        offset: 0,
    };
    assert!(Conservative::new(2.0, Boundary::Exclusive).should_double(full));
}

#[test]
fn test_conservative_grow_start_miri() {
    let mut region = filled_region(8, 0, &[1, 2, 3]);

    Conservative::default()
        .grow_start(&mut region)
        .expect("no allocation");
    assert_eq!(region.extent(), Extent { capacity: 8, size: 3, offset: 3 });

    let mut region = filled_region(4, 0, &[1, 2, 3]);
    Conservative::default()
        .grow_start(&mut region)
        .expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 8, size: 3, offset: 4 });
    assert_eq!(region.live(), &[1, 2, 3]);
}

#[test]
fn test_conservative_reserve_is_exact_miri() {
    let mut region = filled_region(8, 6, &[1, 2]);

    // Fits after the smallest shift that frees 5 trailing slots.
    Conservative::default()
        .reserve_end(&mut region, 5)
        .expect("no allocation");
    assert_eq!(region.extent(), Extent { capacity: 8, size: 2, offset: 1 });

    Conservative::default()
        .reserve_end(&mut region, 10)
        .expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 12, size: 2, offset: 0 });

    Conservative::default()
        .reserve_start(&mut region, 10)
        .expect("no allocation");
    assert_eq!(region.extent(), Extent { capacity: 12, size: 2, offset: 10 });

    Conservative::default()
        .reserve_start(&mut region, 11)
        .expect("small allocation");
    assert_eq!(region.extent(), Extent { capacity: 13, size: 2, offset: 11 });
    assert_eq!(region.live(), &[1, 2]);
}

#[test]
#[should_panic(expected = "threshold must be finite")]
fn test_conservative_rejects_nan_miri() {
    let _ = Conservative::new(f64::NAN, Boundary::Inclusive);
}

#[test]
fn test_empty_region_repositions_miri() {
    let mut region = filled_region(4, 0, &[]);
    region.move_empty_to(4);

    Reclaiming.grow_end(&mut region).expect("no allocation");
    assert_eq!(region.extent(), Extent { capacity: 4, size: 0, offset: 0 });

    Conservative::new(0.0, Boundary::Inclusive)
        .grow_start(&mut region)
        .expect("no allocation");
    assert_eq!(region.extent(), Extent { capacity: 4, size: 0, offset: 4 });
    assert_eq!(region.copied_elements(), 0);
}

#[test]
fn test_doubling_overflow_miri() {
    assert_eq!(doubled(3), Ok(6));
    assert_eq!(
        doubled(usize::MAX / 2 + 1),
        Err(DequeError::AllocationFailed {
            capacity: usize::MAX
        })
    );
}
