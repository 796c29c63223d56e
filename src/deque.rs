//! The `deque` module defines the double-buffer topology, [`Deque`].
//!
//! A [`Deque`] splits its logical sequence at some point and stores each
//! half in its own [`Region`]:
//!
//! - the back region holds the elements after the split, in order, so
//!   `push_back` appends to it;
//! - the front region holds the elements before the split in *reverse*
//!   physical order, so `push_front` also appends to its region.
//!
//! The growth policy is applied to each region independently, and the two
//! buffers never copy into one another.  When one side runs empty, pops
//! continue from the far end of the other side's region, leaving slack
//! before that region's live range; pushes to the empty side reclaim that
//! slack before touching their own buffer.
//!
//! ```text
//!  front region (reversed)      back region
//!  | |x|x|x| |                  x|x| | |
//!     ^     ^                   ^
//!   j = 0   split (j = Sf - 1)  j = Sf
//! ```
use crate::contract::DoubleEnded;
use crate::error::DequeError;
use crate::error::End;
use crate::error::Result;
use crate::policy::Conservative;
use crate::policy::GrowthPolicy;
use crate::policy::Naive;
use crate::policy::Reclaiming;
use crate::region::Extent;
use crate::region::Region;

/// A physical position in one of the two regions of a [`Deque`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    Front(usize),
    Back(usize),
}

/// Translates logical `index` to a physical [`Slot`], given the extents
/// of the front and back regions, or returns `None` if `index` is past
/// the end of the sequence.
///
/// The first `front.size` logical elements live in the front region,
/// last-pushed (i.e., logically first) at the top of its live range.
#[inline(always)]
pub fn locate(front: Extent, back: Extent, index: usize) -> Option<Slot> {
    if index < front.size {
        return Some(Slot::Front((front.size - index) + front.offset - 1));
    }

    let back_index = index - front.size;
    if back_index < back.size {
        Some(Slot::Back(back_index + back.offset))
    } else {
        None
    }
}

/// A double-ended queue backed by two buffers, one per end, each grown
/// according to the growth policy `P`.
#[derive(Clone, Debug)]
pub struct Deque<T, P = Reclaiming> {
    front: Region<T>,
    back: Region<T>,
    policy: P,
}

/// A [`Deque`] that reallocates each side to exactly the size it needs.
pub type DequeNaive<T> = Deque<T, Naive>;

/// A [`Deque`] that doubles each side and reuses popped slots.
pub type DequeReclaiming<T> = Deque<T, Reclaiming>;

/// A [`Deque`] whose sides shift in place until dense enough to double.
pub type DequeConservative<T> = Deque<T, Conservative>;

impl<T: Copy + Default, P: GrowthPolicy> Default for Deque<T, P> {
    fn default() -> Self {
        Self::with_policy(P::default())
    }
}

impl<T: Copy + Default, P: GrowthPolicy> Deque<T, P> {
    /// Creates an empty [`Deque`] with the default policy.
    #[inline(always)]
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty [`Deque`] whose regions grow according to
    /// `policy`.
    pub fn with_policy(policy: P) -> Self {
        Deque {
            front: Region::new(),
            back: Region::new(),
            policy,
        }
    }

    #[inline(always)]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.front.size() + self.back.size()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total capacity over both regions.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.front.capacity() + self.back.capacity()
    }

    #[inline(always)]
    pub fn front_extent(&self) -> Extent {
        self.front.extent()
    }

    #[inline(always)]
    pub fn back_extent(&self) -> Extent {
        self.back.extent()
    }

    /// Live elements over allocated slots, summed over both regions.
    #[inline(always)]
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Number of elements moved by reallocations and shifts so far, in
    /// both regions.
    #[inline(always)]
    pub fn copied_elements(&self) -> usize {
        self.front.copied_elements() + self.back.copied_elements()
    }

    /// Pushes `value` to the back of the [`Deque`], or returns an error
    /// if growing the back region failed.
    pub fn try_push_back(&mut self, value: T) -> Result<()> {
        if self.back.is_empty() {
            // The back of the sequence is the bottom of the front region:
            // reclaim slack left there by `pop_back` before growing.
            if self.front.leading() > 0 {
                self.front.push_start(value);
                self.check_rep();
                return Ok(());
            }

            self.back.move_empty_to(0);
        }

        self.policy.grow_end(&mut self.back)?;
        self.back.push_end(value);
        self.check_rep();
        Ok(())
    }

    /// Pushes `value` to the front of the [`Deque`], or returns an error
    /// if growing the front region failed.
    pub fn try_push_front(&mut self, value: T) -> Result<()> {
        if self.front.is_empty() {
            if self.back.leading() > 0 {
                self.back.push_start(value);
                self.check_rep();
                return Ok(());
            }

            self.front.move_empty_to(0);
        }

        self.policy.grow_end(&mut self.front)?;
        self.front.push_end(value);
        self.check_rep();
        Ok(())
    }

    /// Pushes `value` to the back of the [`Deque`].
    ///
    /// Panics if the back region cannot grow.
    #[inline(always)]
    pub fn push_back(&mut self, value: T) {
        if let Err(e) = self.try_push_back(value) {
            panic!("{}", e);
        }
    }

    /// Pushes `value` to the front of the [`Deque`].
    ///
    /// Panics if the front region cannot grow.
    #[inline(always)]
    pub fn push_front(&mut self, value: T) {
        if let Err(e) = self.try_push_front(value) {
            panic!("{}", e);
        }
    }

    /// Consumes and returns the last element in the [`Deque`].
    pub fn pop_back(&mut self) -> Result<T> {
        let ret = match self.back.pop_end() {
            Some(ret) => ret,
            None => self
                .policy
                .release_start(&mut self.front)
                .ok_or(DequeError::Underflow { end: End::Back })?,
        };

        self.check_rep();
        Ok(ret)
    }

    /// Consumes and returns the first element in the [`Deque`].
    pub fn pop_front(&mut self) -> Result<T> {
        let ret = match self.front.pop_end() {
            Some(ret) => ret,
            None => self
                .policy
                .release_start(&mut self.back)
                .ok_or(DequeError::Underflow { end: End::Front })?,
        };

        self.check_rep();
        Ok(ret)
    }

    #[inline(always)]
    fn locate(&self, index: usize) -> Result<Slot> {
        locate(self.front.extent(), self.back.extent(), index).ok_or(
            DequeError::IndexOutOfBounds {
                index,
                len: self.len(),
            },
        )
    }

    /// Returns a reference to the element at logical position `index`.
    #[inline(always)]
    pub fn get(&self, index: usize) -> Result<&T> {
        Ok(match self.locate(index)? {
            Slot::Front(slot) => self.front.slot(slot),
            Slot::Back(slot) => self.back.slot(slot),
        })
    }

    /// Returns a mutable reference to the element at logical position
    /// `index`.
    #[inline(always)]
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        Ok(match self.locate(index)? {
            Slot::Front(slot) => self.front.slot_mut(slot),
            Slot::Back(slot) => self.back.slot_mut(slot),
        })
    }

    /// Returns a reference to the first element, if any.
    #[inline(always)]
    pub fn front(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Returns a reference to the last element, if any.
    #[inline(always)]
    pub fn back(&self) -> Option<&T> {
        self.get(self.len().checked_sub(1)?).ok()
    }

    /// Ensures the back region can absorb the next `additional` calls to
    /// `push_back` without reallocating.  Does nothing if there is
    /// already room.
    pub fn reserve_back(&mut self, additional: usize) -> Result<()> {
        self.policy.reserve_end(&mut self.back, additional)?;
        self.check_rep();
        Ok(())
    }

    /// Ensures the front region can absorb the next `additional` calls
    /// to `push_front` without reallocating.  Does nothing if there is
    /// already room.
    pub fn reserve_front(&mut self, additional: usize) -> Result<()> {
        self.policy.reserve_end(&mut self.front, additional)?;
        self.check_rep();
        Ok(())
    }

    /// Draws both regions' occupancy: the front region in reverse, a `:`
    /// at the split, then the back region.  For debugging only.
    pub fn render_occupancy(&self) -> String {
        format!(
            "|{}:{}|",
            self.front.render_reversed(),
            self.back.render_forward()
        )
    }

    #[inline(always)]
    #[cfg_attr(test, mutants::skip)] // obviously, removing checks will not be detected.
    fn check_rep(&self) {
        self.front.check_rep();
        self.back.check_rep();
        debug_assert!((0.0..=1.0).contains(&self.load_factor()));
    }
}

impl<T: Copy + Default, P: GrowthPolicy> std::ops::Index<usize> for Deque<T, P> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T: Copy + Default, P: GrowthPolicy> std::ops::IndexMut<usize> for Deque<T, P> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T: Copy + Default, P: GrowthPolicy> DoubleEnded for Deque<T, P> {
    type Item = T;

    #[inline(always)]
    fn len(&self) -> usize {
        Deque::len(self)
    }

    #[inline(always)]
    fn try_push_back(&mut self, value: T) -> Result<()> {
        Deque::try_push_back(self, value)
    }

    #[inline(always)]
    fn try_push_front(&mut self, value: T) -> Result<()> {
        Deque::try_push_front(self, value)
    }

    #[inline(always)]
    fn pop_back(&mut self) -> Result<T> {
        Deque::pop_back(self)
    }

    #[inline(always)]
    fn pop_front(&mut self) -> Result<T> {
        Deque::pop_front(self)
    }

    #[inline(always)]
    fn get(&self, index: usize) -> Result<&T> {
        Deque::get(self, index)
    }

    #[inline(always)]
    fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        Deque::get_mut(self, index)
    }

    #[inline(always)]
    fn load_factor(&self) -> Option<f64> {
        Some(Deque::load_factor(self))
    }

    #[inline(always)]
    fn reserve_back(&mut self, additional: usize) -> Result<()> {
        Deque::reserve_back(self, additional)
    }

    #[inline(always)]
    fn reserve_front(&mut self, additional: usize) -> Result<()> {
        Deque::reserve_front(self, additional)
    }
}

#[test]
fn test_locate_exhaustive_miri() {
    use itertools::iproduct;

    let extents = || {
        iproduct!(1..5usize, 0..5usize, 0..5usize)
            .filter(|(capacity, size, offset)| offset + size <= *capacity)
            .map(|(capacity, size, offset)| Extent {
                capacity,
                size,
                offset,
            })
    };

    for (front, back) in iproduct!(extents(), extents()) {
        let len = front.size + back.size;
        let mut seen_front = Vec::new();
        let mut seen_back = Vec::new();

        for index in 0..len + 2 {
            match locate(front, back, index) {
                Some(Slot::Front(slot)) => {
                    assert!(index < front.size);
                    assert!(slot >= front.offset && slot < front.offset + front.size);
                    seen_front.push(slot);
                }
                Some(Slot::Back(slot)) => {
                    assert!(index >= front.size && index < len);
                    assert!(slot >= back.offset && slot < back.offset + back.size);
                    seen_back.push(slot);
                }
                None => assert!(index >= len),
            }
        }

        // The front region is walked top-down, the back region bottom-up,
        // and every live slot is hit exactly once.
        assert_eq!(
            seen_front,
            (front.offset..front.offset + front.size)
                .rev()
                .collect::<Vec<_>>()
        );
        assert_eq!(
            seen_back,
            (back.offset..back.offset + back.size).collect::<Vec<_>>()
        );
    }
}

#[test]
fn test_locate_examples_miri() {
    let front = Extent {
        capacity: 4,
        size: 2,
        offset: 1,
    };
    let back = Extent {
        capacity: 4,
        size: 3,
        offset: 1,
    };

    assert_eq!(locate(front, back, 0), Some(Slot::Front(2)));
    assert_eq!(locate(front, back, 1), Some(Slot::Front(1)));
    assert_eq!(locate(front, back, 2), Some(Slot::Back(1)));
    assert_eq!(locate(front, back, 4), Some(Slot::Back(3)));
    assert_eq!(locate(front, back, 5), None);
}

#[cfg(test)]
fn check_scenario<P: GrowthPolicy>() {
    let mut deque = Deque::<u32, P>::new();

    deque.push_back(1);
    deque.push_back(2);
    deque.push_front(0);
    assert_eq!(deque.snapshot(), Ok(vec![0, 1, 2]));

    assert_eq!(deque.pop_front(), Ok(0));
    assert_eq!(deque.snapshot(), Ok(vec![1, 2]));

    deque.push_front(9);
    deque.push_front(8);
    assert_eq!(deque.len(), 4);
    assert_eq!(deque[0], 8);
    assert_eq!(deque[1], 9);
    assert_eq!(deque[2], 1);
    assert_eq!(deque[3], 2);
    assert_eq!(deque.front(), Some(&8));
    assert_eq!(deque.back(), Some(&2));
}

#[test]
fn test_scenario_naive_miri() {
    check_scenario::<Naive>();
}

#[test]
fn test_scenario_reclaiming_miri() {
    check_scenario::<Reclaiming>();
}

#[test]
fn test_scenario_conservative_miri() {
    check_scenario::<Conservative>();
}

#[test]
fn test_empty_errors_miri() {
    let mut deque = DequeConservative::<u32>::new();

    assert!(deque.is_empty());
    assert_eq!(deque.load_factor(), 0.0);
    assert_eq!(
        deque.pop_back(),
        Err(DequeError::Underflow { end: End::Back })
    );
    assert_eq!(
        deque.pop_front(),
        Err(DequeError::Underflow { end: End::Front })
    );
    assert_eq!(
        deque.get(0),
        Err(DequeError::IndexOutOfBounds { index: 0, len: 0 })
    );

    deque.push_front(3);
    assert_eq!(
        deque.get(1),
        Err(DequeError::IndexOutOfBounds { index: 1, len: 1 })
    );
    assert_eq!(deque.pop_back(), Ok(3));
    assert!(deque.is_empty());
}

#[test]
fn test_pop_crosses_sides_miri() {
    let mut deque = DequeReclaiming::<u32>::new();

    for i in 0..4 {
        deque.push_front(i);
    }
    assert_eq!(deque.snapshot(), Ok(vec![3, 2, 1, 0]));
    assert_eq!(deque.back_extent().size, 0);

    // The back region is empty, so pop_back eats the bottom of the front
    // region and leaves slack there.
    assert_eq!(deque.pop_back(), Ok(0));
    assert_eq!(deque.pop_back(), Ok(1));
    assert_eq!(
        deque.front_extent(),
        Extent {
            capacity: 4,
            size: 2,
            offset: 2
        }
    );

    // push_back reclaims that slack instead of using the back region.
    let copied = deque.copied_elements();
    deque.push_back(10);
    assert_eq!(deque.front_extent().offset, 1);
    assert_eq!(deque.back_extent().size, 0);
    assert_eq!(deque.copied_elements(), copied);
    assert_eq!(deque.snapshot(), Ok(vec![3, 2, 10]));

    deque.push_back(11);
    deque.push_back(12);
    assert_eq!(deque.front_extent().offset, 0);
    assert_eq!(deque.back_extent().size, 1);
    assert_eq!(deque.snapshot(), Ok(vec![3, 2, 10, 11, 12]));
    assert_eq!(deque[4], 12);
}

#[test]
fn test_naive_cross_pop_shifts_miri() {
    let mut deque = DequeNaive::<u32>::new();

    for i in 0..3 {
        deque.push_back(i);
    }
    assert_eq!(
        deque.back_extent(),
        Extent {
            capacity: 3,
            size: 3,
            offset: 0
        }
    );

    assert_eq!(deque.pop_front(), Ok(0));
    assert_eq!(
        deque.back_extent(),
        Extent {
            capacity: 3,
            size: 2,
            offset: 0
        }
    );

    // No slack to reclaim: front pushes go to the front region.
    deque.push_front(7);
    assert_eq!(deque.front_extent().size, 1);
    assert_eq!(deque.snapshot(), Ok(vec![7, 1, 2]));
}

#[test]
fn test_conservative_side_shifts_miri() {
    let mut deque = DequeConservative::<u32>::new();

    for i in 0..4 {
        deque.push_back(i);
    }
    assert_eq!(deque.back_extent().capacity, 4);

    // Drain the (empty) front side's neighbour from below.
    assert_eq!(deque.pop_front(), Ok(0));
    assert_eq!(deque.pop_front(), Ok(1));
    assert_eq!(deque.pop_front(), Ok(2));

    // Sparse back region: recentre in place rather than double.
    deque.push_back(4);
    assert_eq!(
        deque.back_extent(),
        Extent {
            capacity: 4,
            size: 2,
            offset: 1
        }
    );
    assert_eq!(deque.snapshot(), Ok(vec![3, 4]));
}

#[test]
fn test_reserve_miri() {
    let mut deque = DequeReclaiming::<u32>::new();

    deque.reserve_back(16).expect("small allocation");
    deque.reserve_front(8).expect("small allocation");
    let capacity = deque.capacity();
    let copied = deque.copied_elements();

    for i in 0..8 {
        deque.push_front(i);
    }
    for i in 0..16 {
        deque.push_back(i);
    }

    assert_eq!(deque.capacity(), capacity);
    assert_eq!(deque.copied_elements(), copied);
    assert_eq!(deque.len(), 24);

    // Already satisfied: nothing moves.
    deque.pop_back().expect("non-empty");
    let back = deque.back_extent();
    deque.reserve_back(1).expect("no-op");
    assert_eq!(deque.back_extent(), back);
}

#[test]
fn test_render_miri() {
    let mut deque = DequeReclaiming::<u8>::new();
    assert_eq!(deque.render_occupancy(), "| : |");

    deque.push_back(1);
    deque.push_back(2);
    deque.push_front(0);
    assert_eq!(deque.render_occupancy(), "|x:x|x|");

    deque.push_front(0);
    assert_eq!(deque.render_occupancy(), "|x|x:x|x|");

    deque.push_front(0);
    assert_eq!(deque.render_occupancy(), "| |x|x|x:x|x|");

    // Slack at the bottom of the front region shows up next to the split.
    deque.pop_back().expect("non-empty");
    deque.pop_back().expect("non-empty");
    deque.pop_back().expect("non-empty");
    assert_eq!(deque.render_occupancy(), "| |x|x| : | |");
}
