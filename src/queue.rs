//! The `queue` module defines the single-buffer topology, [`Queue`].
//!
//! A [`Queue`] stores its elements in one contiguous [`Region`]: the
//! logical sequence is exactly the region's live range, so both ends
//! compete for the same buffer.  Pushing to the front either reuses
//! slack left behind by earlier `pop_front`s, or asks the
//! [`GrowthPolicy`] for room (which may shift the whole sequence).
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

/// Translates logical `index` to a physical slot in a single-buffer
/// region with this `extent`, or `None` if `index` is past the live
/// range.
#[inline(always)]
pub fn locate(extent: Extent, index: usize) -> Option<usize> {
    if index < extent.size {
        Some(extent.offset + index)
    } else {
        None
    }
}

/// A double-ended queue in a single contiguous buffer, grown according
/// to the growth policy `P`.
#[derive(Clone, Debug)]
pub struct Queue<T, P = Reclaiming> {
    region: Region<T>,
    policy: P,
}

/// A [`Queue`] that reallocates to exactly the size it needs.
pub type QueueNaive<T> = Queue<T, Naive>;

/// A [`Queue`] that doubles and reuses popped slots.
pub type QueueReclaiming<T> = Queue<T, Reclaiming>;

/// A [`Queue`] that shifts in place until it is dense enough to double.
pub type QueueConservative<T> = Queue<T, Conservative>;

impl<T: Copy + Default, P: GrowthPolicy> Default for Queue<T, P> {
    fn default() -> Self {
        Self::with_policy(P::default())
    }
}

impl<T: Copy + Default, P: GrowthPolicy> Queue<T, P> {
    /// Creates an empty [`Queue`] with the default policy.
    #[inline(always)]
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty [`Queue`] that grows according to `policy`.
    pub fn with_policy(policy: P) -> Self {
        Queue {
            region: Region::new(),
            policy,
        }
    }

    #[inline(always)]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.region.size()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Returns the buffer's capacity, size and offset.
    #[inline(always)]
    pub fn extent(&self) -> Extent {
        self.region.extent()
    }

    /// Live elements over allocated slots.
    #[inline(always)]
    pub fn load_factor(&self) -> f64 {
        self.region.load_factor()
    }

    /// Number of elements moved by reallocations and shifts so far.
    #[inline(always)]
    pub fn copied_elements(&self) -> usize {
        self.region.copied_elements()
    }

    /// Pushes `value` to the back of the [`Queue`], or returns an error
    /// if growing the buffer failed.
    pub fn try_push_back(&mut self, value: T) -> Result<()> {
        self.policy.grow_end(&mut self.region)?;
        self.region.push_end(value);
        self.check_rep();
        Ok(())
    }

    /// Pushes `value` to the front of the [`Queue`], or returns an error
    /// if growing the buffer failed.
    pub fn try_push_front(&mut self, value: T) -> Result<()> {
        self.policy.grow_start(&mut self.region)?;
        if self.region.leading() > 0 {
            self.region.push_start(value);
        } else {
            self.region.push_start_shifting(value);
        }

        self.check_rep();
        Ok(())
    }

    /// Pushes `value` to the back of the [`Queue`].
    ///
    /// Panics if the buffer cannot grow.
    #[inline(always)]
    pub fn push_back(&mut self, value: T) {
        if let Err(e) = self.try_push_back(value) {
            panic!("{}", e);
        }
    }

    /// Pushes `value` to the front of the [`Queue`].
    ///
    /// Panics if the buffer cannot grow.
    #[inline(always)]
    pub fn push_front(&mut self, value: T) {
        if let Err(e) = self.try_push_front(value) {
            panic!("{}", e);
        }
    }

    /// Consumes and returns the last element in the [`Queue`].
    pub fn pop_back(&mut self) -> Result<T> {
        let ret = self
            .region
            .pop_end()
            .ok_or(DequeError::Underflow { end: End::Back })?;
        self.check_rep();
        Ok(ret)
    }

    /// Consumes and returns the first element in the [`Queue`].
    pub fn pop_front(&mut self) -> Result<T> {
        let ret = self
            .policy
            .release_start(&mut self.region)
            .ok_or(DequeError::Underflow { end: End::Front })?;
        self.check_rep();
        Ok(ret)
    }

    /// Returns a reference to the element at logical position `index`.
    #[inline(always)]
    pub fn get(&self, index: usize) -> Result<&T> {
        let slot = locate(self.region.extent(), index).ok_or(DequeError::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;
        Ok(self.region.slot(slot))
    }

    /// Returns a mutable reference to the element at logical position
    /// `index`.
    #[inline(always)]
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let slot = locate(self.region.extent(), index).ok_or(DequeError::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;
        Ok(self.region.slot_mut(slot))
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

    /// Ensures the next `additional` calls to `push_back` will not
    /// reallocate.  Does nothing if there is already room.
    pub fn reserve_back(&mut self, additional: usize) -> Result<()> {
        self.policy.reserve_end(&mut self.region, additional)?;
        self.check_rep();
        Ok(())
    }

    /// Ensures the next `additional` calls to `push_front` will not
    /// reallocate.  Does nothing if there is already room.
    pub fn reserve_front(&mut self, additional: usize) -> Result<()> {
        self.policy.reserve_start(&mut self.region, additional)?;
        self.check_rep();
        Ok(())
    }

    /// Draws the buffer's occupancy, one cell per slot: `x` for live
    /// elements, blank for slack.  For debugging only.
    pub fn render_occupancy(&self) -> String {
        format!("|{}|", self.region.render_forward())
    }

    #[inline(always)]
    #[cfg_attr(test, mutants::skip)] // obviously, removing checks will not be detected.
    fn check_rep(&self) {
        self.region.check_rep();
        debug_assert!((0.0..=1.0).contains(&self.load_factor()));
    }
}

impl<T: Copy + Default, P: GrowthPolicy> std::ops::Index<usize> for Queue<T, P> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T: Copy + Default, P: GrowthPolicy> std::ops::IndexMut<usize> for Queue<T, P> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T: Copy + Default, P: GrowthPolicy> DoubleEnded for Queue<T, P> {
    type Item = T;

    #[inline(always)]
    fn len(&self) -> usize {
        Queue::len(self)
    }

    #[inline(always)]
    fn try_push_back(&mut self, value: T) -> Result<()> {
        Queue::try_push_back(self, value)
    }

    #[inline(always)]
    fn try_push_front(&mut self, value: T) -> Result<()> {
        Queue::try_push_front(self, value)
    }

    #[inline(always)]
    fn pop_back(&mut self) -> Result<T> {
        Queue::pop_back(self)
    }

    #[inline(always)]
    fn pop_front(&mut self) -> Result<T> {
        Queue::pop_front(self)
    }

    #[inline(always)]
    fn get(&self, index: usize) -> Result<&T> {
        Queue::get(self, index)
    }

    #[inline(always)]
    fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        Queue::get_mut(self, index)
    }

    #[inline(always)]
    fn load_factor(&self) -> Option<f64> {
        Some(Queue::load_factor(self))
    }

    #[inline(always)]
    fn reserve_back(&mut self, additional: usize) -> Result<()> {
        Queue::reserve_back(self, additional)
    }

    #[inline(always)]
    fn reserve_front(&mut self, additional: usize) -> Result<()> {
        Queue::reserve_front(self, additional)
    }
}

#[test]
fn test_locate_exhaustive_miri() {
    use itertools::iproduct;

    for (capacity, size, offset) in iproduct!(1..6usize, 0..6usize, 0..6usize) {
        if offset + size > capacity {
            continue;
        }

        let extent = Extent {
            capacity,
            size,
            offset,
        };
        for index in 0..capacity + 2 {
            match locate(extent, index) {
                Some(slot) => {
                    assert!(index < size);
                    assert_eq!(slot, offset + index);
                    assert!(slot < capacity);
                }
                None => assert!(index >= size),
            }
        }
    }
}

#[cfg(test)]
fn check_scenario<P: GrowthPolicy>() {
    let mut queue = Queue::<u32, P>::new();

    queue.push_back(1);
    queue.push_back(2);
    queue.push_front(0);
    assert_eq!(queue.snapshot(), Ok(vec![0, 1, 2]));

    assert_eq!(queue.pop_front(), Ok(0));
    assert_eq!(queue.snapshot(), Ok(vec![1, 2]));

    queue.push_front(9);
    queue.push_front(8);
    assert_eq!(queue.len(), 4);
    assert_eq!(queue[0], 8);
    assert_eq!(queue[1], 9);
    assert_eq!(queue[2], 1);
    assert_eq!(queue[3], 2);
    assert_eq!(queue.front(), Some(&8));
    assert_eq!(queue.back(), Some(&2));
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
    let mut queue = QueueReclaiming::<u32>::new();

    assert!(queue.is_empty());
    assert_eq!(queue.front(), None);
    assert_eq!(queue.back(), None);
    assert_eq!(
        queue.pop_back(),
        Err(DequeError::Underflow { end: End::Back })
    );
    assert_eq!(
        queue.pop_front(),
        Err(DequeError::Underflow { end: End::Front })
    );
    assert_eq!(
        queue.get(0),
        Err(DequeError::IndexOutOfBounds { index: 0, len: 0 })
    );

    queue.push_back(5);
    assert_eq!(
        queue.get_mut(1),
        Err(DequeError::IndexOutOfBounds { index: 1, len: 1 })
    );

    // Errors don't disturb the contents.
    assert_eq!(queue.snapshot(), Ok(vec![5]));
}

#[test]
#[should_panic(expected = "index out of bounds: index=3 len=2")]
fn test_index_panics_miri() {
    let mut queue = QueueNaive::<u32>::new();
    queue.push_back(1);
    queue.push_back(2);

    let _ = queue[3];
}

#[test]
fn test_naive_never_keeps_offset_miri() {
    let mut queue = QueueNaive::<u32>::new();

    for i in 0..4 {
        queue.push_back(i);
    }
    assert_eq!(queue.extent(), Extent { capacity: 4, size: 4, offset: 0 });

    assert_eq!(queue.pop_front(), Ok(0));
    assert_eq!(queue.extent(), Extent { capacity: 4, size: 3, offset: 0 });

    // There's a free slot at the end, so the front push shifts in place.
    queue.push_front(10);
    assert_eq!(queue.extent(), Extent { capacity: 4, size: 4, offset: 0 });

    // Now full: grow by exactly one.
    queue.push_front(11);
    assert_eq!(queue.extent(), Extent { capacity: 5, size: 5, offset: 0 });
    assert_eq!(queue.snapshot(), Ok(vec![11, 10, 1, 2, 3]));
}

#[test]
fn test_reclaiming_reuses_front_slack_miri() {
    let mut queue = QueueReclaiming::<u32>::new();

    for i in 0..8 {
        queue.push_back(i);
    }
    assert_eq!(queue.capacity(), 8);

    assert_eq!(queue.pop_front(), Ok(0));
    assert_eq!(queue.pop_front(), Ok(1));
    assert_eq!(queue.extent(), Extent { capacity: 8, size: 6, offset: 2 });

    let copied = queue.copied_elements();
    queue.push_front(100);
    queue.push_front(101);
    assert_eq!(queue.extent(), Extent { capacity: 8, size: 8, offset: 0 });
    assert_eq!(queue.copied_elements(), copied);
    assert_eq!(queue.snapshot(), Ok(vec![101, 100, 2, 3, 4, 5, 6, 7]));

    // Slack exhausted: double and keep all the new room at the front.
    queue.push_front(102);
    assert_eq!(queue.extent(), Extent { capacity: 16, size: 9, offset: 7 });
}

#[test]
fn test_reclaiming_push_back_doubles_despite_front_slack_miri() {
    let mut queue = QueueReclaiming::<u32>::new();

    for i in 0..4 {
        queue.push_back(i);
    }
    assert_eq!(queue.pop_front(), Ok(0));
    assert_eq!(queue.pop_front(), Ok(1));
    assert_eq!(queue.pop_front(), Ok(2));

    queue.push_back(4);
    assert_eq!(queue.extent(), Extent { capacity: 8, size: 2, offset: 3 });
    assert_eq!(queue.snapshot(), Ok(vec![3, 4]));

    // The leading slack kept through the doubling serves front pushes.
    let copied = queue.copied_elements();
    queue.push_front(2);
    queue.push_front(1);
    queue.push_front(0);
    assert_eq!(queue.extent(), Extent { capacity: 8, size: 5, offset: 0 });
    assert_eq!(queue.copied_elements(), copied);
}

#[test]
fn test_conservative_shifts_instead_of_doubling_miri() {
    let mut queue = QueueConservative::<u32>::new();

    for i in 0..4 {
        queue.push_back(i);
    }
    assert_eq!(queue.pop_front(), Ok(0));
    assert_eq!(queue.pop_front(), Ok(1));
    assert_eq!(queue.pop_front(), Ok(2));

    // load factor 0.25: recentre instead of doubling.
    queue.push_back(4);
    assert_eq!(queue.extent(), Extent { capacity: 4, size: 2, offset: 1 });

    // Both ends kept a free slot.
    queue.push_front(2);
    assert_eq!(queue.extent(), Extent { capacity: 4, size: 3, offset: 0 });
    assert_eq!(queue.snapshot(), Ok(vec![3, 4]));
}

#[test]
fn test_conservative_threshold_is_configurable_miri() {
    use crate::policy::Boundary;

    // 4 slots, 2 live at the end: load factor exactly 0.5.
    fn half_full(policy: Conservative) -> QueueConservative<u32> {
        let mut queue = Queue::with_policy(policy);
        for i in 0..4 {
            queue.push_back(i);
        }
        queue.pop_front().expect("non-empty");
        queue.pop_front().expect("non-empty");
        queue
    }

    let mut inclusive = half_full(Conservative::new(0.5, Boundary::Inclusive));
    inclusive.push_back(4);
    assert_eq!(inclusive.capacity(), 8);

    let mut exclusive = half_full(Conservative::new(0.5, Boundary::Exclusive));
    exclusive.push_back(4);
    assert_eq!(exclusive.capacity(), 4);

    assert_eq!(inclusive.snapshot(), exclusive.snapshot());
}

#[test]
fn test_reserve_miri() {
    let mut queue = QueueReclaiming::<u32>::new();
    queue.push_back(1);

    queue.reserve_back(10).expect("small allocation");
    let extent = queue.extent();
    assert!(extent.trailing() >= 10);

    let copied = queue.copied_elements();
    for i in 0..10 {
        queue.push_back(i);
    }
    assert_eq!(queue.capacity(), extent.capacity);
    assert_eq!(queue.copied_elements(), copied);

    queue.reserve_front(5).expect("small allocation");
    assert!(queue.extent().leading() >= 5);
    let extent = queue.extent();
    queue.reserve_front(5).expect("no-op");
    assert_eq!(queue.extent(), extent);
    assert_eq!(queue.len(), 11);
}

#[test]
fn test_render_miri() {
    let mut queue = QueueReclaiming::<u8>::new();
    assert_eq!(queue.render_occupancy(), "| |");

    queue.push_back(1);
    queue.push_back(2);
    queue.push_back(3);
    assert_eq!(queue.render_occupancy(), "|x|x|x| |");

    queue.pop_front().expect("non-empty");
    assert_eq!(queue.render_occupancy(), "| |x|x| |");
}

#[cfg(test)]
fn check_alternating_pushes<P: GrowthPolicy>() {
    let mut queue = Queue::<u32, P>::new();
    let pushes = 2000;

    for i in 0..pushes {
        if i % 2 == 0 {
            queue.push_back(i);
        } else {
            queue.push_front(i);
        }
        assert!(queue.capacity() <= 4 * queue.len());
    }

    assert!(queue.copied_elements() <= 2 * pushes as usize);
    assert_eq!(queue.front(), Some(&(pushes - 1)));
    assert_eq!(queue.back(), Some(&(pushes - 2)));
}

#[test]
fn test_alternating_pushes_reclaiming() {
    check_alternating_pushes::<Reclaiming>();
}

#[test]
fn test_alternating_pushes_conservative() {
    check_alternating_pushes::<Conservative>();
}
