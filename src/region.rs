//! The `region` module defines [`Region`], the raw growable array that
//! every container in this crate is built from.
//!
//! A region is one owned buffer plus two counters: the live elements
//! occupy `buffer[offset..offset + size]`.  The gap before `offset` is
//! slack left behind by removals at the start of the region, and the gap
//! after the live range is room for pushes at the end.  Regions never
//! decide *when* to grow; that is the job of a
//! [`GrowthPolicy`](crate::policy::GrowthPolicy).  They only know how to
//! reallocate or shift their live range, and they count how many
//! elements those moves copied.
use itertools::Itertools;

use crate::error::DequeError;
use crate::error::Result;
use crate::INITIAL_CAPACITY;

/// The `(capacity, size, offset)` triple that describes a region's
/// occupancy, without its contents.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Extent {
    pub capacity: usize,
    pub size: usize,
    pub offset: usize,
}

impl Extent {
    /// Number of free slots before the live range.
    #[inline(always)]
    pub fn leading(&self) -> usize {
        self.offset
    }

    /// Number of free slots after the live range.
    #[inline(always)]
    pub fn trailing(&self) -> usize {
        self.capacity - self.offset - self.size
    }

    /// Live elements over allocated slots, in `[0, 1]`.
    #[inline(always)]
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }

        self.size as f64 / self.capacity as f64
    }
}

/// A [`Region`] exclusively owns a fixed-capacity buffer; growing it
/// means allocating a fresh buffer and copying the live range over.
#[derive(Clone, Debug)]
pub struct Region<T> {
    buffer: Box<[T]>,
    size: usize,
    offset: usize,
    // Elements moved by reallocations and in-place shifts, for cost
    // accounting.  Writes of new elements are not counted.
    copied: usize,
}

/// Allocates a buffer of exactly `capacity` default-initialised slots.
///
/// The allocation is attempted once; failure (including capacity
/// overflow) is reported as [`DequeError::AllocationFailed`].
fn allocate<T: Copy + Default>(capacity: usize) -> Result<Box<[T]>> {
    let mut storage: Vec<T> = Vec::new();
    storage
        .try_reserve_exact(capacity)
        .map_err(|_| DequeError::AllocationFailed { capacity })?;
    storage.resize(capacity, T::default());
    Ok(storage.into_boxed_slice())
}

impl<T: Copy + Default> Default for Region<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> Region<T> {
    /// Creates an empty region with [`INITIAL_CAPACITY`] slots.
    pub fn new() -> Self {
        Region {
            buffer: vec![T::default(); INITIAL_CAPACITY].into_boxed_slice(),
            size: 0,
            offset: 0,
            copied: 0,
        }
    }

    #[inline(always)]
    pub fn extent(&self) -> Extent {
        Extent {
            capacity: self.capacity(),
            size: self.size,
            offset: self.offset,
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline(always)]
    pub fn leading(&self) -> usize {
        self.offset
    }

    #[inline(always)]
    pub fn trailing(&self) -> usize {
        self.capacity() - self.offset - self.size
    }

    #[inline(always)]
    pub fn load_factor(&self) -> f64 {
        self.extent().load_factor()
    }

    /// Total number of elements copied by reallocations and shifts
    /// since this region was created.
    #[inline(always)]
    pub fn copied_elements(&self) -> usize {
        self.copied
    }

    /// Returns the live elements, in physical order.
    #[inline(always)]
    pub fn live(&self) -> &[T] {
        &self.buffer[self.offset..self.offset + self.size]
    }

    /// Returns the physical slot at `index`; callers translate logical
    /// positions to physical ones before getting here.
    #[inline(always)]
    pub(crate) fn slot(&self, index: usize) -> &T {
        debug_assert!(index >= self.offset && index < self.offset + self.size);
        &self.buffer[index]
    }

    #[inline(always)]
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index >= self.offset && index < self.offset + self.size);
        &mut self.buffer[index]
    }

    /// Moves the live range to a freshly allocated buffer of `capacity`
    /// slots, starting at `offset`, and releases the old buffer.
    ///
    /// On failure, the region is left untouched.
    pub(crate) fn reallocate(&mut self, capacity: usize, offset: usize) -> Result<()> {
        assert!(
            offset + self.size <= capacity,
            "reallocation target too small. capacity={} offset={} size={}",
            capacity,
            offset,
            self.size
        );

        let mut fresh = allocate::<T>(capacity)?;
        fresh[offset..offset + self.size].copy_from_slice(self.live());

        log::debug!(
            "reallocating region: capacity {} -> {}, offset {} -> {}, size={}",
            self.capacity(),
            capacity,
            self.offset,
            offset,
            self.size
        );

        self.buffer = fresh;
        self.offset = offset;
        self.copied += self.size;
        self.check_rep();
        Ok(())
    }

    /// Moves the live range within the current buffer so that it starts
    /// at `offset`.
    pub(crate) fn shift_to(&mut self, offset: usize) {
        assert!(offset + self.size <= self.capacity());
        if offset == self.offset {
            return;
        }

        log::trace!(
            "shifting region in place: offset {} -> {}, size={} capacity={}",
            self.offset,
            offset,
            self.size,
            self.capacity()
        );

        self.buffer
            .copy_within(self.offset..self.offset + self.size, offset);
        self.offset = offset;
        self.copied += self.size;
        self.check_rep();
    }

    /// Appends `value` after the live range.  The caller must have made
    /// room first.
    #[inline(always)]
    pub(crate) fn push_end(&mut self, value: T) {
        assert!(self.trailing() > 0, "push_end on a full region");
        self.buffer[self.offset + self.size] = value;
        self.size += 1;
    }

    /// Prepends `value` in the slack before the live range.  The caller
    /// must have made room first.
    #[inline(always)]
    pub(crate) fn push_start(&mut self, value: T) {
        assert!(self.offset > 0, "push_start without leading slack");
        self.offset -= 1;
        self.buffer[self.offset] = value;
        self.size += 1;
    }

    /// Prepends `value` by shifting the whole live range up one slot.
    pub(crate) fn push_start_shifting(&mut self, value: T) {
        assert!(self.trailing() > 0, "push_start_shifting on a full region");
        let start = self.offset;
        self.buffer.copy_within(start..start + self.size, start + 1);
        self.copied += self.size;
        self.buffer[start] = value;
        self.size += 1;
    }

    /// Removes and returns the last live element.
    #[inline(always)]
    pub(crate) fn pop_end(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }

        self.size -= 1;
        Some(self.buffer[self.offset + self.size])
    }

    /// Removes and returns the first live element, leaving its slot
    /// behind as leading slack.
    #[inline(always)]
    pub(crate) fn pop_start(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }

        let ret = self.buffer[self.offset];
        self.offset += 1;
        self.size -= 1;
        Some(ret)
    }

    /// Removes and returns the first live element, shifting the rest of
    /// the live range down so that no slack is left behind.
    pub(crate) fn pop_start_shifting(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }

        let start = self.offset;
        let ret = self.buffer[start];
        self.buffer
            .copy_within(start + 1..start + self.size, start);
        self.size -= 1;
        self.copied += self.size;
        Some(ret)
    }

    /// Repositions an empty region so that its (empty) live range
    /// starts at `offset`.  Nothing is copied.
    #[inline(always)]
    pub(crate) fn move_empty_to(&mut self, offset: usize) {
        assert_eq!(self.size, 0, "move_empty_to on a non-empty region");
        assert!(offset <= self.capacity());
        self.offset = offset;
    }

    /// Renders one character per slot, in physical order: `x` for live
    /// slots, a blank for free ones.
    fn marks(&self) -> impl DoubleEndedIterator<Item = char> + '_ {
        (0..self.capacity()).map(move |idx| {
            if idx >= self.offset && idx < self.offset + self.size {
                'x'
            } else {
                ' '
            }
        })
    }

    /// Slots in physical order, separated by `|`: `x|x| ` for two live
    /// elements in a buffer of 3.
    pub fn render_forward(&self) -> String {
        self.marks().join("|")
    }

    /// Slots in reverse physical order, separated by `|`.
    pub fn render_reversed(&self) -> String {
        self.marks().rev().join("|")
    }

    #[inline(always)]
    #[cfg_attr(test, mutants::skip)] // obviously, removing checks will not be detected.
    pub(crate) fn check_rep(&self) {
        debug_assert!(self.capacity() >= 1);
        debug_assert!(self.offset + self.size <= self.capacity());
    }
}

#[test]
fn test_new_region_miri() {
    let region = Region::<u32>::new();

    assert_eq!(
        region.extent(),
        Extent {
            capacity: 1,
            size: 0,
            offset: 0
        }
    );
    assert!(region.is_empty());
    assert_eq!(region.live(), &[]);
    assert_eq!(region.load_factor(), 0.0);
    assert_eq!(region.trailing(), 1);
    assert_eq!(region.copied_elements(), 0);
}

#[test]
fn test_push_pop_miri() {
    let mut region = Region::<u32>::new();

    region.push_end(1);
    assert_eq!(region.live(), &[1]);
    assert_eq!(region.trailing(), 0);
    assert_eq!(region.load_factor(), 1.0);

    region.reallocate(4, 2).expect("small allocation");
    assert_eq!(region.live(), &[1]);
    assert_eq!(region.offset(), 2);
    assert_eq!(region.copied_elements(), 1);

    region.push_start(0);
    region.push_end(2);
    assert_eq!(region.live(), &[0, 1, 2]);
    assert_eq!(region.leading(), 1);
    assert_eq!(region.trailing(), 0);

    assert_eq!(region.pop_start(), Some(0));
    assert_eq!(region.leading(), 2);
    assert_eq!(region.pop_end(), Some(2));
    assert_eq!(region.live(), &[1]);

    assert_eq!(region.pop_start_shifting(), Some(1));
    assert!(region.is_empty());
    assert_eq!(region.pop_start(), None);
    assert_eq!(region.pop_end(), None);
    assert_eq!(region.pop_start_shifting(), None);

    region.move_empty_to(4);
    assert_eq!(region.leading(), 4);
    assert_eq!(region.trailing(), 0);
    region.move_empty_to(0);
    assert_eq!(region.trailing(), 4);
}

#[test]
fn test_shift_miri() {
    let mut region = Region::<u32>::new();
    region.reallocate(5, 0).expect("small allocation");
    region.push_end(1);
    region.push_end(2);

    region.shift_to(3);
    assert_eq!(region.live(), &[1, 2]);
    assert_eq!(region.leading(), 3);
    assert_eq!(region.copied_elements(), 2);

    // Shifting to the current offset is free.
    region.shift_to(3);
    assert_eq!(region.copied_elements(), 2);

    region.shift_to(0);
    assert_eq!(region.live(), &[1, 2]);
    assert_eq!(region.trailing(), 3);

    region.push_start_shifting(0);
    assert_eq!(region.live(), &[0, 1, 2]);
    assert_eq!(region.offset(), 0);
    assert_eq!(region.copied_elements(), 6);
}

#[test]
#[should_panic(expected = "push_end on a full region")]
fn test_push_end_full_miri() {
    let mut region = Region::<u32>::new();
    region.push_end(1);
    region.push_end(2);
}

#[test]
fn test_allocation_failure() {
    let mut region = Region::<u64>::new();
    region.push_end(7);

    assert_eq!(
        region.reallocate(usize::MAX, 0),
        Err(DequeError::AllocationFailed {
            capacity: usize::MAX
        })
    );

    // The region is untouched.
    assert_eq!(region.live(), &[7]);
    assert_eq!(region.capacity(), 1);
}

#[test]
fn test_render_miri() {
    let mut region = Region::<u8>::new();
    region.reallocate(4, 1).expect("small allocation");
    region.push_end(1);
    region.push_end(2);

    assert_eq!(region.render_forward(), " |x|x| ");
    assert_eq!(region.render_reversed(), " |x|x| ");

    region.pop_end();
    assert_eq!(region.render_forward(), " |x| | ");
    assert_eq!(region.render_reversed(), " | |x| ");
}
