//! The `baseline` module implements [`DoubleEnded`] for standard
//! containers, so they can run the same workloads as the policy
//! containers.
//!
//! These adapters have no growth logic of their own: a [`Vec`] pushes to
//! the front by inserting at index 0, a [`LinkedList`] walks its nodes for
//! indexed access and cannot report a load factor.
use std::collections::LinkedList;
use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::contract::DoubleEnded;
use crate::error::DequeError;
use crate::error::End;
use crate::error::Result;

#[inline(always)]
fn out_of_bounds(index: usize, len: usize) -> DequeError {
    DequeError::IndexOutOfBounds { index, len }
}

#[inline(always)]
fn ratio(len: usize, capacity: usize) -> f64 {
    if capacity == 0 {
        return 0.0;
    }

    len as f64 / capacity as f64
}

impl<T> DoubleEnded for Vec<T> {
    type Item = T;

    #[inline(always)]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn try_push_back(&mut self, value: T) -> Result<()> {
        DoubleEnded::reserve_back(self, 1)?;
        self.push(value);
        Ok(())
    }

    fn try_push_front(&mut self, value: T) -> Result<()> {
        DoubleEnded::reserve_back(self, 1)?;
        self.insert(0, value);
        Ok(())
    }

    #[inline(always)]
    fn pop_back(&mut self) -> Result<T> {
        self.pop().ok_or(DequeError::Underflow { end: End::Back })
    }

    fn pop_front(&mut self) -> Result<T> {
        if Vec::is_empty(self) {
            return Err(DequeError::Underflow { end: End::Front });
        }

        Ok(self.remove(0))
    }

    #[inline(always)]
    fn get(&self, index: usize) -> Result<&T> {
        let len = Vec::len(self);
        self.as_slice()
            .get(index)
            .ok_or_else(|| out_of_bounds(index, len))
    }

    #[inline(always)]
    fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = Vec::len(self);
        self.as_mut_slice()
            .get_mut(index)
            .ok_or_else(|| out_of_bounds(index, len))
    }

    #[inline(always)]
    fn load_factor(&self) -> Option<f64> {
        Some(ratio(Vec::len(self), self.capacity()))
    }

    fn reserve_back(&mut self, additional: usize) -> Result<()> {
        self.try_reserve(additional)
            .map_err(|_| DequeError::AllocationFailed {
                capacity: Vec::len(self).saturating_add(additional),
            })
    }
}

impl<T> DoubleEnded for VecDeque<T> {
    type Item = T;

    #[inline(always)]
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn try_push_back(&mut self, value: T) -> Result<()> {
        DoubleEnded::reserve_back(self, 1)?;
        VecDeque::push_back(self, value);
        Ok(())
    }

    fn try_push_front(&mut self, value: T) -> Result<()> {
        DoubleEnded::reserve_back(self, 1)?;
        VecDeque::push_front(self, value);
        Ok(())
    }

    #[inline(always)]
    fn pop_back(&mut self) -> Result<T> {
        VecDeque::pop_back(self).ok_or(DequeError::Underflow { end: End::Back })
    }

    #[inline(always)]
    fn pop_front(&mut self) -> Result<T> {
        VecDeque::pop_front(self).ok_or(DequeError::Underflow { end: End::Front })
    }

    #[inline(always)]
    fn get(&self, index: usize) -> Result<&T> {
        VecDeque::get(self, index).ok_or_else(|| out_of_bounds(index, VecDeque::len(self)))
    }

    #[inline(always)]
    fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = VecDeque::len(self);
        VecDeque::get_mut(self, index).ok_or_else(|| out_of_bounds(index, len))
    }

    #[inline(always)]
    fn load_factor(&self) -> Option<f64> {
        Some(ratio(VecDeque::len(self), self.capacity()))
    }

    fn reserve_back(&mut self, additional: usize) -> Result<()> {
        self.try_reserve(additional)
            .map_err(|_| DequeError::AllocationFailed {
                capacity: VecDeque::len(self).saturating_add(additional),
            })
    }

    fn reserve_front(&mut self, additional: usize) -> Result<()> {
        // A ring buffer's free space serves both ends.
        DoubleEnded::reserve_back(self, additional)
    }
}

impl<T> DoubleEnded for LinkedList<T> {
    type Item = T;

    #[inline(always)]
    fn len(&self) -> usize {
        LinkedList::len(self)
    }

    #[inline(always)]
    fn try_push_back(&mut self, value: T) -> Result<()> {
        LinkedList::push_back(self, value);
        Ok(())
    }

    #[inline(always)]
    fn try_push_front(&mut self, value: T) -> Result<()> {
        LinkedList::push_front(self, value);
        Ok(())
    }

    #[inline(always)]
    fn pop_back(&mut self) -> Result<T> {
        LinkedList::pop_back(self).ok_or(DequeError::Underflow { end: End::Back })
    }

    #[inline(always)]
    fn pop_front(&mut self) -> Result<T> {
        LinkedList::pop_front(self).ok_or(DequeError::Underflow { end: End::Front })
    }

    fn get(&self, index: usize) -> Result<&T> {
        let len = LinkedList::len(self);
        self.iter()
            .nth(index)
            .ok_or_else(|| out_of_bounds(index, len))
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = LinkedList::len(self);
        self.iter_mut()
            .nth(index)
            .ok_or_else(|| out_of_bounds(index, len))
    }
}

impl<A: smallvec::Array> DoubleEnded for SmallVec<A> {
    type Item = A::Item;

    #[inline(always)]
    fn len(&self) -> usize {
        SmallVec::len(self)
    }

    fn try_push_back(&mut self, value: A::Item) -> Result<()> {
        DoubleEnded::reserve_back(self, 1)?;
        self.push(value);
        Ok(())
    }

    fn try_push_front(&mut self, value: A::Item) -> Result<()> {
        DoubleEnded::reserve_back(self, 1)?;
        self.insert(0, value);
        Ok(())
    }

    #[inline(always)]
    fn pop_back(&mut self) -> Result<A::Item> {
        self.pop().ok_or(DequeError::Underflow { end: End::Back })
    }

    fn pop_front(&mut self) -> Result<A::Item> {
        if SmallVec::is_empty(self) {
            return Err(DequeError::Underflow { end: End::Front });
        }

        Ok(self.remove(0))
    }

    #[inline(always)]
    fn get(&self, index: usize) -> Result<&A::Item> {
        let len = SmallVec::len(self);
        self.as_slice()
            .get(index)
            .ok_or_else(|| out_of_bounds(index, len))
    }

    #[inline(always)]
    fn get_mut(&mut self, index: usize) -> Result<&mut A::Item> {
        let len = SmallVec::len(self);
        self.as_mut_slice()
            .get_mut(index)
            .ok_or_else(|| out_of_bounds(index, len))
    }

    #[inline(always)]
    fn load_factor(&self) -> Option<f64> {
        Some(ratio(SmallVec::len(self), self.capacity()))
    }

    fn reserve_back(&mut self, additional: usize) -> Result<()> {
        self.try_reserve(additional)
            .map_err(|_| DequeError::AllocationFailed {
                capacity: SmallVec::len(self).saturating_add(additional),
            })
    }
}

#[cfg(test)]
fn check_contract<C: DoubleEnded<Item = u32> + Default>() {
    let mut container = C::default();

    assert!(container.is_empty());
    assert_eq!(
        container.pop_back(),
        Err(DequeError::Underflow { end: End::Back })
    );
    assert_eq!(
        container.pop_front(),
        Err(DequeError::Underflow { end: End::Front })
    );
    assert_eq!(container.get(0), Err(out_of_bounds(0, 0)));

    container.try_push_back(1).expect("small allocation");
    container.try_push_back(2).expect("small allocation");
    container.try_push_front(0).expect("small allocation");
    assert_eq!(container.snapshot(), Ok(vec![0, 1, 2]));

    assert_eq!(container.pop_front(), Ok(0));
    container.try_push_front(9).expect("small allocation");
    container.try_push_front(8).expect("small allocation");
    assert_eq!(container.snapshot(), Ok(vec![8, 9, 1, 2]));

    *container.get_mut(1).expect("in bounds") = 90;
    container.swap(0, 3).expect("in bounds");
    assert_eq!(container.snapshot(), Ok(vec![2, 90, 1, 8]));
    assert_eq!(container.get_mut(4), Err(out_of_bounds(4, 4)));

    container.reserve_back(10).expect("small allocation");
    container.reserve_front(10).expect("small allocation");
    if let Some(load) = container.load_factor() {
        assert!((0.0..=1.0).contains(&load));
    }

    assert_eq!(container.pop_back(), Ok(8));
    assert_eq!(container.len(), 3);
}

#[test]
fn test_vec_miri() {
    check_contract::<Vec<u32>>();

    let empty: Vec<u32> = Vec::new();
    assert_eq!(DoubleEnded::load_factor(&empty), Some(0.0));
}

#[test]
fn test_vec_deque_miri() {
    check_contract::<VecDeque<u32>>();
}

#[test]
fn test_linked_list_miri() {
    check_contract::<LinkedList<u32>>();

    let list: LinkedList<u32> = LinkedList::new();
    assert_eq!(DoubleEnded::load_factor(&list), None);
}

#[test]
fn test_smallvec_miri() {
    check_contract::<SmallVec<[u32; 4]>>();

    // Inline storage counts as capacity.
    let mut small: SmallVec<[u32; 4]> = SmallVec::new();
    small.try_push_back(1).expect("inline");
    assert_eq!(DoubleEnded::load_factor(&small), Some(0.25));
}
