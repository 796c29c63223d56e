//! The `contract` module defines [`DoubleEnded`], the operation set
//! shared by every container in this crate and by the standard
//! collections they are compared against.
use crate::error::Result;

/// A sequence that can grow and shrink at both ends, with indexed
/// access by logical position.
///
/// Workload drivers only ever talk to containers through this trait, so
/// the six policy containers and the baselines are interchangeable.
pub trait DoubleEnded {
    /// The type of each value in the container.
    type Item;

    /// Returns the number of live elements.
    fn len(&self) -> usize;

    /// Determines whether there are no live elements.
    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes `value` after the last element.
    fn try_push_back(&mut self, value: Self::Item) -> Result<()>;

    /// Pushes `value` before the first element.
    fn try_push_front(&mut self, value: Self::Item) -> Result<()>;

    /// Consumes and returns the last element; underflows when empty.
    fn pop_back(&mut self) -> Result<Self::Item>;

    /// Consumes and returns the first element; underflows when empty.
    fn pop_front(&mut self) -> Result<Self::Item>;

    /// Returns a reference to the element at logical position `index`.
    fn get(&self, index: usize) -> Result<&Self::Item>;

    /// Returns a mutable reference to the element at logical position
    /// `index`.
    fn get_mut(&mut self, index: usize) -> Result<&mut Self::Item>;

    /// Live elements over allocated slots, for containers that can
    /// tell.
    #[inline(always)]
    fn load_factor(&self) -> Option<f64> {
        None
    }

    /// Ensures the next `additional` pushes to the back will not
    /// reallocate, if the container supports reservations.
    #[inline(always)]
    fn reserve_back(&mut self, additional: usize) -> Result<()> {
        let _ = additional;
        Ok(())
    }

    /// Ensures the next `additional` pushes to the front will not
    /// reallocate, if the container supports reservations.
    #[inline(always)]
    fn reserve_front(&mut self, additional: usize) -> Result<()> {
        let _ = additional;
        Ok(())
    }

    /// Swaps the elements at logical positions `i` and `j`.
    fn swap(&mut self, i: usize, j: usize) -> Result<()>
    where
        Self::Item: Copy,
    {
        let x = *self.get(i)?;
        let y = *self.get(j)?;
        *self.get_mut(i)? = y;
        *self.get_mut(j)? = x;
        Ok(())
    }

    /// Copies the logical sequence out, front to back.
    fn snapshot(&self) -> Result<Vec<Self::Item>>
    where
        Self::Item: Clone,
    {
        (0..self.len())
            .map(|idx| self.get(idx).cloned())
            .collect()
    }
}
