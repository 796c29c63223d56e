//! The `policy_deque` crate defines contiguous double-ended containers
//! parameterised by a [`GrowthPolicy`], so that the same access patterns
//! can be measured under different reallocation strategies.
//!
//! A [`Queue`] stores its elements in a single [`Region`](region::Region):
//! a contiguous buffer with free slots before and after the live range.
//! A [`Deque`] glues two regions back to back; the front region is stored
//! in reverse, so pushing to either end of the deque is a push to the end
//! of one region.
//!
//! The three policies differ in what they do when a region runs out of
//! room at one end:
//!
//!  - [`Naive`] grows to exactly the required size and shifts elements
//!    down on front pops, so it never allocates slack but pays quadratic
//!    copies for FIFO traffic;
//!  - [`Reclaiming`] doubles, and lets front pops leave slack behind that
//!    later front pushes reuse;
//!  - [`Conservative`] recentres the live range inside its buffer unless
//!    the load factor exceeds a configurable threshold, and only doubles
//!    then.
//!
//! Every container (and the standard collections in [`baseline`])
//! implements [`DoubleEnded`], which is all the drivers in [`workload`]
//! need.
//!
//! # Examples
//!
//! ```rust
//! use policy_deque::DequeReclaiming;
//!
//! let mut deque: DequeReclaiming<u32> = DequeReclaiming::new();
//! deque.push_back(1);
//! deque.push_back(2);
//! deque.push_front(0);
//! assert_eq!(deque.len(), 3);
//! assert_eq!(deque[0], 0);
//! assert_eq!(deque.pop_back(), Ok(2));
//! assert_eq!(deque.pop_back(), Ok(1));
//! // Pops cross over to the front region once the back is empty.
//! assert_eq!(deque.pop_back(), Ok(0));
//! assert!(deque.pop_back().is_err());
//! ```
//!
//! ```rust
//! use policy_deque::{Boundary, Conservative, QueueConservative};
//!
//! let mut queue: QueueConservative<u32> =
//!     QueueConservative::with_policy(Conservative::new(0.75, Boundary::Exclusive));
//! for i in 0..4 {
//!     queue.push_back(i);
//! }
//! assert_eq!(queue.pop_front(), Ok(0));
//! assert_eq!(queue.pop_front(), Ok(1));
//! // Half full: the next push recentres the live range instead of
//! // doubling.
//! queue.push_back(4);
//! assert_eq!(queue.capacity(), 4);
//! assert_eq!(queue.extent().offset, 1);
//! ```
//!
//! ```rust
//! use policy_deque::workload;
//! use policy_deque::workload::Small;
//! use policy_deque::QueueNaive;
//! use policy_deque::QueueReclaiming;
//!
//! let naive = workload::queue_load_factor::<QueueNaive<Small>>(1000).unwrap();
//! let reclaiming = workload::queue_load_factor::<QueueReclaiming<Small>>(1000).unwrap();
//! assert!(naive.unwrap() >= reclaiming.unwrap());
//! ```
pub mod baseline;
pub mod contract;
pub mod deque;
pub mod error;
pub mod policy;
pub mod queue;
pub mod region;
pub mod workload;

pub use contract::DoubleEnded;
pub use deque::Deque;
pub use deque::DequeConservative;
pub use deque::DequeNaive;
pub use deque::DequeReclaiming;
pub use error::DequeError;
pub use error::End;
pub use error::Result;
pub use policy::Boundary;
pub use policy::Conservative;
pub use policy::GrowthPolicy;
pub use policy::Naive;
pub use policy::Reclaiming;
pub use queue::Queue;
pub use queue::QueueConservative;
pub use queue::QueueNaive;
pub use queue::QueueReclaiming;

/// Number of slots in the buffer of a freshly created region.
pub const INITIAL_CAPACITY: usize = 1;

/// Default load factor above which [`Conservative`] doubles instead of
/// sliding the live range.
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.5;

/// Number of elements [`workload::queue`] pushes before alternating
/// pushes and pops.
pub const QUEUE_PRELOAD: usize = 1000;

// Check important properties for the constants above.
#[test]
fn check_constant_relationships() {
    assert!(INITIAL_CAPACITY >= 1);
    // Sliding must free at least one slot, and doubling must keep the
    // load at or under the threshold afterwards.
    assert!(DEFAULT_LOAD_FACTOR_THRESHOLD > 0.0);
    assert!(DEFAULT_LOAD_FACTOR_THRESHOLD < 1.0);
    assert!(DEFAULT_LOAD_FACTOR_THRESHOLD >= 0.5);
    assert!(QUEUE_PRELOAD > INITIAL_CAPACITY);
}
