//! Drives every container through seeded random operation sequences and
//! compares each result against a `VecDeque` model.
use std::collections::LinkedList;
use std::collections::VecDeque;

use policy_deque::deque::Deque;
use policy_deque::queue::Queue;
use policy_deque::region::Extent;
use policy_deque::Boundary;
use policy_deque::Conservative;
use policy_deque::DequeError;
use policy_deque::DoubleEnded;
use policy_deque::End;
use policy_deque::GrowthPolicy;
use policy_deque::Naive;
use policy_deque::Reclaiming;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use smallvec::SmallVec;

const STEPS: usize = 2000;
const SEEDS: [u64; 4] = [0, 1, 42, 0xdead_beef];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn check_extent(extent: Extent) {
    assert!(
        extent.offset + extent.size <= extent.capacity,
        "extent out of bounds: {:?}",
        extent
    );
}

/// Applies the same random operation to `container` and `model`,
/// asserting they agree, then calls `check` on the container.
fn run<C, F>(mut container: C, seed: u64, check: F)
where
    C: DoubleEnded<Item = u32>,
    F: Fn(&C),
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut model: VecDeque<u32> = VecDeque::new();

    for step in 0..STEPS {
        let value = step as u32;
        // Bias towards pushes so the containers get somewhat large.
        match rng.random_range(0..12) {
            0 | 1 | 2 => {
                container.try_push_back(value).expect("small allocation");
                model.push_back(value);
            }
            3 | 4 | 5 => {
                container.try_push_front(value).expect("small allocation");
                model.push_front(value);
            }
            6 => {
                let expected = model.pop_back().ok_or(DequeError::Underflow { end: End::Back });
                assert_eq!(container.pop_back(), expected, "step={}", step);
            }
            7 => {
                let expected = model
                    .pop_front()
                    .ok_or(DequeError::Underflow { end: End::Front });
                assert_eq!(container.pop_front(), expected, "step={}", step);
            }
            8 => {
                // Sometimes one past the end.
                let index = rng.random_range(0..=model.len());
                let expected = model.get(index).ok_or(DequeError::IndexOutOfBounds {
                    index,
                    len: model.len(),
                });
                assert_eq!(container.get(index), expected, "step={}", step);
            }
            9 => {
                if !model.is_empty() {
                    let index = rng.random_range(0..model.len());
                    *container.get_mut(index).expect("in bounds") = value;
                    model[index] = value;
                }
            }
            10 => {
                let additional = rng.random_range(0..8);
                if rng.random_bool(0.5) {
                    container.reserve_back(additional).expect("small allocation");
                } else {
                    container.reserve_front(additional).expect("small allocation");
                }
            }
            _ => {
                if !model.is_empty() {
                    let i = rng.random_range(0..model.len());
                    let j = rng.random_range(0..model.len());
                    container.swap(i, j).expect("in bounds");
                    model.swap(i, j);
                }
            }
        }

        assert_eq!(container.len(), model.len(), "step={}", step);
        if let Some(load) = container.load_factor() {
            assert!((0.0..=1.0).contains(&load), "step={} load={}", step, load);
        }
        check(&container);
    }

    assert_eq!(
        container.snapshot().expect("in bounds"),
        model.iter().copied().collect::<Vec<_>>()
    );
}

fn run_queue<P: GrowthPolicy>(policy: P) {
    for seed in SEEDS {
        run(Queue::<u32, P>::with_policy(policy.clone()), seed, |queue| {
            check_extent(queue.extent());
        });
    }
}

fn run_deque<P: GrowthPolicy>(policy: P) {
    for seed in SEEDS {
        run(Deque::<u32, P>::with_policy(policy.clone()), seed, |deque| {
            check_extent(deque.front_extent());
            check_extent(deque.back_extent());
            assert_eq!(
                deque.len(),
                deque.front_extent().size + deque.back_extent().size
            );
        });
    }
}

#[test]
fn test_queue_naive() {
    init_logger();
    run_queue(Naive);
}

#[test]
fn test_queue_reclaiming() {
    init_logger();
    run_queue(Reclaiming);
}

#[test]
fn test_queue_conservative() {
    init_logger();
    run_queue(Conservative::default());
    run_queue(Conservative::new(0.75, Boundary::Exclusive));
    run_queue(Conservative::new(0.25, Boundary::Inclusive));
}

#[test]
fn test_deque_naive() {
    init_logger();
    run_deque(Naive);
}

#[test]
fn test_deque_reclaiming() {
    init_logger();
    run_deque(Reclaiming);
}

#[test]
fn test_deque_conservative() {
    init_logger();
    run_deque(Conservative::default());
    run_deque(Conservative::new(0.9, Boundary::Inclusive));
}

#[test]
fn test_baselines() {
    init_logger();
    for seed in SEEDS {
        run(Vec::<u32>::new(), seed, |_| ());
        run(VecDeque::<u32>::new(), seed, |_| ());
        run(LinkedList::<u32>::new(), seed, |_| ());
        run(SmallVec::<[u32; 8]>::new(), seed, |_| ());
    }
}
