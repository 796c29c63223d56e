//! Checks the cost and memory behaviour that distinguishes the growth
//! policies on the workload drivers.
use policy_deque::workload;
use policy_deque::workload::Element;
use policy_deque::workload::Large;
use policy_deque::workload::Small;
use policy_deque::DequeConservative;
use policy_deque::DequeNaive;
use policy_deque::DequeReclaiming;
use policy_deque::DoubleEnded;
use policy_deque::QueueConservative;
use policy_deque::QueueNaive;
use policy_deque::QueueReclaiming;
use policy_deque::QUEUE_PRELOAD;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn keys<C>(container: &C) -> Vec<i32>
where
    C: DoubleEnded,
    C::Item: Element,
{
    container
        .snapshot()
        .expect("in bounds")
        .iter()
        .map(Element::key)
        .collect()
}

fn check_fifo_and_lifo<C>()
where
    C: DoubleEnded<Item = u32> + Default,
{
    let mut container = C::default();

    // Back pushes undone by back pops, over some prior contents.
    container.try_push_front(1000).expect("small allocation");
    container.try_push_back(1001).expect("small allocation");
    for i in 0..100 {
        container.try_push_back(i).expect("small allocation");
    }
    for i in (0..100).rev() {
        assert_eq!(container.pop_back(), Ok(i));
    }
    assert_eq!(container.snapshot(), Ok(vec![1000, 1001]));
    assert_eq!(container.pop_back(), Ok(1001));
    assert_eq!(container.pop_back(), Ok(1000));
    assert!(container.is_empty());

    for i in 0..100 {
        container.try_push_back(i).expect("small allocation");
    }
    for i in 0..100 {
        assert_eq!(container.pop_front(), Ok(i));
    }
    assert!(container.is_empty());

    for i in 0..100 {
        container.try_push_front(i).expect("small allocation");
    }
    for i in (0..100).rev() {
        assert_eq!(container.pop_front(), Ok(i));
    }
    assert!(container.pop_front().is_err());

    for i in 0..100 {
        container.try_push_front(i).expect("small allocation");
    }
    for i in 0..100 {
        assert_eq!(container.pop_back(), Ok(i));
    }
    assert!(container.pop_back().is_err());
}

#[test]
fn test_round_trips() {
    init_logger();
    check_fifo_and_lifo::<QueueNaive<u32>>();
    check_fifo_and_lifo::<QueueReclaiming<u32>>();
    check_fifo_and_lifo::<QueueConservative<u32>>();
    check_fifo_and_lifo::<DequeNaive<u32>>();
    check_fifo_and_lifo::<DequeReclaiming<u32>>();
    check_fifo_and_lifo::<DequeConservative<u32>>();
}

macro_rules! check_reserved_fill {
    ($container:ty, $n:expr) => {{
        let n: usize = $n;

        let mut container = <$container>::new();
        container.reserve_back(n).expect("small allocation");
        let capacity = container.capacity();
        container.reserve_back(n).expect("small allocation");
        assert_eq!(container.capacity(), capacity);
        for i in 0..n {
            container.push_back(i as u32);
        }
        assert_eq!(container.capacity(), capacity);

        let mut container = <$container>::new();
        container.reserve_front(n).expect("small allocation");
        let capacity = container.capacity();
        for i in 0..n {
            container.push_front(i as u32);
        }
        assert_eq!(container.capacity(), capacity);
        assert_eq!(container.front(), Some(&((n - 1) as u32)));
    }};
}

#[test]
fn test_reserve_then_fill_does_not_reallocate() {
    init_logger();
    check_reserved_fill!(QueueNaive<u32>, 100);
    check_reserved_fill!(QueueReclaiming<u32>, 100);
    check_reserved_fill!(QueueConservative<u32>, 100);
    check_reserved_fill!(DequeNaive<u32>, 100);
    check_reserved_fill!(DequeReclaiming<u32>, 100);
    check_reserved_fill!(DequeConservative<u32>, 100);
}

#[test]
fn test_fill_back_copies() {
    init_logger();
    let n = 4096;

    // Doubling from 1 copies 1 + 2 + ... + n/2.
    let reclaiming: QueueReclaiming<Small> = workload::fill_back(n).expect("small allocation");
    assert_eq!(reclaiming.copied_elements(), n - 1);

    let conservative: QueueConservative<Small> =
        workload::fill_back(n).expect("small allocation");
    assert_eq!(conservative.copied_elements(), n - 1);

    // Growing one slot at a time copies every prefix.
    let naive: QueueNaive<Small> = workload::fill_back(n).expect("small allocation");
    assert_eq!(naive.copied_elements(), n * (n - 1) / 2);

    let reserved: QueueNaive<Small> = workload::fill_back_reserved(n).expect("small allocation");
    assert_eq!(reserved.copied_elements(), 0);
}

#[test]
fn test_queue_copies_are_linear_unless_naive() {
    init_logger();
    let n = 20_000;
    let bound = 4 * (n + QUEUE_PRELOAD);

    let reclaiming: QueueReclaiming<Small> = workload::queue(n).expect("small allocation");
    assert!(reclaiming.copied_elements() <= bound);

    let conservative: QueueConservative<Small> = workload::queue(n).expect("small allocation");
    assert!(conservative.copied_elements() <= bound);

    let deque: DequeConservative<Small> = workload::queue(n).expect("small allocation");
    assert!(deque.copied_elements() <= bound);

    // Every pop_front shifts the whole queue down.
    let naive: QueueNaive<Small> = workload::queue(n).expect("small allocation");
    assert!(naive.copied_elements() >= (n / 2) * (QUEUE_PRELOAD - 1));
    assert!(naive.copied_elements() > 10 * bound);

    assert_eq!(keys(&naive), keys(&conservative));
}

#[test]
fn test_zigzag_copies_are_linear_unless_naive() {
    init_logger();
    let n = 8_000;

    let reclaiming: DequeReclaiming<Small> = workload::zigzag(n).expect("small allocation");
    assert!(reclaiming.copied_elements() <= 4 * n);

    let conservative: DequeConservative<Small> = workload::zigzag(n).expect("small allocation");
    assert!(conservative.copied_elements() <= 4 * n);

    // Draining across the split shifts the other region on every pop.
    let naive: DequeNaive<Small> = workload::zigzag(n).expect("small allocation");
    assert!(naive.copied_elements() > 4 * n);
}

#[test]
fn test_queue_load_factor_ordering() {
    init_logger();
    let n = 10_000;

    let naive = workload::queue_load_factor::<QueueNaive<Small>>(n)
        .expect("small allocation")
        .expect("has a load factor");
    let reclaiming = workload::queue_load_factor::<QueueReclaiming<Small>>(n)
        .expect("small allocation")
        .expect("has a load factor");
    let conservative = workload::queue_load_factor::<QueueConservative<Small>>(n)
        .expect("small allocation")
        .expect("has a load factor");

    assert!(naive > 0.99, "naive={}", naive);
    // Reclaiming never reuses the front slack for back pushes, so its
    // buffer keeps doubling.
    assert!(conservative > reclaiming, "conservative={} reclaiming={}", conservative, reclaiming);
    assert!(conservative >= 0.45, "conservative={}", conservative);
}

#[test]
fn test_zigzag_load_factor_bounds() {
    init_logger();
    let n = 4_000;

    for load in [
        workload::zigzag_load_factor::<DequeNaive<Small>>(n),
        workload::zigzag_load_factor::<DequeReclaiming<Small>>(n),
        workload::zigzag_load_factor::<DequeConservative<Small>>(n),
        workload::fill_front_load_factor::<DequeConservative<Small>>(n),
        workload::fill_back_load_factor::<Vec<Small>>(n),
    ] {
        let load = load.expect("small allocation").expect("has a load factor");
        assert!((0.0..=1.0).contains(&load), "load={}", load);
    }
}

#[test]
fn test_random_access_workloads() {
    init_logger();
    let n = 500;

    let mut deque: DequeConservative<Large> = workload::fill_front(n).expect("small allocation");
    let mut queue: QueueReclaiming<Large> = workload::fill_back(n).expect("small allocation");

    workload::traverse(&mut deque).expect("in bounds");
    workload::traverse(&mut queue).expect("in bounds");

    workload::shuffle(&mut deque, 1).expect("in bounds");
    workload::shuffle(&mut queue, 1).expect("in bounds");

    workload::quicksort(&mut deque).expect("in bounds");
    workload::quicksort(&mut queue).expect("in bounds");

    let expected: Vec<i32> = (1..=n as i32).collect();
    assert_eq!(keys(&deque), expected);
    assert_eq!(keys(&queue), expected);
}
