use std::collections::LinkedList;
use std::collections::VecDeque;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use policy_deque::workload;
use policy_deque::workload::{Element, Large, Medium, Small};
use policy_deque::{
    DequeConservative, DequeNaive, DequeReclaiming, DoubleEnded, QueueConservative, QueueNaive,
    QueueReclaiming,
};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];
// Naive front pops and LinkedList indexing are quadratic; keep them small.
const QUADRATIC_SIZES: [usize; 2] = [1_000, 10_000];
const SHUFFLE_SEED: u64 = 0x5eed;

/// Benches `$driver::<$container>(n)` for every container type listed.
macro_rules! bench_fill {
    ($c:expr, $name:literal, $driver:path, $sizes:expr, [$($container:ty),+ $(,)?]) => {{
        let mut group = $c.benchmark_group($name);
        for n in $sizes {
            $(
                group.bench_with_input(
                    BenchmarkId::new(stringify!($container), n),
                    &n,
                    |b, &n| b.iter(|| {
                        let ret: $container = $driver(black_box(n)).expect("allocation");
                        ret
                    }),
                );
            )+
        }
        group.finish();
    }};
}

/// Fills each container from the back, then times the traversal,
/// shuffle and sort passes on it.
macro_rules! bench_random_access {
    ($c:expr, $name:literal, $sizes:expr, [$($container:ty),+ $(,)?]) => {{
        let mut group = $c.benchmark_group($name);
        for n in $sizes {
            $(
                group.bench_with_input(
                    BenchmarkId::new(stringify!($container), n),
                    &n,
                    |b, &n| {
                        let mut container: $container =
                            workload::fill_back(n).expect("allocation");
                        b.iter(|| random_access(&mut container))
                    },
                );
            )+
        }
        group.finish();
    }};
}

fn random_access<C>(container: &mut C)
where
    C: DoubleEnded,
    C::Item: Element,
{
    workload::traverse(container).expect("in bounds");
    workload::shuffle(container, SHUFFLE_SEED).expect("in bounds");
    workload::quicksort(container).expect("in bounds");
}

fn bench_fill_back(c: &mut Criterion) {
    bench_fill!(c, "fill_back", workload::fill_back, SIZES, [
        QueueReclaiming<Small>,
        QueueConservative<Small>,
        DequeReclaiming<Small>,
        DequeConservative<Small>,
        Vec<Small>,
        VecDeque<Small>,
        LinkedList<Small>,
    ]);
    bench_fill!(c, "fill_back (naive)", workload::fill_back, QUADRATIC_SIZES, [
        QueueNaive<Small>,
        DequeNaive<Small>,
    ]);
    bench_fill!(c, "fill_back_reserved", workload::fill_back_reserved, SIZES, [
        QueueNaive<Medium>,
        QueueReclaiming<Medium>,
        QueueConservative<Medium>,
        DequeNaive<Medium>,
        DequeReclaiming<Medium>,
        DequeConservative<Medium>,
        Vec<Medium>,
        VecDeque<Medium>,
    ]);
}

fn bench_fill_front(c: &mut Criterion) {
    bench_fill!(c, "fill_front", workload::fill_front, SIZES, [
        QueueReclaiming<Small>,
        QueueConservative<Small>,
        DequeReclaiming<Small>,
        DequeConservative<Small>,
        VecDeque<Small>,
        LinkedList<Small>,
    ]);
    bench_fill!(c, "fill_front (quadratic)", workload::fill_front, QUADRATIC_SIZES, [
        QueueNaive<Small>,
        DequeNaive<Small>,
        Vec<Small>,
    ]);
    bench_fill!(c, "fill_front_reserved", workload::fill_front_reserved, SIZES, [
        QueueReclaiming<Medium>,
        QueueConservative<Medium>,
        DequeNaive<Medium>,
        DequeReclaiming<Medium>,
        DequeConservative<Medium>,
        VecDeque<Medium>,
    ]);
}

fn bench_queue(c: &mut Criterion) {
    bench_fill!(c, "queue", workload::queue, SIZES, [
        QueueReclaiming<Small>,
        QueueConservative<Small>,
        DequeReclaiming<Small>,
        DequeConservative<Small>,
        VecDeque<Small>,
        LinkedList<Small>,
    ]);
    bench_fill!(c, "queue (quadratic)", workload::queue, QUADRATIC_SIZES, [
        QueueNaive<Small>,
        DequeNaive<Small>,
        Vec<Small>,
    ]);
}

fn bench_zigzag(c: &mut Criterion) {
    bench_fill!(c, "zigzag", workload::zigzag, SIZES, [
        DequeReclaiming<Large>,
        DequeConservative<Large>,
        VecDeque<Large>,
        LinkedList<Large>,
    ]);
    bench_fill!(c, "zigzag (single region)", workload::zigzag, QUADRATIC_SIZES, [
        QueueReclaiming<Large>,
        QueueConservative<Large>,
        DequeNaive<Large>,
        Vec<Large>,
    ]);
}

fn bench_random(c: &mut Criterion) {
    bench_random_access!(c, "traverse+shuffle+quicksort", SIZES, [
        QueueReclaiming<Small>,
        QueueConservative<Small>,
        DequeReclaiming<Small>,
        DequeConservative<Small>,
        Vec<Small>,
        VecDeque<Small>,
    ]);
    bench_random_access!(c, "traverse+shuffle+quicksort (naive)", QUADRATIC_SIZES, [
        QueueNaive<Small>,
        DequeNaive<Small>,
    ]);
    bench_random_access!(c, "traverse+shuffle+quicksort (list)", [1_000usize], [
        LinkedList<Small>,
    ]);
}

fn report_load_factors(_c: &mut Criterion) {
    let n = 100_000;
    macro_rules! report {
        ($($container:ty),+ $(,)?) => {
            $(
                let name = stringify!($container);
                let fill_back = workload::fill_back_load_factor::<$container>(n);
                let fill_front = workload::fill_front_load_factor::<$container>(n);
                let queue = workload::queue_load_factor::<$container>(n);
                let zigzag = workload::zigzag_load_factor::<$container>(n);
                println!(
                    "load factor {}: fill_back={:?} fill_front={:?} queue={:?} zigzag={:?}",
                    name, fill_back, fill_front, queue, zigzag
                );
            )+
        };
    }

    report!(
        QueueReclaiming<Small>,
        QueueConservative<Small>,
        DequeReclaiming<Small>,
        DequeConservative<Small>,
        VecDeque<Small>,
    );
}

criterion_group!(
    benches,
    bench_fill_back,
    bench_fill_front,
    bench_queue,
    bench_zigzag,
    bench_random,
    report_load_factors
);
criterion_main!(benches);
