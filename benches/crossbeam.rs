use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use crossbeam::queue::ArrayQueue;

/// The size of the queue to use
pub const SCALE_QUEUE_SIZE: usize = 256;
/// The number of messages
pub const SCALE_MSG_COUNT: usize = 1_000_000;
/// The number of producers in a multiple producers, single consumer test
pub const SCALE_PRODUCERS: usize = 5;

fn crossbeam_spsc() {
    let (sender, receiver) = crossbeam::channel::bounded(SCALE_QUEUE_SIZE);

    let consumer = std::thread::spawn({
        move || {
            for i in 0..SCALE_MSG_COUNT {
                loop {
                    if let Ok(value) = receiver.recv() {
                        assert_eq!(i, value);
                        break;
                    }
                }
            }
        }
    });

    for i in 0..SCALE_MSG_COUNT {
        while sender.send(i).is_err() {}
    }

    consumer.join().unwrap();
}

fn array_queue_mpsc() {
    let queue = Arc::new(ArrayQueue::new(SCALE_QUEUE_SIZE));
    let producers = (0..SCALE_PRODUCERS)
        .map(|p| {
            let queue = queue.clone();
            std::thread::spawn(move || {
                for i in 0..(SCALE_MSG_COUNT / SCALE_PRODUCERS) {
                    while queue.push((p * SCALE_MSG_COUNT / SCALE_PRODUCERS) + i).is_err() {}
                }
            })
        })
        .collect::<Vec<_>>();

    let mut count = 0;
    while count < SCALE_MSG_COUNT {
        if queue.pop().is_some() {
            count += 1;
        }
    }

    for producer in producers {
        producer.join().unwrap();
    }
}

pub fn bench_crossbeam(c: &mut Criterion) {
    let mut group = c.benchmark_group("crossbeam");
    group.throughput(Throughput::Elements(SCALE_MSG_COUNT as u64));
    group.bench_function("crossbeam_spsc", |b| b.iter(crossbeam_spsc));
    group.bench_function("array_queue_mpsc", |b| b.iter(array_queue_mpsc));
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(10);
    targets = bench_crossbeam
);
criterion_main!(benches);
