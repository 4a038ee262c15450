use std::{
    hint::black_box,
    sync::{Mutex, PoisonError},
    time::Instant,
};

use doublebuf::{DoubleBufferAtomic, Storage};
use eyre::eyre;
use tracing::debug;

use crate::config::{Backend, RunConfig};

#[derive(serde::Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RunReport {
    pub name: String,
    pub backend: Backend,
    pub elapsed_secs: f64,
    pub update_attempts: u64,
    pub updates: u64,
    pub swap_attempts: u64,
    pub swaps: u64,
    pub torn_reads: u64,
}

#[derive(Default)]
struct ProducerStats {
    attempts: u64,
    updates: u64,
}

#[derive(Default)]
struct ConsumerStats {
    attempts: u64,
    swaps: u64,
    torn_reads: u64,
}

pub fn run(entry: &RunConfig) -> eyre::Result<RunReport> {
    match entry.backend {
        Backend::Inline => run_double_buffer::<doublebuf::Inline>(entry),
        Backend::Boxed => run_double_buffer::<doublebuf::Boxed>(entry),
        Backend::Mutex => run_mutex(entry),
    }
}

fn spin(max: u32) {
    if max != 0 {
        for _ in 0..rand::random_range(0..=max) {
            std::hint::spin_loop()
        }
    }
}

/// Check that every element of `front` belongs to the same generation, and that
/// it isn't older than the last one seen
fn check_front(front: &[u64], last: u64) -> Result<u64, u64> {
    let generation = front[0];
    let newest = front.iter().copied().max().unwrap_or(generation);

    if generation < last || front.iter().any(|&x| x != generation) {
        Err(newest.max(last))
    } else {
        Ok(generation)
    }
}

fn report(
    entry: &RunConfig,
    start: Instant,
    producer: ProducerStats,
    consumer: ConsumerStats,
) -> RunReport {
    RunReport {
        name: entry.name.clone(),
        backend: entry.backend,
        elapsed_secs: start.elapsed().as_secs_f64(),
        update_attempts: producer.attempts,
        updates: producer.updates,
        swap_attempts: consumer.attempts,
        swaps: consumer.swaps,
        torn_reads: consumer.torn_reads,
    }
}

fn run_double_buffer<S: Storage>(entry: &RunConfig) -> eyre::Result<RunReport> {
    debug!(name = %entry.name, "{}", core::any::type_name::<S>());

    let start = Instant::now();
    let mut state = DoubleBufferAtomic::<Vec<u64>, S>::new(vec![0; entry.buffer_len]);
    let (mut producer, mut consumer) = state.split();

    let (producer, consumer) = std::thread::scope(|s| {
        let producer = s.spawn(move || {
            let mut stats = ProducerStats::default();
            let mut generation = 1;

            while generation <= entry.updates {
                stats.attempts += 1;
                if producer.update_buffers(|back| back.fill(generation)) {
                    stats.updates += 1;
                    generation += 1;
                }
                spin(entry.producer_spin);
            }

            debug!("PRODUCER COMPLETE {}", entry.name);
            stats
        });

        let consumer = s.spawn(move || {
            let mut stats = ConsumerStats::default();
            let mut last = 0;

            while last < entry.updates {
                stats.attempts += 1;

                let swap = consumer.swap_buffers();
                if swap.swapped {
                    stats.swaps += 1;
                }

                match check_front(black_box(swap.front), last) {
                    Ok(generation) => last = generation,
                    Err(generation) => {
                        stats.torn_reads += 1;
                        last = generation;
                    }
                }

                spin(entry.consumer_spin);
            }

            debug!("CONSUMER COMPLETE {}", entry.name);
            stats
        });

        (producer.join(), consumer.join())
    });

    let producer = producer.map_err(|_| eyre!("producer thread of {:?} panicked", entry.name))?;
    let consumer = consumer.map_err(|_| eyre!("consumer thread of {:?} panicked", entry.name))?;

    Ok(report(entry, start, producer, consumer))
}

/// A locked buffer for comparison, the consumer reads whatever is in it
fn run_mutex(entry: &RunConfig) -> eyre::Result<RunReport> {
    debug!(name = %entry.name, "mutex");

    let start = Instant::now();
    let buffer = &Mutex::new(vec![0u64; entry.buffer_len]);

    let (producer, consumer) = std::thread::scope(|s| {
        let producer = s.spawn(move || {
            let mut stats = ProducerStats::default();

            for generation in 1..=entry.updates {
                stats.attempts += 1;
                buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .fill(generation);
                stats.updates += 1;
                spin(entry.producer_spin);
            }

            debug!("PRODUCER COMPLETE {}", entry.name);
            stats
        });

        let consumer = s.spawn(move || {
            let mut stats = ConsumerStats::default();
            let mut last = 0;

            while last < entry.updates {
                stats.attempts += 1;

                let front = buffer.lock().unwrap_or_else(PoisonError::into_inner);
                match check_front(black_box(&front), last) {
                    Ok(generation) => {
                        if generation != last {
                            stats.swaps += 1;
                        }
                        last = generation;
                    }
                    Err(generation) => {
                        stats.torn_reads += 1;
                        last = generation;
                    }
                }
                drop(front);

                spin(entry.consumer_spin);
            }

            debug!("CONSUMER COMPLETE {}", entry.name);
            stats
        });

        (producer.join(), consumer.join())
    });

    let producer = producer.map_err(|_| eyre!("producer thread of {:?} panicked", entry.name))?;
    let consumer = consumer.map_err(|_| eyre!("consumer thread of {:?} panicked", entry.name))?;

    Ok(report(entry, start, producer, consumer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(backend: Backend) -> RunConfig {
        RunConfig {
            name: format!("{backend:?}"),
            backend,
            buffer_len: 32,
            updates: 200,
            producer_spin: 8,
            consumer_spin: 8,
        }
    }

    #[test]
    fn check_front_detects_torn_and_stale_buffers() {
        assert_eq!(check_front(&[3, 3, 3], 2), Ok(3));
        assert_eq!(check_front(&[3, 3, 3], 3), Ok(3));
        assert_eq!(check_front(&[3, 4, 3], 2), Err(4));
        assert_eq!(check_front(&[1, 1, 1], 2), Err(2));
    }

    #[test]
    fn double_buffer_backends_publish_every_generation() {
        for backend in [Backend::Inline, Backend::Boxed] {
            let report = run(&entry(backend)).unwrap();

            assert_eq!(report.updates, 200);
            assert_eq!(report.swaps, 200);
            assert_eq!(report.torn_reads, 0);
            assert!(report.update_attempts >= report.updates);
            assert!(report.swap_attempts >= report.swaps);
        }
    }

    #[test]
    fn mutex_backend_has_no_torn_reads() {
        let report = run(&entry(Backend::Mutex)).unwrap();

        assert_eq!(report.updates, 200);
        assert_eq!(report.torn_reads, 0);
        assert!(report.swaps <= 200);
    }
}
