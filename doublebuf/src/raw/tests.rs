#![allow(clippy::arithmetic_side_effects)]

use super::DoubleBufferAtomic;
use crate::{state::Status, storage::Inline, storage::Storage};

#[cfg(feature = "alloc")]
use crate::storage::Boxed;

fn handoff_scenario<S: Storage>() {
    let mut state = DoubleBufferAtomic::<_, S>::with_buffers("front", "back");
    let (mut producer, mut consumer) = state.split();

    assert_eq!(producer.status(), Status::Idle);
    assert_eq!(producer.front_index(), 0);

    assert!(producer.update_buffers(|back| {
        assert_eq!(*back, "back");
        *back = "back2"
    }));
    assert_eq!(producer.status(), Status::Done);
    assert_eq!(*consumer.front(), "front");

    let swap = consumer.swap_buffers();
    assert!(swap.swapped);
    assert_eq!(*swap.front, "back2");
    assert_eq!(consumer.front_index(), 1);
    assert_eq!(consumer.status(), Status::Idle);

    let swap = consumer.swap_buffers();
    assert!(!swap.swapped);
    assert_eq!(*swap.front, "back2");
    assert_eq!(consumer.front_index(), 1);

    drop((producer, consumer));

    let (front, back) = state.into_buffers();
    assert_eq!((front, back), ("back2", "front"));
}

#[test]
fn handoff_inline() {
    handoff_scenario::<Inline>()
}

#[test]
#[cfg(feature = "alloc")]
fn handoff_boxed() {
    handoff_scenario::<Boxed>()
}

fn rejected_calls_are_idempotent<S: Storage>() {
    let mut state = DoubleBufferAtomic::<_, S>::with_buffers(0, 1);
    let (mut producer, mut consumer) = state.split();

    for _ in 0..10 {
        let swap = consumer.swap_buffers();
        assert!(!swap.swapped);
        assert_eq!(*swap, 0);
        assert!(!consumer.has_update());
    }

    assert!(producer.update_buffers(|back| *back = 10));

    for _ in 0..10 {
        let mut called = false;
        assert!(!producer.update_buffers(|back| {
            called = true;
            *back = 20;
        }));
        assert!(!called);
        assert!(!producer.is_idle());
        assert_eq!(producer.status(), Status::Done);
    }

    assert_eq!(*consumer.front(), 0);
    assert!(consumer.swap_buffers().swapped);
    assert_eq!(*consumer.front(), 10);

    drop((producer, consumer));

    assert_eq!(*state.back_mut(), 0);
}

#[test]
fn rejected_calls_are_idempotent_inline() {
    rejected_calls_are_idempotent::<Inline>()
}

#[test]
#[cfg(feature = "alloc")]
fn rejected_calls_are_idempotent_boxed() {
    rejected_calls_are_idempotent::<Boxed>()
}

#[test]
fn two_cycles_alternate_slots() {
    let mut state = DoubleBufferAtomic::<u32>::new(3);
    let (mut producer, mut consumer) = state.split();

    // the back buffer still holds its initial value, so each update sees the
    // value from two swaps ago
    assert!(producer.update_buffers(|back| *back += 1));
    assert_eq!(*consumer.swap_buffers(), 4);
    assert_eq!(consumer.front_index(), 1);

    assert!(producer.update_buffers(|back| *back *= 10));
    assert_eq!(*consumer.swap_buffers(), 30);
    assert_eq!(consumer.front_index(), 0);

    assert!(producer.update_buffers(|back| *back += 1));
    assert_eq!(*consumer.swap_buffers(), 5);

    drop((producer, consumer));

    let split = state.split_mut();
    assert_eq!((*split.front, *split.back), (5, 30));
}

#[test]
fn try_update_returns_the_result() {
    let mut state = DoubleBufferAtomic::<u32>::default();
    let (mut producer, mut consumer) = state.split();

    assert_eq!(producer.try_update(|back| core::mem::replace(back, 7)), Some(0));
    assert_eq!(producer.try_update(|back| *back), None);

    assert_eq!(consumer.swap_buffers().into_parts(), (&7, true));
}

#[test]
fn exclusive_accessors() {
    let mut state = DoubleBufferAtomic::<u32>::from((1, 2));

    *state.front_mut() += 10;
    *state.back_mut() += 20;

    assert_eq!(state.status(), Status::Idle);
    assert_eq!(state.into_buffers(), (11, 22));
}

#[test]
fn unchecked_accessors() {
    let state = DoubleBufferAtomic::<u32>::with_buffers(1, 2);

    // SAFETY: there is no producer or consumer
    unsafe {
        assert_eq!(*state.front_unchecked(), 1);
        assert_eq!(*state.back_unchecked(), 2);

        assert!(state.update_buffers(|back| *back = 3));
        assert_eq!(*state.back_unchecked(), 3);
        assert!(state.swap_buffers().swapped);

        assert_eq!(*state.front_unchecked(), 3);
        assert_eq!(*state.back_unchecked(), 1);
    }
}

#[test]
#[cfg(feature = "std")]
fn panicking_update_leaves_buffer_idle() {
    use core::panic::AssertUnwindSafe;
    use std::panic::catch_unwind;

    let mut state = DoubleBufferAtomic::<u32>::with_buffers(1, 2);
    let (mut producer, mut consumer) = state.split();

    let result = catch_unwind(AssertUnwindSafe(|| {
        producer.update_buffers(|back| {
            *back = 99;
            panic!("update failed")
        })
    }));
    assert!(result.is_err());

    assert_eq!(producer.status(), Status::Idle);
    assert!(!consumer.swap_buffers().swapped);
    assert_eq!(*consumer.front(), 1);

    assert!(producer.update_buffers(|back| {
        assert_eq!(*back, 99);
        *back = 3;
    }));
    assert_eq!(*consumer.swap_buffers(), 3);
}

#[test]
#[cfg(feature = "std")]
fn producer_consumer_threads_never_see_torn_buffers() {
    const LEN: usize = 64;
    const GENERATIONS: u64 = 2_000;

    let mut state = DoubleBufferAtomic::<[u64; LEN]>::new([0; LEN]);
    let (mut producer, mut consumer) = state.split();

    std::thread::scope(|s| {
        s.spawn(move || {
            let mut generation = 1;
            while generation <= GENERATIONS {
                if producer.update_buffers(|back| back.fill(generation)) {
                    generation += 1;
                } else {
                    std::thread::yield_now();
                }
            }
        });

        s.spawn(move || {
            let mut last = 0;
            while last < GENERATIONS {
                let swap = consumer.swap_buffers();
                let front = swap.front;

                assert!(front.iter().all(|&x| x == front[0]), "torn front buffer");
                assert!(front[0] >= last);

                if swap.swapped {
                    assert_eq!(front[0], last + 1);
                }

                last = front[0];

                if !swap.swapped {
                    std::thread::yield_now();
                }
            }
        });
    });

    let (front, back) = state.into_buffers();
    assert_eq!(front, [GENERATIONS; LEN]);
    assert_eq!(back, [GENERATIONS - 1; LEN]);
}

#[test]
#[cfg(feature = "std")]
fn fan_out_readers_share_the_front() {
    let mut state = DoubleBufferAtomic::<alloc::vec::Vec<u32>>::new(alloc::vec::Vec::new());
    let (mut producer, mut consumer) = state.split();

    assert!(producer.update_buffers(|back| back.extend(0..100)));
    assert!(consumer.swap_buffers().swapped);

    let consumer = &consumer;
    let sums = std::thread::scope(|s| {
        let readers: alloc::vec::Vec<_> = (0..4)
            .map(|_| s.spawn(move || consumer.front().iter().sum::<u32>()))
            .collect();

        // the producer is free to prepare the next buffer while the readers run
        assert!(producer.update_buffers(|back| back.push(1)));

        readers
            .into_iter()
            .map(|reader| reader.join().unwrap())
            .collect::<alloc::vec::Vec<_>>()
    });

    assert_eq!(sums, [4950; 4]);
}

#[test]
fn swap_during_update_keeps_the_front() {
    let mut state = DoubleBufferAtomic::<u32>::with_buffers(1, 2);
    let (mut producer, mut consumer) = state.split();

    assert!(producer.update_buffers(|back| {
        *back = 3;

        let swap = consumer.swap_buffers();
        assert!(!swap.swapped);
        assert_eq!(*swap.front, 1);
        assert_eq!(consumer.status(), Status::Updating);
        assert_eq!(consumer.front_index(), 0);
    }));

    let swap = consumer.swap_buffers();
    assert!(swap.swapped);
    assert_eq!(*swap.front, 3);
}
