//! The handoff state shared by the producer and the consumer
//!
//! The status and the index of the front buffer live in a single atomic byte,
//! so every transition of the protocol is one atomic step and an observer can
//! never see a new front index paired with a stale status.
//!
//! ```text
//!  bit  2 1   0
//!      [status][front]
//! ```
//!
//! The status bits are `00` for [`Status::Idle`], `01` for [`Status::Updating`]
//! and `10` for [`Status::Done`].

use const_fn::const_fn;

use crate::sync::{AtomicU8, Ordering};


const FRONT_MASK: u8 = 0b001;
const STATUS_MASK: u8 = 0b110;

const IDLE: u8 = 0b000;
const UPDATING: u8 = 0b010;
const DONE: u8 = 0b100;

/// The handoff status of the back buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// The back buffer may be written to
    Idle = 0,
    /// The producer is writing to the back buffer
    Updating = 1,
    /// The back buffer is fully written and waiting to be swapped in
    Done = 2,
}

impl Status {
    const fn into_bits(self) -> u8 {
        match self {
            Self::Idle => IDLE,
            Self::Updating => UPDATING,
            Self::Done => DONE,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits & STATUS_MASK {
            IDLE => Self::Idle,
            UPDATING => Self::Updating,
            _ => Self::Done,
        }
    }
}

/// A decoded snapshot of the state word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct State(u8);

impl State {
    #[inline]
    pub(crate) const fn new(status: Status, front: usize) -> Self {
        Self(status.into_bits() | (front as u8 & FRONT_MASK))
    }

    #[inline]
    pub(crate) const fn status(self) -> Status {
        Status::from_bits(self.0)
    }

    #[inline]
    pub(crate) const fn front(self) -> usize {
        (self.0 & FRONT_MASK) as usize
    }

    #[inline]
    pub(crate) const fn back(self) -> usize {
        self.front() ^ 1
    }

    #[inline]
    const fn with_status(self, status: Status) -> Self {
        Self::new(status, self.front())
    }

    #[inline]
    const fn swapped(self) -> Self {
        Self::new(Status::Idle, self.back())
    }
}

pub(crate) struct AtomicState {
    word: AtomicU8,
}

impl AtomicState {
    #[const_fn(cfg(not(loom)))]
    pub(crate) const fn new() -> Self {
        Self {
            word: AtomicU8::new(State::new(Status::Idle, 0).0),
        }
    }

    #[inline]
    pub(crate) fn load(&self, order: Ordering) -> State {
        State(self.word.load(order))
    }

    /// Move from `Idle` to `Updating`, returning the index of the back buffer
    ///
    /// The acquire pairs with the release in [`AtomicState::try_swap`], so every
    /// read of the old front buffer happens before the producer overwrites it.
    #[inline]
    pub(crate) fn try_begin_update(&self) -> Option<usize> {
        let current = self.load(Ordering::Relaxed);

        if current.status() != Status::Idle {
            return None;
        }

        self.word
            .compare_exchange(
                current.0,
                current.with_status(Status::Updating).0,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .ok()
            .map(|_| current.back())
    }

    /// Publish the back buffer written since [`AtomicState::try_begin_update`]
    #[inline]
    pub(crate) fn finish_update(&self, back: usize) {
        self.word
            .store(State::new(Status::Done, back ^ 1).0, Ordering::Release);
    }

    /// Roll back a [`AtomicState::try_begin_update`] whose write did not complete
    #[inline]
    pub(crate) fn abort_update(&self, back: usize) {
        self.word
            .store(State::new(Status::Idle, back ^ 1).0, Ordering::Release);
    }

    /// Move from `Done` to `Idle` and flip the front index
    ///
    /// On success returns the new state, on failure the current state.
    #[inline]
    pub(crate) fn try_swap(&self) -> Result<State, State> {
        let current = self.load(Ordering::Acquire);

        if current.status() != Status::Done {
            return Err(current);
        }

        let next = current.swapped();

        match self.word.compare_exchange(
            current.0,
            next.0,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(next),
            Err(actual) => Err(State(actual)),
        }
    }
}
