#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed, pausable replay of a decoded keystroke log against a world.
//!
//! [`Playback`] feeds one key per step into [`keyplay_world::apply`],
//! suspending through a [`Pacer`] before each step. A shared [`PauseHandle`]
//! halts the loop at the next check; calling [`Playback::run`] again resumes
//! at the stored index.

mod pacer;

use std::{cell::Cell, rc::Rc, time::Duration};

use keyplay_core::{Command, Event, Key};
use keyplay_world::{self as world, query, World};
use tracing::{debug, info};

pub use pacer::{InstantPacer, Pacer, ThreadPacer};

/// Delay between consecutive keys unless configured otherwise.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Shared pause flag observed by a running [`Playback`].
#[derive(Clone, Debug, Default)]
pub struct PauseHandle(Rc<Cell<bool>>);

impl PauseHandle {
    /// Requests that playback halt at its next check. Idempotent.
    pub fn pause(&self) {
        self.0.set(true);
    }

    /// Clears the pause request.
    pub fn resume(&self) {
        self.0.set(false);
    }

    /// Flips the pause request and returns the new state.
    pub fn toggle(&self) -> bool {
        let paused = !self.0.get();
        self.0.set(paused);
        paused
    }

    /// Reports whether a pause is requested.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.0.get()
    }
}

/// Reason a call to [`Playback::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// The pause flag was observed; running again resumes at the same index.
    Paused,
    /// Every key was consumed or the game reached a terminal state.
    Complete,
}

/// Cursor over a recorded key sequence.
#[derive(Debug)]
pub struct Playback {
    keys: Vec<Key>,
    index: usize,
    delay: Duration,
    pause: PauseHandle,
    complete: bool,
}

impl Playback {
    /// Prepares playback of `keys` with the default delay.
    #[must_use]
    pub fn new(keys: Vec<Key>) -> Self {
        Self {
            keys,
            index: 0,
            delay: DEFAULT_DELAY,
            pause: PauseHandle::default(),
            complete: false,
        }
    }

    /// Replaces the delay between consecutive keys.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle that pauses or resumes this playback.
    #[must_use]
    pub fn pause_handle(&self) -> PauseHandle {
        self.pause.clone()
    }

    /// Index of the next key to apply.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of keys in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Reports whether the sequence holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Delay applied between consecutive keys.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Reports whether a pause is requested.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Reports whether playback stopped for good.
    ///
    /// Completion unlocks submission of the log that was replayed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Applies the next key unless playback is paused or complete.
    ///
    /// Returns `true` when a key was consumed.
    pub fn step(&mut self, world: &mut World, out_events: &mut Vec<Event>) -> bool {
        if self.refresh_completion(world) || self.is_paused() {
            return false;
        }
        let Some(&key) = self.keys.get(self.index) else {
            return false;
        };

        world::apply(world, Command::PressKey { key }, out_events);
        self.index += 1;
        debug!(index = self.index, %key, "replayed key");
        let _ = self.refresh_completion(world);
        true
    }

    /// Replays keys until paused, exhausted, or the game ends.
    ///
    /// Every key, the first included, is preceded by one suspension.
    pub fn run<P: Pacer>(
        &mut self,
        world: &mut World,
        pacer: &mut P,
        out_events: &mut Vec<Event>,
    ) -> PlaybackState {
        loop {
            if self.refresh_completion(world) {
                return PlaybackState::Complete;
            }
            if self.is_paused() {
                debug!(index = self.index, "playback paused");
                return PlaybackState::Paused;
            }
            pacer.suspend(self.delay);
            if self.is_paused() {
                debug!(index = self.index, "playback paused during suspension");
                return PlaybackState::Paused;
            }
            let _ = self.step(world, out_events);
        }
    }

    fn refresh_completion(&mut self, world: &World) -> bool {
        if self.complete {
            return true;
        }
        if self.index >= self.keys.len() || query::is_game_over(world) {
            self.complete = true;
            info!(
                consumed = self.index,
                total = self.keys.len(),
                status = %query::status_line(world),
                "playback complete"
            );
        }
        self.complete
    }
}
