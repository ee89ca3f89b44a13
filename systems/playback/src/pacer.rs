use std::{thread, time::Duration};

/// Suspends playback between consecutive inputs.
pub trait Pacer {
    /// Waits for `delay` before the next input is considered.
    fn suspend(&mut self, delay: Duration);
}

/// Pacer that blocks the current thread for the full delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn suspend(&mut self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

/// Pacer that returns immediately, used for grading runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantPacer;

impl Pacer for InstantPacer {
    fn suspend(&mut self, _delay: Duration) {}
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn suspend(&mut self, delay: Duration) {
        (**self).suspend(delay);
    }
}
