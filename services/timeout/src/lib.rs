#![cfg_attr(target_os = "none", no_std)]

//! Software timeout channels over a periodic timer tick.
//!
//! [`Timeout::tick`] is called from a periodic timer interrupt (AST
//! periodic event on UC3, RTC32 compare on XMEGA); everything else runs
//! from thread context. A channel counts down on each tick, raises its
//! expired flag at zero and, if periodic, reloads itself.
//!
//! Channel state lives behind a critical-section mutex so a tick landing
//! mid-update cannot see a half-written channel.

use core::cell::RefCell;

use critical_section::Mutex;

#[derive(Copy, Clone)]
struct Channel {
    /// Ticks until expiry; zero means the channel is idle.
    count: u32,
    /// Reload value; zero makes the channel single-shot.
    period: u32,
}

struct State<const N: usize> {
    channels: [Channel; N],
    expired: u32,
}

/// `N` timeout channels sharing one tick source. `N` is capped at 32 by
/// the expiry bitmask.
pub struct Timeout<const N: usize = 8> {
    state: Mutex<RefCell<State<N>>>,
}

impl<const N: usize> Timeout<N> {
    pub const fn new() -> Self {
        assert!(N <= 32);
        Timeout {
            state: Mutex::new(RefCell::new(State {
                channels: [Channel { count: 0, period: 0 }; N],
                expired: 0,
            })),
        }
    }

    /// Fire once after `ticks`.
    pub fn start_singleshot(&self, id: usize, ticks: u32) {
        self.start_offset(id, 0, ticks)
    }

    /// Fire every `period` ticks, first expiry one full period out.
    pub fn start_periodic(&self, id: usize, period: u32) {
        self.start_offset(id, period, period)
    }

    /// Fire after `start` ticks, then every `period`. Lets several
    /// periodic channels share a tick without expiring in lockstep.
    pub fn start_offset(&self, id: usize, period: u32, start: u32) {
        debug_assert!(id < N);
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            state.channels[id] = Channel { count: start, period };
            state.expired &= !(1 << id);
        });
    }

    pub fn stop(&self, id: usize) {
        debug_assert!(id < N);
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            state.channels[id].count = 0;
            state.expired &= !(1 << id);
        });
    }

    /// True exactly once per expiry.
    pub fn test_and_clear_expired(&self, id: usize) -> bool {
        debug_assert!(id < N);
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            let hit = state.expired & (1 << id) != 0;
            state.expired &= !(1 << id);
            hit
        })
    }

    /// Advance every live channel by one tick. Call from the timer ISR.
    pub fn tick(&self) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            for id in 0..N {
                let ch = &mut state.channels[id];
                if ch.count == 0 {
                    continue;
                }
                ch.count -= 1;
                if ch.count == 0 {
                    ch.count = ch.period;
                    state.expired |= 1 << id;
                }
            }
        });
    }
}

impl<const N: usize> Default for Timeout<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_n<const N: usize>(t: &Timeout<N>, n: u32) {
        for _ in 0..n {
            t.tick();
        }
    }

    #[test]
    fn singleshot_fires_once() {
        let t: Timeout<4> = Timeout::new();
        t.start_singleshot(0, 3);
        tick_n(&t, 2);
        assert!(!t.test_and_clear_expired(0));
        t.tick();
        assert!(t.test_and_clear_expired(0));
        // consumed, and the channel went idle
        assert!(!t.test_and_clear_expired(0));
        tick_n(&t, 10);
        assert!(!t.test_and_clear_expired(0));
    }

    #[test]
    fn periodic_reloads_every_period() {
        let t: Timeout<4> = Timeout::new();
        t.start_periodic(1, 2);
        for _ in 0..3 {
            t.tick();
            assert!(!t.test_and_clear_expired(1));
            t.tick();
            assert!(t.test_and_clear_expired(1));
        }
    }

    #[test]
    fn offset_shifts_only_the_first_expiry() {
        let t: Timeout<4> = Timeout::new();
        t.start_offset(2, 4, 1);
        t.tick();
        assert!(t.test_and_clear_expired(2));
        tick_n(&t, 3);
        assert!(!t.test_and_clear_expired(2));
        t.tick();
        assert!(t.test_and_clear_expired(2));
    }

    #[test]
    fn stop_discards_a_pending_expiry() {
        let t: Timeout<4> = Timeout::new();
        t.start_singleshot(3, 1);
        t.tick();
        t.stop(3);
        assert!(!t.test_and_clear_expired(3));
    }

    #[test]
    fn channels_do_not_interfere() {
        let t: Timeout<4> = Timeout::new();
        t.start_singleshot(0, 1);
        t.start_periodic(1, 3);
        t.tick();
        assert!(t.test_and_clear_expired(0));
        assert!(!t.test_and_clear_expired(1));
        tick_n(&t, 2);
        assert!(t.test_and_clear_expired(1));
        assert!(!t.test_and_clear_expired(0));
    }

    #[test]
    fn restart_clears_a_stale_flag() {
        let t: Timeout<4> = Timeout::new();
        t.start_singleshot(0, 1);
        t.tick();
        t.start_singleshot(0, 5);
        assert!(!t.test_and_clear_expired(0));
    }
}
