#![cfg_attr(target_os = "none", no_std)]

//! Sleep-mode lock manager.
//!
//! A driver that cannot survive a given sleep depth takes a lock on the
//! shallowest mode it tolerates; [`Sleepmgr::enter_sleep`] then picks the
//! deepest mode nobody objects to. Lock counts are kept per mode,
//! shallowest first, and the deepest mode carries a permanent sentinel
//! lock so the scan always terminates.

use core::cell::RefCell;

use critical_section::Mutex;

/// Puts the hardware to sleep at a given mode index. The hosted test
/// controller records the mode instead of sleeping.
pub trait SleepController {
    fn sleep(&mut self, mode: usize);
}

pub struct Sleepmgr<const N: usize> {
    locks: Mutex<RefCell<[u8; N]>>,
}

impl<const N: usize> Sleepmgr<N> {
    pub const fn new() -> Self {
        Sleepmgr { locks: Mutex::new(RefCell::new([0; N])) }
    }

    /// Clear all counts and place the sentinel on the deepest mode.
    pub fn init(&self) {
        critical_section::with(|cs| {
            let mut locks = self.locks.borrow(cs).borrow_mut();
            *locks = [0; N];
            locks[N - 1] = 1;
        });
    }

    /// Veto sleeping deeper than `mode`.
    pub fn lock_mode(&self, mode: usize) {
        critical_section::with(|cs| {
            let mut locks = self.locks.borrow(cs).borrow_mut();
            debug_assert!(locks[mode] < u8::MAX);
            locks[mode] = locks[mode].saturating_add(1);
        });
    }

    pub fn unlock_mode(&self, mode: usize) {
        critical_section::with(|cs| {
            let mut locks = self.locks.borrow(cs).borrow_mut();
            debug_assert!(locks[mode] > 0);
            locks[mode] = locks[mode].saturating_sub(1);
        });
    }

    /// The deepest mode currently permitted: the first locked entry
    /// scanning from the shallow end.
    pub fn deepest_allowed(&self) -> usize {
        critical_section::with(|cs| {
            let locks = self.locks.borrow(cs).borrow();
            locks.iter().position(|&count| count != 0).unwrap_or(N - 1)
        })
    }

    pub fn enter_sleep<C: SleepController>(&self, controller: &mut C) -> usize {
        let mode = self.deepest_allowed();
        log::trace!("sleep depth {}", mode);
        controller.sleep(mode);
        mode
    }
}

#[cfg(feature = "uc3")]
pub mod uc3 {
    use super::Sleepmgr;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive)]
    pub enum SleepMode {
        Active = 0,
        Idle = 1,
        Frozen = 2,
        Standby = 3,
        Stop = 4,
        DeepStop = 5,
        Static = 6,
    }

    pub const MODES: usize = 7;

    pub static SLEEPMGR: Sleepmgr<MODES> = Sleepmgr::new();

    pub fn lock(mode: SleepMode) {
        SLEEPMGR.lock_mode(mode as usize)
    }

    pub fn unlock(mode: SleepMode) {
        SLEEPMGR.unlock_mode(mode as usize)
    }

    pub fn deepest_allowed() -> SleepMode {
        num_traits::FromPrimitive::from_usize(SLEEPMGR.deepest_allowed())
            .unwrap_or(SleepMode::Active)
    }
}

#[cfg(feature = "xmega")]
pub mod xmega {
    use super::Sleepmgr;

    /// Sleep depths in SLEEP.CTRL encoding order, shallowest first.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive)]
    pub enum SleepMode {
        Active = 0,
        Idle = 1,
        ExtStandby = 2,
        PowerSave = 3,
        Standby = 4,
        PowerDown = 5,
    }

    pub const MODES: usize = 6;

    pub static SLEEPMGR: Sleepmgr<MODES> = Sleepmgr::new();

    pub fn lock(mode: SleepMode) {
        SLEEPMGR.lock_mode(mode as usize)
    }

    pub fn unlock(mode: SleepMode) {
        SLEEPMGR.unlock_mode(mode as usize)
    }

    pub fn deepest_allowed() -> SleepMode {
        num_traits::FromPrimitive::from_usize(SLEEPMGR.deepest_allowed())
            .unwrap_or(SleepMode::Active)
    }
}

#[cfg(feature = "sam4l")]
pub mod sam4l {
    use super::Sleepmgr;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive)]
    pub enum SleepMode {
        Active = 0,
        Sleep0 = 1,
        Sleep1 = 2,
        Sleep2 = 3,
        Sleep3 = 4,
        Wait = 5,
        Retain = 6,
        Backup = 7,
    }

    pub const MODES: usize = 8;

    pub static SLEEPMGR: Sleepmgr<MODES> = Sleepmgr::new();

    pub fn lock(mode: SleepMode) {
        SLEEPMGR.lock_mode(mode as usize)
    }

    pub fn unlock(mode: SleepMode) {
        SLEEPMGR.unlock_mode(mode as usize)
    }

    pub fn deepest_allowed() -> SleepMode {
        num_traits::FromPrimitive::from_usize(SLEEPMGR.deepest_allowed())
            .unwrap_or(SleepMode::Active)
    }
}
