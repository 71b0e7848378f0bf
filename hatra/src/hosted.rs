//! In-process register bank for builds that are not `target_os = "none"`.
//!
//! Each peripheral base address maps to a zero-initialised block of memory
//! that lives for the rest of the thread. Driver code is oblivious: it gets
//! a pointer from [`crate::periph_base`] and performs the same volatile
//! accesses it would on silicon. Tests use [`peek`]/[`poke`] to reach the
//! same bytes from outside, and [`install_hook`] to script peripheral
//! behaviour (ready bits, FIFO supply, ciphertext computation).
//!
//! State is thread-local so concurrently running tests cannot see each
//! other's peripherals.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// What the CSR layer is doing to a register when a hook runs.
#[derive(Debug, Copy, Clone)]
pub enum Access {
    Read,
    Write(usize),
}

/// Hook verdict. On a read, `Replace(v)` is the value the driver sees; the
/// backing block is the hook's business (it can `poke` before returning,
/// which is how read-to-clear registers are modelled). On a write,
/// `Replace(v)` stores `v` instead of the value the driver wrote.
#[derive(Debug, Copy, Clone)]
pub enum HookAction {
    Pass,
    Replace(usize),
}

pub type Hook = Box<dyn FnMut(usize, Access) -> HookAction>;

struct Block {
    mem: *mut u8,
    len: usize,
    elem: usize,
}

#[derive(Default)]
struct Bank {
    // keyed by hardware base address
    blocks: HashMap<usize, Block>,
    // emulated pointer -> hardware base, for CSR-side dispatch
    by_ptr: HashMap<usize, usize>,
    // hooks keyed by hardware base, so installation does not depend on the
    // block having been allocated yet
    hooks: HashMap<usize, Rc<RefCell<Hook>>>,
    // pokes made before the block exists, replayed once it is allocated so
    // test ordering does not matter
    pending: HashMap<usize, Vec<(usize, usize)>>,
}

thread_local! {
    static BANK: RefCell<Bank> = RefCell::new(Bank::default());
}

/// Return the emulated backing block for `hw_base`, allocating it on first
/// use. The allocation is leaked so pointers stay valid for the thread's
/// lifetime even if the bank is reset.
pub fn periph_base(hw_base: usize, numregs: usize, elem: usize) -> *mut u8 {
    BANK.with(|b| {
        let mut bank = b.borrow_mut();
        if let Some(block) = bank.blocks.get(&hw_base) {
            return block.mem;
        }
        let len = numregs.max(1) * elem.max(1);
        let mem = Box::leak(vec![0u8; len].into_boxed_slice()).as_mut_ptr();
        bank.by_ptr.insert(mem as usize, hw_base);
        let block = Block { mem, len, elem };
        if let Some(writes) = bank.pending.remove(&hw_base) {
            for (word_offset, value) in writes {
                unsafe { write_elem(&block, word_offset, value) };
            }
        }
        bank.blocks.insert(hw_base, block);
        mem
    })
}

/// Read a register out of the bank by hardware base and word offset.
/// Allocation side of [`periph_base`] must have happened first; an unknown
/// base reads as zero, matching bus behaviour on these parts.
pub fn peek(hw_base: usize, word_offset: usize) -> usize {
    BANK.with(|b| {
        let bank = b.borrow();
        match bank.blocks.get(&hw_base) {
            Some(block) => unsafe { read_elem(block, word_offset) },
            None => bank
                .pending
                .get(&hw_base)
                .and_then(|writes| {
                    writes.iter().rev().find(|(off, _)| *off == word_offset).map(|(_, v)| *v)
                })
                .unwrap_or(0),
        }
    })
}

/// Write a register in the bank by hardware base and word offset.
pub fn poke(hw_base: usize, word_offset: usize, value: usize) {
    BANK.with(|b| {
        let mut bank = b.borrow_mut();
        if let Some(block) = bank.blocks.get(&hw_base) {
            unsafe { write_elem(block, word_offset, value) };
        } else {
            bank.pending.entry(hw_base).or_default().push((word_offset, value));
        }
    })
}

/// Set (OR) bits in a register; convenience for flag-raising in tests.
pub fn poke_or(hw_base: usize, word_offset: usize, bits: usize) {
    let v = peek(hw_base, word_offset);
    poke(hw_base, word_offset, v | bits);
}

/// Install a model hook on a block. The hook observes every CSR access to
/// the block: `(word_offset, Access) -> HookAction`. One hook per block;
/// installing again replaces the old one.
pub fn install_hook(hw_base: usize, hook: Hook) {
    BANK.with(|b| {
        let mut bank = b.borrow_mut();
        bank.hooks.insert(hw_base, Rc::new(RefCell::new(hook)));
    })
}

pub fn remove_hook(hw_base: usize) {
    BANK.with(|b| {
        let mut bank = b.borrow_mut();
        bank.hooks.remove(&hw_base);
    })
}

/// Zero every block and drop every hook. Allocations stay alive so CSRs
/// created before the reset remain valid.
pub fn reset_bank() {
    BANK.with(|b| {
        let mut bank = b.borrow_mut();
        for block in bank.blocks.values_mut() {
            unsafe { core::ptr::write_bytes(block.mem, 0, block.len) };
        }
        bank.hooks.clear();
        bank.pending.clear();
    })
}

unsafe fn read_elem(block: &Block, word_offset: usize) -> usize {
    let byte = word_offset * block.elem;
    if byte + block.elem > block.len {
        return 0;
    }
    match block.elem {
        1 => block.mem.add(byte).read_volatile() as usize,
        2 => (block.mem.add(byte) as *mut u16).read_volatile() as usize,
        _ => (block.mem.add(byte) as *mut u32).read_volatile() as usize,
    }
}

unsafe fn write_elem(block: &Block, word_offset: usize, value: usize) {
    let byte = word_offset * block.elem;
    if byte + block.elem > block.len {
        return;
    }
    match block.elem {
        1 => block.mem.add(byte).write_volatile(value as u8),
        2 => (block.mem.add(byte) as *mut u16).write_volatile(value as u16),
        _ => (block.mem.add(byte) as *mut u32).write_volatile(value as u32),
    }
}

fn hook_for(emu_base: usize) -> Option<(usize, Rc<RefCell<Hook>>)> {
    BANK.with(|b| {
        let bank = b.borrow();
        let hw = *bank.by_ptr.get(&emu_base)?;
        let hook = bank.hooks.get(&hw)?.clone();
        Some((hw, hook))
    })
}

/// CSR read dispatch. Returns `Some(v)` when a hook supplied the value.
/// The registry borrow is released before the hook runs so hooks may call
/// [`peek`]/[`poke`] freely.
pub(crate) fn on_read(emu_base: usize, word_offset: usize, _elem: usize) -> Option<usize> {
    let (_hw, hook) = hook_for(emu_base)?;
    let action = (hook.borrow_mut())(word_offset, Access::Read);
    match action {
        HookAction::Pass => None,
        HookAction::Replace(v) => Some(v),
    }
}

/// CSR write dispatch, called after the value has landed in the backing
/// block. Returns `Some(v)` when the hook wants `v` stored instead, which
/// is how models express write-one-to-clear and self-clearing bits.
pub(crate) fn on_write(emu_base: usize, word_offset: usize, _elem: usize, value: usize) -> Option<usize> {
    let (_hw, hook) = hook_for(emu_base)?;
    let action = (hook.borrow_mut())(word_offset, Access::Write(value));
    match action {
        HookAction::Pass => None,
        HookAction::Replace(v) => Some(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, Register, CSR};

    const BASE: usize = 0xFFFF_4000;
    const DATA: Register = Register::new(0, 0xFFFF_FFFF);
    const STATUS: Register = Register::new(1, 0x3);
    const STATUS_RDY: Field = Field::new(1, 0, STATUS);

    #[test]
    fn bank_is_stable_and_shared() {
        let p1 = crate::periph_base::<u32>(BASE, 4);
        let p2 = crate::periph_base::<u32>(BASE, 4);
        assert_eq!(p1, p2);
        let mut csr = CSR::new(p1);
        csr.wo(DATA, 0x1234_5678u32);
        assert_eq!(peek(BASE, 0), 0x1234_5678);
        poke(BASE, 1, 0x1);
        assert_eq!(csr.rf(STATUS_RDY), 1);
    }

    #[test]
    fn read_hook_replaces_value() {
        let base = BASE + 0x1000;
        let p = crate::periph_base::<u32>(base, 4);
        let mut n = 0usize;
        install_hook(
            base,
            Box::new(move |off, access| {
                if off == 0 {
                    if let Access::Read = access {
                        n = n.wrapping_add(7);
                        poke(base, 0, n);
                        return HookAction::Replace(n);
                    }
                }
                HookAction::Pass
            }),
        );
        let csr: CSR<u32> = CSR::new(p);
        assert_eq!(csr.r(DATA), 7);
        assert_eq!(csr.r(DATA), 14);
        remove_hook(base);
        // the hook kept the backing block in step, so the value survives it
        assert_eq!(csr.r(DATA), 14);
    }

    #[test]
    fn write_hook_can_self_clear() {
        let base = BASE + 0x2000;
        let p = crate::periph_base::<u32>(base, 4);
        install_hook(
            base,
            Box::new(move |off, access| {
                // register 0 bit 0 is a start strobe that never reads back
                if off == 0 {
                    if let Access::Write(v) = access {
                        if v & 1 != 0 {
                            // completion: raise ready in the status register
                            poke_or(base, 1, 1);
                            return HookAction::Replace(v & !1);
                        }
                    }
                }
                HookAction::Pass
            }),
        );
        let mut csr: CSR<u32> = CSR::new(p);
        csr.wo(DATA, 1u32);
        assert_eq!(csr.r(DATA), 0);
        assert_eq!(csr.rf(STATUS_RDY), 1);
    }
}
