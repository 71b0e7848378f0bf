#![cfg_attr(target_os = "none", no_std)]
#![allow(dead_code)]

//! Hand-authored thin register abstraction.
//!
//! The silicon covered here (AVR32 UC3, XMEGA, SAM4L) predates SVD
//! publication, so the maps in [`uc3`], [`xmega`] and [`sam4l`] are
//! transcribed from the datasheet register summaries by hand. Offsets are
//! in register-width units and masks cover the documented bits only.
//!
//! On hardware (`target_os = "none"`) a [`CSR`] is a bare pointer to the
//! peripheral. Everywhere else the same driver code runs against an
//! in-process register bank (see [`hosted`]), which tests can inspect and
//! script with access hooks.

#[cfg(feature = "sam4l")]
pub mod sam4l;
#[cfg(feature = "uc3")]
pub mod uc3;
#[cfg(feature = "xmega")]
pub mod xmega;

#[cfg(not(target_os = "none"))]
pub mod hosted;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Register {
    /// Offset of this register from the peripheral base, in register-width units.
    offset: usize,
    /// Mask of the bits the datasheet documents for this register.
    mask: usize,
}
impl Register {
    pub const fn new(offset: usize, mask: usize) -> Register { Register { offset, mask } }

    pub const fn offset(&self) -> usize { self.offset }

    pub const fn mask(&self) -> usize { self.mask }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Field {
    /// Unshifted bitmask for the field; a 3-bit field carries 0b111 here.
    mask: usize,
    /// Bit offset of the field's LSB within its register.
    offset: usize,
    /// The register this field lives in.
    register: Register,
}
impl Field {
    pub const fn new(width: usize, offset: usize, register: Register) -> Field {
        let mask = if width < usize::BITS as usize { (1 << width) - 1 } else { usize::MAX };
        Field { mask, offset, register }
    }

    pub const fn offset(&self) -> usize { self.offset }

    pub const fn mask(&self) -> usize { self.mask }

    pub const fn register(&self) -> Register { self.register }
}

/// Volatile accessor over one peripheral instance.
///
/// `T` is the register width of the peripheral: `u32` for the 32-bit
/// families, `u8` for XMEGA's byte-wide I/O space. All accesses go through
/// `read_volatile`/`write_volatile` at exactly that width, bracketed by
/// compiler fences so the optimizer cannot fold or reorder them.
#[derive(Debug, Copy, Clone)]
pub struct CSR<T> {
    base: *mut T,
}

impl<T> CSR<T>
where
    T: Copy + core::convert::TryFrom<usize> + core::convert::TryInto<usize> + core::default::Default,
{
    pub fn new(base: *mut T) -> Self { CSR { base } }

    /// Retrieve the raw base pointer. Unsafe because the copy can be used to
    /// alias the peripheral from another context; hardware is shared mutable
    /// state and sometimes that is exactly what an interrupt handler needs.
    pub unsafe fn base(&self) -> *mut T { self.base }

    fn ptr(&self, word_offset: usize) -> *mut T {
        // offset is in register-width units, matching the datasheet tables
        unsafe { self.base.add(word_offset) }
    }

    fn raw_read(&self, word_offset: usize) -> usize {
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
        let v = unsafe { self.ptr(word_offset).read_volatile() };
        v.try_into().unwrap_or_default()
    }

    fn raw_write(&mut self, word_offset: usize, value: usize) {
        let v: T = value.try_into().unwrap_or_default();
        unsafe { self.ptr(word_offset).write_volatile(v) };
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(not(target_os = "none"))]
    fn load(&self, word_offset: usize) -> usize {
        if let Some(v) = hosted::on_read(self.base as usize, word_offset, core::mem::size_of::<T>()) {
            return v;
        }
        self.raw_read(word_offset)
    }

    #[cfg(target_os = "none")]
    fn load(&self, word_offset: usize) -> usize { self.raw_read(word_offset) }

    #[cfg(not(target_os = "none"))]
    fn store(&mut self, word_offset: usize, value: usize) {
        self.raw_write(word_offset, value);
        if let Some(v) = hosted::on_write(self.base as usize, word_offset, core::mem::size_of::<T>(), value)
        {
            self.raw_write(word_offset, v);
        }
    }

    #[cfg(target_os = "none")]
    fn store(&mut self, word_offset: usize, value: usize) { self.raw_write(word_offset, value) }

    /// Read the register.
    pub fn r(&self, reg: Register) -> T {
        self.load(reg.offset).try_into().unwrap_or_default()
    }

    /// Read one field of the register, shifted down to bit 0.
    pub fn rf(&self, field: Field) -> T {
        ((self.load(field.register.offset) >> field.offset) & field.mask)
            .try_into()
            .unwrap_or_default()
    }

    /// Read-modify-write one field, leaving the other bits as read.
    pub fn rmwf(&mut self, field: Field, value: T) {
        let v: usize = value.try_into().unwrap_or_default();
        let previous = self.load(field.register.offset) & !(field.mask << field.offset);
        self.store(field.register.offset, previous | ((v & field.mask) << field.offset));
    }

    /// Write the register with only this field set; other bits go to zero.
    pub fn wfo(&mut self, field: Field, value: T) {
        let v: usize = value.try_into().unwrap_or_default();
        self.store(field.register.offset, (v & field.mask) << field.offset);
    }

    /// Write the whole register.
    pub fn wo(&mut self, reg: Register, value: T) {
        let v: usize = value.try_into().unwrap_or_default();
        self.store(reg.offset, v);
    }

    /// Clear one field out of a previously read value.
    pub fn zf(&self, field: Field, value: T) -> T {
        let v: usize = value.try_into().unwrap_or_default();
        (v & !(field.mask << field.offset)).try_into().unwrap_or_default()
    }

    /// Shift and mask a value into its field position, for building masks.
    pub fn ms(&self, field: Field, value: T) -> T {
        let v: usize = value.try_into().unwrap_or_default();
        ((v & field.mask) << field.offset).try_into().unwrap_or_default()
    }
}

// CSRs are plain pointers; the peripherals behind them are single-owner by
// driver convention, and interrupt handlers receive their own copy.
unsafe impl<T> Send for CSR<T> {}

/// Shareable CSR base for interrupt-handler arguments.
///
/// Holds the base pointer in an `AtomicPtr` so a `'static` copy can be
/// handed to a handler while the owning driver keeps its own accessor.
#[derive(Debug)]
pub struct AtomicCsr<T> {
    base: core::sync::atomic::AtomicPtr<T>,
}

impl<T> AtomicCsr<T>
where
    T: Copy + core::convert::TryFrom<usize> + core::convert::TryInto<usize> + core::default::Default,
{
    pub const fn empty() -> Self {
        AtomicCsr { base: core::sync::atomic::AtomicPtr::new(core::ptr::null_mut()) }
    }

    pub fn new(base: *mut T) -> Self {
        AtomicCsr { base: core::sync::atomic::AtomicPtr::new(base) }
    }

    pub fn set(&self, base: *mut T) {
        self.base.store(base, core::sync::atomic::Ordering::SeqCst);
    }

    /// Materialize a plain CSR over the shared base. Returns `None` until
    /// `set` has been called.
    pub fn load(&self) -> Option<CSR<T>> {
        let p = self.base.load(core::sync::atomic::Ordering::SeqCst);
        if p.is_null() { None } else { Some(CSR::new(p)) }
    }
}

unsafe impl<T> Send for AtomicCsr<T> {}
unsafe impl<T> Sync for AtomicCsr<T> {}

/// Resolve a peripheral base address to something a [`CSR`] can use.
///
/// On hardware this is the identity cast; hosted it hands back a pointer
/// into the emulated bank so the same driver code runs in tests.
#[cfg(target_os = "none")]
pub fn periph_base<T>(hw_base: usize, _numregs: usize) -> *mut T {
    hw_base as *mut T
}

#[cfg(not(target_os = "none"))]
pub fn periph_base<T>(hw_base: usize, numregs: usize) -> *mut T {
    hosted::periph_base(hw_base, numregs, core::mem::size_of::<T>()) as *mut T
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRATCH: Register = Register::new(0, 0xFFFF_FFFF);
    const SCRATCH_LOW: Field = Field::new(8, 0, SCRATCH);
    const SCRATCH_MID: Field = Field::new(4, 8, SCRATCH);
    const NEXT: Register = Register::new(1, 0xFFFF_FFFF);

    #[test]
    fn field_masks() {
        assert_eq!(SCRATCH_LOW.mask(), 0xFF);
        assert_eq!(SCRATCH_MID.mask(), 0xF);
        assert_eq!(Field::new(1, 31, SCRATCH).mask(), 1);
    }

    #[test]
    fn word_rmw_preserves_neighbors() {
        let mut backing = [0u32; 4];
        let mut csr = CSR::new(backing.as_mut_ptr());
        csr.wo(SCRATCH, 0xAABB_CCDD);
        csr.rmwf(SCRATCH_MID, 0x3);
        assert_eq!(csr.r(SCRATCH), 0xAABB_C3DD);
        assert_eq!(csr.rf(SCRATCH_MID), 0x3);
        assert_eq!(csr.rf(SCRATCH_LOW), 0xDD);
        // neighbor untouched
        assert_eq!(csr.r(NEXT), 0);
    }

    #[test]
    fn byte_wide_access() {
        // XMEGA-style byte registers must not touch adjacent bytes
        let mut backing = [0u8; 4];
        let b0: Register = Register::new(0, 0xFF);
        let b1: Register = Register::new(1, 0xFF);
        let b0_hi: Field = Field::new(4, 4, b0);
        let mut csr = CSR::new(backing.as_mut_ptr());
        csr.wo(b1, 0x55);
        csr.wfo(b0_hi, 0xA);
        assert_eq!(csr.r(b0), 0xA0);
        assert_eq!(csr.r(b1), 0x55);
    }

    #[test]
    fn ms_builds_merge_masks() {
        let mut backing = [0u32; 1];
        let csr = CSR::new(backing.as_mut_ptr());
        let m = csr.ms(SCRATCH_LOW, 0x12) | csr.ms(SCRATCH_MID, 0x3);
        assert_eq!(m, 0x312);
        assert_eq!(csr.zf(SCRATCH_MID, 0xFFFF), 0xF0FF);
    }
}
