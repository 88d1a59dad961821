// Licensed under the Apache-2.0 license

//! Typed access to memory-mapped hardware registers.
//!
//! Register metadata (width, reset value, read/write value types) is
//! carried in zero-sized marker types, so a [`RegRef`] compiles down to a
//! single volatile load or store. All accesses are whole-register
//! operations; there is deliberately no read-modify-write helper, because
//! several registers on the peripherals this crate serves are
//! write-trigger registers whose read value is undefined.
//!
//! The [`Mmio`]/[`MmioMut`] traits abstract the actual load/store so the
//! same register block type can point at real hardware ([`RealMmio`],
//! [`RealMmioMut`]) or at a software model of the peripheral during
//! host-side testing.

#![cfg_attr(not(test), no_std)]

use core::marker::PhantomData;

/// Raw integer widths a hardware register can have.
pub trait Uint: Clone + Copy + 'static {}
impl Uint for u8 {}
impl Uint for u16 {}
impl Uint for u32 {}
impl Uint for u64 {}

/// A source of volatile reads, usually real hardware.
pub trait Mmio {
    /// Performs a single volatile read of `src`.
    ///
    /// # Safety
    ///
    /// `src` must be a readable register address for this Mmio
    /// implementation. Implementations that interpret the pointer as a
    /// bus offset (rather than dereferencing it) may be safe in practice.
    unsafe fn read_volatile<T: Clone + Copy>(&self, src: *const T) -> T;
}

/// A sink of volatile writes, usually real hardware.
pub trait MmioMut: Mmio {
    /// Performs a single volatile write of `src` to `dst`.
    ///
    /// # Safety
    ///
    /// `dst` must be a writable register address for this Mmio
    /// implementation.
    unsafe fn write_volatile<T: Clone + Copy>(&self, dst: *mut T, src: T);
}

impl<M: Mmio + ?Sized> Mmio for &M {
    unsafe fn read_volatile<T: Clone + Copy>(&self, src: *const T) -> T {
        (**self).read_volatile(src)
    }
}

impl<M: MmioMut + ?Sized> MmioMut for &M {
    unsafe fn write_volatile<T: Clone + Copy>(&self, dst: *mut T, src: T) {
        (**self).write_volatile(dst, src)
    }
}

/// Reads registers by dereferencing their physical address.
#[derive(Clone, Copy, Default)]
pub struct RealMmio;

impl Mmio for RealMmio {
    unsafe fn read_volatile<T: Clone + Copy>(&self, src: *const T) -> T {
        core::ptr::read_volatile(src)
    }
}

/// Reads and writes registers by dereferencing their physical address.
#[derive(Clone, Copy, Default)]
pub struct RealMmioMut;

impl Mmio for RealMmioMut {
    unsafe fn read_volatile<T: Clone + Copy>(&self, src: *const T) -> T {
        core::ptr::read_volatile(src)
    }
}

impl MmioMut for RealMmioMut {
    unsafe fn write_volatile<T: Clone + Copy>(&self, dst: *mut T, src: T) {
        core::ptr::write_volatile(dst, src)
    }
}

/// Metadata for a single register.
pub trait RegType {
    type Raw: Uint;
}

/// A register that can be read.
pub trait ReadableReg: RegType {
    type ReadVal: From<Self::Raw>;
}

/// A register that can be written.
pub trait WritableReg: RegType {
    type WriteVal: From<Self::Raw> + Into<Self::Raw>;
}

/// A register with a defined reset value; writes start from it so
/// reserved bits are always written back as the hardware defines them.
pub trait ResettableReg: RegType {
    const RESET_VAL: Self::Raw;
}

/// Metadata for a read-only 32-bit register.
#[derive(Clone, Copy)]
pub struct ReadOnlyReg32<TReadVal> {
    _phantom: PhantomData<TReadVal>,
}
impl<TReadVal> RegType for ReadOnlyReg32<TReadVal> {
    type Raw = u32;
}
impl<TReadVal: From<u32>> ReadableReg for ReadOnlyReg32<TReadVal> {
    type ReadVal = TReadVal;
}

/// Metadata for a write-only 32-bit register. Used for write-trigger
/// registers, whose read value must never be relied upon.
#[derive(Clone, Copy)]
pub struct WriteOnlyReg32<const RESET: u32, TWriteVal> {
    _phantom: PhantomData<TWriteVal>,
}
impl<const RESET: u32, TWriteVal> RegType for WriteOnlyReg32<RESET, TWriteVal> {
    type Raw = u32;
}
impl<const RESET: u32, TWriteVal: From<u32> + Into<u32>> WritableReg
    for WriteOnlyReg32<RESET, TWriteVal>
{
    type WriteVal = TWriteVal;
}
impl<const RESET: u32, TWriteVal> ResettableReg for WriteOnlyReg32<RESET, TWriteVal> {
    const RESET_VAL: u32 = RESET;
}

/// Metadata for a read-write 32-bit register.
#[derive(Clone, Copy)]
pub struct ReadWriteReg32<const RESET: u32, TReadVal, TWriteVal> {
    _phantom: PhantomData<(TReadVal, TWriteVal)>,
}
impl<const RESET: u32, TReadVal, TWriteVal> RegType for ReadWriteReg32<RESET, TReadVal, TWriteVal> {
    type Raw = u32;
}
impl<const RESET: u32, TReadVal: From<u32>, TWriteVal> ReadableReg
    for ReadWriteReg32<RESET, TReadVal, TWriteVal>
{
    type ReadVal = TReadVal;
}
impl<const RESET: u32, TReadVal, TWriteVal: From<u32> + Into<u32>> WritableReg
    for ReadWriteReg32<RESET, TReadVal, TWriteVal>
{
    type WriteVal = TWriteVal;
}
impl<const RESET: u32, TReadVal, TWriteVal> ResettableReg
    for ReadWriteReg32<RESET, TReadVal, TWriteVal>
{
    const RESET_VAL: u32 = RESET;
}

/// Reference to a single register behind an [`Mmio`] implementation.
pub struct RegRef<TReg: RegType, TMmio> {
    ptr: *mut TReg::Raw,
    mmio: TMmio,
}

impl<TReg: RegType, TMmio: Mmio> RegRef<TReg, TMmio> {
    /// # Safety
    ///
    /// `ptr` must be the address of a register of type `TReg` for the
    /// supplied `mmio` implementation.
    #[inline(always)]
    pub unsafe fn new_with_mmio(ptr: *mut TReg::Raw, mmio: TMmio) -> Self {
        Self { ptr, mmio }
    }
}

impl<TReg: ReadableReg, TMmio: Mmio> RegRef<TReg, TMmio> {
    #[inline(always)]
    pub fn read(&self) -> TReg::ReadVal {
        TReg::ReadVal::from(unsafe { self.mmio.read_volatile(self.ptr) })
    }
}

impl<TReg: WritableReg + ResettableReg, TMmio: MmioMut> RegRef<TReg, TMmio> {
    /// Writes the register with one volatile store. The closure receives
    /// the reset value, so unset fields (reserved bits included) hold
    /// their hardware-defined defaults.
    #[inline(always)]
    pub fn write(&self, f: impl FnOnce(TReg::WriteVal) -> TReg::WriteVal) {
        let val = f(TReg::WriteVal::from(TReg::RESET_VAL));
        unsafe { self.mmio.write_volatile(self.ptr, val.into()) }
    }
}

/// An element of a register [`Array`]; implemented by [`RegRef`].
pub trait RegElem: Sized {
    type Raw: Uint;
    type ElemMmio: Mmio + Clone;

    /// # Safety
    ///
    /// Same contract as [`RegRef::new_with_mmio`].
    unsafe fn new_at(ptr: *mut Self::Raw, mmio: Self::ElemMmio) -> Self;
}

impl<TReg: RegType, TMmio: Mmio + Clone> RegElem for RegRef<TReg, TMmio> {
    type Raw = TReg::Raw;
    type ElemMmio = TMmio;

    unsafe fn new_at(ptr: *mut Self::Raw, mmio: Self::ElemMmio) -> Self {
        RegRef::new_with_mmio(ptr, mmio)
    }
}

/// A contiguous array of identical registers, e.g. a big-integer operand
/// memory block viewed as words.
pub struct Array<const LEN: usize, TElem: RegElem> {
    ptr: *mut TElem::Raw,
    mmio: TElem::ElemMmio,
}

impl<const LEN: usize, TElem: RegElem> Array<LEN, TElem> {
    /// # Safety
    ///
    /// `ptr` must be the base address of `LEN` consecutive registers of
    /// the element type for the supplied `mmio` implementation.
    #[inline(always)]
    pub unsafe fn new_with_mmio(ptr: *mut TElem::Raw, mmio: TElem::ElemMmio) -> Self {
        Self { ptr, mmio }
    }

    pub const fn len(&self) -> usize {
        LEN
    }

    pub const fn is_empty(&self) -> bool {
        LEN == 0
    }

    /// Returns the register at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= LEN`.
    #[inline(always)]
    pub fn at(&self, index: usize) -> TElem {
        assert!(index < LEN);
        unsafe { TElem::new_at(self.ptr.wrapping_add(index), self.mmio.clone()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    struct PlainU32;
    impl RegType for PlainU32 {
        type Raw = u32;
    }
    impl ReadableReg for PlainU32 {
        type ReadVal = u32;
    }
    impl WritableReg for PlainU32 {
        type WriteVal = u32;
    }
    impl ResettableReg for PlainU32 {
        const RESET_VAL: u32 = 0;
    }

    #[test]
    fn test_reg_ref_read_write() {
        let mut backing = [0u32; 4];
        let reg: RegRef<PlainU32, RealMmioMut> =
            unsafe { RegRef::new_with_mmio(backing.as_mut_ptr().wrapping_add(2), RealMmioMut) };
        reg.write(|w| w | 0xdead_beef);
        assert_eq!(reg.read(), 0xdead_beef);
        assert_eq!(backing, [0, 0, 0xdead_beef, 0]);
    }

    #[test]
    fn test_write_starts_from_reset_value() {
        #[derive(Clone, Copy)]
        struct ResetFive;
        impl RegType for ResetFive {
            type Raw = u32;
        }
        impl WritableReg for ResetFive {
            type WriteVal = u32;
        }
        impl ResettableReg for ResetFive {
            const RESET_VAL: u32 = 5;
        }

        let mut backing = [0u32; 1];
        let reg: RegRef<ResetFive, RealMmioMut> =
            unsafe { RegRef::new_with_mmio(backing.as_mut_ptr(), RealMmioMut) };
        reg.write(|w| w | 0x10);
        assert_eq!(backing[0], 0x15);
    }

    #[test]
    fn test_array_at() {
        let mut backing = [0u32; 8];
        let arr: Array<8, RegRef<PlainU32, RealMmioMut>> =
            unsafe { Array::new_with_mmio(backing.as_mut_ptr(), RealMmioMut) };
        assert_eq!(arr.len(), 8);
        for i in 0..8 {
            arr.at(i).write(|_| i as u32 * 3);
        }
        assert_eq!(arr.at(5).read(), 15);
        assert_eq!(backing[7], 21);
    }

    #[test]
    #[should_panic]
    fn test_array_at_out_of_bounds() {
        let mut backing = [0u32; 2];
        let arr: Array<2, RegRef<PlainU32, RealMmioMut>> =
            unsafe { Array::new_with_mmio(backing.as_mut_ptr(), RealMmioMut) };
        arr.at(2);
    }
}
