// Licensed under the Apache-2.0 license.
//
// Register definitions for the RSA modular-arithmetic accelerator.
//
// The peripheral exposes four 96-word big-integer memories (M, Z, Y, X)
// followed by the control/status registers. Offsets and field widths
// follow the hardware memory map; the start registers and INT_CLR are
// write-trigger registers and are modeled write-only.

/// Owned handle to the RSA accelerator register block.
pub struct RsaReg {
    _priv: (),
}

impl RsaReg {
    pub const PTR: *mut u32 = 0x6008_c000 as *mut u32;

    /// # Safety
    ///
    /// The caller must ensure that all concurrent use of this peripheral
    /// in the firmware is done so in a compatible way. The simplest way
    /// to enforce this is to only call this function once.
    #[inline(always)]
    pub unsafe fn new() -> Self {
        Self { _priv: () }
    }

    /// Returns a register block that can only be used to read registers.
    #[inline(always)]
    pub fn regs(&self) -> RegisterBlock<hwreg::RealMmio> {
        unsafe { RegisterBlock::new(Self::PTR) }
    }

    /// Returns a register block that can be used to read and write registers.
    #[inline(always)]
    pub fn regs_mut(&mut self) -> RegisterBlock<hwreg::RealMmioMut> {
        unsafe { RegisterBlock::new(Self::PTR) }
    }
}

pub struct RegisterBlock<TMmio: hwreg::Mmio + core::borrow::Borrow<TMmio>> {
    ptr: *mut u32,
    mmio: TMmio,
}

impl<TMmio: hwreg::Mmio + core::default::Default> RegisterBlock<TMmio> {
    /// # Safety
    ///
    /// `ptr` must point to the peripheral's register base for the default
    /// mmio implementation.
    #[inline(always)]
    pub unsafe fn new(ptr: *mut u32) -> Self {
        Self {
            ptr,
            mmio: core::default::Default::default(),
        }
    }
}

impl<TMmio: hwreg::Mmio> RegisterBlock<TMmio> {
    /// # Safety
    ///
    /// `ptr` must point to the peripheral's register base for the
    /// supplied `mmio` implementation.
    #[inline(always)]
    pub unsafe fn new_with_mmio(ptr: *mut u32, mmio: TMmio) -> Self {
        Self { ptr, mmio }
    }

    /// M memory block; holds the modulus as 96 little-endian words.
    #[inline(always)]
    pub fn m_mem(&self) -> hwreg::Array<96, hwreg::RegRef<crate::rsa::meta::MemWord, &TMmio>> {
        unsafe {
            hwreg::Array::new_with_mmio(
                self.ptr
                    .wrapping_add(0 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Z memory block; result/accumulator, 96 little-endian words.
    #[inline(always)]
    pub fn z_mem(&self) -> hwreg::Array<96, hwreg::RegRef<crate::rsa::meta::MemWord, &TMmio>> {
        unsafe {
            hwreg::Array::new_with_mmio(
                self.ptr
                    .wrapping_add(0x200 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Y memory block; multiplicand or exponent, 96 little-endian words.
    #[inline(always)]
    pub fn y_mem(&self) -> hwreg::Array<96, hwreg::RegRef<crate::rsa::meta::MemWord, &TMmio>> {
        unsafe {
            hwreg::Array::new_with_mmio(
                self.ptr
                    .wrapping_add(0x400 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// X memory block; multiplicand or base, 96 little-endian words.
    #[inline(always)]
    pub fn x_mem(&self) -> hwreg::Array<96, hwreg::RegRef<crate::rsa::meta::MemWord, &TMmio>> {
        unsafe {
            hwreg::Array::new_with_mmio(
                self.ptr
                    .wrapping_add(0x600 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Montgomery constant M' register.
    #[inline(always)]
    pub fn m_prime(&self) -> hwreg::RegRef<crate::rsa::meta::MPrime, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x800 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Operand length in 32-bit words (7-bit field).
    #[inline(always)]
    pub fn mode(&self) -> hwreg::RegRef<crate::rsa::meta::Mode, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x804 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Reads 1 once the one-time memory initialization after reset has
    /// completed.
    #[inline(always)]
    pub fn query_clean(&self) -> hwreg::RegRef<crate::rsa::meta::QueryClean, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x808 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Write-trigger; starts a modular exponentiation.
    #[inline(always)]
    pub fn set_start_modexp(&self) -> hwreg::RegRef<crate::rsa::meta::SetStartModexp, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x80c / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Write-trigger; starts a modular multiplication.
    #[inline(always)]
    pub fn set_start_modmult(&self) -> hwreg::RegRef<crate::rsa::meta::SetStartModmult, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x810 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Write-trigger; starts a plain (non-modular) multiplication.
    #[inline(always)]
    pub fn set_start_mult(&self) -> hwreg::RegRef<crate::rsa::meta::SetStartMult, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x814 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Reads 1 while the accelerator is idle, 0 while an operation runs.
    #[inline(always)]
    pub fn query_idle(&self) -> hwreg::RegRef<crate::rsa::meta::QueryIdle, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x818 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Write-1-to-clear; acknowledges the completion interrupt and arms
    /// the next completion signal.
    #[inline(always)]
    pub fn int_clr(&self) -> hwreg::RegRef<crate::rsa::meta::IntClr, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x81c / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Timing-vs-performance trade-off bit. Inverted polarity: 0 selects
    /// the constant-time datapath (reset default), 1 the faster
    /// non-constant-time one.
    #[inline(always)]
    pub fn constant_time(&self) -> hwreg::RegRef<crate::rsa::meta::ConstantTime, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x820 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Enables the leading-zero search optimization; only meaningful
    /// together with a programmed search position.
    #[inline(always)]
    pub fn search_enable(&self) -> hwreg::RegRef<crate::rsa::meta::SearchEnable, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x824 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Starting bit position for the search optimization (12-bit field).
    #[inline(always)]
    pub fn search_pos(&self) -> hwreg::RegRef<crate::rsa::meta::SearchPos, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x828 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Completion interrupt enable.
    #[inline(always)]
    pub fn int_ena(&self) -> hwreg::RegRef<crate::rsa::meta::IntEna, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x82c / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }

    /// Hardware version stamp (30-bit, informational only).
    #[inline(always)]
    pub fn date(&self) -> hwreg::RegRef<crate::rsa::meta::Date, &TMmio> {
        unsafe {
            hwreg::RegRef::new_with_mmio(
                self.ptr
                    .wrapping_add(0x830 / core::mem::size_of::<u32>()),
                core::borrow::Borrow::borrow(&self.mmio),
            )
        }
    }
}

pub mod regs {
    //! Types that represent the values held by registers.

    #[derive(Clone, Copy)]
    pub struct ModeReadVal(u32);
    impl ModeReadVal {
        /// Operand length in 32-bit words.
        #[inline(always)]
        pub fn mode(&self) -> u32 {
            self.0 & 0x7f
        }
    }
    impl From<u32> for ModeReadVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<ModeReadVal> for u32 {
        fn from(val: ModeReadVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct ModeWriteVal(u32);
    impl ModeWriteVal {
        /// Operand length in 32-bit words.
        #[inline(always)]
        pub fn mode(self, val: u32) -> Self {
            Self((self.0 & !0x7f) | (val & 0x7f))
        }
    }
    impl From<u32> for ModeWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<ModeWriteVal> for u32 {
        fn from(val: ModeWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct QueryCleanReadVal(u32);
    impl QueryCleanReadVal {
        /// True once the one-time memory initialization has completed.
        #[inline(always)]
        pub fn query_clean(&self) -> bool {
            (self.0 & 1) != 0
        }
    }
    impl From<u32> for QueryCleanReadVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<QueryCleanReadVal> for u32 {
        fn from(val: QueryCleanReadVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct SetStartModexpWriteVal(u32);
    impl SetStartModexpWriteVal {
        #[inline(always)]
        pub fn set_start_modexp(self, val: bool) -> Self {
            Self((self.0 & !1) | u32::from(val))
        }
    }
    impl From<u32> for SetStartModexpWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<SetStartModexpWriteVal> for u32 {
        fn from(val: SetStartModexpWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct SetStartModmultWriteVal(u32);
    impl SetStartModmultWriteVal {
        #[inline(always)]
        pub fn set_start_modmult(self, val: bool) -> Self {
            Self((self.0 & !1) | u32::from(val))
        }
    }
    impl From<u32> for SetStartModmultWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<SetStartModmultWriteVal> for u32 {
        fn from(val: SetStartModmultWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct SetStartMultWriteVal(u32);
    impl SetStartMultWriteVal {
        #[inline(always)]
        pub fn set_start_mult(self, val: bool) -> Self {
            Self((self.0 & !1) | u32::from(val))
        }
    }
    impl From<u32> for SetStartMultWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<SetStartMultWriteVal> for u32 {
        fn from(val: SetStartMultWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct QueryIdleReadVal(u32);
    impl QueryIdleReadVal {
        /// True when the accelerator is idle.
        #[inline(always)]
        pub fn query_idle(&self) -> bool {
            (self.0 & 1) != 0
        }
    }
    impl From<u32> for QueryIdleReadVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<QueryIdleReadVal> for u32 {
        fn from(val: QueryIdleReadVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct IntClrWriteVal(u32);
    impl IntClrWriteVal {
        #[inline(always)]
        pub fn int_clr(self, val: bool) -> Self {
            Self((self.0 & !1) | u32::from(val))
        }
    }
    impl From<u32> for IntClrWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<IntClrWriteVal> for u32 {
        fn from(val: IntClrWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct ConstantTimeReadVal(u32);
    impl ConstantTimeReadVal {
        /// 0 = constant-time datapath, 1 = faster non-constant-time one.
        #[inline(always)]
        pub fn constant_time(&self) -> bool {
            (self.0 & 1) != 0
        }
    }
    impl From<u32> for ConstantTimeReadVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<ConstantTimeReadVal> for u32 {
        fn from(val: ConstantTimeReadVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct ConstantTimeWriteVal(u32);
    impl ConstantTimeWriteVal {
        /// 0 = constant-time datapath, 1 = faster non-constant-time one.
        #[inline(always)]
        pub fn constant_time(self, val: bool) -> Self {
            Self((self.0 & !1) | u32::from(val))
        }
    }
    impl From<u32> for ConstantTimeWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<ConstantTimeWriteVal> for u32 {
        fn from(val: ConstantTimeWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct SearchEnableReadVal(u32);
    impl SearchEnableReadVal {
        #[inline(always)]
        pub fn search_enable(&self) -> bool {
            (self.0 & 1) != 0
        }
    }
    impl From<u32> for SearchEnableReadVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<SearchEnableReadVal> for u32 {
        fn from(val: SearchEnableReadVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct SearchEnableWriteVal(u32);
    impl SearchEnableWriteVal {
        #[inline(always)]
        pub fn search_enable(self, val: bool) -> Self {
            Self((self.0 & !1) | u32::from(val))
        }
    }
    impl From<u32> for SearchEnableWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<SearchEnableWriteVal> for u32 {
        fn from(val: SearchEnableWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct SearchPosReadVal(u32);
    impl SearchPosReadVal {
        /// Starting bit position of the search optimization.
        #[inline(always)]
        pub fn search_pos(&self) -> u32 {
            self.0 & 0xfff
        }
    }
    impl From<u32> for SearchPosReadVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<SearchPosReadVal> for u32 {
        fn from(val: SearchPosReadVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct SearchPosWriteVal(u32);
    impl SearchPosWriteVal {
        /// Starting bit position of the search optimization.
        #[inline(always)]
        pub fn search_pos(self, val: u32) -> Self {
            Self((self.0 & !0xfff) | (val & 0xfff))
        }
    }
    impl From<u32> for SearchPosWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<SearchPosWriteVal> for u32 {
        fn from(val: SearchPosWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct IntEnaReadVal(u32);
    impl IntEnaReadVal {
        #[inline(always)]
        pub fn int_ena(&self) -> bool {
            (self.0 & 1) != 0
        }
    }
    impl From<u32> for IntEnaReadVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<IntEnaReadVal> for u32 {
        fn from(val: IntEnaReadVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct IntEnaWriteVal(u32);
    impl IntEnaWriteVal {
        #[inline(always)]
        pub fn int_ena(self, val: bool) -> Self {
            Self((self.0 & !1) | u32::from(val))
        }
    }
    impl From<u32> for IntEnaWriteVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<IntEnaWriteVal> for u32 {
        fn from(val: IntEnaWriteVal) -> u32 {
            val.0
        }
    }

    #[derive(Clone, Copy)]
    pub struct DateReadVal(u32);
    impl DateReadVal {
        /// Hardware version stamp.
        #[inline(always)]
        pub fn date(&self) -> u32 {
            self.0 & 0x3fff_ffff
        }
    }
    impl From<u32> for DateReadVal {
        fn from(val: u32) -> Self {
            Self(val)
        }
    }
    impl From<DateReadVal> for u32 {
        fn from(val: DateReadVal) -> u32 {
            val.0
        }
    }
}

pub mod meta {
    //! Additional metadata needed by hwreg.

    pub type MemWord = hwreg::ReadWriteReg32<0, u32, u32>;
    pub type MPrime = hwreg::ReadWriteReg32<0, u32, u32>;
    pub type Mode =
        hwreg::ReadWriteReg32<0, crate::rsa::regs::ModeReadVal, crate::rsa::regs::ModeWriteVal>;
    pub type QueryClean = hwreg::ReadOnlyReg32<crate::rsa::regs::QueryCleanReadVal>;
    pub type SetStartModexp = hwreg::WriteOnlyReg32<0, crate::rsa::regs::SetStartModexpWriteVal>;
    pub type SetStartModmult = hwreg::WriteOnlyReg32<0, crate::rsa::regs::SetStartModmultWriteVal>;
    pub type SetStartMult = hwreg::WriteOnlyReg32<0, crate::rsa::regs::SetStartMultWriteVal>;
    pub type QueryIdle = hwreg::ReadOnlyReg32<crate::rsa::regs::QueryIdleReadVal>;
    pub type IntClr = hwreg::WriteOnlyReg32<0, crate::rsa::regs::IntClrWriteVal>;
    pub type ConstantTime = hwreg::ReadWriteReg32<
        0,
        crate::rsa::regs::ConstantTimeReadVal,
        crate::rsa::regs::ConstantTimeWriteVal,
    >;
    pub type SearchEnable = hwreg::ReadWriteReg32<
        0,
        crate::rsa::regs::SearchEnableReadVal,
        crate::rsa::regs::SearchEnableWriteVal,
    >;
    pub type SearchPos = hwreg::ReadWriteReg32<
        0,
        crate::rsa::regs::SearchPosReadVal,
        crate::rsa::regs::SearchPosWriteVal,
    >;
    pub type IntEna =
        hwreg::ReadWriteReg32<0, crate::rsa::regs::IntEnaReadVal, crate::rsa::regs::IntEnaWriteVal>;
    pub type Date = hwreg::ReadOnlyReg32<crate::rsa::regs::DateReadVal>;
}
