/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa.rs

Abstract:

    File contains API for the RSA modular-arithmetic accelerator.

--*/

use crate::error::{RsaAccelError, RsaResult};
use crate::wait;
use bitflags::bitflags;
use hwreg::MmioMut;
use rsa_accel_registers::rsa::RegisterBlock;

/// Maximum supported operand/modulus length in bits for this hardware
/// revision.
pub const RSA_MAX_OPERAND_BITS: usize = 3072;

/// Words per big-integer memory block.
pub const RSA_MEM_WORDS: usize = 96;

/// Bytes per big-integer memory block.
pub const RSA_MEM_BYTES: usize = RSA_MEM_WORDS * 4;

/// Big-integer memory blocks of the accelerator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OperandBlock {
    /// Modulus. On hardware revisions that need an accumulator constant
    /// (r^2 mod M style), that constant is loaded into `Z` instead.
    M,
    /// Result / accumulator.
    Z,
    /// Multiplicand, or exponent for ModExp.
    Y,
    /// Multiplicand, or base for ModExp.
    X,
}

/// Accelerator operations; each maps to exactly one start trigger.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RsaOpKind {
    /// Z = X^Y mod M
    ModExp,
    /// Z = X*Y mod M
    ModMult,
    /// Z = X*Y, no reduction; the result is twice the operand length.
    Mult,
}

/// Timing/performance trade-off of the accelerator datapath.
///
/// The underlying hardware bit has inverted polarity (0 selects the
/// protected datapath); this enum exists so no caller ever passes a raw
/// bool and gets the sense backwards.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Timing {
    /// Constant-time operation, protected against timing side channels.
    /// Hardware reset default.
    ConstantTime,
    /// Faster, data-dependent timing. Never use with secret exponents.
    Accelerated,
}

/// Leading-zero search optimization for exponentiation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Search {
    Disabled,
    /// Skip exponent bits above the given bit position. Purely a
    /// performance hint; the numeric result must not change. The caller
    /// must guarantee the position is not below the exponent's true
    /// leading one-bit; the driver cannot check that without inspecting
    /// operand data, and a wrong position yields undefined results.
    FromBit(u16),
}

/// How completion of a started operation will be detected.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompletionMode {
    /// Spin on the idle status bit.
    Poll,
    /// Enable the completion interrupt before triggering; the caller
    /// supplies the delivered-notification source to
    /// [`Rsa::await_completion_with`].
    Interrupt,
}

/// Sequencer state, observed via the clean/idle status bits.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SeqState {
    /// Hardware initialization not yet observed.
    Idle,
    /// Initialization complete; accelerator available.
    Ready,
    /// An operation is in flight.
    Running,
    /// Completion observed and acknowledged; result not yet consumed.
    Completed,
    /// Timeout or inconsistent hardware state; requires `init`.
    Faulted,
}

bitflags! {
    /// Operand blocks populated since the last mode change.
    struct LoadedBlocks: u8 {
        const M = 0b001;
        const Y = 0b010;
        const X = 0b100;
    }
}

/// Token for an in-flight operation, consumed by the completion wait.
#[must_use = "a started operation must be awaited"]
#[derive(Debug)]
pub struct Operation {
    kind: RsaOpKind,
    mode: CompletionMode,
}

impl Operation {
    pub fn kind(&self) -> RsaOpKind {
        self.kind
    }

    pub fn completion_mode(&self) -> CompletionMode {
        self.mode
    }
}

/// RSA Accelerator API
///
/// The accelerator is a single shared resource with no per-request
/// identity: this type owns the register block, and all sequencing
/// methods take `&mut self`, so Rust ownership provides the required
/// mutual exclusion. Callers that share the driver across contexts must
/// wrap it in their platform's lock.
pub struct Rsa<TMmio: MmioMut> {
    regs: RegisterBlock<TMmio>,
    state: SeqState,
    mode_words: usize,
    timing: Timing,
    search: Search,
    loaded: LoadedBlocks,
    modulus_lsb: u8,
}

impl<TMmio: MmioMut> Rsa<TMmio> {
    /// Create a new instance of the RSA accelerator driver.
    ///
    /// The accelerator is not usable until [`Rsa::init`] has observed the
    /// one-time memory initialization.
    pub fn new(regs: RegisterBlock<TMmio>) -> Self {
        Self {
            regs,
            state: SeqState::Idle,
            mode_words: 0,
            timing: Timing::ConstantTime,
            search: Search::Disabled,
            loaded: LoadedBlocks::empty(),
            modulus_lsb: 0,
        }
    }

    /// Wait for the accelerator to become usable, and reinitialize the
    /// driver after a fault.
    ///
    /// Polls the one-time clean status, then drains any leftover busy
    /// state (the hardware may still be finishing an operation abandoned
    /// by a timeout), then acknowledges any stale completion signal so
    /// the next one starts from a known-armed state.
    ///
    /// # Arguments
    ///
    /// * `max_polls` - Poll budget for each status bit
    pub fn init(&mut self, max_polls: u32) -> RsaResult<()> {
        if !wait::until_or_timeout(|| self.regs.query_clean().read().query_clean(), max_polls) {
            return Err(RsaAccelError::TIMED_OUT);
        }
        if !wait::until_or_timeout(|| self.regs.query_idle().read().query_idle(), max_polls) {
            return Err(RsaAccelError::TIMED_OUT);
        }
        self.regs.int_clr().write(|w| w.int_clr(true));
        self.state = SeqState::Ready;
        self.mode_words = 0;
        self.loaded = LoadedBlocks::empty();
        Ok(())
    }

    /// Program the operand length for subsequent operations.
    ///
    /// Invalidates previously loaded operands: the used length of every
    /// operand must match the configured mode for the duration of one
    /// operation.
    ///
    /// # Arguments
    ///
    /// * `bit_len` - Operand length in bits; a multiple of 32 up to
    ///   [`RSA_MAX_OPERAND_BITS`]
    pub fn configure(&mut self, bit_len: usize) -> RsaResult<()> {
        self.require_ready()?;
        if bit_len == 0 || bit_len % 32 != 0 || bit_len > RSA_MAX_OPERAND_BITS {
            return Err(RsaAccelError::LENGTH_EXCEEDED);
        }
        let words = bit_len / 32;
        self.regs.mode().write(|w| w.mode(words as u32));
        self.mode_words = words;
        self.loaded = LoadedBlocks::empty();
        Ok(())
    }

    /// Select the timing/performance trade-off for subsequent operations.
    pub fn set_timing(&mut self, timing: Timing) -> RsaResult<()> {
        if self.state == SeqState::Running {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        self.timing = timing;
        Ok(())
    }

    /// Configure the search optimization for subsequent operations.
    ///
    /// Validates what can be validated without reading operand data: the
    /// position must fit the hardware field and lie below the configured
    /// operand bit length. See [`Search::FromBit`] for the part that
    /// remains the caller's responsibility.
    pub fn set_search(&mut self, search: Search) -> RsaResult<()> {
        if self.state == SeqState::Running {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        if let Search::FromBit(pos) = search {
            if pos >= 1 << 12 {
                return Err(RsaAccelError::INVALID_SEARCH_POS);
            }
            if self.mode_words != 0 && usize::from(pos) >= self.mode_words * 32 {
                return Err(RsaAccelError::INVALID_SEARCH_POS);
            }
        }
        self.search = search;
        Ok(())
    }

    /// Program the Montgomery constant M' register. The driver performs
    /// no big-integer math; computing M' from the modulus is the caller's
    /// concern.
    pub fn set_mprime(&mut self, mprime: u32) -> RsaResult<()> {
        if self.state == SeqState::Running {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        self.regs.m_prime().write(|_| mprime);
        Ok(())
    }

    /// Copy an operand into a big-integer memory block.
    ///
    /// `bytes` is the operand in little-endian order and must not exceed
    /// the configured operand length. The remainder of the block, up to
    /// its full capacity, is zero-filled so stale words from a previous
    /// longer operation cannot reach the datapath.
    ///
    /// # Arguments
    ///
    /// * `block` - Target memory block
    /// * `bytes` - Operand, little-endian
    pub fn load_operand(&mut self, block: OperandBlock, bytes: &[u8]) -> RsaResult<()> {
        self.require_ready()?;
        if self.mode_words == 0 {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        if bytes.len() > self.mode_words * 4 {
            return Err(RsaAccelError::LENGTH_EXCEEDED);
        }
        let mem = match block {
            OperandBlock::M => self.regs.m_mem(),
            OperandBlock::Z => self.regs.z_mem(),
            OperandBlock::Y => self.regs.y_mem(),
            OperandBlock::X => self.regs.x_mem(),
        };
        for i in 0..RSA_MEM_WORDS {
            let word = word_at(bytes, i);
            mem.at(i).write(|_| word);
        }
        match block {
            OperandBlock::M => {
                self.modulus_lsb = bytes.first().copied().unwrap_or(0);
                self.loaded |= LoadedBlocks::M;
            }
            OperandBlock::Y => self.loaded |= LoadedBlocks::Y,
            OperandBlock::X => self.loaded |= LoadedBlocks::X,
            OperandBlock::Z => (),
        }
        Ok(())
    }

    /// Copy back the contents of a big-integer memory block.
    ///
    /// Exactly `out.len()` bytes are read. Reading the result block `Z`
    /// after a completed operation consumes the result and returns the
    /// sequencer to ready. For [`RsaOpKind::Mult`] the significant result
    /// is twice the configured operand length.
    pub fn read_operand(&mut self, block: OperandBlock, out: &mut [u8]) -> RsaResult<()> {
        match self.state {
            SeqState::Idle => return Err(RsaAccelError::NOT_INITIALIZED),
            SeqState::Ready | SeqState::Completed => (),
            SeqState::Running | SeqState::Faulted => {
                return Err(RsaAccelError::SEQUENCE_VIOLATION)
            }
        }
        if out.len() > RSA_MEM_BYTES {
            return Err(RsaAccelError::LENGTH_EXCEEDED);
        }
        let mem = match block {
            OperandBlock::M => self.regs.m_mem(),
            OperandBlock::Z => self.regs.z_mem(),
            OperandBlock::Y => self.regs.y_mem(),
            OperandBlock::X => self.regs.x_mem(),
        };
        for (i, chunk) in out.chunks_mut(4).enumerate() {
            let word = mem.at(i).read().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        if block == OperandBlock::Z && self.state == SeqState::Completed {
            self.state = SeqState::Ready;
        }
        Ok(())
    }

    /// Program the persistent options and fire the start trigger for one
    /// operation.
    ///
    /// # Arguments
    ///
    /// * `kind` - Operation to start
    /// * `completion` - How completion will be detected; interrupt-mode
    ///   detection requires enabling the interrupt before the trigger
    ///
    /// # Returns
    ///
    /// * `Operation` - Token to pass to the completion wait
    pub fn start(&mut self, kind: RsaOpKind, completion: CompletionMode) -> RsaResult<Operation> {
        match self.state {
            SeqState::Idle => return Err(RsaAccelError::NOT_INITIALIZED),
            SeqState::Ready => (),
            // Rejected before any register is touched, so an in-flight
            // operation is never disturbed.
            SeqState::Running | SeqState::Completed | SeqState::Faulted => {
                return Err(RsaAccelError::SEQUENCE_VIOLATION)
            }
        }
        if self.mode_words == 0 {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        let required = match kind {
            RsaOpKind::ModExp | RsaOpKind::ModMult => {
                LoadedBlocks::X | LoadedBlocks::Y | LoadedBlocks::M
            }
            RsaOpKind::Mult => LoadedBlocks::X | LoadedBlocks::Y,
        };
        if !self.loaded.contains(required) {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        match kind {
            RsaOpKind::ModExp | RsaOpKind::ModMult => {
                if self.modulus_lsb & 1 == 0 {
                    return Err(RsaAccelError::INVALID_MODULUS);
                }
            }
            RsaOpKind::Mult => {
                // Double-length product must fit the result block.
                if self.mode_words * 2 > RSA_MEM_WORDS {
                    return Err(RsaAccelError::LENGTH_EXCEEDED);
                }
            }
        }
        // The mode may have changed since the search position was
        // staged; it must still lie below the operand length that will
        // actually be programmed.
        if let Search::FromBit(pos) = self.search {
            if usize::from(pos) >= self.mode_words * 32 {
                return Err(RsaAccelError::INVALID_SEARCH_POS);
            }
        }
        // The hardware must agree that nothing is in flight; a busy
        // status here means a prior operation was never acknowledged.
        if !self.regs.query_idle().read().query_idle() {
            self.state = SeqState::Faulted;
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }

        self.regs
            .constant_time()
            .write(|w| w.constant_time(self.timing == Timing::Accelerated));
        match self.search {
            Search::Disabled => {
                self.regs.search_enable().write(|w| w.search_enable(false));
            }
            Search::FromBit(pos) => {
                self.regs.search_pos().write(|w| w.search_pos(pos.into()));
                self.regs.search_enable().write(|w| w.search_enable(true));
            }
        }
        if completion == CompletionMode::Interrupt {
            self.regs.int_ena().write(|w| w.int_ena(true));
        }
        match kind {
            RsaOpKind::ModExp => self
                .regs
                .set_start_modexp()
                .write(|w| w.set_start_modexp(true)),
            RsaOpKind::ModMult => self
                .regs
                .set_start_modmult()
                .write(|w| w.set_start_modmult(true)),
            RsaOpKind::Mult => self.regs.set_start_mult().write(|w| w.set_start_mult(true)),
        }
        self.state = SeqState::Running;
        Ok(Operation {
            kind,
            mode: completion,
        })
    }

    /// Wait for completion by polling the idle status bit.
    ///
    /// The interrupt-clear trigger is pulsed exactly once on every
    /// outcome, to arm the next completion signal. On expiry of the poll
    /// budget the sequencer faults: the hardware's true state is unknown
    /// and [`Rsa::init`] is required before further use.
    ///
    /// Only valid for operations started in [`CompletionMode::Poll`];
    /// an interrupt-mode token is rejected (its wait belongs to
    /// [`Rsa::await_completion_with`]) and the operation keeps running.
    ///
    /// # Arguments
    ///
    /// * `op` - Token returned by [`Rsa::start`]
    /// * `max_polls` - Poll budget; the caller-specified timeout
    pub fn await_completion(&mut self, op: Operation, max_polls: u32) -> RsaResult<()> {
        if self.state != SeqState::Running {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        if op.mode != CompletionMode::Poll {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        let done =
            wait::until_or_timeout(|| self.regs.query_idle().read().query_idle(), max_polls);
        self.acknowledge();
        if !done {
            self.state = SeqState::Faulted;
            return Err(RsaAccelError::TIMED_OUT);
        }
        self.state = SeqState::Completed;
        Ok(())
    }

    /// Wait for completion of an interrupt-mode operation.
    ///
    /// `notified` is the externally wired delivery of the completion
    /// interrupt (interrupt-controller wiring is outside this driver);
    /// it is polled up to `max_polls` times and may suspend the caller
    /// internally. Disabling the interrupt enable again after use is
    /// also the caller's responsibility. The interrupt-clear trigger is
    /// pulsed exactly once on every outcome.
    ///
    /// Only valid for operations started in
    /// [`CompletionMode::Interrupt`]: a poll-mode operation never
    /// enabled the interrupt, so its notifier could not fire, and the
    /// token is rejected here while the operation keeps running.
    pub fn await_completion_with<F>(
        &mut self,
        op: Operation,
        notified: F,
        max_polls: u32,
    ) -> RsaResult<()>
    where
        F: FnMut() -> bool,
    {
        if self.state != SeqState::Running {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        if op.mode != CompletionMode::Interrupt {
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        let done = wait::until_or_timeout(notified, max_polls);
        self.acknowledge();
        if !done {
            self.state = SeqState::Faulted;
            return Err(RsaAccelError::TIMED_OUT);
        }
        // The interrupt fired but the hardware disagrees about being
        // done; treat the sequence as corrupted.
        if !self.regs.query_idle().read().query_idle() {
            self.state = SeqState::Faulted;
            return Err(RsaAccelError::SEQUENCE_VIOLATION);
        }
        self.state = SeqState::Completed;
        Ok(())
    }

    /// Hardware version stamp from the DATE register.
    pub fn version(&self) -> u32 {
        self.regs.date().read().date()
    }

    fn require_ready(&self) -> RsaResult<()> {
        match self.state {
            SeqState::Idle => Err(RsaAccelError::NOT_INITIALIZED),
            SeqState::Ready => Ok(()),
            SeqState::Running | SeqState::Completed | SeqState::Faulted => {
                Err(RsaAccelError::SEQUENCE_VIOLATION)
            }
        }
    }

    fn acknowledge(&mut self) {
        self.regs.int_clr().write(|w| w.int_clr(true));
    }
}

/// Little-endian word `i` of `bytes`, zero-padded past the end.
fn word_at(bytes: &[u8], i: usize) -> u32 {
    let mut word = [0u8; 4];
    let off = i * 4;
    if off < bytes.len() {
        let n = core::cmp::min(4, bytes.len() - off);
        word[..n].copy_from_slice(&bytes[off..off + n]);
    }
    u32::from_le_bytes(word)
}
