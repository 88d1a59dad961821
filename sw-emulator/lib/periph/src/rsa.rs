/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa.rs

Abstract:

    File contains the RSA accelerator peripheral implementation.

    This is a functional model: operands are read from the big-integer
    memories when a start trigger is written, the result is computed with
    host big-integer arithmetic, and completion is committed after a
    latency budget of QUERY_IDLE reads (or poll() calls). The Montgomery
    datapath itself is not simulated, so the M' register is accepted but
    does not influence the result.

--*/

use std::cell::RefCell;
use std::rc::Rc;

use num_bigint::BigUint;
use rsa_accel_emu_bus::{Bus, BusError, RvAddr, RvData, RvSize};
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_bitfields;
use tock_registers::registers::InMemoryRegister;

register_bitfields! [
    u32,

    /// Mode Register Fields
    Mode [
        MODE OFFSET(0) NUMBITS(7) [],
    ],

    /// Constant Time Register Fields
    ConstantTime [
        CONSTANT_TIME OFFSET(0) NUMBITS(1) [],
    ],

    /// Search Enable Register Fields
    SearchEnable [
        SEARCH_ENABLE OFFSET(0) NUMBITS(1) [],
    ],

    /// Search Position Register Fields
    SearchPos [
        SEARCH_POS OFFSET(0) NUMBITS(12) [],
    ],

    /// Interrupt Enable Register Fields
    IntEna [
        INT_ENA OFFSET(0) NUMBITS(1) [],
    ],
];

/// Words per big-integer memory block (3072 bits).
const RSA_MEM_WORDS: usize = 96;

const M_MEM_OFFSET: RvAddr = 0x000;
const Z_MEM_OFFSET: RvAddr = 0x200;
const Y_MEM_OFFSET: RvAddr = 0x400;
const X_MEM_OFFSET: RvAddr = 0x600;

const M_PRIME_OFFSET: RvAddr = 0x800;
const MODE_OFFSET: RvAddr = 0x804;
const QUERY_CLEAN_OFFSET: RvAddr = 0x808;
const SET_START_MODEXP_OFFSET: RvAddr = 0x80c;
const SET_START_MODMULT_OFFSET: RvAddr = 0x810;
const SET_START_MULT_OFFSET: RvAddr = 0x814;
const QUERY_IDLE_OFFSET: RvAddr = 0x818;
const INT_CLR_OFFSET: RvAddr = 0x81c;
const CONSTANT_TIME_OFFSET: RvAddr = 0x820;
const SEARCH_ENABLE_OFFSET: RvAddr = 0x824;
const SEARCH_POS_OFFSET: RvAddr = 0x828;
const INT_ENA_OFFSET: RvAddr = 0x82c;
const DATE_OFFSET: RvAddr = 0x830;

/// DATE register value (30-bit version stamp).
const DATE_VAL: RvData = 0x2021_0428;

/// Number of QUERY_CLEAN reads before the one-time memory initialization
/// reports complete.
pub const INIT_READS: u32 = 4;

/// Operation latency, in QUERY_IDLE reads / poll() calls, with the
/// constant-time datapath selected (CONSTANT_TIME = 0).
pub const CONSTANT_TIME_LATENCY: u32 = 16;

/// Operation latency with the accelerated datapath selected
/// (CONSTANT_TIME = 1). Shorter than [`CONSTANT_TIME_LATENCY`]; the
/// numeric result is identical.
pub const ACCELERATED_LATENCY: u32 = 6;

#[derive(Clone, Copy)]
enum OpKind {
    ModExp,
    ModMult,
    Mult,
}

/// RSA Accelerator Peripheral
pub struct RsaAccel {
    /// M memory (modulus)
    m_mem: [u32; RSA_MEM_WORDS],

    /// Z memory (result / accumulator)
    z_mem: [u32; RSA_MEM_WORDS],

    /// Y memory
    y_mem: [u32; RSA_MEM_WORDS],

    /// X memory
    x_mem: [u32; RSA_MEM_WORDS],

    /// M' register
    m_prime: u32,

    /// Mode register
    mode: InMemoryRegister<u32, Mode::Register>,

    /// Constant time register
    constant_time: InMemoryRegister<u32, ConstantTime::Register>,

    /// Search enable register
    search_enable: InMemoryRegister<u32, SearchEnable::Register>,

    /// Search position register
    search_pos: InMemoryRegister<u32, SearchPos::Register>,

    /// Interrupt enable register
    int_ena: InMemoryRegister<u32, IntEna::Register>,

    /// Remaining QUERY_CLEAN reads until initialization reports complete
    clean_reads_remaining: u32,

    /// Remaining latency of the in-flight operation, 0 when idle
    busy_reads_remaining: u32,

    /// Result words awaiting commit at completion
    pending_result: Option<Vec<u32>>,

    /// Completion interrupt line
    int_pending: bool,
}

impl Default for RsaAccel {
    fn default() -> Self {
        Self::new()
    }
}

impl RsaAccel {
    pub fn new() -> Self {
        Self {
            m_mem: [0; RSA_MEM_WORDS],
            z_mem: [0; RSA_MEM_WORDS],
            y_mem: [0; RSA_MEM_WORDS],
            x_mem: [0; RSA_MEM_WORDS],
            m_prime: 0,
            mode: InMemoryRegister::new(0),
            constant_time: InMemoryRegister::new(0),
            search_enable: InMemoryRegister::new(0),
            search_pos: InMemoryRegister::new(0),
            int_ena: InMemoryRegister::new(0),
            clean_reads_remaining: INIT_READS,
            busy_reads_remaining: 0,
            pending_result: None,
            int_pending: false,
        }
    }

    /// State of the completion interrupt line wired to the interrupt
    /// controller.
    pub fn interrupt_pending(&self) -> bool {
        self.int_pending
    }

    fn mem_word(mem: &[u32; RSA_MEM_WORDS], base: RvAddr, addr: RvAddr) -> RvData {
        mem[((addr - base) / 4) as usize]
    }

    fn set_mem_word(mem: &mut [u32; RSA_MEM_WORDS], base: RvAddr, addr: RvAddr, val: RvData) {
        mem[((addr - base) / 4) as usize] = val;
    }

    fn operand(mem: &[u32; RSA_MEM_WORDS], words: usize) -> BigUint {
        BigUint::new(mem[..words].to_vec())
    }

    /// Starts an operation. A trigger written while a previous operation
    /// is still in flight is ignored; the running computation is not
    /// disturbed.
    fn trigger(&mut self, kind: OpKind) {
        if self.busy_reads_remaining > 0 {
            return;
        }
        let words = self.mode.read(Mode::MODE) as usize;
        if words == 0 || words > RSA_MEM_WORDS {
            return;
        }

        let x = Self::operand(&self.x_mem, words);
        let y = Self::operand(&self.y_mem, words);
        let (result, result_words) = match kind {
            OpKind::ModExp => {
                let m = Self::operand(&self.m_mem, words);
                if m == BigUint::default() {
                    return;
                }
                (x.modpow(&y, &m), words)
            }
            OpKind::ModMult => {
                let m = Self::operand(&self.m_mem, words);
                if m == BigUint::default() {
                    return;
                }
                ((x * y) % m, words)
            }
            OpKind::Mult => (x * y, (words * 2).min(RSA_MEM_WORDS)),
        };

        let mut digits = result.to_u32_digits();
        digits.resize(result_words, 0);
        self.pending_result = Some(digits);
        self.busy_reads_remaining = if self.constant_time.is_set(ConstantTime::CONSTANT_TIME) {
            ACCELERATED_LATENCY
        } else {
            CONSTANT_TIME_LATENCY
        };
    }

    /// Commits the pending result and raises the interrupt line.
    fn op_complete(&mut self) {
        if let Some(digits) = self.pending_result.take() {
            self.z_mem[..digits.len()].copy_from_slice(&digits);
        }
        if self.int_ena.is_set(IntEna::INT_ENA) {
            self.int_pending = true;
        }
    }
}

impl Bus for RsaAccel {
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        if size != RvSize::Word {
            Err(BusError::LoadAccessFault)?
        }
        if addr % 4 != 0 {
            Err(BusError::LoadAddrMisaligned)?
        }
        match addr {
            M_MEM_OFFSET..=0x17f => Ok(Self::mem_word(&self.m_mem, M_MEM_OFFSET, addr)),
            Z_MEM_OFFSET..=0x37f => Ok(Self::mem_word(&self.z_mem, Z_MEM_OFFSET, addr)),
            Y_MEM_OFFSET..=0x57f => Ok(Self::mem_word(&self.y_mem, Y_MEM_OFFSET, addr)),
            X_MEM_OFFSET..=0x77f => Ok(Self::mem_word(&self.x_mem, X_MEM_OFFSET, addr)),
            M_PRIME_OFFSET => Ok(self.m_prime),
            MODE_OFFSET => Ok(self.mode.get()),
            QUERY_CLEAN_OFFSET => {
                if self.clean_reads_remaining > 0 {
                    self.clean_reads_remaining -= 1;
                    Ok(0)
                } else {
                    Ok(1)
                }
            }
            // Write-trigger registers have no defined read value.
            SET_START_MODEXP_OFFSET | SET_START_MODMULT_OFFSET | SET_START_MULT_OFFSET
            | INT_CLR_OFFSET => Ok(0),
            QUERY_IDLE_OFFSET => {
                self.poll();
                Ok(u32::from(self.busy_reads_remaining == 0))
            }
            CONSTANT_TIME_OFFSET => Ok(self.constant_time.get()),
            SEARCH_ENABLE_OFFSET => Ok(self.search_enable.get()),
            SEARCH_POS_OFFSET => Ok(self.search_pos.get()),
            INT_ENA_OFFSET => Ok(self.int_ena.get()),
            DATE_OFFSET => Ok(DATE_VAL),
            _ => Err(BusError::LoadAccessFault),
        }
    }

    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        if size != RvSize::Word {
            Err(BusError::StoreAccessFault)?
        }
        if addr % 4 != 0 {
            Err(BusError::StoreAddrMisaligned)?
        }
        match addr {
            M_MEM_OFFSET..=0x17f => Self::set_mem_word(&mut self.m_mem, M_MEM_OFFSET, addr, val),
            Z_MEM_OFFSET..=0x37f => Self::set_mem_word(&mut self.z_mem, Z_MEM_OFFSET, addr, val),
            Y_MEM_OFFSET..=0x57f => Self::set_mem_word(&mut self.y_mem, Y_MEM_OFFSET, addr, val),
            X_MEM_OFFSET..=0x77f => Self::set_mem_word(&mut self.x_mem, X_MEM_OFFSET, addr, val),
            M_PRIME_OFFSET => self.m_prime = val,
            MODE_OFFSET => self.mode.set(val),
            SET_START_MODEXP_OFFSET => {
                if val & 1 != 0 {
                    self.trigger(OpKind::ModExp);
                }
            }
            SET_START_MODMULT_OFFSET => {
                if val & 1 != 0 {
                    self.trigger(OpKind::ModMult);
                }
            }
            SET_START_MULT_OFFSET => {
                if val & 1 != 0 {
                    self.trigger(OpKind::Mult);
                }
            }
            INT_CLR_OFFSET => {
                if val & 1 != 0 {
                    self.int_pending = false;
                }
            }
            CONSTANT_TIME_OFFSET => self.constant_time.set(val),
            SEARCH_ENABLE_OFFSET => self.search_enable.set(val),
            SEARCH_POS_OFFSET => self.search_pos.set(val),
            INT_ENA_OFFSET => self.int_ena.set(val),
            QUERY_CLEAN_OFFSET | QUERY_IDLE_OFFSET | DATE_OFFSET => {
                Err(BusError::StoreAccessFault)?
            }
            _ => Err(BusError::StoreAccessFault)?,
        }
        Ok(())
    }

    fn poll(&mut self) {
        if self.busy_reads_remaining > 0 {
            self.busy_reads_remaining -= 1;
            if self.busy_reads_remaining == 0 {
                self.op_complete();
            }
        }
    }
}

/// Clonable handle to a shared [`RsaAccel`], so a test can hold the
/// peripheral's interrupt line while the driver owns the bus
/// connection. Stands in for the interrupt controller wiring, which is
/// outside the driver's scope.
#[derive(Clone)]
pub struct SharedRsaAccel {
    rsa: Rc<RefCell<RsaAccel>>,
}

impl SharedRsaAccel {
    pub fn new(rsa: RsaAccel) -> Self {
        Self {
            rsa: Rc::new(RefCell::new(rsa)),
        }
    }

    /// Advances the peripheral one step and samples the interrupt line;
    /// usable as an `await_completion_with` notifier.
    pub fn poll_interrupt(&self) -> bool {
        let mut rsa = self.rsa.borrow_mut();
        rsa.poll();
        rsa.interrupt_pending()
    }

    /// Samples the interrupt line without advancing the peripheral.
    pub fn interrupt_pending(&self) -> bool {
        self.rsa.borrow().interrupt_pending()
    }
}

impl Bus for SharedRsaAccel {
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        self.rsa.borrow_mut().read(size, addr)
    }

    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        self.rsa.borrow_mut().write(size, addr, val)
    }

    fn poll(&mut self) {
        self.rsa.borrow_mut().poll()
    }
}
