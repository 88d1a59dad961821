// Licensed under the Apache-2.0 license

//! Driver-level tests running against the emulated accelerator over the
//! bus-backed MMIO adapter, with null-based register pointers acting as
//! bus addresses.

use rsa_accel_driver::{
    CompletionMode, OperandBlock, Rsa, RsaAccelError, RsaOpKind, Search, Timing, RSA_MEM_BYTES,
};
use rsa_accel_emu_bus::BusMmio;
use rsa_accel_emu_periph::{RsaAccel, SharedRsaAccel, INIT_READS};
use rsa_accel_registers::rsa::RegisterBlock;

fn new_rsa() -> (Rsa<BusMmio<SharedRsaAccel>>, SharedRsaAccel) {
    let shared = SharedRsaAccel::new(RsaAccel::new());
    let regs = unsafe {
        RegisterBlock::new_with_mmio(core::ptr::null_mut::<u32>(), BusMmio::new(shared.clone()))
    };
    (Rsa::new(regs), shared)
}

fn read_z(rsa: &mut Rsa<BusMmio<SharedRsaAccel>>, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    rsa.read_operand(OperandBlock::Z, &mut out).unwrap();
    out
}

#[test]
fn test_modexp() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(384).unwrap();
    // 5^3 mod 2753 = 125
    rsa.load_operand(OperandBlock::M, &[0xc1, 0x0a]).unwrap();
    rsa.load_operand(OperandBlock::X, &[5]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[3]).unwrap();
    rsa.set_mprime(0x1234_5678).unwrap();
    let op = rsa.start(RsaOpKind::ModExp, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();

    let z = read_z(&mut rsa, 48);
    assert_eq!(z[0], 125);
    assert!(z[1..].iter().all(|&b| b == 0));
}

#[test]
fn test_modmult() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(32).unwrap();
    // 17 * 19 mod 101 = 20
    rsa.load_operand(OperandBlock::M, &[101]).unwrap();
    rsa.load_operand(OperandBlock::X, &[17]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[19]).unwrap();
    let op = rsa.start(RsaOpKind::ModMult, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();

    assert_eq!(read_z(&mut rsa, 4), [20, 0, 0, 0]);
}

#[test]
fn test_mult_double_length_result() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(32).unwrap();
    rsa.load_operand(OperandBlock::X, &123_456_789u32.to_le_bytes())
        .unwrap();
    rsa.load_operand(OperandBlock::Y, &987_654_321u32.to_le_bytes())
        .unwrap();
    let op = rsa.start(RsaOpKind::Mult, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();

    let expected = 123_456_789u64 * 987_654_321u64;
    assert_eq!(read_z(&mut rsa, 8), expected.to_le_bytes());
}

#[test]
fn test_accelerated_timing_same_result() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(384).unwrap();
    rsa.load_operand(OperandBlock::M, &[0xc1, 0x0a]).unwrap();
    rsa.load_operand(OperandBlock::X, &[5]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[3]).unwrap();
    let op = rsa.start(RsaOpKind::ModExp, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();
    let constant_time = read_z(&mut rsa, 48);

    rsa.set_timing(Timing::Accelerated).unwrap();
    let op = rsa.start(RsaOpKind::ModExp, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();
    assert_eq!(read_z(&mut rsa, 48), constant_time);
}

#[test]
fn test_start_while_running_preserves_operation() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(32).unwrap();
    // 2^10 mod 1001 = 23
    rsa.load_operand(OperandBlock::M, &[0xe9, 0x03]).unwrap();
    rsa.load_operand(OperandBlock::X, &[2]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[10]).unwrap();
    let op = rsa.start(RsaOpKind::ModExp, CompletionMode::Poll).unwrap();
    assert_eq!(
        rsa.start(RsaOpKind::ModMult, CompletionMode::Poll)
            .err()
            .unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );

    // The in-flight operation is undisturbed by the rejected trigger.
    rsa.await_completion(op, 100).unwrap();
    assert_eq!(read_z(&mut rsa, 4), [23, 0, 0, 0]);
}

#[test]
fn test_timeout_faults_and_init_recovers() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(32).unwrap();
    rsa.load_operand(OperandBlock::M, &[101]).unwrap();
    rsa.load_operand(OperandBlock::X, &[17]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[19]).unwrap();
    let op = rsa.start(RsaOpKind::ModMult, CompletionMode::Poll).unwrap();
    assert_eq!(
        rsa.await_completion(op, 2).err().unwrap(),
        RsaAccelError::TIMED_OUT
    );

    // Faulted; everything but init is refused.
    assert_eq!(
        rsa.configure(32).err().unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );
    let mut out = [0u8; 4];
    assert_eq!(
        rsa.read_operand(OperandBlock::Z, &mut out).err().unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );

    rsa.init(100).unwrap();
    rsa.configure(32).unwrap();
    rsa.load_operand(OperandBlock::M, &[101]).unwrap();
    rsa.load_operand(OperandBlock::X, &[17]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[19]).unwrap();
    let op = rsa.start(RsaOpKind::ModMult, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();
    assert_eq!(read_z(&mut rsa, 4), [20, 0, 0, 0]);
}

#[test]
fn test_operand_write_zero_fills_block() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(3072).unwrap();
    let stale = [0xffu8; RSA_MEM_BYTES];
    rsa.load_operand(OperandBlock::X, &stale).unwrap();

    rsa.configure(384).unwrap();
    let operand: Vec<u8> = (1..=13).collect();
    rsa.load_operand(OperandBlock::X, &operand).unwrap();
    let mut out = [0u8; RSA_MEM_BYTES];
    rsa.read_operand(OperandBlock::X, &mut out).unwrap();
    assert_eq!(&out[..13], operand.as_slice());
    assert!(out[13..].iter().all(|&b| b == 0));
}

#[test]
fn test_even_modulus_rejected() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(384).unwrap();
    rsa.load_operand(OperandBlock::M, &[0xc0, 0x0a]).unwrap();
    rsa.load_operand(OperandBlock::X, &[5]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[3]).unwrap();
    assert_eq!(
        rsa.start(RsaOpKind::ModExp, CompletionMode::Poll)
            .err()
            .unwrap(),
        RsaAccelError::INVALID_MODULUS
    );
    // Plain multiplication has no modulus; the even value in M is fine.
    let op = rsa.start(RsaOpKind::Mult, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();
}

#[test]
fn test_not_initialized() {
    let (mut rsa, _) = new_rsa();
    assert_eq!(
        rsa.configure(384).err().unwrap(),
        RsaAccelError::NOT_INITIALIZED
    );
    assert_eq!(
        rsa.load_operand(OperandBlock::X, &[1]).err().unwrap(),
        RsaAccelError::NOT_INITIALIZED
    );
    assert_eq!(
        rsa.start(RsaOpKind::ModExp, CompletionMode::Poll)
            .err()
            .unwrap(),
        RsaAccelError::NOT_INITIALIZED
    );
    let mut out = [0u8; 4];
    assert_eq!(
        rsa.read_operand(OperandBlock::Z, &mut out).err().unwrap(),
        RsaAccelError::NOT_INITIALIZED
    );
}

#[test]
fn test_missing_operands_rejected() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    // No mode programmed yet.
    assert_eq!(
        rsa.load_operand(OperandBlock::X, &[1]).err().unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );
    rsa.configure(32).unwrap();
    rsa.load_operand(OperandBlock::X, &[5]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[3]).unwrap();
    // Modulus never loaded.
    assert_eq!(
        rsa.start(RsaOpKind::ModExp, CompletionMode::Poll)
            .err()
            .unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );
    // Reprogramming the mode invalidates loaded operands.
    rsa.configure(64).unwrap();
    assert_eq!(
        rsa.start(RsaOpKind::Mult, CompletionMode::Poll)
            .err()
            .unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );
}

#[test]
fn test_length_limits() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    assert_eq!(
        rsa.configure(0).err().unwrap(),
        RsaAccelError::LENGTH_EXCEEDED
    );
    assert_eq!(
        rsa.configure(33).err().unwrap(),
        RsaAccelError::LENGTH_EXCEEDED
    );
    assert_eq!(
        rsa.configure(3072 + 32).err().unwrap(),
        RsaAccelError::LENGTH_EXCEEDED
    );

    rsa.configure(32).unwrap();
    assert_eq!(
        rsa.load_operand(OperandBlock::X, &[0u8; 8]).err().unwrap(),
        RsaAccelError::LENGTH_EXCEEDED
    );

    // Full-width multiplication would need a double-width result block.
    rsa.configure(3072).unwrap();
    rsa.load_operand(OperandBlock::X, &[2]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[3]).unwrap();
    assert_eq!(
        rsa.start(RsaOpKind::Mult, CompletionMode::Poll)
            .err()
            .unwrap(),
        RsaAccelError::LENGTH_EXCEEDED
    );
}

#[test]
fn test_search_position_validation() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    assert_eq!(
        rsa.set_search(Search::FromBit(4096)).err().unwrap(),
        RsaAccelError::INVALID_SEARCH_POS
    );
    rsa.configure(32).unwrap();
    assert_eq!(
        rsa.set_search(Search::FromBit(40)).err().unwrap(),
        RsaAccelError::INVALID_SEARCH_POS
    );

    rsa.configure(384).unwrap();
    rsa.set_search(Search::FromBit(10)).unwrap();
    rsa.load_operand(OperandBlock::M, &[0xc1, 0x0a]).unwrap();
    rsa.load_operand(OperandBlock::X, &[5]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[3]).unwrap();
    let op = rsa.start(RsaOpKind::ModExp, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();
    assert_eq!(read_z(&mut rsa, 1), [125]);
}

#[test]
fn test_stale_search_pos_rejected_after_reconfigure() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    // Staged before any mode exists; only the field width is checkable.
    rsa.set_search(Search::FromBit(500)).unwrap();
    rsa.configure(32).unwrap();
    rsa.load_operand(OperandBlock::M, &[101]).unwrap();
    rsa.load_operand(OperandBlock::X, &[5]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[3]).unwrap();
    // The staged position no longer fits the programmed operand length.
    assert_eq!(
        rsa.start(RsaOpKind::ModExp, CompletionMode::Poll)
            .err()
            .unwrap(),
        RsaAccelError::INVALID_SEARCH_POS
    );

    rsa.set_search(Search::Disabled).unwrap();
    let op = rsa.start(RsaOpKind::ModExp, CompletionMode::Poll).unwrap();
    rsa.await_completion(op, 100).unwrap();
    // 5^3 mod 101 = 24
    assert_eq!(read_z(&mut rsa, 4), [24, 0, 0, 0]);
}

#[test]
fn test_z_block_loadable_but_never_required() {
    let (mut rsa, _) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(384).unwrap();
    // Accumulator-constant style load through the ordinary operand path.
    let constant: Vec<u8> = (1..=48).collect();
    rsa.load_operand(OperandBlock::Z, &constant).unwrap();
    let mut out = [0u8; 48];
    rsa.read_operand(OperandBlock::Z, &mut out).unwrap();
    assert_eq!(out.as_slice(), constant.as_slice());

    // A populated Z contributes nothing to the blocks an operation needs.
    assert_eq!(
        rsa.start(RsaOpKind::Mult, CompletionMode::Poll)
            .err()
            .unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );
}

#[test]
fn test_wait_entry_point_must_match_completion_mode() {
    let (mut rsa, shared) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(32).unwrap();
    rsa.load_operand(OperandBlock::X, &[17]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[19]).unwrap();

    // A poll-mode token never enabled the interrupt; the notifier wait
    // rejects it instead of timing out on a line that cannot fire.
    let op = rsa.start(RsaOpKind::Mult, CompletionMode::Poll).unwrap();
    assert_eq!(
        rsa.await_completion_with(op, || shared.poll_interrupt(), 100)
            .err()
            .unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );
    rsa.init(100).unwrap();

    rsa.configure(32).unwrap();
    rsa.load_operand(OperandBlock::X, &[17]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[19]).unwrap();
    let op = rsa
        .start(RsaOpKind::Mult, CompletionMode::Interrupt)
        .unwrap();
    assert_eq!(
        rsa.await_completion(op, 100).err().unwrap(),
        RsaAccelError::SEQUENCE_VIOLATION
    );
    rsa.init(100).unwrap();
}

#[test]
fn test_interrupt_completion() {
    let (mut rsa, shared) = new_rsa();
    rsa.init(100).unwrap();
    rsa.configure(32).unwrap();
    // 17 * 19 = 323
    rsa.load_operand(OperandBlock::X, &[17]).unwrap();
    rsa.load_operand(OperandBlock::Y, &[19]).unwrap();
    let op = rsa
        .start(RsaOpKind::Mult, CompletionMode::Interrupt)
        .unwrap();
    assert!(!shared.interrupt_pending());
    rsa.await_completion_with(op, || shared.poll_interrupt(), 100)
        .unwrap();
    // The completion wait acknowledged the interrupt.
    assert!(!shared.interrupt_pending());
    assert_eq!(read_z(&mut rsa, 4), 323u32.to_le_bytes());
}

#[test]
fn test_init_waits_for_memory_initialization() {
    let (mut rsa, _) = new_rsa();
    assert_eq!(rsa.init(1).err().unwrap(), RsaAccelError::TIMED_OUT);
    assert_eq!(
        rsa.configure(32).err().unwrap(),
        RsaAccelError::NOT_INITIALIZED
    );
    rsa.init(INIT_READS + 1).unwrap();
    rsa.configure(32).unwrap();
}

#[test]
fn test_version() {
    let (rsa, _) = new_rsa();
    assert_eq!(rsa.version(), 0x2021_0428);
}
