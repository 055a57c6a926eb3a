//! Transaction protocol coverage for the register-file device.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_possible_truncation)]

use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use smbus_core::{
    BusAddress, DeviceConfig, RegisterFileDevice, SmbusDevice, TransactionError,
    REGISTER_FILE_SIZE,
};
use thiserror as _;

fn read_n(device: &mut RegisterFileDevice, count: usize) -> Vec<u8> {
    (0..count).map(|_| device.receive_byte()).collect()
}

fn seeded_device() -> RegisterFileDevice {
    let mut device = RegisterFileDevice::default();
    let mut fill = vec![0x00];
    fill.extend((0..REGISTER_FILE_SIZE).map(|i| (i as u8).wrapping_mul(7).wrapping_add(3)));
    device.write_data(&fill).unwrap();
    device
}

#[test]
fn reset_reads_back_all_zero_from_cursor_zero() {
    let mut device = seeded_device();
    device.receive_byte();

    device.reset();

    assert_eq!(device.command(), 0);
    assert_eq!(read_n(&mut device, REGISTER_FILE_SIZE), vec![0; REGISTER_FILE_SIZE]);
}

#[test]
fn command_only_write_moves_cursor_and_preserves_registers() {
    let mut device = seeded_device();
    let prior = device.register(0x10);
    let before = *device.registers();

    device.write_data(&[0x10]).unwrap();

    assert_eq!(device.command(), 0x10);
    assert_eq!(*device.registers(), before);
    assert_eq!(device.receive_byte(), prior);
}

#[test]
fn read_after_write_starts_at_written_region() {
    let mut device = RegisterFileDevice::default();

    device.write_data(&[0x05, 0xAA, 0xBB, 0xCC]).unwrap();

    assert_eq!(device.command(), 0x05);
    assert_eq!(read_n(&mut device, 3), vec![0xAA, 0xBB, 0xCC]);
    assert_eq!(device.command(), 0x08);
}

#[rstest]
#[case::fits_exactly(0xFD, vec![0x01, 0x02, 0x03], 3)]
#[case::drops_one(0xFE, vec![0x01, 0x02, 0x03], 2)]
#[case::last_register_only(0xFF, vec![0x01, 0x02, 0x03], 1)]
#[case::command_only(0x80, vec![], 0)]
#[case::overlong_from_zero(0x00, vec![0x5A; 300], 256)]
fn write_truncates_at_file_end(
    #[case] command: u8,
    #[case] payload: Vec<u8>,
    #[case] written: usize,
) {
    let mut device = seeded_device();
    let before = *device.registers();
    let mut frame = vec![command];
    frame.extend_from_slice(&payload);

    device.write_data(&frame).unwrap();

    let start = usize::from(command);
    assert_eq!(&device.registers()[start..start + written], &payload[..written]);
    assert_eq!(&device.registers()[..start], &before[..start]);
    assert_eq!(
        &device.registers()[start + written..],
        &before[start + written..]
    );
    assert_eq!(device.command(), command);
}

#[test]
fn truncated_write_does_not_wrap_to_register_zero() {
    let mut device = seeded_device();
    let first = device.register(0x00);

    device.write_data(&[0xFE, 0x01, 0x02, 0x03]).unwrap();

    assert_eq!(device.register(0xFE), 0x01);
    assert_eq!(device.register(0xFF), 0x02);
    assert_eq!(device.register(0x00), first);
}

#[test]
fn read_cursor_wraps_from_last_register() {
    let mut device = seeded_device();
    device.write_data(&[0xFF]).unwrap();

    assert_eq!(device.receive_byte(), device.register(0xFF));
    assert_eq!(device.command(), 0x00);
    assert_eq!(device.receive_byte(), device.register(0x00));
}

#[rstest]
#[case::read(true)]
#[case::write(false)]
fn quick_command_never_mutates(#[case] read: bool) {
    let mut device = seeded_device();
    device.write_data(&[0x42]).unwrap();
    let before = device.clone();

    device.quick_command(read);

    assert_eq!(device, before);
}

#[test]
fn full_register_file_round_trip() {
    let mut device = RegisterFileDevice::new(DeviceConfig::default()).unwrap();
    let payload: Vec<u8> = (0..=u8::MAX).rev().collect();
    let mut frame = vec![0x00];
    frame.extend_from_slice(&payload);

    device.write_data(&frame).unwrap();

    assert_eq!(read_n(&mut device, REGISTER_FILE_SIZE), payload);
}

#[test]
fn empty_write_is_a_contract_violation() {
    let mut device = seeded_device();
    let before = device.clone();

    assert_eq!(device.write_data(&[]), Err(TransactionError::EmptyWrite));
    assert_eq!(device, before);
}

#[test]
fn configured_address_is_reported() {
    let device = RegisterFileDevice::new(DeviceConfig { address: 0x2A }).unwrap();
    assert_eq!(device.address(), BusAddress::new(0x2A).unwrap());
}

proptest! {
    #[test]
    fn property_write_copies_clamped_prefix(
        command in any::<u8>(),
        payload in prop::collection::vec(any::<u8>(), 0..320),
    ) {
        let mut device = seeded_device();
        let before = *device.registers();
        let mut frame = vec![command];
        frame.extend_from_slice(&payload);

        device.write_data(&frame).unwrap();

        let start = usize::from(command);
        let copied = payload.len().min(REGISTER_FILE_SIZE - start);
        for index in 0..REGISTER_FILE_SIZE {
            let expected = if (start..start + copied).contains(&index) {
                payload[index - start]
            } else {
                before[index]
            };
            prop_assert_eq!(device.registers()[index], expected);
        }
        prop_assert_eq!(device.command(), command);
    }

    #[test]
    fn property_reads_advance_cursor_modulo_256(
        cursor in any::<u8>(),
        count in 0_usize..1024,
    ) {
        let mut device = seeded_device();
        device.write_data(&[cursor]).unwrap();

        let values = read_n(&mut device, count);

        prop_assert_eq!(device.command(), ((usize::from(cursor) + count) % 256) as u8);
        for (offset, value) in values.iter().enumerate() {
            let index = ((usize::from(cursor) + offset) % 256) as u8;
            prop_assert_eq!(*value, device.register(index));
        }
    }
}
