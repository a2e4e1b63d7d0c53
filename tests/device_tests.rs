//! Integration tests for the behavioural device model.

use sdram_controller::common::ProtocolViolation;
use sdram_controller::config::{Config, TimingConfig};
use sdram_controller::protocol::*;
use sdram_controller::sim::{SdramDevice, SdramModel};

fn encoder() -> ProtocolEncoder {
    ProtocolEncoder::new(HoldTable::from_timing(&TimingConfig::default()))
}

/// Drives one command followed by NOPs for its hold time.
fn issue(dev: &mut SdramModel, intent: Intent) -> Result<Option<u32>, ProtocolViolation> {
    let cmd = encoder().encode(intent);
    let mut data = dev.clock(&cmd)?;
    for _ in 1..cmd.hold {
        data = data.or(dev.clock(&Command::NOP)?);
    }
    Ok(data)
}

fn initialized() -> SdramModel {
    let mut dev = SdramModel::new(&Config::default());
    issue(&mut dev, Intent::Precharge { bank: None }).unwrap();
    issue(&mut dev, Intent::SetMode(0x0021)).unwrap();
    dev
}

/// Tests that commands before the mode register is set are refused.
#[test]
fn test_command_before_init() {
    let mut dev = SdramModel::new(&Config::default());
    let err = issue(&mut dev, Intent::ActivateRow { bank: 0, row: 0 }).unwrap_err();
    assert!(matches!(
        err,
        ProtocolViolation::NotInitialized {
            opcode: Opcode::Activate,
            ..
        }
    ));
}

/// Tests initialization through precharge-all and mode set.
#[test]
fn test_initialization() {
    let dev = initialized();
    assert_eq!(dev.mode(), Some(0x0021));
    assert_eq!(dev.open_row(0), None);
    assert_eq!(dev.name(), "sdram-model");
}

/// Tests that a command inside the previous hold time is refused.
#[test]
fn test_hold_violation() {
    let mut dev = SdramModel::new(&Config::default());
    issue(&mut dev, Intent::Precharge { bank: None }).unwrap();
    dev.clock(&encoder().encode(Intent::SetMode(0x0021))).unwrap();

    let err = dev
        .clock(&encoder().encode(Intent::ActivateRow { bank: 0, row: 1 }))
        .unwrap_err();
    assert_eq!(
        err,
        ProtocolViolation::HoldNotElapsed {
            opcode: Opcode::Activate,
            cycle: 2,
            elapsed: 1,
            required: 2,
        }
    );
}

/// Tests that column commands need an open row.
#[test]
fn test_column_command_without_open_row() {
    let mut dev = initialized();
    let err = issue(&mut dev, Intent::Read { bank: 2, col: 0 }).unwrap_err();
    assert!(matches!(
        err,
        ProtocolViolation::NoOpenRow {
            opcode: Opcode::Read,
            bank: 2,
            ..
        }
    ));
}

/// Tests that a second ACTIVATE on an open bank is refused.
#[test]
fn test_activate_open_bank() {
    let mut dev = initialized();
    issue(&mut dev, Intent::ActivateRow { bank: 1, row: 7 }).unwrap();
    assert_eq!(dev.open_row(1), Some(7));

    let err = issue(&mut dev, Intent::ActivateRow { bank: 1, row: 8 }).unwrap_err();
    assert!(matches!(
        err,
        ProtocolViolation::BankAlreadyOpen {
            bank: 1,
            row: 8,
            open: 7,
            ..
        }
    ));
}

/// Tests that REFRESH needs every bank precharged.
#[test]
fn test_refresh_with_open_bank() {
    let mut dev = initialized();
    issue(&mut dev, Intent::ActivateRow { bank: 3, row: 0 }).unwrap();
    let err = issue(&mut dev, Intent::Refresh).unwrap_err();
    assert!(matches!(err, ProtocolViolation::BankNotIdle { bank: 3, .. }));

    let mut dev = initialized();
    issue(&mut dev, Intent::ActivateRow { bank: 3, row: 0 }).unwrap();
    issue(&mut dev, Intent::Precharge { bank: Some(3) }).unwrap();
    issue(&mut dev, Intent::Refresh).unwrap();
    assert_eq!(dev.refreshes(), 1);
}

/// Tests that a WRITE must carry data.
#[test]
fn test_write_without_data() {
    let mut dev = initialized();
    issue(&mut dev, Intent::ActivateRow { bank: 0, row: 0 }).unwrap();
    let cmd = Command {
        data: None,
        ..encoder().encode(Intent::Write {
            bank: 0,
            col: 0,
            data: 0,
        })
    };
    assert!(matches!(
        dev.clock(&cmd),
        Err(ProtocolViolation::MissingWriteData { .. })
    ));
}

/// Tests storage of both beats and read data after the CAS latency.
#[test]
fn test_write_then_read_with_cas_latency() {
    let mut dev = initialized();
    issue(&mut dev, Intent::ActivateRow { bank: 0, row: 0 }).unwrap();
    issue(
        &mut dev,
        Intent::Write {
            bank: 0,
            col: 4,
            data: 0xDEAD_BEEF,
        },
    )
    .unwrap();

    assert_eq!(dev.cell(4), 0xBEEF);
    assert_eq!(dev.cell(5), 0xDEAD);
    assert_eq!(dev.word(4), 0xDEAD_BEEF);
    assert_eq!(dev.word(6), 0);

    let read = encoder().encode(Intent::Read { bank: 0, col: 4 });
    assert_eq!(dev.clock(&read).unwrap(), None);
    assert_eq!(dev.clock(&Command::NOP).unwrap(), None);
    assert_eq!(dev.clock(&Command::NOP).unwrap(), Some(0xDEAD_BEEF));
    assert_eq!(dev.clock(&Command::NOP).unwrap(), None);
}

/// Tests that PRECHARGE of all banks closes every open row.
#[test]
fn test_precharge_all_closes_rows() {
    let mut dev = initialized();
    issue(&mut dev, Intent::ActivateRow { bank: 0, row: 1 }).unwrap();
    issue(&mut dev, Intent::ActivateRow { bank: 2, row: 3 }).unwrap();
    issue(&mut dev, Intent::Precharge { bank: None }).unwrap();
    assert_eq!(dev.open_row(0), None);
    assert_eq!(dev.open_row(2), None);
}
