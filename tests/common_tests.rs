//! Integration tests for common utilities module.

use sdram_controller::common::*;

fn reference_map() -> AddressMap {
    AddressMap::new(13, 2, 10)
}

/// Tests that the reference layout covers 64 MB of 16-bit words.
#[test]
fn test_address_map_geometry() {
    let map = reference_map();
    assert_eq!(map.width(), 25);
    assert_eq!(map.limit(), 1 << 25);
    assert_eq!(map.columns_per_row(), 1024);
    assert_eq!(map.banks(), 4);
}

/// Tests row-bank-column decomposition of a flat address.
#[test]
fn test_address_decompose() {
    let map = reference_map();

    assert_eq!(map.decompose(0).unwrap(), DeviceAddr::default());

    let addr = (5 << 12) | (1 << 10) | 64;
    let at = map.decompose(addr).unwrap();
    assert_eq!(at.row, 5);
    assert_eq!(at.bank, 1);
    assert_eq!(at.col, 64);
    assert_eq!(map.compose(at), addr);

    let last = map.decompose((1 << 25) - 1).unwrap();
    assert_eq!(last.row, 0x1FFF);
    assert_eq!(last.bank, 3);
    assert_eq!(last.col, 0x3FF);
}

/// Tests that addresses past the device are rejected.
#[test]
fn test_address_out_of_range() {
    let map = reference_map();
    assert_eq!(
        map.decompose(1 << 25),
        Err(RejectReason::AddressOutOfRange {
            addr: 1 << 25,
            limit: 1 << 25
        })
    );
    assert!(map.decompose(u32::MAX).is_err());
}

/// Tests operation display names.
#[test]
fn test_operation_display() {
    assert_eq!(format!("{}", Operation::Read), "read");
    assert_eq!(format!("{}", Operation::Write), "write");
    assert_ne!(Operation::Read, Operation::Write);
}

/// Tests that rejection reasons format with their details.
#[test]
fn test_reject_reason_display() {
    let s = format!("{}", RejectReason::BlockCount { count: 17, max: 16 });
    assert!(s.contains("17"));
    assert!(s.contains("16"));

    let s = format!(
        "{}",
        SubmitError::Rejected(RejectReason::AddressOutOfRange {
            addr: 0x200_0000,
            limit: 0x200_0000
        })
    );
    assert!(s.contains("0x2000000"));
}

/// Tests that busy and rejected submissions are distinct.
#[test]
fn test_submit_error_classes() {
    let rejected: SubmitError = RejectReason::UnexpectedPayload(3).into();
    assert_ne!(rejected, SubmitError::Busy);
    assert!(matches!(rejected, SubmitError::Rejected(_)));
}

/// Tests fatal error formatting.
#[test]
fn test_controller_error_display() {
    let err = ControllerError::RefreshDebtSaturated {
        debt: 15,
        cycle: 4000,
    };
    let s = format!("{}", err);
    assert!(s.contains("15"));
    assert!(s.contains("4000"));
}
