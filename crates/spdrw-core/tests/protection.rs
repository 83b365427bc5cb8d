//! RSWP application against the emulator

use spdrw_core::spd::RamType;
use spdrw_core::{rswp, Error, I2cAddress, Session};
use spdrw_mock::MockEeprom;

fn ddr5_mock() -> MockEeprom {
    let mut img = vec![0u8; 1024];
    img[2] = 18; // DDR5
    MockEeprom::with_image(&img)
}

fn open(mock: MockEeprom) -> Session<MockEeprom> {
    let mut session = Session::open(mock).unwrap();
    session.select(I2cAddress::new(0x50).unwrap()).unwrap();
    session
}

#[test]
fn detects_generation_from_device() {
    let mut session = open(ddr5_mock());
    assert_eq!(rswp::detect_ram_type(&mut session).unwrap(), RamType::Ddr5);

    let mut img = vec![0u8; 256];
    img[2] = 11; // DDR3, no dedicated probe, falls back to byte 2
    let mut session = open(MockEeprom::with_image(&img));
    assert_eq!(rswp::detect_ram_type(&mut session).unwrap(), RamType::Ddr3);
}

#[test]
fn protects_all_blocks_of_the_generation() {
    let mut session = open(ddr5_mock());
    let blocks = rswp::resolve_blocks(RamType::Ddr5, None).unwrap();

    let results = rswp::set_protection(&mut session, &blocks).unwrap();

    assert_eq!(results.len(), 16);
    assert!(results.iter().all(|&(_, ok)| ok));
    assert!(session.transport_mut().rswp_state().iter().all(|&b| b));
}

#[test]
fn refused_block_is_reported_not_fatal() {
    let mut session = open(ddr5_mock().refuse_block(3));
    let blocks = rswp::resolve_blocks(RamType::Ddr5, None).unwrap();

    let results = rswp::set_protection(&mut session, &blocks).unwrap();

    assert_eq!(results[3], (3, false));
    assert!(results
        .iter()
        .filter(|&&(block, _)| block != 3)
        .all(|&(_, ok)| ok));
}

#[test]
fn clear_failure_is_fatal() {
    let mut session = open(ddr5_mock());
    rswp::set_protection(&mut session, &[0, 1]).unwrap();
    rswp::clear_protection(&mut session).unwrap();
    assert!(session.transport_mut().rswp_state().iter().all(|&b| !b));

    let mut session = open(ddr5_mock().refuse_clear());
    assert!(matches!(
        rswp::clear_protection(&mut session),
        Err(Error::ProtectionClearFailure)
    ));
}

#[test]
fn permanent_protection_reports_both_outcomes() {
    let mut session = open(ddr5_mock());
    rswp::set_permanent_protection(&mut session).unwrap();
    assert!(session.transport_mut().pswp_state());

    let mut session = open(ddr5_mock().refuse_pswp());
    assert!(matches!(
        rswp::set_permanent_protection(&mut session),
        Err(Error::PermanentProtectionFailure { .. })
    ));
}
