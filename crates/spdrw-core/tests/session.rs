//! Session gate and cleanup guarantees

use spdrw_core::{Error, Session};
use spdrw_mock::MockEeprom;
use std::sync::atomic::Ordering;

#[test]
fn open_gates_on_firmware_version() {
    let mock = MockEeprom::new(256).with_firmware(20200101);
    let disconnects = mock.disconnect_counter();

    let err = Session::open(mock).unwrap_err();

    assert!(matches!(err, Error::FirmwareOutdated { .. }));
    // rejected sessions still disconnect
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
}

#[test]
fn open_gates_on_liveness() {
    let mock = MockEeprom::new(256).unresponsive();
    let disconnects = mock.disconnect_counter();

    let err = Session::open(mock).unwrap_err();

    assert!(matches!(err, Error::DeviceUnresponsive { .. }));
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
}

#[test]
fn drop_disconnects_exactly_once() {
    let mock = MockEeprom::new(256);
    let disconnects = mock.disconnect_counter();

    let session = Session::open(mock).unwrap();
    assert_eq!(disconnects.load(Ordering::SeqCst), 0);
    drop(session);

    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
}

#[test]
fn open_session_reports_firmware() {
    let mock = MockEeprom::new(256).with_firmware(20230205);
    let session = Session::open(mock).unwrap();
    assert_eq!(session.firmware().unwrap().0, 20230205);
}
