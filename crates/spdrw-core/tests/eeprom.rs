//! Accessor behavior against the in-memory emulator

use spdrw_core::eeprom::{self, NullSink, WriteMode, DEFAULT_CHUNK_SIZE};
use spdrw_core::{Error, I2cAddress, Session};
use spdrw_mock::MockEeprom;
use std::sync::atomic::Ordering;

fn ddr4_image(fill: u8) -> Vec<u8> {
    let mut img = vec![fill; 512];
    img[2] = 12; // DDR4 device-type byte
    img
}

fn open(mock: MockEeprom) -> Session<MockEeprom> {
    let mut session = Session::open(mock).unwrap();
    session.select(I2cAddress::new(0x50).unwrap()).unwrap();
    session
}

#[test]
fn read_all_is_chunked_and_ordered() {
    let image: Vec<u8> = (0..96).collect();
    let mock = MockEeprom::with_image(&image);
    let reads = mock.read_counter();
    let mut session = open(mock);

    let data = eeprom::read_all(&mut session, 96, DEFAULT_CHUNK_SIZE, &mut NullSink).unwrap();

    assert_eq!(data, image);
    assert_eq!(reads.load(Ordering::SeqCst), 3);
}

#[test]
fn read_all_handles_partial_tail_chunk() {
    let mock = MockEeprom::new(80);
    let reads = mock.read_counter();
    let mut session = open(mock);

    let data = eeprom::read_all(&mut session, 80, 32, &mut NullSink).unwrap();

    assert_eq!(data.len(), 80);
    assert_eq!(reads.load(Ordering::SeqCst), 3); // 32 + 32 + 16
}

#[test]
fn verified_write_round_trips() {
    let image = ddr4_image(0xA5);
    let mut session = open(MockEeprom::new(512));

    let stats = eeprom::write_image(&mut session, &image, WriteMode::Verified, &mut NullSink)
        .unwrap();
    assert_eq!(stats.bytes_handled, 512);

    let back = eeprom::read_all(&mut session, 512, DEFAULT_CHUNK_SIZE, &mut NullSink).unwrap();
    assert_eq!(back, image);
}

#[test]
fn verified_rewrite_performs_no_device_writes() {
    let image = ddr4_image(0x5A);
    let mock = MockEeprom::new(512);
    let writes = mock.write_counter();
    let mut session = open(mock);

    eeprom::write_image(&mut session, &image, WriteMode::Verified, &mut NullSink).unwrap();
    let after_first = writes.load(Ordering::SeqCst);

    let stats = eeprom::write_image(&mut session, &image, WriteMode::Verified, &mut NullSink)
        .unwrap();

    assert_eq!(writes.load(Ordering::SeqCst), after_first);
    assert_eq!(stats.bytes_written, 0);
    assert_eq!(stats.bytes_handled, 512);
}

#[test]
fn forced_write_hits_every_byte_even_when_identical() {
    let image = ddr4_image(0x11);
    let mock = MockEeprom::with_image(&image);
    let writes = mock.write_counter();
    let mut session = open(mock);

    let stats =
        eeprom::write_image(&mut session, &image, WriteMode::Forced, &mut NullSink).unwrap();

    assert_eq!(writes.load(Ordering::SeqCst), 512);
    assert_eq!(stats.bytes_written, 512);
}

#[test]
fn oversized_image_is_rejected_before_any_write() {
    let image = vec![0u8; 257];
    let mock = MockEeprom::new(256);
    let writes = mock.write_counter();
    let mut session = open(mock);

    let err = eeprom::write_image(&mut session, &image, WriteMode::Forced, &mut NullSink)
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(writes.load(Ordering::SeqCst), 0);
}

#[test]
fn verified_write_rejects_non_spd_image() {
    let image = vec![0xFFu8; 512]; // device-type byte is not DDR4
    let mock = MockEeprom::new(512);
    let writes = mock.write_counter();
    let mut session = open(mock);

    let err = eeprom::write_image(&mut session, &image, WriteMode::Verified, &mut NullSink)
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(writes.load(Ordering::SeqCst), 0);
}

#[test]
fn unacknowledged_byte_aborts_at_offset() {
    let image = ddr4_image(0xAA);
    let mock = MockEeprom::new(512).nack_at(10);
    let mut session = open(mock);

    let err = eeprom::write_image(&mut session, &image, WriteMode::Verified, &mut NullSink)
        .unwrap_err();

    match err {
        Error::WriteFailure {
            offset, address, ..
        } => {
            assert_eq!(offset, 10);
            assert_eq!(address, 0x50);
        }
        other => panic!("expected WriteFailure, got {other:?}"),
    }
    // no rollback: bytes before the failure stay written
    assert_eq!(&session.transport_mut().data()[..10], &image[..10]);
}

#[test]
fn progress_events_arrive_in_ascending_order() {
    struct Recorder(Vec<usize>);
    impl eeprom::ProgressSink for Recorder {
        fn byte(&mut self, offset: usize, _value: u8) {
            self.0.push(offset);
        }
    }

    let image = ddr4_image(0x42);
    let mut session = open(MockEeprom::new(512));
    let mut recorder = Recorder(Vec::new());

    eeprom::write_image(&mut session, &image, WriteMode::Verified, &mut recorder).unwrap();

    assert_eq!(recorder.0.len(), 512);
    assert!(recorder.0.windows(2).all(|w| w[0] < w[1]));
}
