//! Chunked read and per-byte write/verify logic
//!
//! Reads and writes proceed strictly in ascending address order, never
//! reordered or batched speculatively. A failure aborts the whole
//! operation at the failing offset; bytes already written stay on the
//! device (the medium has no rollback).
//!
//! Protocol code carries no presentation concerns: every handled byte is
//! forwarded to a [`ProgressSink`], and the renderer consumes that
//! stream independently.

use crate::error::{Error, Result};
use crate::session::Session;
use crate::spd;
use crate::transport::Transport;
use std::time::{Duration, Instant};

/// Window size for chunked reads.
pub const DEFAULT_CHUNK_SIZE: usize = 32;

/// Write strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Validate the image structure, then write only bytes that differ
    /// from the current device content (read-compare-write).
    Verified,
    /// Write every byte unconditionally.
    Forced,
}

/// Counters reported after a completed write.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteStats {
    /// Bytes processed (equals the image length on success)
    pub bytes_handled: usize,
    /// Bytes actually written to the device
    pub bytes_written: usize,
    pub elapsed: Duration,
}

/// Consumer of per-byte progress events, in ascending offset order.
pub trait ProgressSink {
    fn byte(&mut self, offset: usize, value: u8);
}

/// Sink that discards all progress (used with `/silent`).
pub struct NullSink;

impl ProgressSink for NullSink {
    fn byte(&mut self, _offset: usize, _value: u8) {}
}

/// Read `total_length` bytes in sequential chunks of `chunk_size`,
/// concatenated in address order. A partial-chunk failure aborts the
/// whole read with [`Error::ReadFailure`] at the chunk offset.
pub fn read_all<T: Transport>(
    session: &mut Session<T>,
    total_length: usize,
    chunk_size: usize,
    sink: &mut dyn ProgressSink,
) -> Result<Vec<u8>> {
    let mut image = Vec::with_capacity(total_length);
    let mut offset = 0usize;
    while offset < total_length {
        let len = chunk_size.min(total_length - offset);
        let mut chunk = vec![0u8; len];
        session
            .transport_mut()
            .read_bytes(offset as u16, &mut chunk)
            .map_err(|_| Error::ReadFailure {
                offset: offset as u16,
            })?;
        for (i, &value) in chunk.iter().enumerate() {
            sink.byte(offset + i, value);
        }
        image.extend_from_slice(&chunk);
        offset += len;
    }
    Ok(image)
}

/// Write an image to the selected device, byte by byte in ascending
/// order. Fails with [`Error::WriteFailure`] the instant one byte is not
/// acknowledged.
pub fn write_image<T: Transport>(
    session: &mut Session<T>,
    image: &[u8],
    mode: WriteMode,
    sink: &mut dyn ProgressSink,
) -> Result<WriteStats> {
    let capacity = session.data_length();
    if image.len() > capacity {
        return Err(Error::Validation(format!(
            "Image is {} bytes, larger than the {} byte EEPROM",
            image.len(),
            capacity
        )));
    }
    if mode == WriteMode::Verified && !spd::validate(image) {
        return Err(Error::Validation("Incorrect SPD file".into()));
    }

    let address = session.address().map(|a| a.value()).unwrap_or(0);
    let port = session.describe();
    let started = Instant::now();
    let mut stats = WriteStats::default();

    for (offset, &value) in image.iter().enumerate() {
        let offset = offset as u16;
        let needs_write = match mode {
            WriteMode::Forced => true,
            WriteMode::Verified => session.transport_mut().read_byte(offset)? != value,
        };
        if needs_write {
            let acked = session.transport_mut().write_byte(offset, value)?;
            if !acked {
                return Err(Error::WriteFailure {
                    offset,
                    address,
                    port,
                });
            }
            stats.bytes_written += 1;
        }
        stats.bytes_handled += 1;
        sink.byte(offset as usize, value);
    }

    stats.elapsed = started.elapsed();
    log::debug!(
        "wrote {} of {} bytes in {} ms",
        stats.bytes_written,
        stats.bytes_handled,
        stats.elapsed.as_millis()
    );
    Ok(stats)
}
