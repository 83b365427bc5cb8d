//! Reversible and permanent write-protection block model
//!
//! Block legality depends on the detected generation: DDR5 exposes 16
//! protection blocks, DDR4 exposes 4, everything earlier (and unknown)
//! exposes a single block 0.
//!
//! Per-block set failures are reported per block and never abort the
//! loop; a refused block usually means the SA0 strap is not wired to HV
//! or the block is already read-only. Clearing and permanent-set are
//! all-or-nothing and their failures are fatal.

use crate::error::{Error, Result};
use crate::session::Session;
use crate::spd::RamType;
use crate::transport::{ProtectedTransport, Transport};

/// Number of RSWP blocks a generation exposes.
pub fn block_count(ram_type: RamType) -> u8 {
    match ram_type {
        RamType::Ddr5 => 16,
        RamType::Ddr4 => 4,
        _ => 1,
    }
}

/// Detect the generation of the selected device: DDR5 probe, then DDR4
/// probe, then the SPD device-type byte.
pub fn detect_ram_type<T: ProtectedTransport>(session: &mut Session<T>) -> Result<RamType> {
    if session.transport_mut().detect_ddr5()? {
        return Ok(RamType::Ddr5);
    }
    if session.transport_mut().detect_ddr4()? {
        return Ok(RamType::Ddr4);
    }
    let code = session.transport_mut().read_byte(2)?;
    Ok(RamType::from_code(code))
}

/// Expand an optional explicit block into the list of blocks to protect.
///
/// An explicit block is validated against the generation's legal range;
/// no explicit block means the full legal range.
pub fn resolve_blocks(ram_type: RamType, explicit: Option<u8>) -> Result<Vec<u8>> {
    let count = block_count(ram_type);
    match explicit {
        Some(block) if block >= count => Err(Error::Range(format!(
            "Incorrect block number specified: {} supports blocks 0-{}",
            ram_type,
            count - 1
        ))),
        Some(block) => Ok(vec![block]),
        None => Ok((0..count).collect()),
    }
}

/// Apply reversible protection per block, independently. A hardware
/// refusal on one block is reported as `(block, false)` and the loop
/// continues; only a transport failure aborts.
pub fn set_protection<T: ProtectedTransport>(
    session: &mut Session<T>,
    blocks: &[u8],
) -> Result<Vec<(u8, bool)>> {
    let mut results = Vec::with_capacity(blocks.len());
    for &block in blocks {
        let ok = session.transport_mut().set_rswp(block)?;
        if !ok {
            log::warn!("device refused write protection for block {block}");
        }
        results.push((block, ok));
    }
    Ok(results)
}

/// Clear reversible protection on all blocks. Failure is fatal.
pub fn clear_protection<T: ProtectedTransport>(session: &mut Session<T>) -> Result<()> {
    if session.transport_mut().clear_rswp()? {
        Ok(())
    } else {
        Err(Error::ProtectionClearFailure)
    }
}

/// Apply the irreversible lock. Failure is fatal; callers must report
/// both outcomes unambiguously since the operation cannot be undone.
pub fn set_permanent_protection<T: ProtectedTransport>(session: &mut Session<T>) -> Result<()> {
    if session.transport_mut().set_pswp()? {
        Ok(())
    } else {
        Err(Error::PermanentProtectionFailure {
            port: session.describe(),
            address: session.address().map(|a| a.value()).unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_range_per_generation() {
        assert_eq!(
            resolve_blocks(RamType::Ddr5, None).unwrap(),
            (0..16).collect::<Vec<_>>()
        );
        assert_eq!(resolve_blocks(RamType::Ddr4, None).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(resolve_blocks(RamType::Ddr3, None).unwrap(), vec![0]);
        assert_eq!(resolve_blocks(RamType::Unknown, None).unwrap(), vec![0]);
    }

    #[test]
    fn explicit_block_legality() {
        assert_eq!(resolve_blocks(RamType::Ddr5, Some(15)).unwrap(), vec![15]);
        assert_eq!(resolve_blocks(RamType::Ddr4, Some(3)).unwrap(), vec![3]);
        assert_eq!(resolve_blocks(RamType::Ddr3, Some(0)).unwrap(), vec![0]);

        assert!(matches!(
            resolve_blocks(RamType::Ddr4, Some(5)),
            Err(Error::Range(_))
        ));
        assert!(matches!(
            resolve_blocks(RamType::Ddr3, Some(1)),
            Err(Error::Range(_))
        ));
        assert!(matches!(
            resolve_blocks(RamType::Ddr5, Some(16)),
            Err(Error::Range(_))
        ));
        assert!(matches!(
            resolve_blocks(RamType::Unknown, Some(1)),
            Err(Error::Range(_))
        ));
    }
}
