//! Write-protection commands
//!
//! Per-block RSWP set failures are printed per block and never abort the
//! loop; clearing and permanent-set are all-or-nothing.

use spdrw_core::transport::I2cAddress;
use spdrw_core::{rswp, Result};

pub fn enable(port: &str, address: I2cAddress, block: Option<u8>) -> Result<()> {
    let mut session = super::open_bridge(port)?;
    session.select(address)?;

    let ram_type = rswp::detect_ram_type(&mut session)?;
    let blocks = rswp::resolve_blocks(ram_type, block)?;
    log::info!("detected {ram_type}, protecting {} block(s)", blocks.len());

    for (block, ok) in rswp::set_protection(&mut session, &blocks)? {
        if ok {
            println!("Block {block} is now read-only");
        } else {
            println!(
                "Unable to set write protection for block {block}. \
                 Either SA0 is not connected to HV, or the block is already read-only."
            );
        }
    }
    Ok(())
}

pub fn disable(port: &str, address: I2cAddress) -> Result<()> {
    let mut session = super::open_bridge(port)?;
    session.select(address)?;
    rswp::clear_protection(&mut session)?;
    println!("Write protection successfully disabled.");
    Ok(())
}

pub fn enable_permanent(port: &str, address: I2cAddress) -> Result<()> {
    let mut session = super::open_bridge(port)?;
    session.select(address)?;
    rswp::set_permanent_protection(&mut session)?;
    println!(
        "Permanent write protection enabled on {}:{}",
        session.describe(),
        address
    );
    Ok(())
}
