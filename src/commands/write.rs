//! Write command

use crate::cli::OutputOptions;
use crate::hexdump::HexDump;
use spdrw_core::eeprom::{self, NullSink, ProgressSink, WriteMode};
use spdrw_core::transport::I2cAddress;
use spdrw_core::{Error, Result};
use std::path::Path;

pub fn run(
    port: &str,
    address: I2cAddress,
    input: &Path,
    forced: bool,
    opts: &OutputOptions,
) -> Result<()> {
    let image = std::fs::read(input).map_err(|source| Error::FileIo {
        path: input.to_path_buf(),
        source,
    })?;

    let mut session = super::open_bridge(port)?;
    session.select(address)?;

    println!(
        "Writing \"{}\" ({} bytes) to EEPROM at address {}\n",
        input.display(),
        image.len(),
        address
    );

    let mode = if forced {
        WriteMode::Forced
    } else {
        WriteMode::Verified
    };
    let mut null = NullSink;
    let mut dump = HexDump::new(opts.color);
    let sink: &mut dyn ProgressSink = if opts.silent { &mut null } else { &mut dump };
    let stats = eeprom::write_image(&mut session, &image, mode, sink)?;

    println!(
        "\n\nWritten {} bytes to EEPROM at address {} on port {} in {} ms",
        stats.bytes_handled,
        address,
        session.describe(),
        stats.elapsed.as_millis()
    );
    Ok(())
}
