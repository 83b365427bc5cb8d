//! Read command

use crate::cli::OutputOptions;
use crate::hexdump::HexDump;
use indicatif::{ProgressBar, ProgressStyle};
use spdrw_core::eeprom::{self, ProgressSink, DEFAULT_CHUNK_SIZE};
use spdrw_core::transport::{DeviceTarget, I2cAddress, Transport};
use spdrw_core::{Error, Result, Session};
use std::path::Path;
use std::time::Instant;

pub fn run(
    target: &DeviceTarget,
    address: I2cAddress,
    output: Option<&Path>,
    opts: &OutputOptions,
) -> Result<()> {
    print!("Reading EEPROM at address {address}");
    if let Some(path) = output {
        print!(" to {}", path.display());
    }
    println!("\n");

    let started = Instant::now();
    let (image, source) = match target {
        DeviceTarget::SerialPort { name } => {
            let mut session = super::open_bridge(name)?;
            session.select(address)?;
            (read_with_progress(&mut session, opts)?, session.describe())
        }
        DeviceTarget::Bus { index } => {
            let mut session = super::open_smbus(*index)?;
            session.select(address)?;
            (read_with_progress(&mut session, opts)?, session.describe())
        }
    };
    let elapsed = started.elapsed();

    if !opts.silent {
        HexDump::new(opts.color).render(&image);
    }
    println!(
        "\nRead {} bytes from EEPROM at address {} on {} in {} ms",
        image.len(),
        address,
        source,
        elapsed.as_millis()
    );

    if let Some(path) = output {
        std::fs::write(path, &image).map_err(|source| Error::FileIo {
            path: path.to_path_buf(),
            source,
        })?;
        println!("Saved to \"{}\"", path.display());
    }
    Ok(())
}

fn read_with_progress<T: Transport>(
    session: &mut Session<T>,
    opts: &OutputOptions,
) -> Result<Vec<u8>> {
    let total = session.data_length();
    let bar = if opts.silent {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    };

    let mut sink = BarSink(&bar);
    let image = eeprom::read_all(session, total, DEFAULT_CHUNK_SIZE, &mut sink)?;
    bar.finish_and_clear();
    Ok(image)
}

struct BarSink<'a>(&'a ProgressBar);

impl ProgressSink for BarSink<'_> {
    fn byte(&mut self, offset: usize, _value: u8) {
        self.0.set_position(offset as u64 + 1);
    }
}
