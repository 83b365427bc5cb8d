//! Firmware export command
//!
//! Writes the bridge firmware sources to a created destination
//! directory so they can be built and flashed with the Arduino
//! toolchain. The sketch is marked read-only after writing.

use spdrw_core::{Error, Result};
use std::path::Path;

const SKETCH_NAME: &str = "SpdReaderWriter.ino";
const SETTINGS_NAME: &str = "SpdReaderWriterSettings.h";

const SKETCH: &str = include_str!("../../firmware/SpdReaderWriter/SpdReaderWriter.ino");
const SETTINGS: &str = include_str!("../../firmware/SpdReaderWriter/SpdReaderWriterSettings.h");

pub fn run(destination: &Path) -> Result<()> {
    let dir = destination.join("SpdReaderWriter");
    std::fs::create_dir_all(&dir).map_err(|source| Error::FileIo {
        path: dir.clone(),
        source,
    })?;

    let sketch_path = dir.join(SKETCH_NAME);
    write_file(&sketch_path, SKETCH)?;
    write_file(&dir.join(SETTINGS_NAME), SETTINGS)?;

    // the sketch must match the settings header it shipped with
    let mut permissions = std::fs::metadata(&sketch_path)
        .map_err(|source| Error::FileIo {
            path: sketch_path.clone(),
            source,
        })?
        .permissions();
    permissions.set_readonly(true);
    std::fs::set_permissions(&sketch_path, permissions).map_err(|source| Error::FileIo {
        path: sketch_path.clone(),
        source,
    })?;

    println!("Firmware files saved to {}", dir.display());
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })
}
