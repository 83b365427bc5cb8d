//! Column-wrapped hex dump with per-nibble coloring
//!
//! Pure rendering: each call emits one byte at its offset, in ascending
//! order. A column-index header precedes byte 0, an address gutter opens
//! every row, and each byte is colored by its high nibble. Every colored
//! fragment carries its own reset, so styling never bleeds into
//! adjacent output.

use colored::{Color, Colorize};
use spdrw_core::eeprom::ProgressSink;
use std::fmt::Write as _;
use std::io::Write as _;

/// Foreground palette indexed by the byte's high nibble.
const PALETTE: [Color; 16] = [
    Color::BrightBlack,
    Color::White,
    Color::Red,
    Color::BrightRed,
    Color::BrightYellow,
    Color::Yellow,
    Color::BrightGreen,
    Color::Green,
    Color::Cyan,
    Color::BrightCyan,
    Color::BrightBlue,
    Color::Blue,
    Color::Magenta,
    Color::BrightMagenta,
    Color::BrightWhite,
    Color::White,
];

pub struct HexDump {
    columns: usize,
    header: bool,
    color: bool,
}

impl HexDump {
    pub fn new(color: bool) -> Self {
        Self {
            columns: 16,
            header: true,
            color,
        }
    }

    /// Emit one byte at `offset`.
    pub fn put(&self, offset: usize, value: u8) {
        let mut fragment = String::new();
        self.format_byte(&mut fragment, offset, value);
        print!("{fragment}");
        let _ = std::io::stdout().flush();
    }

    /// Render a whole image.
    pub fn render(&self, image: &[u8]) {
        let mut out = String::new();
        for (offset, &value) in image.iter().enumerate() {
            self.format_byte(&mut out, offset, value);
        }
        println!("{out}");
    }

    fn format_byte(&self, out: &mut String, offset: usize, value: u8) {
        if offset == 0 && self.header {
            out.push_str("      ");
            for column in 0..self.columns {
                let _ = write!(out, "{column:02X} ");
            }
        }
        if offset % self.columns == 0 {
            out.push('\n');
            if self.header {
                let _ = write!(out, "{offset:04X}: ");
            }
        }
        if self.color {
            let _ = write!(
                out,
                "{}",
                format!("{value:02X}").color(PALETTE[(value >> 4) as usize])
            );
        } else {
            let _ = write!(out, "{value:02X}");
        }
        if offset % self.columns != self.columns - 1 {
            out.push(' ');
        }
    }
}

impl ProgressSink for HexDump {
    fn byte(&mut self, offset: usize, value: u8) {
        self.put(offset, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_plain(image: &[u8]) -> String {
        let dump = HexDump::new(false);
        let mut out = String::new();
        for (offset, &value) in image.iter().enumerate() {
            dump.format_byte(&mut out, offset, value);
        }
        out
    }

    #[test]
    fn header_row_lists_column_indices() {
        let out = render_plain(&[0xAB]);
        assert!(out.starts_with("      00 01 02 03"));
        assert!(out.contains("0F "));
    }

    #[test]
    fn rows_open_with_address_gutter() {
        let out = render_plain(&vec![0u8; 32]);
        assert!(out.contains("\n0000: "));
        assert!(out.contains("\n0010: "));
    }

    #[test]
    fn no_space_after_last_column() {
        let out = render_plain(&vec![0x11u8; 16]);
        let row = out.lines().last().unwrap();
        assert_eq!(row, "0000: 11 11 11 11 11 11 11 11 11 11 11 11 11 11 11 11");
    }

    #[test]
    fn monochrome_output_is_bare_hex() {
        let out = render_plain(&[0xDE, 0xAD]);
        assert!(out.trim_end().ends_with("0000: DE AD"));
        assert!(!out.contains('\u{1b}'));
    }
}
