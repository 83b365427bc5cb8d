//! Command parsing and routing
//!
//! One verb maps to exactly one operation through a direct `match` on
//! the verb string. All argument-shape validation happens here, before
//! any device I/O: addresses must be decimal, ports must be "COM"
//! followed by digits, bus and block numbers must be non-negative
//! decimal integers.

use spdrw_core::error::{Error, Result};
use spdrw_core::transport::{DeviceTarget, I2cAddress};
use std::path::PathBuf;

/// Per-invocation output configuration, passed to every component that
/// renders anything.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub silent: bool,
    pub color: bool,
}

/// Which devices `/find` looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindFilter {
    All,
    Serial,
    Smbus,
}

/// One parsed orchestration operation.
#[derive(Debug, PartialEq, Eq)]
pub enum Operation {
    ShowHelp,
    Find {
        filter: FindFilter,
    },
    Scan {
        target: DeviceTarget,
    },
    Read {
        target: DeviceTarget,
        address: I2cAddress,
        output: Option<PathBuf>,
    },
    Write {
        port: String,
        address: I2cAddress,
        input: PathBuf,
        forced: bool,
    },
    SetProtection {
        port: String,
        address: I2cAddress,
        block: Option<u8>,
        permanent: bool,
    },
    ClearProtection {
        port: String,
        address: I2cAddress,
    },
    ExportFirmware {
        destination: PathBuf,
    },
}

/// A fully parsed command line. Immutable once parsed.
#[derive(Debug)]
pub struct Command {
    pub operation: Operation,
    pub output: OutputOptions,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Command> {
        let output = OutputOptions {
            silent: args.iter().any(|a| a == "/silent"),
            color: !args.iter().any(|a| a == "/nocolor"),
        };
        // flags may appear anywhere; positional matching ignores them
        let args: Vec<&str> = args
            .iter()
            .map(String::as_str)
            .filter(|a| *a != "/silent" && *a != "/nocolor")
            .collect();

        let verb = *args.first().ok_or_else(|| {
            Error::InvalidArguments("No command specified".into())
        })?;

        let operation = match verb {
            "/?" | "/help" => Operation::ShowHelp,

            "/find" => {
                let filter = match args.get(1) {
                    None => FindFilter::All,
                    Some(&"all") => FindFilter::All,
                    Some(&"arduino") => FindFilter::Serial,
                    Some(&"smbus") => FindFilter::Smbus,
                    Some(other) => {
                        return Err(Error::InvalidArguments(format!(
                            "Unknown device filter \"{other}\""
                        )))
                    }
                };
                Operation::Find { filter }
            }

            "/scan" => {
                if args.len() != 2 {
                    return Err(Error::InvalidArguments(
                        "Incorrect use of arguments".into(),
                    ));
                }
                Operation::Scan {
                    target: DeviceTarget::parse(args[1])?,
                }
            }

            "/read" => Operation::Read {
                target: DeviceTarget::parse(positional(&args, 1)?)?,
                address: parse_address(positional(&args, 2)?)?,
                output: args.get(3).map(PathBuf::from),
            },

            "/write" | "/writeforce" => Operation::Write {
                port: parse_port(positional(&args, 1)?)?,
                address: parse_address(positional(&args, 2)?)?,
                input: args
                    .get(3)
                    .map(PathBuf::from)
                    .ok_or_else(|| {
                        Error::InvalidArguments("File path is mandatory for write mode.".into())
                    })?,
                forced: verb == "/writeforce",
            },

            "/firmware" | "/savefirmware" => Operation::ExportFirmware {
                destination: args
                    .get(1)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .ok_or_else(|| {
                        Error::InvalidArguments("No destination path specified".into())
                    })?,
            },

            "/enablewriteprotection" | "/setwriteprotection" => Operation::SetProtection {
                port: parse_port(positional(&args, 1)?)?,
                address: parse_address(positional(&args, 2)?)?,
                block: args.get(3).map(|b| parse_block(b)).transpose()?,
                permanent: false,
            },

            "/enablepermanentwriteprotection" | "/setpermanentwriteprotection" => {
                Operation::SetProtection {
                    port: parse_port(positional(&args, 1)?)?,
                    address: parse_address(positional(&args, 2)?)?,
                    block: None,
                    permanent: true,
                }
            }

            "/disablewriteprotection" | "/clearwriteprotection" => Operation::ClearProtection {
                port: parse_port(positional(&args, 1)?)?,
                address: parse_address(positional(&args, 2)?)?,
            },

            other => return Err(Error::UnknownCommand(other.to_string())),
        };

        Ok(Command { operation, output })
    }
}

fn positional<'a>(args: &[&'a str], index: usize) -> Result<&'a str> {
    args.get(index)
        .copied()
        .ok_or_else(|| Error::InvalidArguments("Incorrect use of arguments".into()))
}

fn parse_address(arg: &str) -> Result<I2cAddress> {
    let value = arg.parse::<u8>().map_err(|_| {
        Error::InvalidArguments(format!(
            "Address \"{arg}\" should be specified in decimal notation"
        ))
    })?;
    I2cAddress::new(value)
}

/// Write and protection commands go through the bridge only.
fn parse_port(arg: &str) -> Result<String> {
    match DeviceTarget::parse(arg)? {
        DeviceTarget::SerialPort { name } => Ok(name),
        DeviceTarget::Bus { .. } => Err(Error::InvalidArguments(
            "Port name should start with \"COM\" followed by a number.".into(),
        )),
    }
}

fn parse_block(arg: &str) -> Result<u8> {
    arg.parse::<u8>().map_err(|_| {
        Error::InvalidArguments("Block number should be specified in decimal notation.".into())
    })
}

const HELP: &[&str] = &[
    "",
    "Command line parameters:",
    "",
    "  spdrw /?",
    "  spdrw /find",
    "  spdrw /find <all|arduino|smbus>",
    "  spdrw /scan <PORTNAME>",
    "  spdrw /scan <SMBUS#>",
    "  spdrw /read <PORTNAME> <ADDRESS#> <filepath> /silent /nocolor",
    "  spdrw /read <SMBUS#> <ADDRESS#> <filepath> /silent /nocolor",
    "  spdrw /write <PORTNAME> <ADDRESS#> <FILEPATH> /silent /nocolor",
    "  spdrw /writeforce <PORTNAME> <ADDRESS#> <FILEPATH> /silent /nocolor",
    "  spdrw /firmware <DESTDIR>",
    "  spdrw /enablewriteprotection <PORTNAME> <ADDRESS#>",
    "  spdrw /enablewriteprotection <PORTNAME> <ADDRESS#> <block#>",
    "  spdrw /disablewriteprotection <PORTNAME> <ADDRESS#>",
    "  spdrw /enablepermanentwriteprotection <PORTNAME> <ADDRESS#>",
    "",
    "Parameters in CAPS are mandatory!",
    "All numbers must be specified in decimal format",
    "Parameter <filepath> is optional when /read switch is used, output will be printed to console only.",
    "Switch /silent is optional, progress won't be shown with this switch.",
    "Switch /nocolor is optional, use to show SPD contents in monochrome",
    "",
];

pub fn print_help() {
    for line in HELP {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Command::parse(&args)
    }

    #[test]
    fn help_verbs() {
        assert_eq!(parse(&["/?"]).unwrap().operation, Operation::ShowHelp);
        assert_eq!(parse(&["/help"]).unwrap().operation, Operation::ShowHelp);
    }

    #[test]
    fn unknown_verb_fails() {
        assert!(matches!(
            parse(&["/bogus"]).unwrap_err(),
            Error::UnknownCommand(_)
        ));
    }

    #[test]
    fn read_with_serial_target_and_file() {
        let command = parse(&["/read", "COM5", "80", "out.bin"]).unwrap();
        match command.operation {
            Operation::Read {
                target,
                address,
                output,
            } => {
                assert_eq!(
                    target,
                    DeviceTarget::SerialPort {
                        name: "COM5".into()
                    }
                );
                assert_eq!(address.value(), 80);
                assert_eq!(output, Some(PathBuf::from("out.bin")));
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn read_from_bus_without_file() {
        let command = parse(&["/read", "0", "80"]).unwrap();
        match command.operation {
            Operation::Read { target, output, .. } => {
                assert_eq!(target, DeviceTarget::Bus { index: 0 });
                assert_eq!(output, None);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn flags_are_stripped_anywhere() {
        let command = parse(&["/read", "COM3", "/silent", "80", "/nocolor"]).unwrap();
        assert!(command.output.silent);
        assert!(!command.output.color);
        match command.operation {
            Operation::Read { output, .. } => assert_eq!(output, None),
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn writeforce_sets_forced_mode() {
        let command = parse(&["/writeforce", "COM3", "80", "spd.bin"]).unwrap();
        match command.operation {
            Operation::Write { forced, .. } => assert!(forced),
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn write_requires_file_path() {
        assert!(matches!(
            parse(&["/write", "COM3", "80"]).unwrap_err(),
            Error::InvalidArguments(_)
        ));
    }

    #[test]
    fn write_rejects_bus_target() {
        assert!(matches!(
            parse(&["/write", "0", "80", "spd.bin"]).unwrap_err(),
            Error::InvalidArguments(_)
        ));
    }

    #[test]
    fn address_must_be_decimal() {
        assert!(matches!(
            parse(&["/read", "COM3", "0x50"]).unwrap_err(),
            Error::InvalidArguments(_)
        ));
        assert!(matches!(
            parse(&["/read", "COM3", "200"]).unwrap_err(),
            Error::InvalidArguments(_)
        ));
    }

    #[test]
    fn protection_verbs_and_aliases() {
        let command = parse(&["/enablewriteprotection", "COM3", "80", "2"]).unwrap();
        match command.operation {
            Operation::SetProtection {
                block, permanent, ..
            } => {
                assert_eq!(block, Some(2));
                assert!(!permanent);
            }
            other => panic!("unexpected operation {other:?}"),
        }

        let alias = parse(&["/setwriteprotection", "COM3", "80"]).unwrap();
        assert!(matches!(
            alias.operation,
            Operation::SetProtection { block: None, .. }
        ));

        let permanent = parse(&["/setpermanentwriteprotection", "COM3", "80"]).unwrap();
        assert!(matches!(
            permanent.operation,
            Operation::SetProtection {
                permanent: true,
                ..
            }
        ));

        assert!(matches!(
            parse(&["/clearwriteprotection", "COM3", "80"]).unwrap().operation,
            Operation::ClearProtection { .. }
        ));
    }

    #[test]
    fn block_must_be_decimal() {
        assert!(matches!(
            parse(&["/enablewriteprotection", "COM3", "80", "two"]).unwrap_err(),
            Error::InvalidArguments(_)
        ));
    }

    #[test]
    fn scan_arity_is_checked() {
        assert!(parse(&["/scan"]).is_err());
        assert!(parse(&["/scan", "COM3", "extra"]).is_err());
        assert!(parse(&["/scan", "0"]).is_ok());
    }

    #[test]
    fn firmware_requires_destination() {
        assert!(parse(&["/firmware"]).is_err());
        assert!(matches!(
            parse(&["/savefirmware", "fw"]).unwrap().operation,
            Operation::ExportFirmware { .. }
        ));
    }
}
