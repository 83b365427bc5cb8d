//! spdrw - SPD EEPROM reader and writer
//!
//! Programs and inspects the SPD EEPROM on memory modules through one of
//! two transports: a serial-attached microcontroller bridge, or the
//! host's own SMBus controller. One invocation runs one command: parse,
//! open a session, operate, render, disconnect.

mod cli;
mod commands;
mod hexdump;

use colored::Colorize;
use spdrw_core::Error;
use std::io::BufRead;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "/nocolor") {
        colored::control::set_override(false);
    }

    print_banner();

    if args.is_empty() {
        cli::print_help();
        wait_for_enter();
        return;
    }

    if let Err(e) = run(&args) {
        report(&e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> spdrw_core::Result<()> {
    let command = cli::Command::parse(args)?;
    commands::run(command)
}

fn print_banner() {
    println!("   SPD-RW - EEPROM SPD reader and writer");
    println!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
    println!("Version {}", env!("CARGO_PKG_VERSION"));
    println!();
}

fn report(e: &Error) {
    eprintln!("{}\n", e.to_string().red());
    if matches!(e, Error::UnknownCommand(_)) {
        cli::print_help();
    }
}

fn wait_for_enter() {
    println!("\nPress [enter] to quit.\n");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
