//! WhatsApp Dispatch CLI
//!
//! Sends the message file to every number in the contacts file.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use whatsapp_dispatch::dispatch::{self, RunOptions};
use whatsapp_dispatch::Error;

/// WhatsApp automation - send one message to a contact list
#[derive(Parser)]
#[command(name = "whatsapp-dispatch")]
#[command(about = "Send a WhatsApp message via the Business API or WhatsApp Web")]
struct Cli {
    /// YAML config file (defaults are used if it does not exist)
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Path to message file
    #[arg(long)]
    message: Option<PathBuf>,

    /// Path to contacts file
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Log what would be sent without sending anything
    #[arg(long = "dry_run")]
    dry_run: bool,
}

/// Exit status for a missing message/contacts file or an empty contact list
const EXIT_FILE_ERROR: u8 = 1;
/// Exit status for anything else
const EXIT_UNHANDLED: u8 = 2;

fn exit_code(err: &Error) -> u8 {
    if err.is_file_error() {
        EXIT_FILE_ERROR
    } else {
        EXIT_UNHANDLED
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Secrets may live in ./.env; real environment variables win
    dotenvy::dotenv().ok();

    let opts = RunOptions {
        config_path: cli.config,
        message: cli.message,
        contacts: cli.contacts,
        dry_run: cli.dry_run,
    };

    let code = match dispatch::run(&opts) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_file_error() {
                println!("[File Error] {}", e);
            } else {
                println!("[Unhandled Error] {}", e);
            }
            ExitCode::from(exit_code(&e))
        }
    };

    println!("Program finished.");
    code
}
