//! account-report - list a JSON export of user accounts and print its summary

use foodreport::{cli, EntityKind};
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::main_for(EntityKind::Account)
}
