//! order-report - list a JSON export of orders and print its summary

use foodreport::{cli, EntityKind};
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::main_for(EntityKind::Order)
}
