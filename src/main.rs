//! carve - extract named byte ranges from binary containers
//!
//! carve provides:
//! - Pattern-driven extraction from zip/tar/directory containers
//! - Content-checksum deduplication with conflict reporting
//! - Bounded memory region carving with string terminators
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;

mod cli;
mod core;
mod memory;
mod unpack;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
