//! Read command driver
//!
//! Resolves the requested address against the input file, carves the
//! bounded region and hands it to stdout or an output file.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::core::render::{RenderConfig, Renderer};
use crate::memory::addr::{FlatResolver, OffsetResolver, VirtualAddr};
use crate::memory::reader::{read_region, ReadOptions};

/// Run the read command
#[allow(clippy::too_many_arguments)]
pub fn run_read(
    input: &Path,
    offset: &str,
    count: usize,
    ascii: bool,
    utf16: bool,
    output: Option<&Path>,
    verbose: bool,
    config: RenderConfig,
) -> Result<()> {
    let options = ReadOptions::new(count, ascii, utf16)?;
    let addr: VirtualAddr = offset.parse()?;

    let data = fs::read(input)
        .with_context(|| format!("failed to read input file: {}", input.display()))?;
    let (start, end_hint) = FlatResolver.resolve(&addr)?;
    let region = read_region(&data, start, end_hint, &options)?;

    if verbose {
        eprintln!("carved {} bytes at offset {}", region.len(), start);
    }

    match output {
        Some(path) => {
            fs::write(path, region)
                .with_context(|| format!("failed to write region: {}", path.display()))?;
            let item = ResultItem::region(start as u64, (start + region.len()) as u64).with_meta(
                Meta {
                    size: Some(region.len() as u64),
                    written: Some(path.display().to_string()),
                    ..Default::default()
                },
            );
            let mut result_set = ResultSet::new();
            result_set.push(item);
            println!("{}", Renderer::with_config(config).render(&result_set));
        }
        None => {
            // Raw bytes on stdout; metadata would corrupt the stream.
            let mut stdout = std::io::stdout();
            stdout.write_all(region)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
