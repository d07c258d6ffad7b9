//! Unpack command driver
//!
//! Wires the CLI to the extraction engine: picks a producer, streams
//! emissions into the unified result model and optionally writes payloads
//! to an output directory.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::core::paths::sanitize_output_path;
use crate::core::render::{RenderConfig, Renderer};
use crate::core::util::{hash_bytes, HashAlgorithm};
use crate::unpack::detect::{sniff, ContainerKind};
use crate::unpack::dir::DirUnpacker;
use crate::unpack::engine::{extract, Blob, Emitted, UnpackOptions, Unpacker};
use crate::unpack::tar::TarUnpacker;
use crate::unpack::zip::ZipUnpacker;

/// Run the unpack command
#[allow(clippy::too_many_arguments)]
pub fn run_unpack(
    input: &Path,
    patterns: &[String],
    list: bool,
    join: bool,
    regex: bool,
    container: Option<&str>,
    output_dir: Option<&Path>,
    checksum: HashAlgorithm,
    quiet: bool,
    verbose: bool,
    config: RenderConfig,
) -> Result<()> {
    let blob = if input.is_dir() {
        Blob::new(Vec::new()).with_path(input.to_string_lossy())
    } else {
        Blob::from_file(input)?
    };

    let kind = resolve_kind(input, &blob, container)?;
    let unpacker: Box<dyn Unpacker> = match kind {
        ContainerKind::Zip => Box::new(ZipUnpacker),
        ContainerKind::Tar => Box::new(TarUnpacker::new(false)),
        ContainerKind::TarGz => Box::new(TarUnpacker::new(true)),
        ContainerKind::Dir => Box::new(DirUnpacker::new(input)),
    };

    let options = UnpackOptions::new(patterns, list, join, regex)?;

    let mut result_set = ResultSet::new();
    for emitted in extract(&blob, unpacker.as_ref(), &options)? {
        match emitted {
            Emitted::Path(path) => result_set.push(ResultItem::path(path)),
            Emitted::Payload {
                path,
                data,
                conflict,
            } => {
                if conflict && !quiet {
                    eprintln!("warning: duplicate path with different contents: {}", path);
                }
                if verbose {
                    eprintln!("{}", path);
                }
                let written = match output_dir {
                    Some(dir) => write_payload(dir, &path, &data, quiet)?,
                    None => None,
                };
                let item = ResultItem::item(&path).with_meta(Meta {
                    size: Some(data.len() as u64),
                    checksum: Some(hash_bytes(&data, checksum)),
                    conflict,
                    written,
                });
                result_set.push(item);
            }
        }
    }

    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render(&result_set));

    Ok(())
}

/// Pick the container kind from an explicit flag or by sniffing
fn resolve_kind(input: &Path, blob: &Blob, container: Option<&str>) -> Result<ContainerKind> {
    let kind = match container {
        Some(spec) => spec
            .parse::<ContainerKind>()
            .map_err(|e| anyhow::anyhow!(e))?,
        None if input.is_dir() => ContainerKind::Dir,
        None => match sniff(&blob.data) {
            Some(kind) => kind,
            None => bail!(
                "could not detect container format of {}; use --container",
                input.display()
            ),
        },
    };
    if (kind == ContainerKind::Dir) != input.is_dir() {
        bail!(
            "container kind {:?} does not fit input {}",
            kind,
            input.display()
        );
    }
    Ok(kind)
}

/// Write one payload below the output directory, refusing unsafe paths
fn write_payload(
    dir: &Path,
    path: &str,
    data: &[u8],
    quiet: bool,
) -> Result<Option<String>> {
    let Some(rel) = sanitize_output_path(path) else {
        if !quiet {
            eprintln!("warning: refusing to write unsafe path: {}", path);
        }
        return Ok(None);
    };
    let target = dir.join(rel);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    fs::write(&target, data)
        .with_context(|| format!("failed to write payload: {}", target.display()))?;
    Ok(Some(target.display().to_string()))
}
