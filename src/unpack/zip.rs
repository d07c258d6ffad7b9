//! Zip container producer
//!
//! Entry names come from the central directory, which is cheap to scan, so
//! payloads stay deferred: an entry is only decompressed when the engine
//! decides it is wanted.

use std::io::{Cursor, Read};
use std::sync::Arc;

use anyhow::{Context, Result};
use zip::ZipArchive;

use crate::core::item::UnpackResult;
use crate::core::paths::pathspec;
use crate::unpack::engine::{Blob, Entries, PathFilter, Unpacker};

pub struct ZipUnpacker;

impl Unpacker for ZipUnpacker {
    fn unpack(&self, blob: &Blob, _filter: &PathFilter) -> Result<Entries> {
        let mut archive = ZipArchive::new(Cursor::new(blob.data.as_slice()))
            .context("failed to open zip archive")?;

        let mut items = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let (path, is_dir) = {
                let file = archive
                    .by_index(index)
                    .with_context(|| format!("failed to read zip entry {}", index))?;
                (pathspec(file.name()), file.is_dir())
            };
            if is_dir {
                continue;
            }
            let data = Arc::clone(&blob.data);
            items.push(UnpackResult::deferred(path, move || {
                read_entry(data.as_slice(), index)
            }));
        }
        Ok(Box::new(items.into_iter().map(Ok)))
    }
}

/// Reopen the archive and decompress a single entry
fn read_entry(data: &[u8], index: usize) -> Result<Vec<u8>> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).context("failed to reopen zip archive")?;
    let mut file = archive
        .by_index(index)
        .with_context(|| format!("failed to open zip entry {}", index))?;
    let mut buf = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut buf)
        .with_context(|| format!("failed to decompress zip entry '{}'", file.name()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unpack::engine::{extract, UnpackOptions};
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn sample_zip() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("a.txt", options).unwrap();
        writer.write_all(b"alpha").unwrap();
        writer.add_directory("sub", options).unwrap();
        writer.start_file("sub/b.bin", options).unwrap();
        writer.write_all(b"\x00\x01\x02").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unpack_zip_entries() {
        let blob = Blob::new(sample_zip());
        let options = UnpackOptions::new(&[], false, false, false).unwrap();
        let emitted: Vec<_> = extract(&blob, &ZipUnpacker, &options).unwrap().collect();

        let paths: Vec<&str> = emitted.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["a.txt", "sub/b.bin"]);
    }

    #[test]
    fn test_unpack_zip_filters_before_decompression() {
        let blob = Blob::new(sample_zip());
        let options = UnpackOptions::new(&["*.txt".into()], false, false, false).unwrap();
        let emitted: Vec<_> = extract(&blob, &ZipUnpacker, &options).unwrap().collect();

        assert_eq!(emitted.len(), 1);
        match &emitted[0] {
            crate::unpack::engine::Emitted::Payload { path, data, .. } => {
                assert_eq!(path, "a.txt");
                assert_eq!(data, b"alpha");
            }
            other => panic!("unexpected emission: {:?}", other),
        }
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        let blob = Blob::new(b"not a zip at all".to_vec());
        let options = UnpackOptions::new(&[], false, false, false).unwrap();
        assert!(extract(&blob, &ZipUnpacker, &options).is_err());
    }
}
