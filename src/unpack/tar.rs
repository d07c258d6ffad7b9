//! Tar container producer
//!
//! Tar archives are sequential: the stream cannot be revisited per entry,
//! so payloads are read eagerly while walking the archive once. Gzip
//! compression is handled by wrapping the reader.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

use crate::core::item::UnpackResult;
use crate::core::paths::pathspec;
use crate::unpack::engine::{Blob, Entries, PathFilter, Unpacker};

pub struct TarUnpacker {
    gzip: bool,
}

impl TarUnpacker {
    pub fn new(gzip: bool) -> Self {
        Self { gzip }
    }
}

impl Unpacker for TarUnpacker {
    fn unpack(&self, blob: &Blob, _filter: &PathFilter) -> Result<Entries> {
        let cursor = Cursor::new(blob.data.as_slice());
        let reader: Box<dyn Read> = if self.gzip {
            Box::new(GzDecoder::new(cursor))
        } else {
            Box::new(cursor)
        };

        let mut archive = Archive::new(reader);
        let mut items = Vec::new();
        for entry in archive.entries().context("failed to read tar archive")? {
            let mut entry = entry.context("failed to read tar entry")?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let path = pathspec(
                &entry
                    .path()
                    .context("tar entry has an invalid path")?
                    .to_string_lossy(),
            );
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .with_context(|| format!("failed to read tar entry '{}'", path))?;
            items.push(UnpackResult::new(path, data));
        }
        Ok(Box::new(items.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unpack::engine::{extract, Emitted, UnpackOptions};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn tar_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_unpack_tar_entries() {
        let blob = Blob::new(tar_with(&[("a.txt", b"alpha"), ("sub/b.txt", b"beta")]));
        let options = UnpackOptions::new(&[], false, false, false).unwrap();
        let emitted: Vec<_> = extract(&blob, &TarUnpacker::new(false), &options)
            .unwrap()
            .collect();

        let paths: Vec<&str> = emitted.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["a.txt", "sub/b.txt"]);
    }

    #[test]
    fn test_unpack_tar_gz() {
        let tarball = tar_with(&[("x", b"payload")]);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tarball).unwrap();
        let blob = Blob::new(encoder.finish().unwrap());

        let options = UnpackOptions::new(&[], false, false, false).unwrap();
        let emitted: Vec<_> = extract(&blob, &TarUnpacker::new(true), &options)
            .unwrap()
            .collect();

        assert_eq!(emitted.len(), 1);
        match &emitted[0] {
            Emitted::Payload { data, .. } => assert_eq!(data, b"payload"),
            other => panic!("unexpected emission: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_entries_with_conflict() {
        // Tar happily stores the same path twice; the engine reports the
        // second occurrence as a conflict but emits both payloads.
        let blob = Blob::new(tar_with(&[("a.txt", b"one"), ("a.txt", b"two")]));
        let options = UnpackOptions::new(&[], false, false, false).unwrap();
        let emitted: Vec<_> = extract(&blob, &TarUnpacker::new(false), &options)
            .unwrap()
            .collect();

        assert_eq!(emitted.len(), 2);
        assert!(matches!(
            &emitted[1],
            Emitted::Payload { conflict: true, .. }
        ));
    }
}
