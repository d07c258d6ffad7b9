//! Directory container producer
//!
//! Treats a directory tree as a container whose items are the regular
//! files below it. Subdirectories that cannot reach any pattern are pruned
//! before descending, and file payloads stay deferred until the engine
//! asks for them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;

use crate::core::item::UnpackResult;
use crate::core::paths::pathspec;
use crate::unpack::engine::{Blob, Entries, PathFilter, Unpacker};

pub struct DirUnpacker {
    root: PathBuf,
}

impl DirUnpacker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Unpacker for DirUnpacker {
    fn unpack(&self, _blob: &Blob, filter: &PathFilter) -> Result<Entries> {
        let root = self.root.clone();
        if !root.is_dir() {
            anyhow::bail!("not a directory: {}", root.display());
        }

        let mut builder = WalkBuilder::new(&root);
        builder
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        // Prune unreachable subtrees without descending into them.
        let reach = filter.clone();
        let prune_root = root.clone();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                return true;
            }
            match entry.path().strip_prefix(&prune_root) {
                Ok(rel) => reach.is_reachable(&pathspec(&rel.to_string_lossy())),
                Err(_) => true,
            }
        });

        let mut items = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let rel = match entry.path().strip_prefix(&root) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let path = pathspec(&rel.to_string_lossy());
            let file_path = entry.into_path();
            items.push(UnpackResult::deferred(path, move || read_file(&file_path)));
        }
        Ok(Box::new(items.into_iter().map(Ok)))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unpack::engine::{extract, Emitted, UnpackOptions};
    use std::fs;
    use tempfile::tempdir;

    fn write_file(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_unpack_directory_tree() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("a.txt"), b"A");
        write_file(&temp.path().join("sub/b.txt"), b"B");

        let options = UnpackOptions::new(&[], false, false, false).unwrap();
        let unpacker = DirUnpacker::new(temp.path());
        let emitted: Vec<_> = extract(&Blob::new(Vec::new()), &unpacker, &options)
            .unwrap()
            .collect();

        let paths: Vec<&str> = emitted.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["a.txt", "sub/b.txt"]);
    }

    #[test]
    fn test_unreachable_subtree_is_pruned() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("wanted/a.txt"), b"A");
        write_file(&temp.path().join("other/b.txt"), b"B");

        let options = UnpackOptions::new(&["wanted/*".into()], false, false, false).unwrap();
        let unpacker = DirUnpacker::new(temp.path());
        let emitted: Vec<_> = extract(&Blob::new(Vec::new()), &unpacker, &options)
            .unwrap()
            .collect();

        assert_eq!(emitted.len(), 1);
        match &emitted[0] {
            Emitted::Payload { path, data, .. } => {
                assert_eq!(path, "wanted/a.txt");
                assert_eq!(data, b"A");
            }
            other => panic!("unexpected emission: {:?}", other),
        }
    }

    #[test]
    fn test_missing_directory_fails() {
        let options = UnpackOptions::new(&[], false, false, false).unwrap();
        let unpacker = DirUnpacker::new("/no/such/directory");
        assert!(extract(&Blob::new(Vec::new()), &unpacker, &options).is_err());
    }
}
