//! Extraction engine
//!
//! Selects, deduplicates and emits named byte ranges handed over by a
//! container unpacker. The engine never discovers ranges itself; producers
//! implement [`Unpacker`] and stay behind that seam.
//!
//! Extraction runs in two passes. The first pass consumes the producer's
//! lazy entry stream once, keeps every item matching at least one pattern
//! and materializes payloads up front so producer failures surface early.
//! The second pass is a lazy iterator over patterns in declaration order,
//! then items in discovery order, with a per-pattern checksum ledger that
//! drops pure duplicates and flags same-path content conflicts.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::item::UnpackResult;
use crate::core::paths::{join_path, pathspec};
use crate::core::pattern::PathPattern;
use crate::core::util::checksum64;

/// Input blob with optional path metadata
///
/// The payload is shared so that producers can hand cheap clones to
/// deferred payload closures.
#[derive(Clone)]
pub struct Blob {
    pub data: Arc<Vec<u8>>,
    pub path: Option<String>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(data),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(pathspec(&path.into()));
        self
    }

    /// Read a file into a blob, remembering its path for join mode
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read input file: {}", path.display()))?;
        Ok(Self::new(data).with_path(path.to_string_lossy()))
    }
}

/// Ordered list of path patterns with any-pattern convenience checks
#[derive(Clone)]
pub struct PathFilter {
    patterns: Vec<PathPattern>,
}

impl PathFilter {
    /// Compile pattern specifications in declaration order
    ///
    /// An empty list means match everything. Wildcard specifications are
    /// slash-normalized first; raw regex specifications are compiled
    /// verbatim.
    pub fn new(specs: &[String], regex: bool) -> Result<Self> {
        let patterns = if specs.is_empty() {
            vec![PathPattern::new("*", false)?]
        } else {
            specs
                .iter()
                .map(|spec| {
                    if regex {
                        PathPattern::new(spec, true)
                    } else {
                        PathPattern::new(&pathspec(spec), false)
                    }
                })
                .collect::<Result<Vec<_>>>()?
        };
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    /// True if any pattern could still match below this hierarchy prefix
    pub fn is_reachable(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.reach(path))
    }

    /// True if any pattern fully matches this path
    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.check(path))
    }
}

/// Lazy entry stream handed over by a container unpacker
pub type Entries = Box<dyn Iterator<Item = Result<UnpackResult>>>;

/// Produce a lazy sequence of named byte ranges from a blob
///
/// Implementations may consult the filter's `is_reachable` to skip whole
/// subtrees before creating items. Errors from the stream or from deferred
/// payloads propagate to the extraction caller unchanged.
pub trait Unpacker {
    fn unpack(&self, blob: &Blob, filter: &PathFilter) -> Result<Entries>;
}

/// Extraction configuration
pub struct UnpackOptions {
    pub filter: PathFilter,
    /// Emit matching paths instead of payloads; skips materialization
    pub list: bool,
    /// Prepend the blob's own path to every emitted path
    pub join: bool,
}

impl UnpackOptions {
    pub fn new(paths: &[String], list: bool, join: bool, regex: bool) -> Result<Self> {
        Ok(Self {
            filter: PathFilter::new(paths, regex)?,
            list,
            join,
        })
    }
}

/// One emission from the extraction engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    /// A labeled payload
    Payload {
        path: String,
        data: Vec<u8>,
        /// Same path was already emitted with different contents
        conflict: bool,
    },
    /// A matching path, listing mode only
    Path(String),
}

impl Emitted {
    #[allow(dead_code)]
    pub fn path(&self) -> &str {
        match self {
            Emitted::Payload { path, .. } => path,
            Emitted::Path(path) => path,
        }
    }
}

struct Collected {
    path: String,
    data: Vec<u8>,
}

/// Run the first extraction pass and return the lazy emission iterator
///
/// Collects every candidate matching at least one pattern, materializing
/// payloads unless listing mode is active. All per-call state lives inside
/// the returned iterator, so a fresh call starts from a clean slate.
pub fn extract<'a>(
    blob: &Blob,
    unpacker: &dyn Unpacker,
    options: &'a UnpackOptions,
) -> Result<ExtractIter<'a>> {
    let root = if options.join {
        blob.path.clone().unwrap_or_default()
    } else {
        String::new()
    };

    let mut items = Vec::new();
    for entry in unpacker.unpack(blob, &options.filter)? {
        let mut item = entry?;
        if !options.filter.is_match(&item.path) {
            continue;
        }
        let data = if options.list {
            Vec::new()
        } else {
            let path = item.path.clone();
            item.get_data()
                .with_context(|| format!("failed to materialize '{}'", path))?
                .to_vec()
        };
        items.push(Collected {
            path: item.path,
            data,
        });
    }

    Ok(ExtractIter {
        options,
        root,
        items,
        ledger: HashMap::new(),
        pattern_idx: 0,
        item_idx: 0,
    })
}

/// Lazy second pass over patterns and collected items
///
/// Patterns drive emission order; within one pattern, items keep their
/// discovery order. The checksum ledger resets per pattern, so an item
/// matched by several patterns is emitted once per pattern, while a single
/// pattern never emits the same (path, checksum) pair twice.
pub struct ExtractIter<'a> {
    options: &'a UnpackOptions,
    root: String,
    items: Vec<Collected>,
    ledger: HashMap<String, HashSet<u64>>,
    pattern_idx: usize,
    item_idx: usize,
}

impl Iterator for ExtractIter<'_> {
    type Item = Emitted;

    fn next(&mut self) -> Option<Emitted> {
        let patterns = self.options.filter.patterns();
        while self.pattern_idx < patterns.len() {
            let pattern = &patterns[self.pattern_idx];
            while self.item_idx < self.items.len() {
                let idx = self.item_idx;
                self.item_idx += 1;

                let item = &self.items[idx];
                if !pattern.check(&item.path) {
                    continue;
                }
                if self.options.list {
                    return Some(Emitted::Path(join_path(&self.root, &item.path)));
                }

                let checksum = checksum64(&item.data);
                let conflict = match self.ledger.entry(item.path.clone()) {
                    Entry::Occupied(mut seen) => {
                        if !seen.get_mut().insert(checksum) {
                            // Pure duplicate, silently absorbed.
                            continue;
                        }
                        true
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(HashSet::from([checksum]));
                        false
                    }
                };
                return Some(Emitted::Payload {
                    path: join_path(&self.root, &item.path),
                    data: item.data.clone(),
                    conflict,
                });
            }
            self.pattern_idx += 1;
            self.item_idx = 0;
            self.ledger.clear();
        }
        None
    }
}
