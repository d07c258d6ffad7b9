//! Unified result model
//!
//! Every command maps its output to this model before rendering, so
//! consumers see one stable shape regardless of the container format or
//! operation that produced it.

use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// An extracted payload, described by path and metadata
    Item,
    /// A matching path emitted in listing mode
    Path,
    /// A byte region carved out of a flat buffer
    Region,
    Error,
}

/// Byte range within the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Payload size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Hex content checksum (xxh3 or sha1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Path was emitted before with different contents
    #[serde(default)]
    pub conflict: bool,

    /// Filesystem path the payload was written to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<String>,
}

/// Error information attached to a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarveError {
    pub code: String,
    pub message: String,
}

impl CarveError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// One result item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    pub kind: Kind,

    /// Item path inside the container, '/' separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Byte range for region results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ByteRange>,

    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CarveError>,
}

impl ResultItem {
    /// Create a new extracted-item result
    pub fn item(path: impl Into<String>) -> Self {
        Self {
            kind: Kind::Item,
            path: Some(path.into()),
            range: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new listing-mode path result
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            kind: Kind::Path,
            path: Some(path.into()),
            range: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new carved-region result
    pub fn region(start: u64, end: u64) -> Self {
        Self {
            kind: Kind::Region,
            path: None,
            range: Some(ByteRange { start, end }),
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new error result
    #[allow(dead_code)]
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Error,
            path: None,
            range: None,
            meta: Meta::default(),
            errors: vec![CarveError::new(code, message)],
        }
    }

    /// Attach metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }
}

/// An ordered collection of result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
