//! Bounded memory region reader
//!
//! Carves one byte range out of a flat buffer, ending at an
//! encoding-specific string terminator, a byte budget, a resolver-supplied
//! bound, or the end of the buffer, whichever comes first.

use memchr::memchr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("only one of utf16 and ascii may be specified")]
    ConflictingEncodings,

    #[error("end of string could not be determined")]
    TerminatorNotFound,

    #[error("offset {offset} lies beyond the end of the buffer ({len} bytes)")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("cannot resolve section address '{0}' in a flat buffer")]
    UnresolvedSection(String),

    #[error("invalid virtual address: '{0}'")]
    InvalidAddress(String),
}

/// Byte budget and optional string termination for one read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    count: usize,
    ascii: bool,
    utf16: bool,
}

impl ReadOptions {
    /// Validate and build a read configuration
    ///
    /// `count` of zero means no byte budget. `ascii` and `utf16` are
    /// mutually exclusive; asking for both is rejected before any data is
    /// touched.
    pub fn new(count: usize, ascii: bool, utf16: bool) -> Result<Self, MemoryError> {
        if ascii && utf16 {
            return Err(MemoryError::ConflictingEncodings);
        }
        Ok(Self {
            count,
            ascii,
            utf16,
        })
    }
}

/// Slice a bounded region out of `data` starting at `start`
///
/// The terminator-derived end, `start + count` and `end_hint` are
/// independent upper bound candidates; the smallest present one wins and
/// the result never extends past the buffer. Without any bound the region
/// runs to the end of the buffer. A requested terminator that does not
/// exist in the remaining buffer is a hard failure even when a byte budget
/// would have bounded the read.
pub fn read_region<'d>(
    data: &'d [u8],
    start: usize,
    end_hint: Option<usize>,
    options: &ReadOptions,
) -> Result<&'d [u8], MemoryError> {
    if start > data.len() {
        return Err(MemoryError::OffsetOutOfBounds {
            offset: start,
            len: data.len(),
        });
    }

    let terminator = if options.ascii {
        Some(start + memchr(0, &data[start..]).ok_or(MemoryError::TerminatorNotFound)?)
    } else if options.utf16 {
        Some(find_utf16_terminator(data, start)?)
    } else {
        None
    };
    let budget = (options.count > 0).then(|| start.saturating_add(options.count));

    let end = [terminator, budget, end_hint]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(data.len())
        .clamp(start, data.len());
    Ok(&data[start..end])
}

/// Find the first aligned zero pair at or after `start`
fn find_utf16_terminator(data: &[u8], start: usize) -> Result<usize, MemoryError> {
    let mut pos = start;
    while pos + 2 <= data.len() {
        if data[pos] == 0 && data[pos + 1] == 0 {
            return Ok(pos);
        }
        pos += 2;
    }
    Err(MemoryError::TerminatorNotFound)
}
