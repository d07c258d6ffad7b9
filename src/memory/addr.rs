//! Virtual address parsing and offset resolution
//!
//! Addresses are written as plain offsets (`0x401000`, `4096`) or
//! section-qualified (`.data:0x10`). Mapping an address to a byte offset
//! is the resolver's job; a flat buffer supports only plain offsets.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::memory::reader::MemoryError;

/// Static regex for address syntax: optional section prefix plus offset
static ADDR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A(?:(?P<section>\.[A-Za-z_][A-Za-z0-9_.]*):)?(?P<offset>0[xX][0-9a-fA-F]+|[0-9]+)\z")
        .expect("Invalid ADDR_RE regex")
});

/// A parsed virtual address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualAddr {
    /// Section name including its leading dot, when qualified
    pub section: Option<String>,
    pub offset: u64,
}

impl std::str::FromStr for VirtualAddr {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ADDR_RE
            .captures(s)
            .ok_or_else(|| MemoryError::InvalidAddress(s.to_string()))?;
        let raw = &caps["offset"];
        let offset = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => raw.parse::<u64>(),
        }
        .map_err(|_| MemoryError::InvalidAddress(s.to_string()))?;
        Ok(Self {
            section: caps.name("section").map(|m| m.as_str().to_string()),
            offset,
        })
    }
}

/// Resolve a virtual address to a start offset and optional end bound
pub trait OffsetResolver {
    fn resolve(&self, addr: &VirtualAddr) -> Result<(usize, Option<usize>), MemoryError>;
}

/// Identity resolver for flat buffers without a section table
pub struct FlatResolver;

impl OffsetResolver for FlatResolver {
    fn resolve(&self, addr: &VirtualAddr) -> Result<(usize, Option<usize>), MemoryError> {
        match &addr.section {
            Some(section) => Err(MemoryError::UnresolvedSection(section.clone())),
            None => Ok((addr.offset as usize, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_offset() {
        let addr: VirtualAddr = "0x1A".parse().unwrap();
        assert_eq!(addr.offset, 26);
        assert_eq!(addr.section, None);
    }

    #[test]
    fn test_parse_decimal_offset() {
        let addr: VirtualAddr = "4096".parse().unwrap();
        assert_eq!(addr.offset, 4096);
    }

    #[test]
    fn test_parse_section_qualified() {
        let addr: VirtualAddr = ".data:0x10".parse().unwrap();
        assert_eq!(addr.section.as_deref(), Some(".data"));
        assert_eq!(addr.offset, 16);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<VirtualAddr>().is_err());
        assert!("xyz".parse::<VirtualAddr>().is_err());
        assert!("data:12".parse::<VirtualAddr>().is_err()); // section needs a dot
        assert!("0x".parse::<VirtualAddr>().is_err());
    }

    #[test]
    fn test_flat_resolver_identity() {
        let addr: VirtualAddr = "0x20".parse().unwrap();
        assert_eq!(FlatResolver.resolve(&addr).unwrap(), (32, None));
    }

    #[test]
    fn test_flat_resolver_rejects_sections() {
        let addr: VirtualAddr = ".text:0".parse().unwrap();
        assert_eq!(
            FlatResolver.resolve(&addr),
            Err(MemoryError::UnresolvedSection(".text".into()))
        );
    }
}
