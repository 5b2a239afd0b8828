//! PCI address parsing and canonical formatting
//!
//! A [`PciAddress`] is parsed once from `domain:bus:device.function` text and
//! is immutable afterwards. Every address renders to exactly one canonical
//! string:
//!
//! - domain is `0000` when zero, otherwise unpadded lowercase hex
//! - bus and device are two lowercase hex digits
//! - function is one lowercase hex digit
//!
//! Fields are kept as numbers, so equality and hashing agree with equality of
//! the canonical strings, and ordering compares numeric values rather than text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::bdf::{FIELD_SEP, FUNC_SEP, ZERO_DOMAIN};
use crate::error::{BdfError, Result};

/// A PCI address with domain and BDF
///
/// Field order matters: the derived ordering compares domain, then bus,
/// then device, then function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PciAddress {
    domain: u64,
    bus: u32,
    device: u32,
    function: u32,
}

impl PciAddress {
    /// Build an address from numeric field values
    pub const fn new(domain: u64, bus: u32, device: u32, function: u32) -> Self {
        Self {
            domain,
            bus,
            device,
            function,
        }
    }

    /// Parse BDF text, accepting upper or lower case hex
    pub fn parse(addr: &str) -> Result<Self> {
        let parts: Vec<&str> = addr.split(FIELD_SEP).collect();
        let dev_func: Vec<&str> = parts[parts.len() - 1].split(FUNC_SEP).collect();
        if parts.len() != 3 || dev_func.len() != 2 {
            return Err(BdfError::format(addr, "expected domain:bus:device.function"));
        }

        Ok(Self {
            domain: parse_hex_field(addr, "domain", parts[0], u64::from_str_radix)?,
            bus: parse_hex_field(addr, "bus", parts[1], u32::from_str_radix)?,
            device: parse_hex_field(addr, "device", dev_func[0], u32::from_str_radix)?,
            function: parse_hex_field(addr, "function", dev_func[1], u32::from_str_radix)?,
        })
    }

    /// Canonical domain string
    pub fn domain(&self) -> String {
        if self.domain == 0 {
            ZERO_DOMAIN.to_string()
        } else {
            format!("{:x}", self.domain)
        }
    }

    /// Canonical bus string (two hex digits)
    pub fn bus(&self) -> String {
        format!("{:02x}", self.bus)
    }

    /// Canonical device string (two hex digits)
    pub fn device(&self) -> String {
        format!("{:02x}", self.device)
    }

    /// Canonical function string (one hex digit)
    pub fn function(&self) -> String {
        format!("{:01x}", self.function)
    }

    pub fn domain_value(&self) -> u64 {
        self.domain
    }

    pub fn bus_value(&self) -> u32 {
        self.bus
    }

    pub fn device_value(&self) -> u32 {
        self.device
    }

    pub fn function_value(&self) -> u32 {
        self.function
    }

    /// Strict ordering by numeric domain, bus, device and function
    pub fn less_than(&self, other: &PciAddress) -> bool {
        self < other
    }

    /// Whether this address sits behind a VMD (non-zero domain)
    pub fn is_vmd_backing_address(&self) -> bool {
        self.domain != 0
    }
}

/// Parse one hex segment, rejecting signs and anything that isn't a hex digit.
fn parse_hex_field<T>(
    addr: &str,
    field: &str,
    text: &str,
    from_radix: fn(&str, u32) -> std::result::Result<T, std::num::ParseIntError>,
) -> Result<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BdfError::format(addr, format!("invalid {} {:?}", field, text)));
    }
    from_radix(text, 16)
        .map_err(|e| BdfError::format(addr, format!("invalid {} {:?}: {}", field, text, e)))
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.domain == 0 {
            f.write_str(ZERO_DOMAIN)?;
        } else {
            write!(f, "{:x}", self.domain)?;
        }
        write!(f, ":{:02x}:{:02x}.{:01x}", self.bus, self.device, self.function)
    }
}

impl FromStr for PciAddress {
    type Err = BdfError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PciAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PciAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Queries on an address that may be absent
///
/// An absent address reads as nothing: it renders empty, equals nothing,
/// orders against nothing and is never VMD backed.
pub trait OptionalAddress {
    fn to_canonical_string(&self) -> String;
    fn equals(&self, other: Option<&PciAddress>) -> bool;
    fn less_than(&self, other: Option<&PciAddress>) -> bool;
    fn is_vmd_backing_address(&self) -> bool;
}

impl OptionalAddress for Option<&PciAddress> {
    fn to_canonical_string(&self) -> String {
        self.map(|a| a.to_string()).unwrap_or_default()
    }

    fn equals(&self, other: Option<&PciAddress>) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => *a == b,
            _ => false,
        }
    }

    fn less_than(&self, other: Option<&PciAddress>) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.less_than(b),
            _ => false,
        }
    }

    fn is_vmd_backing_address(&self) -> bool {
        self.is_some_and(|a| a.is_vmd_backing_address())
    }
}

/// Sort the present addresses, dropping absent entries first
pub fn sort_present(addrs: &[Option<PciAddress>]) -> Vec<PciAddress> {
    let mut present: Vec<PciAddress> = addrs.iter().flatten().copied().collect();
    present.sort();
    present
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> PciAddress {
        PciAddress::parse(s).unwrap()
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(addr("0:0:0.0").to_string(), "0000:00:00.0");
        assert_eq!(addr("8086:3:1a.2").to_string(), "8086:03:1a.2");
        assert_eq!(addr("0000:5D:05.5").to_string(), "0000:5d:05.5");
        assert_eq!(addr("000A:01:00.0").to_string(), "a:01:00.0");
    }

    #[test]
    fn test_canonical_fields() {
        let a = addr("10000:AF:1.F");
        assert_eq!(a.domain(), "10000");
        assert_eq!(a.bus(), "af");
        assert_eq!(a.device(), "01");
        assert_eq!(a.function(), "f");
        assert_eq!(a.domain_value(), 0x10000);
        assert_eq!(a.bus_value(), 0xaf);
    }

    #[test]
    fn test_round_trip_is_fixed_point() {
        for s in ["0:0:0.0", "8086:3:1a.2", "0000:81:00.1", "d70505:03:00.0", "0:100:0.10"] {
            let canonical = addr(s).to_string();
            assert_eq!(addr(&canonical).to_string(), canonical, "input {}", s);
        }
    }

    #[test]
    fn test_wrong_segment_counts() {
        for s in [
            "",
            "bad-addr",
            "0000:01:00",
            "01:00.0",
            "0000:00:01:00.0",
            "0000:01:00.0.1",
            "0000:01.00.0",
        ] {
            let err = PciAddress::parse(s).unwrap_err();
            assert!(err.is_format(), "input {:?}", s);
        }
    }

    #[test]
    fn test_bad_hex_segments() {
        for s in [
            "000g:01:00.0",
            "0000:zz:00.0",
            "0000:01:0x.0",
            "0000:01:00.",
            "+1:01:00.0",
            "0000: 1:00.0",
        ] {
            assert!(PciAddress::parse(s).unwrap_err().is_format(), "input {:?}", s);
        }
    }

    #[test]
    fn test_field_width_limits() {
        assert!(PciAddress::parse("ffffffffffffffff:00:00.0").is_ok());
        assert!(PciAddress::parse("10000000000000000:00:00.0").is_err());
        assert!(PciAddress::parse("0000:ffffffff:00.0").is_ok());
        assert!(PciAddress::parse("0000:100000000:00.0").is_err());
        assert!(PciAddress::parse("0000:00:00.100000000").is_err());
    }

    #[test]
    fn test_equality_uses_canonical_form() {
        assert_eq!(addr("0:1:0.0"), addr("0000:01:00.0"));
        assert_eq!(addr("00AB:01:00.0"), addr("ab:1:0.0"));
        assert_ne!(addr("0000:01:00.0"), addr("0000:01:00.1"));
    }

    #[test]
    fn test_less_than_is_numeric() {
        assert!(addr("0000:01:00.0").less_than(&addr("0000:0a:00.0")));
        assert!(addr("0000:00:0a.0").less_than(&addr("0000:00:10.0")));
        assert!(addr("0000:ff:ff.f").less_than(&addr("5d0505:00:00.0")));
        assert!(addr("0000:01:00.0").less_than(&addr("0000:01:00.1")));
        assert!(!addr("0000:01:00.0").less_than(&addr("0000:01:00.0")));
    }

    #[test]
    fn test_less_than_is_a_strict_order() {
        let all: Vec<PciAddress> = [
            "0000:01:00.0",
            "0000:0a:00.0",
            "0000:01:01.0",
            "0000:01:00.1",
            "8086:00:00.0",
            "a:00:00.0",
        ]
        .iter()
        .map(|s| addr(s))
        .collect();
        for a in &all {
            assert!(!a.less_than(a));
            for b in &all {
                assert!(!(a.less_than(b) && b.less_than(a)));
                for c in &all {
                    if a.less_than(b) && b.less_than(c) {
                        assert!(a.less_than(c));
                    }
                }
            }
        }
    }

    #[test]
    fn test_vmd_backing() {
        assert!(addr("8086:01:00.0").is_vmd_backing_address());
        assert!(!addr("0000:01:00.0").is_vmd_backing_address());
        assert!(!addr("0:01:00.0").is_vmd_backing_address());
    }

    #[test]
    fn test_optional_address_semantics() {
        let a = addr("0000:01:00.0");
        let b = addr("0000:02:00.0");
        let none: Option<&PciAddress> = None;

        assert_eq!(none.to_canonical_string(), "");
        assert_eq!(Some(&a).to_canonical_string(), "0000:01:00.0");

        assert!(Some(&a).equals(Some(&a)));
        assert!(!Some(&a).equals(None));
        assert!(!none.equals(Some(&a)));
        assert!(!none.equals(None));

        assert!(Some(&a).less_than(Some(&b)));
        assert!(!Some(&a).less_than(None));
        assert!(!none.less_than(Some(&b)));

        assert!(!none.is_vmd_backing_address());
        assert!(Some(&addr("8086:01:00.0")).is_vmd_backing_address());
    }

    #[test]
    fn test_sort_present_drops_absent() {
        let input = vec![
            Some(addr("0000:0a:00.0")),
            None,
            Some(addr("0000:01:00.0")),
            None,
        ];
        let sorted = sort_present(&input);
        assert_eq!(sorted, vec![addr("0000:01:00.0"), addr("0000:0a:00.0")]);
    }

    #[test]
    fn test_serde_as_canonical_string() {
        let a = addr("0:3:1A.2");
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"0000:03:1a.2\"");
        let back: PciAddress = serde_json::from_str("\"0000:03:1a.2\"").unwrap();
        assert_eq!(back, a);
        assert!(serde_json::from_str::<PciAddress>("\"nope\"").is_err());
    }
}
