//! Deduplicating PCI address set
//!
//! Addresses are stored by canonical string, so re-adding an equivalent address
//! is a no-op. Iteration and serialization always materialize a fresh sorted
//! view (numeric domain, bus, device, function); set sizes are small enough
//! that keeping a second sorted structure in sync isn't worth it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use crate::address::PciAddress;
use crate::constants::bdf::ADDR_SEP;
use crate::error::{BdfError, Result};

/// A unique collection of PCI addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PciAddressSet {
    addr_map: HashMap<String, PciAddress>,
}

impl PciAddressSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from BDF strings; fails without a set if any string is invalid.
    pub fn from_strings<I, S>(addrs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.add_strings(addrs)?;
        Ok(set)
    }

    fn insert(&mut self, addr: PciAddress) {
        self.addr_map.insert(addr.to_string(), addr);
    }

    /// Add addresses, ignoring duplicates
    pub fn add<I>(&mut self, addrs: I)
    where
        I: IntoIterator<Item = PciAddress>,
    {
        for addr in addrs {
            self.insert(addr);
        }
    }

    /// Add addresses to a set that may be absent
    ///
    /// Adding to no set at all is a usage error and reports [`BdfError::NilSet`].
    pub fn add_to<I>(set: Option<&mut Self>, addrs: I) -> Result<()>
    where
        I: IntoIterator<Item = PciAddress>,
    {
        let set = set.ok_or(BdfError::NilSet)?;
        set.add(addrs);
        Ok(())
    }

    /// Add addresses parsed from strings
    ///
    /// Empty strings are skipped. If any string fails to parse, the first
    /// error is returned and nothing from this call is added.
    pub fn add_strings<I, S>(&mut self, addrs: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for addr in addrs {
            let addr = addr.as_ref();
            if addr.is_empty() {
                continue;
            }
            match PciAddress::parse(addr) {
                Ok(a) => parsed.push(a),
                Err(e) => {
                    debug!("rejecting address batch: {}", e);
                    return Err(e);
                }
            }
        }

        self.add(parsed);
        Ok(())
    }

    /// Add address strings to a set that may be absent
    ///
    /// An absent set reports [`BdfError::NilSet`]; otherwise behaves like
    /// [`PciAddressSet::add_strings`].
    pub fn add_strings_to<I, S>(set: Option<&mut Self>, addrs: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = set.ok_or(BdfError::NilSet)?;
        set.add_strings(addrs)
    }

    /// Whether an equivalent address is already in the set
    pub fn contains(&self, addr: &PciAddress) -> bool {
        self.addr_map.contains_key(&addr.to_string())
    }

    /// Number of distinct addresses
    pub fn len(&self) -> usize {
        self.addr_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addr_map.is_empty()
    }

    /// Addresses in ascending order
    pub fn addresses(&self) -> Vec<PciAddress> {
        let mut addrs: Vec<PciAddress> = self.addr_map.values().copied().collect();
        addrs.sort();
        addrs
    }

    /// Canonical strings in ascending address order
    pub fn strings(&self) -> Vec<String> {
        self.addresses().iter().map(|a| a.to_string()).collect()
    }

    /// Iterate addresses in ascending order
    pub fn iter(&self) -> std::vec::IntoIter<PciAddress> {
        self.addresses().into_iter()
    }

    /// Addresses present in both sets
    ///
    /// Walks the smaller set and looks each address up in the larger one.
    pub fn intersect(&self, other: &PciAddressSet) -> PciAddressSet {
        let (small, large) = if self.len() < other.len() {
            (self, other)
        } else {
            (other, self)
        };

        let intersection: PciAddressSet = small
            .addr_map
            .values()
            .filter(|a| large.contains(a))
            .copied()
            .collect();
        trace!(
            "intersect {} x {} -> {}",
            self.len(),
            other.len(),
            intersection.len()
        );
        intersection
    }

    /// Addresses in this set but not in `other`
    pub fn difference(&self, other: &PciAddressSet) -> PciAddressSet {
        let difference: PciAddressSet = self
            .addr_map
            .values()
            .filter(|a| !other.contains(a))
            .copied()
            .collect();
        trace!(
            "difference {} - {} -> {}",
            self.len(),
            other.len(),
            difference.len()
        );
        difference
    }

    /// Addresses in either set
    pub fn union(&self, other: &PciAddressSet) -> PciAddressSet {
        let mut union = self.clone();
        union.add(other.addr_map.values().copied());
        union
    }

    /// Addresses behind a VMD (non-zero domain)
    pub fn vmd_backing_addresses(&self) -> PciAddressSet {
        self.addr_map
            .values()
            .filter(|a| a.is_vmd_backing_address())
            .copied()
            .collect()
    }
}

impl fmt::Display for PciAddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.strings().join(ADDR_SEP))
    }
}

impl FromStr for PciAddressSet {
    type Err = BdfError;

    /// Parse a space-separated list of addresses
    fn from_str(s: &str) -> Result<Self> {
        Self::from_strings(s.split(ADDR_SEP))
    }
}

impl FromIterator<PciAddress> for PciAddressSet {
    fn from_iter<I: IntoIterator<Item = PciAddress>>(iter: I) -> Self {
        let mut set = Self::new();
        set.add(iter);
        set
    }
}

impl Extend<PciAddress> for PciAddressSet {
    fn extend<I: IntoIterator<Item = PciAddress>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl IntoIterator for &PciAddressSet {
    type Item = PciAddress;
    type IntoIter = std::vec::IntoIter<PciAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for PciAddressSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.strings())
    }
}

impl<'de> Deserialize<'de> for PciAddressSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        Self::from_strings(strings).map_err(serde::de::Error::custom)
    }
}

/// Queries on a set that may be absent
///
/// An absent set reads as empty.
pub trait OptionalAddressSet {
    fn len(&self) -> usize;
    fn contains(&self, addr: Option<&PciAddress>) -> bool;
    fn addresses(&self) -> Vec<PciAddress>;
    fn strings(&self) -> Vec<String>;
    fn to_canonical_string(&self) -> String;
    fn intersect(&self, other: Option<&PciAddressSet>) -> PciAddressSet;
    fn difference(&self, other: Option<&PciAddressSet>) -> PciAddressSet;
}

impl OptionalAddressSet for Option<&PciAddressSet> {
    fn len(&self) -> usize {
        self.map_or(0, |s| s.len())
    }

    fn contains(&self, addr: Option<&PciAddress>) -> bool {
        match (self, addr) {
            (Some(set), Some(addr)) => set.contains(addr),
            _ => false,
        }
    }

    fn addresses(&self) -> Vec<PciAddress> {
        self.map(|s| s.addresses()).unwrap_or_default()
    }

    fn strings(&self) -> Vec<String> {
        self.map(|s| s.strings()).unwrap_or_default()
    }

    fn to_canonical_string(&self) -> String {
        self.map(|s| s.to_string()).unwrap_or_default()
    }

    fn intersect(&self, other: Option<&PciAddressSet>) -> PciAddressSet {
        match (self, other) {
            (Some(a), Some(b)) => a.intersect(b),
            _ => PciAddressSet::new(),
        }
    }

    fn difference(&self, other: Option<&PciAddressSet>) -> PciAddressSet {
        match (self, other) {
            (Some(a), Some(b)) => a.difference(b),
            (Some(a), None) => (*a).clone(),
            (None, _) => PciAddressSet::new(),
        }
    }
}
