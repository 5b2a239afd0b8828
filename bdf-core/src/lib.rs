//! pcibdf Core Library
//!
//! Canonical PCI addresses (`domain:bus:device.function`) and a deduplicating
//! address set used to reconcile device inventories between scans.
//!
//! # Module Structure
//!
//! - `address` - parsing, canonical formatting and ordering of one address
//! - `set` - deduplicating set with intersect/difference/union
//! - `topology` - topology data handed over by an external hardware provider
//!
//! # Example
//!
//! ```
//! use bdf_core::PciAddressSet;
//!
//! let scan: PciAddressSet = "0000:01:00.0 0000:02:00.0".parse().unwrap();
//! let filter: PciAddressSet = "0000:02:00.0 0000:03:00.0".parse().unwrap();
//!
//! assert_eq!(scan.intersect(&filter).to_string(), "0000:02:00.0");
//! assert_eq!(scan.difference(&filter).to_string(), "0000:01:00.0");
//! ```

pub mod address;
pub mod constants;
pub mod error;
pub mod set;
pub mod topology;

pub use address::{sort_present, OptionalAddress, PciAddress};
pub use error::{BdfError, Result};
pub use set::{OptionalAddressSet, PciAddressSet};
pub use topology::{
    dump_topology, print_topology, write_topology_json, DeviceType, NumaNode, PciDevice,
    SnapshotProvider, Topology, TopologyProvider,
};
