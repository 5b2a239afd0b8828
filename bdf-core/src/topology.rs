//! Hardware topology boundary
//!
//! Defines the topology data handed over by an external hardware provider and
//! the renderers used by the `dump-topology` command. Nothing here walks the
//! PCI bus: the only provider in this crate replays a previously captured
//! JSON snapshot.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::address::PciAddress;
use crate::constants::limits::MAX_SNAPSHOT_SIZE;
use crate::error::{BdfError, Result};
use crate::set::PciAddressSet;

/// Kind of device hanging off a PCI address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    NetworkInterface,
    OfiDomain,
    Block,
    #[default]
    Unknown,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::NetworkInterface => write!(f, "network interface"),
            DeviceType::OfiDomain => write!(f, "OFI domain"),
            DeviceType::Block => write!(f, "block device"),
            DeviceType::Unknown => write!(f, "unknown device"),
        }
    }
}

/// A named device at a PCI address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PciDevice {
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    pub pci_address: PciAddress,
    #[serde(default)]
    pub numa_node: u32,
    /// Link speed in GT/s, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_speed: Option<f64>,
}

/// One NUMA node with its cores and attached devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumaNode {
    pub id: u32,
    #[serde(default)]
    pub cores: Vec<u32>,
    #[serde(default)]
    pub devices: Vec<PciDevice>,
}

impl NumaNode {
    /// Distinct PCI addresses of this node's devices
    pub fn pci_addresses(&self) -> PciAddressSet {
        self.devices.iter().map(|d| d.pci_address).collect()
    }
}

/// System hardware topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub numa_nodes: BTreeMap<u32, NumaNode>,
}

impl Topology {
    /// Every PCI address that has at least one device
    pub fn pci_addresses(&self) -> PciAddressSet {
        self.numa_nodes
            .values()
            .flat_map(|n| n.devices.iter().map(|d| d.pci_address))
            .collect()
    }

    /// Devices attached at the given address
    pub fn devices_at(&self, addr: &PciAddress) -> Vec<&PciDevice> {
        self.numa_nodes
            .values()
            .flat_map(|n| n.devices.iter())
            .filter(|d| d.pci_address == *addr)
            .collect()
    }
}

/// Source of hardware topology
#[cfg_attr(test, mockall::automock)]
pub trait TopologyProvider {
    fn get_topology(&self) -> Result<Topology>;
}

/// Provider that replays a topology captured earlier as JSON
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    path: PathBuf,
}

impl SnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TopologyProvider for SnapshotProvider {
    fn get_topology(&self) -> Result<Topology> {
        let metadata = fs::metadata(&self.path).map_err(|e| BdfError::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        if metadata.len() > MAX_SNAPSHOT_SIZE {
            return Err(BdfError::FileTooLarge {
                path: self.path.clone(),
                size: metadata.len(),
                max_size: MAX_SNAPSHOT_SIZE,
            });
        }

        let data = fs::read_to_string(&self.path).map_err(|e| BdfError::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        let topo: Topology = serde_json::from_str(&data)?;

        for (key, node) in &topo.numa_nodes {
            if *key != node.id {
                return Err(BdfError::provider(format!(
                    "numa node keyed {} reports id {}",
                    key, node.id
                )));
            }
        }

        info!(
            "Loaded topology snapshot {} ({} NUMA node(s), {} PCI address(es))",
            self.path.display(),
            topo.numa_nodes.len(),
            topo.pci_addresses().len()
        );
        Ok(topo)
    }
}

/// Render a topology as indented text
pub fn print_topology<W: Write>(topo: &Topology, out: &mut W) -> Result<()> {
    for node in topo.numa_nodes.values() {
        writeln!(out, "NUMA Node {}", node.id)?;

        let cores = if node.cores.is_empty() {
            "none".to_string()
        } else {
            node.cores
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        writeln!(out, "  CPU cores: {}", cores)?;

        if node.devices.is_empty() {
            writeln!(out, "  PCI devices: none")?;
            continue;
        }
        writeln!(out, "  PCI devices:")?;

        let mut by_addr: BTreeMap<PciAddress, Vec<&PciDevice>> = BTreeMap::new();
        for dev in &node.devices {
            by_addr.entry(dev.pci_address).or_default().push(dev);
        }
        for (addr, devs) in by_addr {
            writeln!(out, "    {}", addr)?;
            for dev in devs {
                match dev.link_speed {
                    Some(speed) => writeln!(
                        out,
                        "      {} ({}, {:.1} GT/s)",
                        dev.name, dev.device_type, speed
                    )?,
                    None => writeln!(out, "      {} ({})", dev.name, dev.device_type)?,
                }
            }
        }
    }
    Ok(())
}

/// Render a topology as pretty JSON followed by a newline
pub fn write_topology_json<W: Write>(topo: &Topology, out: &mut W) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(topo)?;
    data.push(b'\n');
    out.write_all(&data)?;
    Ok(())
}

/// Fetch the topology from a provider and write it to `out`
pub fn dump_topology<P, W>(provider: &P, json: bool, out: &mut W) -> Result<()>
where
    P: TopologyProvider + ?Sized,
    W: Write,
{
    let topo = provider.get_topology()?;
    debug!("dumping topology (json={})", json);
    if json {
        write_topology_json(&topo, out)
    } else {
        print_topology(&topo, out)
    }
}
