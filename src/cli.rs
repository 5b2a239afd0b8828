/*
 * This file is part of pcibdf.
 *
 * Copyright (C) 2025 pcibdf contributors
 *
 * pcibdf is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pcibdf is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pcibdf. If not, see <https://www.gnu.org/licenses/>.
 */

//! Command Line Interface
//!
//! Thin commands over the address core: canonicalize, build sets, combine
//! them and dump a captured topology.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use bdf_core::{dump_topology, PciAddress, PciAddressSet, SnapshotProvider};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::{Config, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "pcibdf")]
#[command(version)]
#[command(about = "Canonical PCI addresses and device-inventory set algebra")]
#[command(long_about = "Canonical PCI addresses and device-inventory set algebra

Sets are given as one argument of space-separated addresses, the same
form every command prints them in.

EXAMPLES:
    pcibdf canon 0:3:1a.2                          Print 0000:03:1a.2
    pcibdf set 0000:0a:00.0 0000:01:00.0           Dedup and sort
    pcibdf intersect \"0000:01:00.0 0000:02:00.0\" \"0000:02:00.0\"
    pcibdf vmd 5d0505:01:00.0 0000:01:00.0         Keep VMD backing addresses
    pcibdf dump-topology --snapshot topo.json -j

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging

FILES:
    ~/.config/pcibdf/config.json   Output format, log level, snapshot path")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print each address in canonical form
    Canon {
        #[arg(required = true)]
        addrs: Vec<String>,
    },

    /// Deduplicate and sort addresses into a set
    Set {
        addrs: Vec<String>,
    },

    /// Addresses present in both sets
    Intersect {
        a: String,
        b: String,
    },

    /// Addresses in the first set but not the second
    Difference {
        a: String,
        b: String,
    },

    /// Addresses in either set
    Union {
        a: String,
        b: String,
    },

    /// Keep only VMD backing addresses (non-zero domain)
    Vmd {
        addrs: Vec<String>,
    },

    /// Dump a captured hardware topology
    DumpTopology {
        /// Dump output to this location
        #[arg(short, long, default_value = "stdout")]
        output: String,

        /// Topology snapshot to read (defaults to the configured one)
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

// ============================================================================
// CLI Execution
// ============================================================================

pub fn run_cli<W: Write>(cli: &Cli, cfg: &Config, out: &mut W) -> anyhow::Result<()> {
    let format = if cli.json { OutputFormat::Json } else { cfg.output };

    match &cli.command {
        Commands::Canon { addrs } => cmd_canon(addrs, format, out),
        Commands::Set { addrs } => {
            let set = PciAddressSet::from_strings(addrs).context("invalid address list")?;
            write_set(&set, format, out)
        }
        Commands::Intersect { a, b } => {
            let (a, b) = parse_pair(a, b)?;
            write_set(&a.intersect(&b), format, out)
        }
        Commands::Difference { a, b } => {
            let (a, b) = parse_pair(a, b)?;
            write_set(&a.difference(&b), format, out)
        }
        Commands::Union { a, b } => {
            let (a, b) = parse_pair(a, b)?;
            write_set(&a.union(&b), format, out)
        }
        Commands::Vmd { addrs } => {
            let set = PciAddressSet::from_strings(addrs).context("invalid address list")?;
            write_set(&set.vmd_backing_addresses(), format, out)
        }
        Commands::DumpTopology { output, snapshot } => {
            cmd_dump_topology(output, format == OutputFormat::Json, snapshot.as_ref(), cfg, out)
        }
    }
}

fn cmd_canon<W: Write>(
    addrs: &[String],
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    let parsed = addrs
        .iter()
        .map(|a| a.parse::<PciAddress>())
        .collect::<Result<Vec<_>, _>>()?;

    match format {
        OutputFormat::Text => {
            for addr in &parsed {
                writeln!(out, "{}", addr)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &parsed)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn parse_pair(a: &str, b: &str) -> anyhow::Result<(PciAddressSet, PciAddressSet)> {
    let a: PciAddressSet = a.parse().context("invalid first set")?;
    let b: PciAddressSet = b.parse().context("invalid second set")?;
    debug!("operands: {} and {} address(es)", a.len(), b.len());
    Ok((a, b))
}

fn write_set<W: Write>(
    set: &PciAddressSet,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", set)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, set)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn cmd_dump_topology<W: Write>(
    output: &str,
    json: bool,
    snapshot: Option<&PathBuf>,
    cfg: &Config,
    out: &mut W,
) -> anyhow::Result<()> {
    let path = snapshot
        .or(cfg.topology_snapshot.as_ref())
        .ok_or_else(|| anyhow!("no topology snapshot given and none configured"))?;
    let provider = SnapshotProvider::new(path);

    if output == "stdout" {
        dump_topology(&provider, json, out)?;
        return Ok(());
    }

    let mut file =
        File::create(output).with_context(|| format!("failed to create {:?}", output))?;
    dump_topology(&provider, json, &mut file)?;
    Ok(())
}
