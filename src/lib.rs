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

//! pcibdf - canonical PCI addresses for storage node tooling
//!
//! The address core lives in `bdf-core`; this crate adds the command line
//! front end, the persisted config and logging setup.

pub mod cli;
pub mod config;
pub mod logger;

pub use bdf_core::{PciAddress, PciAddressSet};
