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

use tracing_subscriber::EnvFilter;

/// Pick the log filter: RUST_LOG wins, then --verbose, then the config.
pub fn log_filter(verbose: bool, configured: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::new(configured)
}

/// Install a stderr subscriber so stdout stays machine-readable
pub fn init_logging(verbose: bool, configured: &str) {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(log_filter(verbose, configured))
        .with_writer(std::io::stderr)
        .try_init();
}
