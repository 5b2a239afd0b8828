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

use std::io::{stdout, Write};

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use pcibdf::cli::{run_cli, Cli};
use pcibdf::config::{config_path, load_config_from};
use pcibdf::logger;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.config.clone().unwrap_or_else(config_path);
    let cfg = load_config_from(&path)
        .with_context(|| format!("failed to load config {}", path.display()))?;

    logger::init_logging(cli.verbose, &cfg.log_level);
    debug!("using config {}", path.display());

    let stdout = stdout();
    let mut out = stdout.lock();
    if let Err(err) = run_cli(&cli, &cfg, &mut out) {
        let _ = out.flush();
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
    out.flush()?;

    Ok(())
}
