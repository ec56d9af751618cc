/*
    ArcProp, orbit propagation and reference frame engine
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

extern crate pretty_env_logger;
#[macro_use]
extern crate log;

use arcprop::io::run_config_file;
use clap::{CommandFactory, Parser};
use std::env::{set_var, var};
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_VAR: &str = "ARCPROP_LOG";

/// Propagates the initial conditions of a YAML run file and writes the resulting ephemeris.
#[derive(Parser, Debug)]
#[command(name = "arcprop", version, author)]
struct Cli {
    /// YAML file containing the initial conditions for state propagation
    file: Option<PathBuf>,
    /// Echo all messages to stdout
    #[arg(short, long)]
    echo: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, if cli.echo { "DEBUG" } else { "INFO" });
    }

    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    let Some(path) = cli.file else {
        println!("No initial conditions file found.\n");
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    };

    info!("Loading run file `{}`", path.display());

    match run_config_file(&path) {
        Ok(traj) => {
            info!("Propagation complete: {traj}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            println!("{e}\n");
            let _ = Cli::command().print_help();
            ExitCode::FAILURE
        }
    }
}
