// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command-line front end for the SCIM filter parser
//!
//! Parses a filter or PATCH path and prints the resulting tree.

use clap::{Parser, Subcommand, ValueEnum};
use scim_filter::{FilterParser, ParseError, PathParser};
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::io::{self, Read};
use std::process;

#[derive(Parser)]
#[command(name = "scim-filter")]
#[command(about = "Parse SCIM filter expressions and PATCH paths")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    /// Log parser activity to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a filter expression
    Filter {
        /// Filter expression (reads from stdin if not provided)
        expression: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Filter)]
        format: Format,
        /// Suppress informational messages
        #[arg(short, long)]
        quiet: bool,
    },
    /// Parse a PATCH operation path
    Path {
        /// Path expression (reads from stdin if not provided)
        expression: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Filter)]
        format: Format,
        /// Suppress informational messages
        #[arg(short, long)]
        quiet: bool,
    },
    /// Check syntax only, exiting non-zero on error
    Validate {
        /// Expression to validate (reads from stdin if not provided)
        expression: Option<String>,
        /// Validate as a PATCH path instead of a filter
        #[arg(short, long)]
        path: bool,
        /// Suppress informational messages
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Canonical filter text
    Filter,
    /// Pretty-printed JSON syntax tree
    Json,
    /// Rust debug representation
    Debug,
}

fn main() {
    // Setup human-panic for better error messages
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Filter {
            expression,
            format,
            quiet,
        } => {
            let expression = read_expression(expression);
            match FilterParser::new().parse(&expression) {
                Ok(Some(node)) => print_result(&expression, &node, format, quiet),
                Ok(None) => {
                    if !quiet {
                        eprintln!("Expression: {expression}");
                    }
                    println!("(empty filter)");
                }
                Err(e) => exit_with(&e),
            }
        }
        Commands::Path {
            expression,
            format,
            quiet,
        } => {
            let expression = read_expression(expression);
            match PathParser::new().parse(&expression) {
                Ok(path) => print_result(&expression, &path, format, quiet),
                Err(e) => exit_with(&e),
            }
        }
        Commands::Validate {
            expression,
            path,
            quiet,
        } => {
            let expression = read_expression(expression);
            let result = if path {
                PathParser::new().parse(&expression).map(|_| ())
            } else {
                FilterParser::new().parse(&expression).map(|_| ())
            };

            match result {
                Ok(()) if !quiet => println!("✓ Expression is valid"),
                Ok(()) => {}
                Err(e) => exit_with(&e),
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn read_expression(expression: Option<String>) -> String {
    if let Some(expression) = expression {
        return expression;
    }

    let mut buffer = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buffer) {
        eprintln!("Error reading from stdin: {e}");
        process::exit(1);
    }
    buffer.trim_end_matches(['\r', '\n']).to_owned()
}

fn print_result<T>(expression: &str, value: &T, format: Format, quiet: bool)
where
    T: Display + Debug + Serialize,
{
    if !quiet {
        eprintln!("Expression: {expression}");
    }

    match format {
        Format::Filter => println!("{value}"),
        Format::Debug => println!("{value:#?}"),
        Format::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing syntax tree: {e}");
                process::exit(1);
            }
        },
    }
}

fn exit_with(error: &ParseError) -> ! {
    eprintln!("Error: {error}");
    if let Some(location) = error.location() {
        log::debug!("error at byte offset {}", location.position);
    }
    process::exit(1);
}
