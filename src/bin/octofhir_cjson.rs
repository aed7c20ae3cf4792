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

//! Simple CLI for CJSON evaluation
//!
//! A command-line interface for evaluating CJSON expressions and documents.

use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use octofhir_cjson::{
    CjsonEngine, CjsonValue, EvalOptions, FunctionRegistry, dump, load_cjson_bytes,
    load_cjson_file,
};
use std::io::{self, Read};
use std::process;

#[derive(Parser)]
#[command(name = "octofhir-cjson")]
#[command(about = "Simple CJSON CLI for evaluating expressions and configuration files")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single CJSON expression
    Eval {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Evaluate map entries (the usual form of a CJSON file)
    Map {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Evaluate list items
    List {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Only check that the input evaluates without errors
    Check {
        #[command(flatten)]
        input: InputArgs,
        /// How to read the input
        #[arg(long, value_enum, default_value_t = Mode::Map)]
        mode: Mode,
        /// Don't report success on stderr
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// CJSON text to evaluate (reads --file or stdin if not provided)
    expression: Option<String>,
    /// CJSON file to evaluate; its `// encoding:` header is honored
    #[arg(short, long)]
    file: Option<String>,
    /// Treat unquoted true, false, null and numbers as strings
    #[arg(long)]
    force_strings: bool,
    /// Custom variable for getCustomVariable(name), as NAME=VALUE
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,
}

#[derive(Args)]
struct OutputArgs {
    /// Print the result as JSON instead of a CJSON dump
    #[arg(short, long)]
    json: bool,
    /// Print the result on a single line
    #[arg(short, long)]
    compact: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Single,
    Map,
    List,
}

fn main() {
    // Setup human-panic for better error messages
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval { input, output } => handle_print(&input, Mode::Single, &output),
        Commands::Map { input, output } => handle_print(&input, Mode::Map, &output),
        Commands::List { input, output } => handle_print(&input, Mode::List, &output),
        Commands::Check { input, mode, quiet } => handle_check(&input, mode, quiet),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn handle_print(input: &InputArgs, mode: Mode, output: &OutputArgs) -> anyhow::Result<()> {
    let (result, _) = evaluate(input, mode)?;
    let text = match (output.json, output.compact) {
        (true, true) => serde_json::to_string(&result)?,
        (true, false) => serde_json::to_string_pretty(&result)?,
        (false, true) => result.to_string(),
        (false, false) => dump(&result),
    };
    println!("{text}");
    Ok(())
}

fn handle_check(input: &InputArgs, mode: Mode, quiet: bool) -> anyhow::Result<()> {
    let (_, source) = evaluate(input, mode)?;
    if !quiet {
        eprintln!("{}: OK", source.as_deref().unwrap_or("input"));
    }
    Ok(())
}

/// Evaluate the input; also returns the name of the file it came from
fn evaluate(input: &InputArgs, mode: Mode) -> anyhow::Result<(CjsonValue, Option<String>)> {
    let (text, source) = read_input(input)?;

    let mut registry = FunctionRegistry::with_standard_functions();
    registry.allow_unresolved(true);
    for var in &input.vars {
        let Some((name, value)) = var.split_once('=') else {
            bail!("Invalid --var {var:?}, expected NAME=VALUE");
        };
        registry.set_variable(name, value);
    }

    let mut options = EvalOptions::default().with_force_string_values(input.force_strings);
    if let Some(source) = &source {
        options = options.with_file_name(source.clone());
    }
    let mut engine = CjsonEngine::new()
        .with_environment(registry)
        .with_options(options);

    let result = match mode {
        Mode::Single => engine.eval(&text)?,
        Mode::Map => CjsonValue::Map(engine.eval_as_map(&text)?),
        Mode::List => CjsonValue::List(engine.eval_as_list(&text)?),
    };
    Ok((result, source))
}

/// The text to evaluate and the name to show in error messages
fn read_input(input: &InputArgs) -> anyhow::Result<(String, Option<String>)> {
    match (&input.expression, &input.file) {
        (Some(_), Some(_)) => bail!("Give either an expression or --file, not both"),
        (Some(expression), None) => Ok((expression.clone(), None)),
        (None, Some(file)) => Ok((load_cjson_file(file)?, Some(file.clone()))),
        (None, None) => {
            let mut bytes = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut bytes) {
                bail!("Error reading from stdin: {e}");
            }
            Ok((load_cjson_bytes(&bytes, None)?, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_quiet_belongs_to_check() {
        assert!(Cli::try_parse_from(["octofhir-cjson", "check", "--quiet", "a: 1"]).is_ok());
        assert!(Cli::try_parse_from(["octofhir-cjson", "check", "-q", "--mode", "list"]).is_ok());
        assert!(Cli::try_parse_from(["octofhir-cjson", "map", "--quiet", "a: 1"]).is_err());
        assert!(Cli::try_parse_from(["octofhir-cjson", "eval", "-q", "1"]).is_err());
    }

    #[test]
    fn test_output_flags_belong_to_printing_commands() {
        assert!(Cli::try_parse_from(["octofhir-cjson", "map", "--json", "--compact", "a: 1"]).is_ok());
        assert!(Cli::try_parse_from(["octofhir-cjson", "check", "--json", "a: 1"]).is_err());
    }
}
