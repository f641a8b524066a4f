//! flowsim entry point.
//!
//! Parses single flows or replays scenario files against the simulated
//! OVS bridge and prints the resulting flow table.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error};
use sdn_flowsim::{run_scenario, Scenario};
use sdn_ovs_flow::{parse_flow_str, ParseCommand};

/// OpenFlow flow parser and simulated switch
#[derive(Parser, Debug)]
#[command(name = "flowsim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "warn", global = true)]
    log_level: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one flow and print it in dump-flows form
    Parse {
        /// ovs-ofctl command the flow is validated for
        #[arg(short = 'c', long, default_value = "add-flow")]
        command: ParseCommand,

        /// Flow text, e.g. "table=0, ip, actions=drop"
        flow: String,
    },
    /// Replay a YAML scenario and print the final bridge state
    Run {
        /// Scenario file
        scenario: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();
    debug!("flowsim starting: {:?}", args);

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("flowsim: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &Args) -> Result<()> {
    match &args.command {
        Command::Parse { command, flow } => {
            let parsed = parse_flow_str(*command, flow)?;
            match args.format {
                Format::Text => println!("{}", parsed),
                Format::Json => println!("{}", serde_json::to_string_pretty(&parsed)?),
            }
        }
        Command::Run { scenario } => {
            let scenario = Scenario::from_file(scenario)?;
            let report = run_scenario(&scenario)
                .with_context(|| format!("failed to run scenario on {}", scenario.bridge))?;
            match args.format {
                Format::Text => {
                    println!("bridge {}", report.bridge);
                    for (name, ofport) in &report.ports {
                        println!(" port {}: ofport {}", name, ofport);
                    }
                    println!("flows:");
                    for flow in &report.flows {
                        println!("{}", flow);
                    }
                    for err in &report.errors {
                        eprintln!("error: {}", err);
                    }
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
    }
    Ok(())
}
