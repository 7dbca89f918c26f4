//! Simple CLI for cohort search compilation
//!
//! Reads a search request in the cohort-builder JSON DSL and prints the
//! realized query for the nested-document backend, or a demographic
//! bucket spec.

use clap::{Parser, Subcommand};
use cohort_search::{
    SearchRequest, StaticCriteriaResolver, compile, demo_chart_buckets, realize,
};
use rustc_hash::FxHashMap;
use std::fs;
use std::io::{self, Read};
use std::process;

#[derive(Parser)]
#[command(name = "cohort-search")]
#[command(about = "Compile cohort-builder search requests into executable queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a search request and print the realized backend query
    Compile {
        /// JSON file containing the search request (reads from stdin if not provided)
        #[arg(short, long)]
        file: Option<String>,
        /// JSON file mapping parent concept ids to descendant leaf ids,
        /// e.g. {"771": [772, 773]}
        #[arg(long)]
        hierarchy: Option<String>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the demographic bucket spec for the given age-range labels
    Buckets {
        /// Age range labels, e.g. 18-44 45-64 65
        #[arg(required = true)]
        age_ranges: Vec<String>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compile {
            file,
            hierarchy,
            pretty,
        } => handle_compile(file.as_deref(), hierarchy.as_deref(), pretty),
        Commands::Buckets { age_ranges, pretty } => handle_buckets(&age_ranges, pretty),
    }
}

fn handle_compile(file: Option<&str>, hierarchy: Option<&str>, pretty: bool) {
    let request: SearchRequest = match serde_json::from_str(&read_input(file)) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error parsing search request: {e}");
            process::exit(1);
        }
    };

    let mut resolver = StaticCriteriaResolver::new();
    if let Some(filename) = hierarchy {
        let children: FxHashMap<i64, Vec<i64>> = match serde_json::from_str(&read_file(filename)) {
            Ok(children) => children,
            Err(e) => {
                eprintln!("Error parsing hierarchy file '{filename}': {e}");
                process::exit(1);
            }
        };
        for (parent, leaves) in children {
            resolver = resolver.with_children(parent, leaves);
        }
    }

    match compile(&request, &resolver) {
        Ok(expr) => print_json(&realize(&expr), pretty),
        Err(e) => {
            eprintln!("Error compiling search request: {e}");
            process::exit(1);
        }
    }
}

fn handle_buckets(age_ranges: &[String], pretty: bool) {
    let labels: Vec<&str> = age_ranges.iter().map(String::as_str).collect();
    match demo_chart_buckets(&labels) {
        Ok(spec) => print_json(&spec, pretty),
        Err(e) => {
            eprintln!("Error building demographic buckets: {e}");
            process::exit(1);
        }
    }
}

fn read_input(file: Option<&str>) -> String {
    match file {
        Some(filename) => read_file(filename),
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {e}");
                process::exit(1);
            }
            buffer
        }
    }
}

fn read_file(filename: &str) -> String {
    match fs::read_to_string(filename) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{filename}': {e}");
            process::exit(1);
        }
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            process::exit(1);
        }
    }
}
