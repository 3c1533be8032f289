//! CLI wrapper for the just-tools object graph engine.
//!
//! Usage:
//!   just-tools <file.json>              # Evaluate and print a dynamic data structure
//!   just-tools -e "expression"          # Evaluate an expression
//!   just-tools                          # Start REPL (interactive mode)
//!
//! `--config <file>` may precede any of the above.

use just_tools::runner::api::Tools;
use just_tools::runner::config::ToolsConfig;
use just_tools::runner::ds::lazy::DirectiveKind;
use just_tools::runner::ds::operations::convert::from_json;
use just_tools::runner::ds::value::{RecordRef, Value};
use just_tools::runner::eval::dynamic::{evaluate_code, new_scope};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

fn main() {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let config = if args.len() >= 2 && args[0] == "--config" {
        let path = args[1].clone();
        args.drain(0..2);
        match ToolsConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    } else {
        ToolsConfig::default()
    };
    init_logging(&config);
    let tools = Tools::new(config);

    match args.len() {
        0 => run_repl(&tools),
        1 => {
            let arg = &args[0];
            if arg == "-h" || arg == "--help" {
                print_usage();
                process::exit(0);
            }
            run_file(&tools, arg);
        }
        2 if args[0] == "-e" || args[0] == "--eval" => eval_code(&tools, &args[1], &new_scope()),
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

fn init_logging(config: &ToolsConfig) {
    let default_level = if config.logging { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("just-tools - Object graph toolkit");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  just-tools [--config <file>] <file.json>     Evaluate a dynamic data structure");
    eprintln!("  just-tools [--config <file>] -e \"code\"       Evaluate an expression");
    eprintln!("  just-tools [--config <file>] --eval \"code\"   Evaluate an expression");
    eprintln!("  just-tools [--config <file>]                 Start REPL (interactive mode)");
}

fn run_file(tools: &Tools, filename: &str) {
    let source = match fs::read_to_string(filename) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", filename, e);
            process::exit(1);
        }
    };

    let json = match serde_json::from_str(&source) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            process::exit(1);
        }
    };

    let graph = from_json(&json);
    match tools.resolve_dynamic_data_structure(&graph, &new_scope()) {
        Ok(resolved) => println!("{}", tools.represent_object(&resolved)),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn eval_code(tools: &Tools, code: &str, scope: &RecordRef) {
    match evaluate_code(code, DirectiveKind::Expression, scope) {
        Ok(value) => println!("{}", tools.represent_object(&value)),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn run_repl(tools: &Tools) {
    println!("just-tools v0.1.0 - Object graph toolkit");
    println!("Type statements and press Enter, `return` prints a value. Type .exit to quit.");
    println!();

    let scope = new_scope();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let input = input.trim();

        if input == ".exit" || input == ".quit" {
            break;
        }

        if input.is_empty() {
            continue;
        }

        match evaluate_code(input, DirectiveKind::Execution, &scope) {
            Ok(Value::Undefined) => {}
            Ok(value) => println!("{}", tools.represent_object(&value)),
            Err(e) => eprintln!("{}", e),
        }
    }

    println!("Goodbye!");
}
