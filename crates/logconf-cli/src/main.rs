use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use logconf_cli::commands;
use logconf_cli::DocumentOptions;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let file = Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Subsystem document to read");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("logconf")
        .version(logconf_xml::VERSION)
        .about("Read, check and upgrade logging subsystem documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .arg(
            Arg::new("base")
                .long("base")
                .global(true)
                .default_value("subsystem=logging")
                .help("Address resources are created under"),
        )
        .subcommand(
            Command::new("parse")
                .about("List the add operations a document produces")
                .arg(file.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("rewrite")
                .about("Upgrade a document to the current schema")
                .arg(file.clone())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to this file instead of stdout"),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .default_value("4")
                        .value_parser(value_parser!(usize))
                        .help("Spaces per nesting level"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a document and print a summary")
                .arg(file)
                .arg(json),
        )
        .subcommand(
            Command::new("filter")
                .about("Print the canonical form of a filter expression")
                .arg(Arg::new("expression").required(true).help("Filter expression")),
        )
}

fn init_tracing(matches: &ArgMatches) {
    let default = match matches.get_count("verbose") {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if matches.get_flag("log-json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(matches: &ArgMatches) -> Result<String> {
    let mut options = DocumentOptions::default();
    if let Some(base) = matches.get_one::<String>("base") {
        options.base = commands::parse_base(base)?;
    }

    match matches.subcommand() {
        Some(("parse", args)) => {
            let file = args.get_one::<PathBuf>("file").map_or_else(PathBuf::new, Clone::clone);
            commands::parse(&file, args.get_flag("json"), &options)
        }
        Some(("rewrite", args)) => {
            let file = args.get_one::<PathBuf>("file").map_or_else(PathBuf::new, Clone::clone);
            if let Some(indent) = args.get_one::<usize>("indent") {
                options.indent = *indent;
            }
            commands::rewrite(&file, args.get_one::<PathBuf>("output"), &options)
        }
        Some(("check", args)) => {
            let file = args.get_one::<PathBuf>("file").map_or_else(PathBuf::new, Clone::clone);
            commands::check(&file, args.get_flag("json"), &options)
        }
        Some(("filter", args)) => {
            let expression = args.get_one::<String>("expression").map_or("", String::as_str);
            commands::filter(expression)
        }
        _ => Ok(String::new()),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(&matches);

    match run(&matches) {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            if stdout.write_all(output.as_bytes()).is_err() {
                return ExitCode::FAILURE;
            }
            if !output.is_empty() && !output.ends_with('\n') {
                let _ = writeln!(stdout);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
