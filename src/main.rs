use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use coast_sorter::sorter::{DEFAULT_EAST_OUTPUT, DEFAULT_SEPARATOR, DEFAULT_WEST_OUTPUT};
use coast_sorter::{process_file, InputSource, MalformedPolicy, SortConfig};
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;

fn main() {
    let matches = Command::new("Coast Sorter")
        .version("0.1.0")
        .about("Divides samples by geographic origin into west and east coast files")
        .arg(
            Arg::new("filename")
                .required(true)
                .help("Input file, one sample per line (use - for stdin)"),
        )
        .arg(
            Arg::new("sep")
                .long("sep")
                .num_args(1)
                .default_value(DEFAULT_SEPARATOR)
                .help("Separator for input file"),
        )
        .arg(
            Arg::new("west-output")
                .long("west-output")
                .num_args(1)
                .default_value(DEFAULT_WEST_OUTPUT)
                .help("Where west coast samples are written"),
        )
        .arg(
            Arg::new("east-output")
                .long("east-output")
                .num_args(1)
                .default_value(DEFAULT_EAST_OUTPUT)
                .help("Where east coast samples are written"),
        )
        .arg(
            Arg::new("groups")
                .long("groups")
                .num_args(1)
                .help("JSON file with {\"west\": [...], \"east\": [...]} location lists"),
        )
        .arg(
            Arg::new("skip-malformed")
                .long("skip-malformed")
                .action(ArgAction::SetTrue)
                .help("Report and skip lines without a location instead of failing"),
        )
        .arg(
            Arg::new("summary")
                .long("summary")
                .num_args(1)
                .help("Write a JSON summary of the run"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log every discarded sample"),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Cannot initialise logger: {e}");
    }

    let filename = matches.get_one::<String>("filename").map(String::as_str).unwrap_or("-");
    let input = if filename == "-" {
        InputSource::Stdin
    } else {
        InputSource::Path(PathBuf::from(filename))
    };

    let mut config = SortConfig::new(input);
    if let Some(sep) = matches.get_one::<String>("sep") {
        config.separator = sep.clone();
    }
    if let Some(west) = matches.get_one::<String>("west-output") {
        config.west_output = PathBuf::from(west);
    }
    if let Some(east) = matches.get_one::<String>("east-output") {
        config.east_output = PathBuf::from(east);
    }
    if matches.get_flag("skip-malformed") {
        config.malformed = MalformedPolicy::Skip;
    }
    let groups_file = matches.get_one::<String>("groups").map(PathBuf::from);
    let summary_path = matches.get_one::<String>("summary").map(PathBuf::from);

    let result = process_file(&config, groups_file)
        .context("sorting samples failed")
        .and_then(|summary| {
            if let Some(path) = &summary_path {
                summary.write_json(path)?;
                info!("Summary written to {}", path.display());
            }
            Ok(summary)
        });

    match result {
        Ok(summary) => info!(
            "Processing completed: {} west, {} east, {} discarded, {} malformed",
            summary.west, summary.east, summary.discarded, summary.malformed
        ),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
