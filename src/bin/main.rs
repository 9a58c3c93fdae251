use clap::{Arg, ArgAction, Command};
use log::{debug, error};
use report2pdf::config::ConfigSource;
use report2pdf::report::ReportGenerator;
use serde_json::{json, Value};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;

#[derive(Debug)]
enum AppError {
    FileReadError(std::io::Error),
    GenerationError(String),
    NoInput,
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AppError::FileReadError(err) => write!(f, "could not read payload: {}", err),
            AppError::GenerationError(msg) => write!(f, "{}", msg),
            AppError::NoInput => write!(f, "no payload provided (pass a file, '-' or --string)"),
        }
    }
}

/// Reads the raw payload text from the file argument, stdin (`-`) or the
/// inline `--string` argument.
fn get_payload_input(matches: &clap::ArgMatches) -> Result<String, AppError> {
    if let Some(path) = matches.get_one::<String>("path") {
        if path == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(AppError::FileReadError)?;
            return Ok(buffer);
        }
        return fs::read_to_string(path).map_err(AppError::FileReadError);
    }
    if let Some(inline) = matches.get_one::<String>("string") {
        return Ok(inline.to_string());
    }
    Err(AppError::NoInput)
}

/// Parses the payload text, degrading invalid JSON to an error-shaped
/// mapping so the run still produces a report describing the problem.
fn parse_payload(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            debug!("payload is not valid JSON ({}), building error report", err);
            let preview = if raw.len() > 200 {
                let mut end = 200;
                while !raw.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &raw[..end])
            } else {
                raw.to_string()
            };
            json!({"error": "Invalid JSON", "raw_input": preview})
        }
    }
}

/// Get the configuration source based on CLI arguments or default behavior.
///
/// Priority order:
/// 1. If `--config` is explicitly provided, use that file
/// 2. If `report2pdfrc.toml` exists in the current directory, use it
/// 3. Otherwise use the default configuration
fn get_config_source(matches: &clap::ArgMatches) -> ConfigSource<'static> {
    if let Some(config_file) = matches.get_one::<String>("config") {
        return ConfigSource::File(Box::leak(config_file.to_string().into_boxed_str()));
    }

    if std::path::Path::new("report2pdfrc.toml").exists() {
        return ConfigSource::File("report2pdfrc.toml");
    }

    ConfigSource::Default
}

fn run(matches: &clap::ArgMatches) -> Result<PathBuf, AppError> {
    let raw = get_payload_input(matches)?;
    let payload = parse_payload(&raw);

    let style = report2pdf::config::load_config_from_source(get_config_source(matches));
    let mut generator = ReportGenerator::new(style);
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        generator = generator.with_output_dir(dir);
    }

    let out_path = matches.get_one::<String>("output").map(PathBuf::from);
    let include_chart = !matches.get_flag("no-chart");

    let result = if matches.get_flag("strict") {
        generator.create_report(&payload, out_path.as_deref(), include_chart)
    } else {
        generator.create_report_with_fallback(&payload, out_path.as_deref(), include_chart)
    };

    result.map_err(|err| AppError::GenerationError(err.to_string()))
}

fn main() {
    let matches = Command::new("report2pdf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate styled PDF reports from JSON payloads")
        .arg(
            Arg::new("path")
                .help("Path to a JSON payload file, or '-' to read from stdin")
                .index(1),
        )
        .arg(
            Arg::new("string")
                .short('s')
                .long("string")
                .help("Inline JSON payload")
                .value_name("JSON"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output PDF path (defaults to a timestamped file in the reports directory)")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for default output paths")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("no-chart")
                .long("no-chart")
                .help("Disable the auto-generated chart for flat payloads")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail immediately instead of retrying with an error report")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a TOML styling configuration")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut logger = env_logger::Builder::from_default_env();
    if matches.get_flag("verbose") {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match run(&matches) {
        Ok(path) => println!("{}", path.display()),
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            process::exit(1);
        }
    }
}
