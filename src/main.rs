use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use snapcal::api_server::start_api_server;
use snapcal::cli::{Cli, Commands, ConfigActions, ParseArgs, summarize};
use snapcal::config::{Config, get_config_path};
use snapcal::{EventResponse, ExtractionContext, ExtractorSettings, HeuristicExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_path = dotenvy::dotenv().ok();

    // Initialize logging with custom format
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Some(Commands::Parse(args)) => run_parse(&config, args),
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            start_api_server(config).await
        }
        Some(Commands::Config { action: ConfigActions::Show }) => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Config { action: ConfigActions::Path }) => {
            println!("{}", get_config_path()?.display());
            Ok(())
        }
        None => run_interactive(&config),
    }
}

fn run_parse(config: &Config, args: ParseArgs) -> Result<()> {
    let now = match args.now.as_deref() {
        Some(now) => ExtractionContext::parse_now(now)?,
        None => Utc::now(),
    };
    let timezone = args.timezone.as_deref().unwrap_or(&config.extraction.default_timezone);
    let locale = args.locale.as_deref().unwrap_or(&config.extraction.default_locale);
    let ctx = ExtractionContext::new(now, timezone, locale)?;

    let extractor = HeuristicExtractor::new(ExtractorSettings::from(config));
    let event = extractor.extract(&args.text, &ctx)?;
    let response = EventResponse::from(&event);

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .context("Failed to serialize event")?;
    println!("{}", json);
    Ok(())
}

fn run_interactive(config: &Config) -> Result<()> {
    info!("Starting SnapCal interactive mode");

    let extractor = HeuristicExtractor::new(ExtractorSettings::from(config));
    let mut rl = DefaultEditor::new()?;
    println!("Welcome to SnapCal! Paste event text, or type 'exit' to quit.");

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "exit" | "quit") {
                    break;
                }
                let _ = rl.add_history_entry(line);

                let ctx = ExtractionContext::new(
                    Utc::now(),
                    &config.extraction.default_timezone,
                    &config.extraction.default_locale,
                )?;
                match extractor.extract(line, &ctx) {
                    Ok(event) => {
                        let accepted = extractor.settings().scoring.accepts(event.confidence);
                        println!("{}", summarize(&event, accepted));
                    }
                    Err(err) => error!("Failed to extract event: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
