use crate::event::CandidateEvent;
use clap::{Args, Parser, Subcommand};

/// SnapCal - turn free text into calendar event candidates
#[derive(Debug, Parser)]
#[command(name = "snapcal")]
#[command(about = "Extract calendar events from free text", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute (if not specified, enters interactive mode)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract an event from text and print it as JSON
    #[command(alias = "extract")]
    Parse(ParseArgs),

    /// Run the HTTP API
    #[command(alias = "server")]
    Serve {
        /// Address to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Text to extract from
    #[arg(required = true)]
    pub text: String,

    /// Reference time in RFC 3339 (defaults to now)
    #[arg(long)]
    pub now: Option<String>,

    /// IANA timezone, e.g. America/New_York
    #[arg(long, alias = "tz")]
    pub timezone: Option<String>,

    /// Locale deciding numeric date order, e.g. en-US or en-GB
    #[arg(long)]
    pub locale: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Show the effective configuration
    #[command(aliases = ["list", "get"])]
    Show,

    /// Print the configuration file path
    Path,
}

/// One-line human summary used by the interactive prompt.
pub fn summarize(event: &CandidateEvent, accepted: bool) -> String {
    let mut summary = format!("{} ({:.2}", event.title, event.confidence);
    if !accepted {
        summary.push_str(", low confidence");
    }
    summary.push(')');

    match (event.start, event.end) {
        (Some(start), Some(end)) => summary.push_str(&format!("\n  when:  {} to {}", start, end)),
        (Some(start), None) if event.all_day => {
            summary.push_str(&format!("\n  when:  {} (all day)", start))
        }
        (Some(start), None) => summary.push_str(&format!("\n  when:  {}", start)),
        _ => {}
    }
    if let Some(location) = &event.location {
        summary.push_str(&format!("\n  where: {}", location));
    }
    summary.push_str(&format!("\n  path:  {}", event.extraction_path));
    summary
}
