use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use claritas_core::{
    ClaritasConfig, FetchConfig, Level, Simplifier, StoredState, default_state_path, fetch_url,
    load_state, save_state,
};
use owo_colors::OwoColorize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for simplified content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, html, json", s)),
        }
    }
}

/// Score the reading complexity of a web page and rewrite it simpler
#[derive(Parser, Debug)]
#[command(name = "claritas")]
#[command(author = "Claritas Contributors")]
#[command(version = VERSION)]
#[command(about = "Score and simplify the readable content of web pages", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, html, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Pin the simplification level (1-3) instead of adapting it
    #[arg(short, long, value_name = "LEVEL")]
    level: Option<u8>,

    /// Profile/state file (default: platform config dir)
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Do not read or write the persisted profile
    #[arg(long)]
    no_profile: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Minimum readable-text length for content candidates
    #[arg(long, default_value = "200", value_name = "NUM")]
    min_text_len: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Print a styled banner for verbose mode
fn print_banner() {
    eprintln!("\n{} {} {}", "Claritas".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Score and simplify the readable content of web pages".dimmed());
    eprintln!();
}

/// Print a styled step message
fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an error message
fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn complexity_color(score: u8) -> String {
    match score {
        0..=3 => format!("{}", score.to_string().green()),
        4..=6 => format!("{}", score.to_string().yellow()),
        _ => format!("{}", score.to_string().red()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("claritas_core=debug")),
            )
            .with_writer(io::stderr)
            .init();
        print_banner();
    }

    let is_url = args.input.starts_with("http://") || args.input.starts_with("https://");

    let html = if args.input == "-" {
        if args.verbose {
            print_step(1, 3, "Reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else if is_url {
        if args.verbose {
            print_step(1, 3, &format!("Fetching {}", args.input.bright_white().underline()));
        }
        let config = FetchConfig {
            timeout: args.timeout,
            user_agent: args
                .user_agent
                .unwrap_or_else(|| FetchConfig::default().user_agent),
            ..Default::default()
        };
        fetch_url(&args.input, &config).await.context("Failed to fetch URL")?
    } else {
        if args.verbose {
            print_step(1, 3, &format!("Reading file {}", args.input.bright_white()));
        }
        fs::read_to_string(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    let state_path = if args.no_profile {
        None
    } else {
        args.profile.clone().or_else(default_state_path)
    };

    let mut state = match &state_path {
        Some(path) => load_state(path).unwrap_or_default(),
        None => StoredState::default(),
    };

    let mut builder = ClaritasConfig::builder().min_text_len(args.min_text_len);
    if let Some(level) = args.level {
        builder = builder.level_override(Level::from_u8(level));
    }
    let simplifier = Simplifier::with_config(builder.build());

    if args.verbose {
        print_step(2, 3, "Scoring and simplifying");
    }

    let source_url = is_url.then_some(args.input.as_str());
    let page = match simplifier.simplify_page(&html, source_url, &mut state, now_ms()).await {
        Ok(page) => page,
        Err(error) => {
            print_error(error.friendly_message());
            return Err(error.into());
        }
    };

    if args.verbose {
        eprintln!("  {} {}", "Domain:".dimmed(), page.domain.to_string().bright_white());
        eprintln!("  {} {}/10", "Complexity:".dimmed(), complexity_color(page.complexity));
        eprintln!("  {} {}", "Level:".dimmed(), page.result.level.as_u8().to_string().bright_white());
        eprintln!("  {} {}", "Backend:".dimmed(), page.result.backend.as_str().bright_white());
        eprintln!(
            "  {} {:.2} ({})",
            "Confidence:".dimmed(),
            page.confidence.confidence,
            format!("{:?}", page.confidence.level).to_lowercase().bright_white()
        );
        eprintln!(
            "  {} {}min -> {}min",
            "Reading time:".dimmed(),
            page.reading_time.before_min,
            page.reading_time.after_min
        );
        eprintln!();
        print_step(3, 3, "Writing output");
    }

    let output = match args.format {
        OutputFormat::Text => page.result.simplified_text.clone(),
        OutputFormat::Html => page.region.html.clone(),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "domain": page.domain,
                "complexity": page.complexity,
                "level": page.result.level,
                "backend": page.result.backend,
                "confidence": page.confidence,
                "reading_time": {
                    "before_min": page.reading_time.before_min,
                    "after_min": page.reading_time.after_min,
                    "saved_min": page.reading_time.saved_min,
                },
                "simplified_text": page.result.simplified_text,
                "html": page.region.html,
            });
            serde_json::to_string_pretty(&value).context("Failed to serialize result")?
        }
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    if let Some(path) = &state_path
        && let Err(error) = save_state(path, &state)
    {
        eprintln!("{} {}", "⚠".yellow(), format!("Could not save profile: {}", error).yellow());
    }

    Ok(())
}
