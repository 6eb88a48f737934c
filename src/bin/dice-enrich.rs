use clap::Parser;
use dice_enrich::{EnrichConfig, Enricher, LazyTranslations, RollData, Translate};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Enriches rule text read from stdin. Paragraphs end at a blank line.
#[derive(Parser, Debug)]
#[command(name = "dice-enrich")]
struct Cli {
    /// JSON translation table used by `@Localize`
    #[arg(long)]
    translations: Option<PathBuf>,

    /// JSON object whose entries `@path` references resolve against
    #[arg(long)]
    roll_data: Option<PathBuf>,

    /// JSON enricher configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

fn run<T: Translate>(enricher: Enricher<T>, data: &RollData) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buf = String::new();
    let mut stdout = io::stdout();

    loop {
        let line = lines.next().transpose()?;
        let end = line.as_deref().map_or(true, str::is_empty);
        if end {
            if !buf.is_empty() {
                buf.pop();
                match enricher.enrich(&buf, data) {
                    Ok(text) => writeln!(stdout, "{}", text)?,
                    Err(why) => eprintln!("Error: {}", why),
                }
                stdout.flush()?;
                buf.clear();
            }
            if line.is_none() {
                return Ok(());
            }
        } else if let Some(line) = line {
            buf.push_str(&line);
            buf.push('\n');
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dice_enrich=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EnrichConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => EnrichConfig::default(),
    };
    let data = match &cli.roll_data {
        Some(path) => RollData::from_value(serde_json::from_str(&std::fs::read_to_string(path)?)?),
        None => RollData::new(),
    };

    match cli.translations {
        Some(path) => run(
            Enricher::with_translations(LazyTranslations::new(path)).with_config(config),
            &data,
        )?,
        None => run(Enricher::new().with_config(config), &data)?,
    }
    Ok(())
}
