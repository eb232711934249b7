#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use pw_toggle::constants::events;
use pw_toggle::fixture::PageSpec;
use pw_toggle::{Document, Event, EventKind, ListenerTarget, Options, PasswordToggle, ToggleEvent, script};

/// Replay a scripted session against a page fixture and print every
/// visibility change as a JSON line
#[derive(Debug, Parser)]
#[command(name = "pw-toggle", version, about)]
struct Cli {
    /// Page fixture: JSON element tree
    page: PathBuf,

    /// Script of actions to replay
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Options file (defaults to the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the final document body
    #[arg(long)]
    dump: bool,
}

fn init_logging() -> Result<()> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout carries the event stream
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")
}

fn print_events(doc: &mut Document) {
    doc.add_listener(
        ListenerTarget::Document,
        EventKind::Custom(events::PASSWORD_TOGGLE.to_string()),
        Rc::new(|_: &mut Document, event: &mut Event| {
            let Some(toggle) = ToggleEvent::from_event(event) else {
                return;
            };
            match serde_json::to_string(&toggle) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "Failed to encode toggle event"),
            }
        }),
    );
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::load_or_default()?,
    };

    let mut doc = PageSpec::load(&cli.page)?.build();
    print_events(&mut doc);

    let toggle = PasswordToggle::new(&mut doc, options).context("Failed to initialize password toggle")?;
    info!(fields = toggle.fields().len(), mode = toggle.mode().as_str(), "Ready");

    if let Some(path) = &cli.script {
        let steps = script::load(path)?;
        let failed = script::run(&mut doc, &toggle, &steps);
        if failed > 0 {
            warn!(failed, total = steps.len(), "Some steps failed");
        }
    }

    if cli.dump {
        let body = doc.body();
        println!("{}", doc.to_html(body));
    }

    Ok(())
}
