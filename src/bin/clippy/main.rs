//! Terminal front end: runs a selection through the same state machines the
//! browser script mirrors, and prints what the widget would show.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use clippy_reader::Operation;
use clippy_reader::client::{ApiClient, DEFAULT_API_BASE};
use clippy_reader::tips::{self, FIRST_TIP_DELAY, TIP_DURATION, TipPreferences, TipScheduler};
use clippy_reader::widget::{ClippyApp, InputEvent, Panel, RawSelection, Rect, SELECTION_DEBOUNCE, Scroll, Viewport};

#[derive(Parser, Debug)]
#[command(name = "clippy", about = "Ask Clippy about a piece of text", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs an action (eli5, summarize, define, example, explain) on text
    Ask {
        action: Operation,

        /// The selected text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        #[arg(long, env = "CLIPPY_API", default_value = DEFAULT_API_BASE)]
        api: String,

        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,

        /// Print the widget markup instead of plain text
        #[arg(long)]
        html: bool,
    },

    /// Lists the menu actions
    Menu,

    /// Shows a random tip
    Tip {
        /// Stop tips for the rest of the day
        #[arg(long)]
        disable_today: bool,

        /// Keep running and show a tip every 30 to 90 seconds
        #[arg(long, conflicts_with = "disable_today")]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Ask {
            action,
            text,
            api,
            timeout_ms,
            html,
        } => ask(action, &text.join(" "), api, Duration::from_millis(timeout_ms), html).await,
        Commands::Menu => {
            for operation in Operation::ALL {
                println!("{:<10} {:<14} {}", operation.id(), operation.label(), operation.title());
            }
            Ok(())
        }
        Commands::Tip { disable_today, watch } => {
            let scheduler = open_tips()?;
            if watch {
                watch_tips(scheduler).await
            } else {
                tip(scheduler, disable_today)
            }
        }
    }
}

async fn ask(action: Operation, text: &str, api: String, timeout: Duration, html: bool) -> Result<()> {
    let client = ApiClient::new(api).with_timeout(timeout).on_loading(|loading| {
        if loading {
            eprint!("📎 Thinking...");
        } else {
            eprintln!();
        }
        let _ = std::io::stderr().flush();
    });

    // Same path as a pointer-up in the browser: one debounced check.
    let mut app = ClippyApp::new(client, Viewport::new(1280.0, 800.0));
    let raw = RawSelection::new(text, Rect::default(), Scroll::default());
    let released = Instant::now();
    app.input(&InputEvent::PointerUp, released);
    if app.tick(released + SELECTION_DEBOUNCE, &raw).is_none() {
        bail!("Select at least 3 characters of text");
    }

    let Some(rendered) = app.choose(action).await else {
        bail!("Nothing to show");
    };
    println!("{}", if html { rendered.to_html() } else { rendered.to_text() });

    if matches!(app.widget().panel(), Panel::Error(_)) {
        std::process::exit(1);
    }
    Ok(())
}

fn open_tips() -> Result<TipScheduler> {
    let today = chrono::Local::now().date_naive();
    Ok(match tips::preferences_path() {
        Some(path) => TipScheduler::load(path, today)?,
        None => TipScheduler::new(TipPreferences::default(), today),
    })
}

fn tip(mut scheduler: TipScheduler, disable_today: bool) -> Result<()> {
    if disable_today {
        scheduler.disable_today();
        println!("OK, no more tips today.");
        return Ok(());
    }

    match scheduler.show_random_tip(Instant::now()) {
        Some(tip) => println!("📎 {tip}"),
        None => println!("📎 That's all my tips for today!"),
    }
    Ok(())
}

async fn watch_tips(mut scheduler: TipScheduler) -> Result<()> {
    let mut next_tip = Instant::now() + FIRST_TIP_DELAY;
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }

        let now = Instant::now();
        scheduler.roll_over(chrono::Local::now().date_naive());
        if scheduler.tick(now) {
            println!("   (closed after {}s)", TIP_DURATION.as_secs());
        }
        if now >= next_tip {
            if let Some(tip) = scheduler.show_random_tip(now) {
                println!("📎 {tip}");
            }
            next_tip = now + TipScheduler::next_delay();
        }
    }
}
