//! Application entry point — CalmMind command line.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run) and pick up
//!    API keys from the environment.
//! 3. Create the [`tokio`] runtime.
//! 4. Open the session store selected in config.
//! 5. Run the requested subcommand.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use calmmind::{
    config::{AppConfig, SpeechMode, StoreBackend, StoreConfig, Theme},
    identity::Identity,
    llm::ApiTextGenerator,
    pipeline::GenerationPipeline,
    progress::{format_duration, ProgressStats, DEFAULT_WEEKLY_GOAL},
    session::SessionView,
    store::{JsonSessionStore, MemorySessionStore, SessionStore},
    tts::{decode_data_uri, ElevenLabsSynthesizer},
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "calmmind", version, about = "Personalised guided meditations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a meditation for a mood and a goal.
    Generate {
        /// Current mood id (stressed, anxious, unfocused, tired, restless, overwhelmed).
        #[arg(long)]
        mood: String,
        /// Desired outcome id (calm, focus, sleep, energy, confidence, peace).
        #[arg(long)]
        outcome: String,
        /// Wallet address to attribute the session to.
        #[arg(long)]
        wallet: String,
        /// Colour theme override.
        #[arg(long)]
        theme: Option<Theme>,
        /// Skip narration and play on the simulated clock.
        #[arg(long)]
        silent: bool,
        /// Write the narration audio to this file.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Follow the session on the simulated clock until it completes.
        #[arg(long)]
        play: bool,
    },
    /// List a wallet's past sessions.
    History {
        #[arg(long)]
        wallet: String,
    },
    /// Show streak, totals and achievements for a wallet.
    Progress {
        #[arg(long)]
        wallet: String,
        /// Sessions per week to aim for.
        #[arg(long, default_value_t = DEFAULT_WEEKLY_GOAL)]
        goal: u32,
    },
}

// ---------------------------------------------------------------------------
// Store selection
// ---------------------------------------------------------------------------

fn open_store(config: &StoreConfig) -> Arc<dyn SessionStore> {
    match config.backend {
        StoreBackend::Memory => {
            log::info!("Session store: in-memory");
            Arc::new(MemorySessionStore::new())
        }
        StoreBackend::File => {
            let path = config.sessions_file();
            log::info!("Session store: {}", path.display());
            Arc::new(JsonSessionStore::open(path))
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

struct GenerateArgs {
    mood: String,
    outcome: String,
    wallet: String,
    theme: Option<Theme>,
    silent: bool,
    out: Option<PathBuf>,
    play: bool,
}

async fn run_generate(
    mut config: AppConfig,
    store: Arc<dyn SessionStore>,
    args: GenerateArgs,
) -> Result<()> {
    if args.silent {
        config.generation.speech = SpeechMode::Silent;
    }
    if let Some(theme) = args.theme {
        config.ui.theme = theme;
    }

    if let Err(e) = store.create_user(&args.wallet).await {
        log::warn!("Could not register wallet {} ({e}); continuing", args.wallet);
    }

    let pipeline = Arc::new(GenerationPipeline::new(
        Arc::new(ApiTextGenerator::from_config(&config.llm)),
        Arc::new(ElevenLabsSynthesizer::from_config(&config.tts)),
        store,
        config.generation.clone(),
    ));
    let view = SessionView::new(pipeline, None, config.playback.clone(), config.ui.theme);

    view.select_mood(&args.mood)?;
    view.select_outcome(&args.outcome)?;
    view.generate(&Identity::connected(args.wallet.as_str())).await?;

    let Some(asset) = view.asset() else {
        bail!("generation finished without a meditation");
    };
    println!("{}", asset.title);
    println!("{}", "=".repeat(asset.title.chars().count()));
    println!("{}\n", asset.script);

    if let Some(path) = &args.out {
        let Some(locator) = asset.audio_locator.as_deref() else {
            bail!("no narration was produced (silent mode)");
        };
        let (_, bytes) =
            decode_data_uri(locator).context("narration is not an inline audio URI")?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("writing narration to {}", path.display()))?;
        println!("Narration saved to {} ({} bytes)", path.display(), bytes.len());
    }

    if args.play {
        view.toggle_play_pause().await;
        let period = Duration::from_millis(config.playback.tick_millis.max(1));
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let status = view.status();
            if let (Some(time), Some(pct)) = (&status.time_label, status.progress_percent) {
                print!("\r{time}  {pct:>5.1}%");
                let _ = std::io::stdout().flush();
            }
            if view.poll_events() > 0 {
                println!("\nSession complete.");
                break;
            }
        }
    }

    Ok(())
}

async fn run_history(store: Arc<dyn SessionStore>, wallet: &str) -> Result<()> {
    let sessions = store.get_sessions(wallet).await?;
    if sessions.is_empty() {
        println!("No sessions yet for {wallet}.");
        return Ok(());
    }
    for s in &sessions {
        let mood = s.mood_tags.join(", ");
        let outcome = s.outcome_tags.join(", ");
        println!(
            "{}  {:<8} {mood} -> {outcome}",
            s.created_at.format("%Y-%m-%d %H:%M"),
            format_duration(s.duration_seconds),
        );
    }
    Ok(())
}

async fn run_progress(store: Arc<dyn SessionStore>, wallet: &str, goal: u32) -> Result<()> {
    let sessions = store.get_sessions(wallet).await?;
    let today = chrono::Utc::now().date_naive();
    let stats = ProgressStats::compute(&sessions, today, goal);

    println!("Sessions:     {}", stats.total_sessions);
    println!("Minutes:      {}", stats.total_minutes);
    println!("Day streak:   {}", stats.current_streak);
    println!(
        "This week:    {}/{} ({:.0}%)",
        stats.sessions_this_week,
        stats.weekly_goal,
        stats.weekly_percent()
    );
    println!("\nAchievements:");
    for (achievement, earned) in stats.achievements() {
        let mark = if earned { "x" } else { " " };
        println!(
            "  [{mark}] {:<11} {}",
            achievement.title(),
            achievement.description()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // 2. Configuration
    let config = AppConfig::load()
        .unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        })
        .with_env_keys();

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Session store
    let store = open_store(&config.store);

    // 5. Subcommand
    rt.block_on(async move {
        match cli.command {
            Command::Generate {
                mood,
                outcome,
                wallet,
                theme,
                silent,
                out,
                play,
            } => {
                run_generate(
                    config,
                    store,
                    GenerateArgs {
                        mood,
                        outcome,
                        wallet,
                        theme,
                        silent,
                        out,
                        play,
                    },
                )
                .await
            }
            Command::History { wallet } => run_history(store, &wallet).await,
            Command::Progress { wallet, goal } => run_progress(store, &wallet, goal).await,
        }
    })
}
