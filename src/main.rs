use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use virtucast::host::HeadlessHost;
use virtucast::{AppConfig, LayoutParser, Session, StartupOutcome, StudioBuilder};

#[derive(Parser)]
#[command(name = "virtucast")]
#[command(about = "Virtual news studio builder and render automation", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory the headless editor works in
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the studio and print what was created
    Studio {
        /// Layout file (.json or .toml) instead of the built-in news studio
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Print the resulting scene as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the built-in studio layout as JSON
    Layout,
    /// Run the startup hook against a launch line and pump ticks until exit
    Render {
        /// Raw editor command line, e.g. "-VirtuCastAutoRender=1 -VirtuCastMap=..."
        #[arg(long, allow_hyphen_values = true)]
        cmdline: String,

        /// Give up after this many ticks
        #[arg(long, default_value_t = 10_000)]
        max_ticks: u64,
    },
    /// Build the studio and bind a video to its screen
    Screen {
        /// Video file; defaults to the last used video, then Content/Movies/screen.mp4
        #[arg(long)]
        video: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load().context("Failed to load configuration")?;
    let mut session = Session::new(
        config.studio_settings(),
        config.media_settings(),
        config.render_tuning(),
    );
    let mut host = HeadlessHost::with_engine_content(&cli.project);

    match cli.command {
        Commands::Layout => {
            let layout = session.layout();
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        Commands::Studio { layout, json } => {
            let layout = match layout {
                Some(path) => LayoutParser::parse_file(&path)?,
                None => session.layout(),
            };
            let report = StudioBuilder::new(config.studio.tag.clone()).rebuild(&mut host, &layout);

            if json {
                println!("{}", serde_json::to_string_pretty(&host.manifest())?);
            } else {
                println!("{}", LayoutParser::summarize(&layout));
                println!("Spawned: {}", report.spawned.len());
                for skipped in &report.skipped {
                    println!("Skipped: {} ({})", skipped.label, skipped.reason);
                }
            }
        }
        Commands::Render { cmdline, max_ticks } => {
            host.set_command_line(cmdline);
            match session.on_startup(&mut host) {
                StartupOutcome::Idle => {
                    println!("Auto-render not requested; nothing to do");
                    return Ok(());
                }
                StartupOutcome::Failed(reason) => anyhow::bail!("Render failed: {reason}"),
                outcome => info!(?outcome, "startup hook done"),
            }

            match host.run_until_exit(max_ticks) {
                Some(ticks) => {
                    if let Some(config) = session.render().config() {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    if let Some(phase) = session.render().phase() {
                        println!("Render phase: {}", serde_json::to_string(&phase)?);
                    }
                    println!("Exit requested after {ticks} ticks");
                }
                None => anyhow::bail!("No exit requested within {max_ticks} ticks"),
            }
        }
        Commands::Screen { video } => {
            session.rebuild_studio(&mut host);
            let assets = session.apply_screen_video(&mut host, video.as_deref())?;
            println!("Screen material: {}", assets.material.path());
            println!("Media player: {}", assets.player.path());
        }
    }

    Ok(())
}
