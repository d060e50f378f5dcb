//! Observatory CLI
//!
//! Inspect the site configuration and drive scripted sessions against the
//! headless runtime.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use observatory_app::{SiteApp, SiteConfig, CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod script;

use script::{format_snapshot, Step};

#[derive(Parser)]
#[command(name = "observatory")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pakistan Economic Observatory site runtime", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Site config file (defaults to ./observatory.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default site config
    Init {
        /// Destination file
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the site config
    Check,

    /// List the navigation links
    Routes {
        /// Mark the link that is active at this path
        #[arg(short, long, default_value = "/")]
        path: String,
    },

    /// Run a scripted session, one frame per step
    Simulate {
        /// Steps: nav:/path, link:N, scroll:DY, brand, back, forward, frame
        #[arg(required = true)]
        steps: Vec<Step>,

        /// Start at this path instead of `/`
        #[arg(long, default_value = "/")]
        start: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Check => cmd_check(cli.config.as_deref()),
        Commands::Routes { path } => cmd_routes(cli.config.as_deref(), &path),
        Commands::Simulate { steps, start } => cmd_simulate(cli.config.as_deref(), &start, &steps),
    }
}

/// Explicit path, then ./observatory.toml, then built-in defaults
fn load_config(explicit: Option<&Path>) -> Result<SiteConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(CONFIG_FILE);
            if !local.exists() {
                info!("No {} found, using built-in defaults", CONFIG_FILE);
                return Ok(SiteConfig::default());
            }
            local
        }
    };

    let config = SiteConfig::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    info!("Loaded {}", path.display());
    Ok(config)
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    SiteConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_check(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let sections: usize = config.pages.iter().map(|p| p.sections.len()).sum();

    println!("{}", config.site.title);
    println!(
        "  viewport: {}x{}",
        config.viewport.width, config.viewport.height
    );
    println!(
        "  reveal:   threshold {} / root margin {}",
        config.reveal.threshold, config.reveal.root_margin
    );
    println!("  routes:   {}", config.routes.len());
    println!("  pages:    {} ({} sections)", config.pages.len(), sections);
    println!("Config OK");
    Ok(())
}

fn cmd_routes(config: Option<&Path>, path: &str) -> Result<()> {
    let config = load_config(config)?;
    let app = SiteApp::with_initial_path(config, path)?;
    let view = app.render();

    println!("{}", view.brand);
    for link in &view.links {
        let marker = if link.state.is_active() { "*" } else { " " };
        println!(
            " {} {:<20} {:<24} [{:?}]",
            marker, link.path, link.label, link.icon
        );
    }
    if view.active().is_none() {
        println!("(no link active at {path})");
    }
    Ok(())
}

fn cmd_simulate(config: Option<&Path>, start: &str, steps: &[Step]) -> Result<()> {
    let config = load_config(config)?;
    let mut app = SiteApp::with_initial_path(config, start)?;

    for step in steps {
        let snapshot = step
            .run(&mut app)
            .with_context(|| format!("Step '{step}' failed"))?;
        println!("{}", format_snapshot(step, &snapshot));
    }
    Ok(())
}
