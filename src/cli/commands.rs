use crate::{
    config::ServerConfig,
    demo::register_demo_routes,
    logging::{init_logging_with_config, LogConfig},
    router::Router,
    server::{AppService, HttpServer},
    template::TemplateEngine,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Command-line interface for pigeon
#[derive(Parser)]
#[command(name = "pigeon")]
#[command(about = "pigeon HTTP router", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve the demo routes over HTTP
    Serve {
        /// YAML configuration file
        #[arg(short, long, env = "PIGEON_CONFIG")]
        config: Option<PathBuf>,

        /// Address to bind, overrides the configuration
        #[arg(short, long)]
        addr: Option<String>,

        /// Templates directory, overrides the configuration
        #[arg(short, long)]
        templates: Option<PathBuf>,
    },
    /// Print the demo route table in match order
    Routes,
    /// Resolve a path against the demo routes and print the captured parameters
    Match {
        /// Request path, already percent-decoded
        path: String,

        /// Content type to route on
        #[arg(long, default_value = "text/html")]
        content_type: String,
    },
}

/// Build the router with the demo routes registered
///
/// # Errors
///
/// Fails if a demo pattern is rejected.
pub fn demo_router(templates_dir: &Path) -> Result<Router> {
    let router = Router::new();
    let templates = Arc::new(TemplateEngine::new(templates_dir));
    register_demo_routes(&router, templates).context("failed to register demo routes")?;
    Ok(router)
}

/// Parse arguments from the process and run
///
/// # Errors
///
/// Returns any error from the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

/// Run an already parsed command line
///
/// # Errors
///
/// Returns any error from the selected command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            addr,
            templates,
        } => {
            init_logging_with_config(&LogConfig::from_env())?;

            let mut config = ServerConfig::load(config.as_deref())?;
            if let Some(addr) = addr {
                config.addr = addr;
            }
            if let Some(templates) = templates {
                config.templates_dir = templates;
            }

            let router = Arc::new(demo_router(&config.templates_dir)?);
            router.dump_routes();

            let server = HttpServer::bind(config.addr.as_str())
                .with_context(|| format!("failed to bind {}", config.addr))?;
            info!(
                addr = %config.addr,
                templates_dir = %config.templates_dir.display(),
                routes_count = router.route_count(),
                "Starting pigeon"
            );
            let service = AppService::new(router, config);
            server.run(service)?;
        }
        Commands::Routes => {
            let router = demo_router(&ServerConfig::default().templates_dir)?;
            for route in router.routes().iter() {
                println!("{}\t{}", route.pattern().as_str(), route.content_type());
            }
        }
        Commands::Match { path, content_type } => {
            let router = demo_router(&ServerConfig::default().templates_dir)?;
            let bound = router.dispatch(&path, &content_type)?;
            println!(
                "{} -> {} ({})",
                path,
                bound.route().pattern().as_str(),
                bound.route().content_type()
            );
            for (name, value) in bound.params().iter() {
                println!("  {} = {}", name, value);
            }
        }
    }
    Ok(())
}
