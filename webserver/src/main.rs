//! Gateway entry point
//!
//! Resolves the configuration from the command line (with `.env` and
//! environment fallbacks), wires the production services for the selected
//! deployment mode and serves HTTP until Ctrl+C.

use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use orchestrator::config::DEFAULT_CACHE_TTL_DAYS;
use orchestrator::services::{
    FileDirectoryProvider, FileResultCache, LocalImporter, MemoryJobLedger, RealArtifactStore, RemoteImporter,
    ShellCommandRunner,
};
use orchestrator::{DeploymentMode, Gateway, GatewayConfig, Importer, JobGateway};
use shared::{logging, node_info, NodeRole};
use webserver::{WebServer, WebServerState};

#[derive(Parser, Debug)]
#[command(name = "smpc-gateway")]
#[command(about = "Admission, caching and job tracking for secure multi-party analytics")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Simulate every data holder on this host
    #[arg(long = "sim", visible_alias = "simulation")]
    simulation: bool,

    /// Directory every external stage runs in
    #[arg(long, env = "SMPC_WORKDIR", default_value = "..")]
    workdir: PathBuf,

    /// Result cache directory
    #[arg(long, env = "SMPC_CACHE_DIR", default_value = "./cache-database")]
    cache_dir: PathBuf,

    /// Directory holding the datasource directory documents
    #[arg(long, default_value = ".")]
    directory_dir: PathBuf,

    /// Cached results older than this are recomputed
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_DAYS)]
    cache_ttl_days: i64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SMPC_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new()
            .with_mode(DeploymentMode::from_flag(self.simulation))
            .with_workdir(&self.workdir)
            .with_cache_dir(&self.cache_dir)
            .with_directory_dir(&self.directory_dir)
            .with_cache_ttl_days(self.cache_ttl_days)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();
    let args = Args::parse();

    let role = NodeRole::init(args.simulation);
    logging::init_tracing_with_level(Some(&args.log_level));

    let config = args.gateway_config();
    config.validate().context("invalid gateway configuration")?;
    let address = SocketAddr::new(args.bind, args.port);
    logging::log_startup(role, &format!("gateway on {address}"));
    let deployment = if config.mode.is_simulation() {
        "local simulation of every data holder"
    } else {
        "remote data holders"
    };
    logging::log_progress(role, "Deployment", deployment);
    node_info!(
        workdir = %config.workdir.display(),
        cache_dir = %config.cache_dir.display(),
        directory_dir = %config.directory_dir.display(),
        cache_ttl_days = args.cache_ttl_days,
        "Configuration resolved"
    );

    let state = WebServerState::new(address, config.mode);
    match config.mode {
        DeploymentMode::Simulation => {
            let importer = LocalImporter::new(Arc::new(ShellCommandRunner::new(&config.workdir)));
            serve(state, build_gateway(config, importer)).await
        }
        DeploymentMode::Smpc => serve(state, build_gateway(config, RemoteImporter::new())).await,
    }
}

/// Production gateway around the given import strategy
fn build_gateway<I: Importer + 'static>(
    config: GatewayConfig,
    importer: I,
) -> Gateway<MemoryJobLedger, FileResultCache, FileDirectoryProvider, I, ShellCommandRunner, RealArtifactStore> {
    let cache = FileResultCache::new(&config.cache_dir).with_ttl(config.cache_ttl);
    let directory = FileDirectoryProvider::new(&config.directory_dir, config.mode);
    let runner = ShellCommandRunner::new(&config.workdir);
    let artifacts = RealArtifactStore::new(&config.workdir);

    Gateway::new(config, MemoryJobLedger::new(), cache, directory, importer, runner, artifacts)
}

async fn serve<G: JobGateway + 'static>(state: WebServerState, gateway: G) -> anyhow::Result<()> {
    WebServer::new(state, gateway).run().await.context("gateway server failed")
}
