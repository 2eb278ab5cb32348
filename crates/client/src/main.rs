mod app;
mod bot;
mod config;

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use app::App;
use config::ClientConfig;
use verilandia::{SyncConfig, SyncController, TransportConfig};

#[derive(Parser)]
#[command(name = "verilandia")]
#[command(about = "Headless Verilandia game client")]
struct Args {
    #[arg(
        value_name = "SERVER",
        help = "Server to connect to (e.g. 127.0.0.1 or game.example:6969)"
    )]
    server_pos: Option<String>,

    #[arg(short, long, conflicts_with = "server_pos")]
    server: Option<String>,

    #[arg(short, long, default_value_t = verilandia::DEFAULT_PORT)]
    port: u16,

    #[arg(long, default_value_t = 144)]
    fps: u32,

    #[arg(long, help = "Drive the player with scripted input")]
    bot: bool,

    #[arg(long, default_value_t = 250)]
    ping_interval_ms: u64,

    #[arg(long, default_value_t = 1, help = "Seconds between status reports (0 disables)")]
    report_secs: u64,

    #[arg(long, help = "Log the scoreboard with every status report")]
    scoreboard: bool,

    #[arg(long, help = "Exit after this many seconds")]
    duration_secs: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let server = args
        .server
        .or(args.server_pos)
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_addr = resolve(&server, args.port)?;

    let sync_config = SyncConfig {
        transport: TransportConfig {
            ping_interval: Duration::from_millis(args.ping_interval_ms),
            ..Default::default()
        },
        ..Default::default()
    };

    let config = ClientConfig {
        fps: args.fps.max(1),
        bot: args.bot,
        report_interval: (args.report_secs > 0).then(|| Duration::from_secs(args.report_secs)),
        scoreboard: args.scoreboard,
        duration: args.duration_secs.map(Duration::from_secs),
    };

    let mut controller = SyncController::connect(server_addr, sync_config)
        .with_context(|| format!("failed to open socket for {}", server_addr))?;
    controller.on_socket_error(|e| log::error!("Network error: {}", e));

    App::new(controller, config).run()
}

/// Accepts a bare IP (default port), `host:port`, or a bare hostname.
fn resolve(server: &str, default_port: u16) -> Result<SocketAddr> {
    if let Ok(ip) = server.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, default_port));
    }

    let mut addrs = match server.to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(_) => (server, default_port)
            .to_socket_addrs()
            .with_context(|| format!("can't resolve server address {:?}", server))?,
    };

    addrs
        .next()
        .with_context(|| format!("server address {:?} resolved to nothing", server))
}
