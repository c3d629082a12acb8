use anyhow::{Context, Result};
use protocol::{Listener, NetworkConfig, TcpListener, ENV_CONFIG};
use tictactoe_server::GameServer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("tictactoe_server=info".parse()?))
        .init();

    info!("Tic-tac-toe server starting...");

    let config = load_config()?;
    let listener = TcpListener::bind(&config.addr())
        .await
        .with_context(|| format!("failed to bind {}", config.addr()))?;
    info!("Listening on {}", listener.local_addr().unwrap_or_else(|| config.addr()));

    GameServer::new().run(listener).await;

    Ok(())
}

/// 默认值 → 配置文件 → 命令行端口
fn load_config() -> Result<NetworkConfig> {
    let mut config = match std::env::var_os(ENV_CONFIG) {
        Some(path) => NetworkConfig::load(&path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => NetworkConfig::server(),
    };

    if let Some(arg) = std::env::args().nth(1) {
        match NetworkConfig::parse_port(&arg) {
            Some(port) => config.port = port,
            None => warn!("Ignoring invalid port argument '{}', using {}", arg, config.port),
        }
    }

    Ok(config)
}
