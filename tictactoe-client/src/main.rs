use anyhow::{bail, Context, Result};
use protocol::{NetworkConfig, ENV_CONFIG};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Uso: tictactoe-client <host> <porta>";

#[tokio::main]
async fn main() {
    // 日志写到 stderr，stdout 只留给对局输出
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "tictactoe_client=warn".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let code = match play().await {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("{:#}", e);
            1
        }
    };

    // 阻塞中的控制台读取无法取消，直接退出进程
    std::process::exit(code);
}

async fn play() -> Result<()> {
    let config = load_config()?;
    tictactoe_client::run(&config).await?;
    Ok(())
}

/// 命令行 `<host> <porta>`；无参数时读取配置文件
fn load_config() -> Result<NetworkConfig> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [host, port] => {
            let Some(port) = NetworkConfig::parse_port(port) else {
                bail!("Porta invalida: {}\n{}", port, USAGE);
            };
            Ok(NetworkConfig {
                host: host.clone(),
                port,
            })
        }
        [] => match std::env::var_os(ENV_CONFIG) {
            Some(path) => NetworkConfig::load(&path)
                .with_context(|| format!("failed to load config {:?}", path)),
            None => bail!(USAGE),
        },
        _ => bail!(USAGE),
    }
}
