use std::env;

use nps_calc::config::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let mut config = ServerConfig::from_env()?;
        if let Some(port) = raw_args.get(2) {
            config.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("invalid port {port:?}"))?;
        }

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
            )
            .init();

        nps_calc::api::run_http_server(config).await?;
        return Ok(());
    }

    if let Err(e) = nps_calc::api::run_cli(raw_args) {
        eprintln!("error: {e}");
        std::process::exit(2);
    }
    Ok(())
}
