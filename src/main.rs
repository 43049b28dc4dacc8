use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use maven_rs::cli::Args;
use maven_rs::launch;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let query = args.query();
    let config = args.into_config()?;

    init_logging(config.verbose);
    debug!("配置: {:?}", config.pipeline);

    match launch(&config, &query).await {
        Ok(state) => {
            for warning in &state.warnings {
                eprintln!("⚠️ {}", warning);
            }
            Ok(())
        }
        Err(e) => {
            error!("调研失败: {:#}", e);
            Err(e)
        }
    }
}

/// 初始化日志：RUST_LOG 优先，否则按 verbose 选择级别；日志写到stderr，stdout留给JSON结果
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
