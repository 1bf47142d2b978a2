use anyhow::Result;
use clap::Parser;
use oca::cli::Cli;
use oca::config::Config;
use oca::{logger, App};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置：配置文件 → 环境变量 → 命令行
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?.apply_env()?,
        None => Config::from_env()?,
    };
    let config = config.merge_cli(&cli.overrides());

    // 初始化日志
    logger::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run(&cli.record_id).await?;

    Ok(())
}
