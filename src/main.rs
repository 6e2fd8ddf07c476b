//! Endpoint Vitals 主程序入口
//!
//! 轻量级HTTP端点可用性监控工具

use anyhow::{Context, Result};
use clap::Parser;
use endpoint_vitals::cli::args::{Args, Commands};
use endpoint_vitals::cli::commands::{CheckCommand, Command, InitCommand, ValidateCommand, VersionCommand};
use endpoint_vitals::config::{ConfigLoader, TomlConfigLoader};
use endpoint_vitals::error::ConfigError;
use endpoint_vitals::logging::{LogConfig, LoggingSystem};
use endpoint_vitals::monitor::{LogReportSink, MonitorScheduler};
use endpoint_vitals::probe::{CycleDispatcher, HttpProber};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        console: true,
        json_format: false,
        ..Default::default()
    };

    LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    // 执行命令
    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 执行CLI命令
async fn execute_command(args: &Args) -> Result<()> {
    match &args.command {
        Commands::Run { interval, timeout } => run_monitor(args, *interval, *timeout).await,
        Commands::Check { .. } => {
            let command = CheckCommand;
            command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Validate { .. } => {
            let command = ValidateCommand;
            command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Init { .. } => {
            let command = InitCommand;
            command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Version { .. } => {
            let command = VersionCommand;
            command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
        }
    }
}

/// 启动监控循环
///
/// 加载配置、组装探测器/分发器/调度器，并运行周期循环直到收到
/// 中断信号。
///
/// # 参数
/// * `args` - 命令行参数
/// * `interval` - 可选的周期间隔覆盖值（秒）
/// * `timeout` - 可选的请求超时覆盖值（秒）
async fn run_monitor(args: &Args, interval: Option<u64>, timeout: Option<u64>) -> Result<()> {
    // 1. 加载和验证配置
    let config_path = args.get_config_path();
    let loader = TomlConfigLoader::new(true);

    if !config_path.exists() {
        return Err(anyhow::anyhow!(
            "配置文件不存在: {}\n提示：请运行 'endpoint-vitals init' 创建默认配置文件",
            config_path.display()
        ));
    }

    let mut config = loader.load_from_file(&config_path).await.with_context(|| {
        format!(
            "加载配置文件失败: {}\n请检查配置文件格式是否正确",
            config_path.display()
        )
    })?;

    // 应用命令行参数覆盖，覆盖后的值需要重新验证（0值会使调度器无法工作）
    config
        .apply_overrides(interval, timeout)
        .map_err(ConfigError::ValidationError)
        .context("命令行参数覆盖值无效")?;

    info!(
        "开始监控 {} 个端点，周期间隔 {} 秒，按 Ctrl+C 停止",
        config.endpoints.len(),
        config.global.cycle_interval_seconds
    );

    // 2. 组装核心组件
    let prober = Arc::new(
        HttpProber::new(Duration::from_secs(config.global.request_timeout_seconds))
            .context("创建HTTP探测器失败")?,
    );
    let dispatcher = CycleDispatcher::new(prober, config.endpoints);
    let mut scheduler = MonitorScheduler::new(
        dispatcher,
        Arc::new(LogReportSink),
        Duration::from_secs(config.global.cycle_interval_seconds),
    );

    // 3. 设置Ctrl+C信号处理
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("收到中断信号，正在停止监控...");
                let _ = shutdown_tx.send(());
            }
            Err(err) => {
                error!("监听中断信号失败: {}", err);
            }
        }
    });

    // 4. 运行周期循环直到收到停止信号
    scheduler.run(shutdown_rx).await;

    info!("监控已停止");
    Ok(())
}
