//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{ConfigLoader, TomlConfigLoader};
use crate::error::{ConfigError, Result};
use crate::monitor::{DomainAggregator, ReportSink, StdoutReportSink};
use crate::probe::{CycleDispatcher, HttpProber};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 默认配置模板
    const CONFIG_TEMPLATE: &'static str = r#"# Endpoint Vitals 配置文件

[global]
# 探测周期间隔（秒）
cycle_interval_seconds = 15
# 单次请求超时（秒）
request_timeout_seconds = 5
# 日志级别: debug | info | warn | error
log_level = "info"

[[endpoints]]
name = "fetch index page"
url = "https://fetch.com/"

[[endpoints]]
name = "fetch careers page"
url = "https://fetch.com/careers"
method = "GET"

[[endpoints]]
name = "fetch some fake post endpoint"
url = "https://fetch.com/some/post/endpoint"
method = "POST"
body = '{"foo": "bar"}'

[endpoints.headers]
"content-type" = "application/json"
"#;

    /// 创建配置文件
    async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        // 检查文件是否已存在
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        // 创建目录（如果不存在）
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // 写入配置文件
        tokio::fs::write(config_path, Self::CONFIG_TEMPLATE).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑配置文件以添加您的端点配置");

        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate {
            config_path,
            verbose,
        } = &args.command
        {
            let config_file = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());

            self.validate_config_file(&config_file, *verbose).await
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 验证配置文件
    async fn validate_config_file(&self, config_path: &Path, verbose: bool) -> Result<()> {
        println!("验证配置文件: {}", config_path.display());

        // 加载配置（加载过程包含验证）
        let loader = TomlConfigLoader::new(true);
        let config = loader.load_from_file(config_path).await?;

        if verbose {
            println!("配置验证通过！");
            println!("全局配置:");
            println!("  周期间隔: {}秒", config.global.cycle_interval_seconds);
            println!("  请求超时: {}秒", config.global.request_timeout_seconds);
            println!("  日志级别: {}", config.global.log_level);

            println!("端点配置:");
            for (i, endpoint) in config.endpoints.iter().enumerate() {
                println!("  {}. {} ({})", i + 1, endpoint.name, endpoint.url);
                println!("     方法: {}", endpoint.method);
                println!("     统计域名: {}", endpoint.domain());
            }
        } else {
            println!("✓ 配置文件验证通过");
            println!("✓ 找到 {} 个端点配置", config.endpoints.len());
        }

        Ok(())
    }
}

/// 一次性检测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check { format, timeout } = &args.command {
            self.perform_check(args, format, *timeout).await
        } else {
            Ok(())
        }
    }
}

impl CheckCommand {
    /// 执行一个探测周期并输出结果
    async fn perform_check(
        &self,
        args: &Args,
        format: &OutputFormat,
        timeout: Option<u64>,
    ) -> Result<()> {
        // 加载配置
        let loader = TomlConfigLoader::new(true);
        let mut config = loader.load_from_file(args.get_config_path()).await?;

        // 命令行超时覆盖配置文件值，未指定时沿用配置值，覆盖后重新验证
        config
            .apply_overrides(None, timeout)
            .map_err(ConfigError::ValidationError)?;

        // 创建探测器与分发器
        let prober = Arc::new(HttpProber::new(Duration::from_secs(
            config.global.request_timeout_seconds,
        ))?);
        let dispatcher = CycleDispatcher::new(prober, config.endpoints);

        // 执行单个周期并汇总
        let results = dispatcher.dispatch().await;
        let mut aggregator = DomainAggregator::new();
        aggregator.fold(&results);

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            OutputFormat::Text => {
                for result in &results {
                    let status = result
                        .status_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<5} {} (状态码: {}, 延迟: {}ms)",
                        result.outcome.to_string(),
                        result.domain,
                        status,
                        result.latency_ms()
                    );
                }
                println!();
                let sink = StdoutReportSink;
                for line in aggregator.report() {
                    sink.emit(&line);
                }
            }
        }

        Ok(())
    }
}
