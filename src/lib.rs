//! Endpoint Vitals - 轻量级HTTP端点可用性监控工具
//!
//! 这是一个用Rust编写的HTTP端点可用性监控工具，支持：
//! - 固定周期的HTTP/HTTPS可用性探测
//! - 周期内并发探测与集中汇总
//! - 按域名累计的可用性百分比统计
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod probe;

// 重新导出主要类型
pub use config::{Config, EndpointSpec, GlobalConfig};
pub use error::EndpointVitalsError;
pub use monitor::{DomainAggregator, DomainStats, MonitorScheduler};
pub use probe::{HttpProber, ProbeOutcome, ProbeResult, Prober};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
