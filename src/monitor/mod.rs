//! 监控调度模块
//!
//! 提供周期调度、域名累计汇总和可用性报告输出功能

pub mod aggregator;
pub mod report;
pub mod scheduler;

// 重新导出主要类型
pub use aggregator::{DomainAggregator, DomainStats};
pub use report::{LogReportSink, ReportSink, StdoutReportSink};
pub use scheduler::{MonitorScheduler, SchedulerState};
