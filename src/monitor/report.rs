//! 可用性报告输出
//!
//! 定义报告行的输出接口和基于日志的默认实现

use tracing::info;

/// 报告输出trait，定义可用性报告行的落地方式
pub trait ReportSink: Send + Sync {
    /// 输出一行可用性报告
    ///
    /// # 参数
    /// * `line` - 形如 `"{domain} has {percentage}% availability percentage"` 的报告行
    fn emit(&self, line: &str);
}

/// 基于tracing日志的报告输出实现
pub struct LogReportSink;

impl ReportSink for LogReportSink {
    fn emit(&self, line: &str) {
        info!("{}", line);
    }
}

/// 直接写到标准输出的报告实现，用于一次性检测命令
pub struct StdoutReportSink;

impl ReportSink for StdoutReportSink {
    fn emit(&self, line: &str) {
        println!("{}", line);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ReportSink;
    use std::sync::Mutex;

    /// 收集报告行的测试实现
    #[derive(Default)]
    pub struct CollectingSink {
        pub lines: Mutex<Vec<String>>,
    }

    impl ReportSink for CollectingSink {
        fn emit(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }
}
