//! 周期调度器
//!
//! 以固定壁钟间隔驱动探测周期：分发 -> 折叠 -> 报告

use crate::monitor::aggregator::DomainAggregator;
use crate::monitor::report::ReportSink;
use crate::probe::CycleDispatcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// 尚未开始首个周期
    Idle,
    /// 周期循环运行中
    Running,
    /// 已收到取消信号并退出
    Stopped,
}

/// 周期调度器
///
/// 持有端点列表（经由分发器只读共享）与域名统计表（独占）。
/// 周期边界按固定频率触发：`tokio::time::interval` 以绝对截止时间
/// 推进（deadline += interval），不受单周期耗时影响，不会随工作时长漂移。
pub struct MonitorScheduler {
    /// 周期分发器
    dispatcher: CycleDispatcher,
    /// 域名汇总器，仅由本调度器在周期边界串行访问
    aggregator: DomainAggregator,
    /// 报告输出
    sink: Arc<dyn ReportSink>,
    /// 周期间隔
    cycle_interval: Duration,
    /// 当前状态
    state: SchedulerState,
}

impl MonitorScheduler {
    /// 创建新的周期调度器
    ///
    /// # 参数
    /// * `dispatcher` - 周期分发器
    /// * `sink` - 报告输出
    /// * `cycle_interval` - 周期间隔
    ///
    /// # 返回
    /// * `Self` - 调度器实例
    pub fn new(
        dispatcher: CycleDispatcher,
        sink: Arc<dyn ReportSink>,
        cycle_interval: Duration,
    ) -> Self {
        Self {
            dispatcher,
            aggregator: DomainAggregator::new(),
            sink,
            cycle_interval,
            state: SchedulerState::Idle,
        }
    }

    /// 当前调度器状态
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// 只读访问累计统计（用于一次性检测输出和测试）
    pub fn aggregator(&self) -> &DomainAggregator {
        &self.aggregator
    }

    /// 执行一个完整周期：分发探测、折叠结果、输出报告
    ///
    /// 折叠只在结果集完整后发生一次，周期之间严格串行。
    pub async fn run_cycle(&mut self) {
        let results = self.dispatcher.dispatch().await;
        self.aggregator.fold(&results);

        for line in self.aggregator.report() {
            self.sink.emit(&line);
        }
    }

    /// 启动周期循环，直到收到停止信号
    ///
    /// 首个周期立即触发，后续周期按固定间隔触发。停止信号在周期
    /// 边界处生效：进行中的周期完整结束后才退出（其最坏耗时已被
    /// 单次请求超时约束），统计表不会停留在折叠中途。
    ///
    /// # 参数
    /// * `shutdown_rx` - 停止信号接收器
    pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "启动周期调度器，端点数量: {}，周期间隔: {}秒",
            self.dispatcher.endpoint_count(),
            self.cycle_interval.as_secs()
        );

        self.state = SchedulerState::Running;
        let mut ticker = interval(self.cycle_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("周期边界触发");
                    self.run_cycle().await;
                }
                recv_result = shutdown_rx.recv() => {
                    if recv_result.is_err() {
                        warn!("停止信号通道已关闭，调度器退出");
                    } else {
                        info!("收到停止信号，调度器退出");
                    }
                    break;
                }
            }
        }

        self.state = SchedulerState::Stopped;
        info!("周期调度器已停止");
    }
}
