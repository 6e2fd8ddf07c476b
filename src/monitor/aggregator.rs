//! 域名可用性汇总器
//!
//! 维护按域名累计的UP/总数计数器，并计算可用性百分比

use crate::probe::ProbeResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个域名的累计统计
///
/// 进程启动后持续累计，不随周期重置或衰减。
/// 不变量：`0 <= up_count <= total_count`，且 `total_count` 单调不减。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainStats {
    /// 累计UP次数
    pub up_count: u64,
    /// 累计探测总次数
    pub total_count: u64,
}

impl DomainStats {
    /// 计算可用性百分比（四舍五入为整数，0-100）
    ///
    /// 仅在 `total_count > 0` 时有意义；无数据时返回0。
    pub fn availability_percent(&self) -> u8 {
        if self.total_count == 0 {
            return 0;
        }
        ((100.0 * self.up_count as f64) / self.total_count as f64).round() as u8
    }
}

/// 域名汇总器
///
/// 域名统计表的唯一所有者：fold与report严格串行（由调度器在每个
/// 周期边界依次调用），表内数据不会被其他组件直接读写。
#[derive(Debug, Default)]
pub struct DomainAggregator {
    /// 域名到累计统计的映射
    stats: BTreeMap<String, DomainStats>,
}

impl DomainAggregator {
    /// 创建空的汇总器
    pub fn new() -> Self {
        Self::default()
    }

    /// 折叠一个周期的完整结果集
    ///
    /// 每条结果按其域名累计：总数加1，结果为UP时UP数加1。
    /// 首次出现的域名自动建立统计项。只允许在结果集完整收集后调用，
    /// 一个周期恰好调用一次。
    ///
    /// # 参数
    /// * `results` - 一个周期的探测结果集
    pub fn fold(&mut self, results: &[ProbeResult]) {
        for result in results {
            let entry = self.stats.entry(result.domain.clone()).or_default();
            entry.total_count += 1;
            if result.outcome.is_up() {
                entry.up_count += 1;
            }
        }
    }

    /// 生成全部已知域名的可用性报告行
    ///
    /// 覆盖进程启动以来观测过的所有域名（包括只在早期周期出现过的），
    /// 百分比反映全部周期的累计值而非滑动窗口。无副作用，可重复调用。
    ///
    /// # 返回
    /// * `Vec<String>` - 每个域名一行，格式固定
    pub fn report(&self) -> Vec<String> {
        self.stats
            .iter()
            .map(|(domain, stats)| {
                format!(
                    "{} has {}% availability percentage",
                    domain,
                    stats.availability_percent()
                )
            })
            .collect()
    }

    /// 获取指定域名的累计统计
    pub fn stats_for(&self, domain: &str) -> Option<&DomainStats> {
        self.stats.get(domain)
    }

    /// 已知域名数量
    pub fn domain_count(&self) -> usize {
        self.stats.len()
    }

    /// 是否尚无任何观测数据
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
