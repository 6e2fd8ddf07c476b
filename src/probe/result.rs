//! 探测结果数据结构
//!
//! 定义单次探测的结果类型、UP/DOWN判定规则和状态枚举

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// UP判定的延迟上限，达到或超过该值一律判定为DOWN
pub const UP_LATENCY_CEILING: Duration = Duration::from_millis(500);

/// 探测结果状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    /// 端点可用
    Up,
    /// 端点不可用
    Down,
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Up => write!(f, "UP"),
            ProbeOutcome::Down => write!(f, "DOWN"),
        }
    }
}

impl ProbeOutcome {
    /// 根据状态码和延迟判定探测结果
    ///
    /// 判定规则：状态码在 [200, 299] 且延迟严格小于 500ms 时为 `Up`，
    /// 其余情况（状态码超出范围、延迟达到上限、请求未完成）一律为 `Down`。
    ///
    /// # 参数
    /// * `status_code` - HTTP状态码，请求未收到响应时为None
    /// * `latency` - 从发出请求到收到响应（或确定失败）的耗时
    ///
    /// # 返回
    /// * `Self` - 判定结果
    pub fn classify(status_code: Option<u16>, latency: Duration) -> Self {
        match status_code {
            Some(code) if (200..=299).contains(&code) && latency < UP_LATENCY_CEILING => {
                ProbeOutcome::Up
            }
            _ => ProbeOutcome::Down,
        }
    }

    /// 判断结果是否为可用
    pub fn is_up(&self) -> bool {
        matches!(self, ProbeOutcome::Up)
    }
}

/// 单次探测结果
///
/// 每个(端点, 周期)对产生一条，由汇总器消费后即丢弃，不单独保留。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// 统计域名（URL的host部分，不含scheme、端口和路径）
    pub domain: String,
    /// 探测结果状态
    pub outcome: ProbeOutcome,
    /// 探测时间戳
    pub timestamp: DateTime<Utc>,
    /// 往返延迟
    #[serde(with = "duration_serde")]
    pub latency: Duration,
    /// HTTP状态码（请求未收到响应时为None）
    pub status_code: Option<u16>,
}

impl ProbeResult {
    /// 根据状态码和延迟创建探测结果，自动完成UP/DOWN判定
    ///
    /// # 参数
    /// * `domain` - 统计域名
    /// * `status_code` - HTTP状态码，请求失败时为None
    /// * `latency` - 往返延迟
    ///
    /// # 返回
    /// * `Self` - 探测结果实例
    pub fn classified(domain: String, status_code: Option<u16>, latency: Duration) -> Self {
        Self {
            domain,
            outcome: ProbeOutcome::classify(status_code, latency),
            timestamp: Utc::now(),
            latency,
            status_code,
        }
    }

    /// 创建请求未完成的DOWN结果（连接失败、DNS失败、超时等）
    pub fn failed(domain: String, latency: Duration) -> Self {
        Self {
            domain,
            outcome: ProbeOutcome::Down,
            timestamp: Utc::now(),
            latency,
            status_code: None,
        }
    }

    /// 获取延迟（毫秒）
    pub fn latency_ms(&self) -> u64 {
        self.latency.as_millis() as u64
    }

    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Duration序列化模块
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
