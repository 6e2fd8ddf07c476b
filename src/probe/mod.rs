//! 探测模块
//!
//! 提供HTTP探测、UP/DOWN判定和周期内并发分发功能

pub mod dispatcher;
pub mod prober;
pub mod result;

// 重新导出主要类型
pub use dispatcher::CycleDispatcher;
pub use prober::{HttpProber, Prober};
pub use result::{ProbeOutcome, ProbeResult, UP_LATENCY_CEILING};
