//! 周期调度分发器
//!
//! 在一个探测周期内并发发出全部探测请求，并等待结果集完整后返回

use crate::config::EndpointSpec;
use crate::probe::prober::Prober;
use crate::probe::result::ProbeResult;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// 周期分发器
///
/// 每次调用 `dispatch` 对应一个完整周期：所有端点的探测并发执行，
/// 结果集在全部探测返回（成功或失败）后才视为完整。单个端点的失败
/// 或任务崩溃只产生一条DOWN结果，不影响其余端点。
pub struct CycleDispatcher {
    /// 探测器
    prober: Arc<dyn Prober>,
    /// 端点列表，进程生命周期内只读
    endpoints: Arc<[EndpointSpec]>,
}

impl CycleDispatcher {
    /// 创建新的周期分发器
    ///
    /// # 参数
    /// * `prober` - 探测器
    /// * `endpoints` - 端点配置列表
    ///
    /// # 返回
    /// * `Self` - 分发器实例
    pub fn new(prober: Arc<dyn Prober>, endpoints: Vec<EndpointSpec>) -> Self {
        Self {
            prober,
            endpoints: endpoints.into(),
        }
    }

    /// 端点数量
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// 执行一个探测周期
    ///
    /// 为每个端点派生一个并发任务并等待全部完成（扇出/扇入屏障）。
    /// 返回的结果数恒等于端点数；结果顺序不做保证。
    ///
    /// # 返回
    /// * `Vec<ProbeResult>` - 本周期的完整结果集
    pub async fn dispatch(&self) -> Vec<ProbeResult> {
        debug!("开始探测周期，端点数量: {}", self.endpoints.len());

        let handles: Vec<_> = self
            .endpoints
            .iter()
            .cloned()
            .map(|endpoint| {
                let prober = Arc::clone(&self.prober);
                tokio::spawn(async move { prober.probe(&endpoint).await })
            })
            .collect();

        let joined = join_all(handles).await;

        let mut results = Vec::with_capacity(self.endpoints.len());
        for (endpoint, joined_result) in self.endpoints.iter().zip(joined) {
            match joined_result {
                Ok(result) => results.push(result),
                Err(e) => {
                    // 探测任务本身崩溃时也必须产出一条结果，保证 |结果| == |端点|
                    error!("探测任务异常终止 {}: {}", endpoint.name, e);
                    results.push(ProbeResult::failed(
                        endpoint.domain(),
                        Duration::from_millis(0),
                    ));
                }
            }
        }

        debug!("探测周期完成，收集结果: {}", results.len());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::result::ProbeOutcome;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// 按URL路径返回固定结果的测试探测器
    struct StubProber;

    #[async_trait]
    impl Prober for StubProber {
        async fn probe(&self, endpoint: &EndpointSpec) -> ProbeResult {
            if endpoint.url.contains("down") {
                ProbeResult::failed(endpoint.domain(), Duration::from_millis(0))
            } else {
                ProbeResult::classified(endpoint.domain(), Some(200), Duration::from_millis(50))
            }
        }

        async fn probe_with_timeout(
            &self,
            endpoint: &EndpointSpec,
            _timeout_duration: Duration,
        ) -> ProbeResult {
            self.probe(endpoint).await
        }
    }

    /// 崩溃的测试探测器，验证任务隔离
    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, endpoint: &EndpointSpec) -> ProbeResult {
            if endpoint.url.contains("panic") {
                panic!("探测任务内部崩溃");
            }
            ProbeResult::classified(endpoint.domain(), Some(200), Duration::from_millis(10))
        }

        async fn probe_with_timeout(
            &self,
            endpoint: &EndpointSpec,
            _timeout_duration: Duration,
        ) -> ProbeResult {
            self.probe(endpoint).await
        }
    }

    fn endpoint(name: &str, url: &str) -> EndpointSpec {
        EndpointSpec {
            name: name.to_string(),
            url: url.to_string(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_dispatch_returns_one_result_per_endpoint() {
        let dispatcher = CycleDispatcher::new(
            Arc::new(StubProber),
            vec![
                endpoint("a", "https://fetch.com/"),
                endpoint("b", "https://fetch.com/careers"),
                endpoint("c", "https://www.fetchrewards.com/down"),
            ],
        );

        let results = dispatcher.dispatch().await;
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_failing_endpoint_does_not_block_others() {
        let dispatcher = CycleDispatcher::new(
            Arc::new(StubProber),
            vec![
                endpoint("ok", "https://fetch.com/"),
                endpoint("bad", "https://www.fetchrewards.com/down"),
            ],
        );

        let results = dispatcher.dispatch().await;
        let up_count = results.iter().filter(|r| r.outcome.is_up()).count();
        let down_count = results.iter().filter(|r| !r.outcome.is_up()).count();

        assert_eq!(up_count, 1);
        assert_eq!(down_count, 1);
    }

    #[tokio::test]
    async fn test_panicking_probe_yields_down_result() {
        let dispatcher = CycleDispatcher::new(
            Arc::new(PanickingProber),
            vec![
                endpoint("ok", "https://fetch.com/"),
                endpoint("crash", "https://fetch.com/panic"),
            ],
        );

        let results = dispatcher.dispatch().await;
        assert_eq!(results.len(), 2);

        let crashed = results
            .iter()
            .find(|r| !r.outcome.is_up())
            .expect("崩溃的任务应产出DOWN结果");
        assert_eq!(crashed.outcome, ProbeOutcome::Down);
        assert!(crashed.status_code.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_is_repeatable_across_cycles() {
        let dispatcher = CycleDispatcher::new(
            Arc::new(StubProber),
            vec![endpoint("a", "https://fetch.com/")],
        );

        for _ in 0..3 {
            let results = dispatcher.dispatch().await;
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].outcome, ProbeOutcome::Up);
        }
    }
}
