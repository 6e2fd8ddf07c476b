//! 可用性监控端到端测试
//!
//! 使用本地mock服务器验证"分发 -> 折叠 -> 报告"的完整链路

use endpoint_vitals::config::EndpointSpec;
use endpoint_vitals::monitor::DomainAggregator;
use endpoint_vitals::probe::{CycleDispatcher, HttpProber, ProbeOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

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
async fn test_mixed_endpoints_accumulate_fifty_percent_over_three_cycles() {
    let mut server = mockito::Server::new_async().await;
    let ok_mock = server
        .mock("GET", "/")
        .with_status(200)
        .expect(3)
        .create_async()
        .await;
    let fail_mock = server
        .mock("GET", "/careers")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let prober = Arc::new(HttpProber::new(Duration::from_secs(5)).unwrap());
    let dispatcher = CycleDispatcher::new(
        prober,
        vec![
            endpoint("index", &format!("{}/", server.url())),
            endpoint("careers", &format!("{}/careers", server.url())),
        ],
    );

    let mut aggregator = DomainAggregator::new();
    for _ in 0..3 {
        let results = dispatcher.dispatch().await;
        assert_eq!(results.len(), 2);
        aggregator.fold(&results);
    }

    ok_mock.assert_async().await;
    fail_mock.assert_async().await;

    // 同域名的两个端点共享一条统计：3个周期后 3/6 = 50%
    let stats = aggregator.stats_for("127.0.0.1").unwrap();
    assert_eq!(stats.total_count, 6);
    assert_eq!(stats.up_count, 3);
    assert_eq!(
        aggregator.report(),
        vec!["127.0.0.1 has 50% availability percentage".to_string()]
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_does_not_block_siblings() {
    let mut server = mockito::Server::new_async().await;
    let _ok_mock = server
        .mock("GET", "/health")
        .with_status(204)
        .create_async()
        .await;

    let prober = Arc::new(HttpProber::new(Duration::from_secs(1)).unwrap());
    let dispatcher = CycleDispatcher::new(
        prober,
        vec![
            endpoint("healthy", &format!("{}/health", server.url())),
            // 未监听的端口，每个周期都连接失败
            endpoint("dead", "http://127.0.0.1:1/"),
        ],
    );

    let mut aggregator = DomainAggregator::new();
    for _ in 0..2 {
        let results = dispatcher.dispatch().await;

        // 永久失败的端点不影响结果集完整性
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.outcome.is_up()).count(), 1);

        let failed = results.iter().find(|r| !r.outcome.is_up()).unwrap();
        assert!(failed.status_code.is_none());

        aggregator.fold(&results);
    }

    let stats = aggregator.stats_for("127.0.0.1").unwrap();
    assert_eq!(stats.total_count, 4);
    assert_eq!(stats.up_count, 2);
}

#[tokio::test]
async fn test_slow_endpoint_classified_down_by_latency() {
    // mock无法注入延迟，直接验证判定规则对真实探测结果的适用性：
    // 状态码2xx但延迟达到500ms时必须为DOWN
    let result = endpoint_vitals::probe::ProbeResult::classified(
        "slow.example.com".to_string(),
        Some(200),
        Duration::from_millis(500),
    );
    assert_eq!(result.outcome, ProbeOutcome::Down);

    let mut aggregator = DomainAggregator::new();
    aggregator.fold(&[result]);
    assert_eq!(
        aggregator.report(),
        vec!["slow.example.com has 0% availability percentage".to_string()]
    );
}

#[tokio::test]
async fn test_report_idempotent_without_intervening_fold() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(200)
        .create_async()
        .await;

    let prober = Arc::new(HttpProber::new(Duration::from_secs(5)).unwrap());
    let dispatcher =
        CycleDispatcher::new(prober, vec![endpoint("index", &format!("{}/", server.url()))]);

    let mut aggregator = DomainAggregator::new();
    aggregator.fold(&dispatcher.dispatch().await);

    let first = aggregator.report();
    let second = aggregator.report();
    assert_eq!(first, second);
    assert_eq!(aggregator.stats_for("127.0.0.1").unwrap().total_count, 1);
}
