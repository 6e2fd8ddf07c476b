//! HTTP探测器实现
//!
//! 对单个端点执行一次HTTP请求并产出判定后的探测结果

use crate::config::EndpointSpec;
use crate::error::ProbeError;
use crate::probe::result::ProbeResult;
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// 探测器trait，定义探测接口
///
/// 单次探测不产生错误：网络失败（连接拒绝、DNS失败、超时）被吸收为
/// `DOWN` 结果，调用方得到的唯一信号是二元的探测结果。
#[async_trait]
pub trait Prober: Send + Sync {
    /// 使用默认超时执行一次探测
    ///
    /// # 参数
    /// * `endpoint` - 端点配置
    ///
    /// # 返回
    /// * `ProbeResult` - 探测结果
    async fn probe(&self, endpoint: &EndpointSpec) -> ProbeResult;

    /// 带超时的探测
    ///
    /// # 参数
    /// * `endpoint` - 端点配置
    /// * `timeout_duration` - 超时时间
    ///
    /// # 返回
    /// * `ProbeResult` - 探测结果
    async fn probe_with_timeout(
        &self,
        endpoint: &EndpointSpec,
        timeout_duration: Duration,
    ) -> ProbeResult;
}

/// HTTP探测器实现
pub struct HttpProber {
    /// HTTP客户端
    client: Client,
    /// 默认超时时间
    default_timeout: Duration,
}

impl HttpProber {
    /// 创建新的HTTP探测器
    ///
    /// # 参数
    /// * `timeout` - 默认超时时间，上限约束单次探测的最坏耗时
    ///
    /// # 返回
    /// * `Result<Self, ProbeError>` - 探测器实例
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(ProbeError::ClientBuild)?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// 构建HTTP请求
    ///
    /// 使用端点配置的方法、请求头和请求体，请求体原样发送不做校验。
    fn build_request(&self, endpoint: &EndpointSpec) -> Result<reqwest::RequestBuilder, ProbeError> {
        let method =
            Method::from_str(&endpoint.method.to_uppercase()).map_err(|_| {
                ProbeError::InvalidMethod {
                    method: endpoint.method.clone(),
                }
            })?;

        let mut request = self.client.request(method, &endpoint.url);

        // 添加请求头
        for (key, value) in &endpoint.headers {
            request = request.header(key, value);
        }

        // 添加请求体（如果有）
        if let Some(body) = &endpoint.body {
            request = request.body(body.clone());
        }

        Ok(request)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &EndpointSpec) -> ProbeResult {
        self.probe_with_timeout(endpoint, self.default_timeout)
            .await
    }

    async fn probe_with_timeout(
        &self,
        endpoint: &EndpointSpec,
        timeout_duration: Duration,
    ) -> ProbeResult {
        let domain = endpoint.domain();

        let request = match self.build_request(endpoint) {
            Ok(request) => request,
            Err(e) => {
                // 构建失败只影响本端点本周期，记为DOWN
                warn!("构建请求失败 {}: {}", endpoint.name, e);
                return ProbeResult::failed(domain, Duration::from_millis(0));
            }
        };

        // 延迟从发出请求起计，包含连接建立
        let start_time = Instant::now();
        let response_result = timeout(timeout_duration, request.send()).await;
        let latency = start_time.elapsed();

        match response_result {
            Ok(Ok(response)) => {
                let status_code = response.status().as_u16();
                debug!(
                    "探测完成 {}: 状态码 {}, 延迟 {}ms",
                    endpoint.name,
                    status_code,
                    latency.as_millis()
                );
                ProbeResult::classified(domain, Some(status_code), latency)
            }
            Ok(Err(e)) => {
                debug!("探测请求失败 {}: {}", endpoint.name, e);
                ProbeResult::failed(domain, latency)
            }
            Err(_) => {
                debug!(
                    "探测超时 {}: 超过 {}ms",
                    endpoint.name,
                    timeout_duration.as_millis()
                );
                ProbeResult::failed(domain, latency)
            }
        }
    }
}
