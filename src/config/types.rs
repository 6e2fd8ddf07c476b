//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// 主配置结构，包含全局配置和端点列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// 端点配置列表
    pub endpoints: Vec<EndpointSpec>,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 探测周期间隔（秒），以固定频率触发，与单周期耗时无关
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_seconds: u64,
    /// 单次请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            cycle_interval_seconds: default_cycle_interval(),
            request_timeout_seconds: default_timeout(),
            log_level: default_log_level(),
        }
    }
}

/// 端点配置结构
///
/// 启动时从配置文件构造一次，进程生命周期内不可变。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointSpec {
    /// 端点名称
    pub name: String,
    /// 端点URL（绝对URL，host部分决定统计域名）
    pub url: String,
    /// HTTP方法
    #[serde(default = "default_method")]
    pub method: String,
    /// 请求头
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// 请求体（原样发送，不做JSON校验）
    pub body: Option<String>,
}

impl Config {
    /// 应用命令行参数覆盖并重新验证
    ///
    /// 覆盖值绕过了配置文件加载阶段的验证，必须在覆盖后重新验证，
    /// 防止0值进入调度器和探测器。
    ///
    /// # 参数
    /// * `cycle_interval_seconds` - 可选的周期间隔覆盖值（秒）
    /// * `request_timeout_seconds` - 可选的请求超时覆盖值（秒）
    ///
    /// # 返回
    /// * `Result<(), String>` - 验证结果，错误时返回错误信息
    pub fn apply_overrides(
        &mut self,
        cycle_interval_seconds: Option<u64>,
        request_timeout_seconds: Option<u64>,
    ) -> Result<(), String> {
        if let Some(interval) = cycle_interval_seconds {
            self.global.cycle_interval_seconds = interval;
        }
        if let Some(timeout) = request_timeout_seconds {
            self.global.request_timeout_seconds = timeout;
        }
        validate_config(self)
    }
}

impl EndpointSpec {
    /// 从URL派生统计域名
    ///
    /// 只取host部分，scheme、端口和路径均不参与（同域名的不同端点
    /// 共享一条统计记录）。URL在配置验证阶段已确认可解析。
    pub fn domain(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.url.clone())
    }
}

// 默认值函数
fn default_cycle_interval() -> u64 {
    15
}
fn default_timeout() -> u64 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_method() -> String {
    "GET".to_string()
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    // 验证全局配置
    if config.global.cycle_interval_seconds == 0 {
        return Err("探测周期间隔不能为0".to_string());
    }

    if config.global.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    // 验证日志级别
    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    // 验证端点配置
    if config.endpoints.is_empty() {
        return Err("至少需要配置一个端点".to_string());
    }

    for endpoint in &config.endpoints {
        // 验证端点名称
        if endpoint.name.trim().is_empty() {
            return Err("端点名称不能为空".to_string());
        }

        // 验证URL格式
        if !endpoint.url.starts_with("http://") && !endpoint.url.starts_with("https://") {
            return Err(format!("端点 {} 的URL格式无效", endpoint.name));
        }

        let parsed = Url::parse(&endpoint.url)
            .map_err(|e| format!("端点 {} 的URL解析失败: {}", endpoint.name, e))?;
        if parsed.host_str().is_none() {
            return Err(format!("端点 {} 的URL缺少host部分", endpoint.name));
        }

        // 验证HTTP方法
        let valid_methods = ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH"];
        if !valid_methods.contains(&endpoint.method.to_uppercase().as_str()) {
            return Err(format!(
                "端点 {} 的HTTP方法 {} 无效，支持的方法: {:?}",
                endpoint.name, endpoint.method, valid_methods
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_endpoint() -> EndpointSpec {
        EndpointSpec {
            name: "fetch index page".to_string(),
            url: "https://fetch.com/".to_string(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: None,
        }
    }

    fn create_test_config() -> Config {
        Config {
            global: GlobalConfig::default(),
            endpoints: vec![create_test_endpoint()],
        }
    }

    #[test]
    fn test_config_serialization() {
        let config = create_test_config();

        let serialized = toml::to_string(&config).expect("序列化失败");
        assert!(!serialized.is_empty());

        let deserialized: Config = toml::from_str(&serialized).expect("反序列化失败");
        assert_eq!(
            config.global.cycle_interval_seconds,
            deserialized.global.cycle_interval_seconds
        );
        assert_eq!(config.endpoints.len(), deserialized.endpoints.len());
        assert_eq!(config.endpoints[0].name, deserialized.endpoints[0].name);
    }

    #[test]
    fn test_default_values() {
        let global = GlobalConfig::default();
        assert_eq!(global.cycle_interval_seconds, 15);
        assert_eq!(global.request_timeout_seconds, 5);
        assert_eq!(global.log_level, "info");
    }

    #[test]
    fn test_method_defaults_to_get() {
        let toml_str = r#"
[[endpoints]]
name = "no method endpoint"
url = "https://example.com/health"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoints[0].method, "GET");
        assert!(config.endpoints[0].headers.is_empty());
        assert!(config.endpoints[0].body.is_none());
    }

    #[test]
    fn test_domain_strips_scheme_port_and_path() {
        let mut endpoint = create_test_endpoint();
        endpoint.url = "https://fetch.com:8443/careers?page=2".to_string();
        assert_eq!(endpoint.domain(), "fetch.com");

        endpoint.url = "http://www.fetchrewards.com/".to_string();
        assert_eq!(endpoint.domain(), "www.fetchrewards.com");
    }

    #[test]
    fn test_shared_domain_for_distinct_paths() {
        let mut first = create_test_endpoint();
        first.url = "https://fetch.com/".to_string();
        let mut second = create_test_endpoint();
        second.url = "https://fetch.com/careers".to_string();

        assert_eq!(first.domain(), second.domain());
    }

    #[test]
    fn test_config_validation() {
        let config = create_test_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_validation_empty_endpoints() {
        let mut config = create_test_config();
        config.endpoints.clear();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("至少需要配置一个端点"));
    }

    #[test]
    fn test_config_validation_invalid_url() {
        let mut config = create_test_config();
        config.endpoints[0].url = "invalid-url".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("URL格式无效"));
    }

    #[test]
    fn test_config_validation_invalid_method() {
        let mut config = create_test_config();
        config.endpoints[0].method = "FETCH".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("HTTP方法"));
    }

    #[test]
    fn test_config_validation_zero_interval() {
        let mut config = create_test_config();
        config.global.cycle_interval_seconds = 0;

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("探测周期间隔"));
    }

    #[test]
    fn test_apply_overrides_updates_values() {
        let mut config = create_test_config();

        config.apply_overrides(Some(30), Some(10)).unwrap();
        assert_eq!(config.global.cycle_interval_seconds, 30);
        assert_eq!(config.global.request_timeout_seconds, 10);
    }

    #[test]
    fn test_apply_overrides_none_keeps_config() {
        let mut config = create_test_config();

        config.apply_overrides(None, None).unwrap();
        assert_eq!(config.global.cycle_interval_seconds, 15);
        assert_eq!(config.global.request_timeout_seconds, 5);
    }

    #[test]
    fn test_apply_overrides_timeout_only() {
        let mut config = create_test_config();

        config.apply_overrides(None, Some(2)).unwrap();
        assert_eq!(config.global.cycle_interval_seconds, 15);
        assert_eq!(config.global.request_timeout_seconds, 2);
    }

    #[test]
    fn test_apply_overrides_rejects_zero_interval() {
        // 周期间隔为0会使调度器的固定频率定时器无法构造，
        // 覆盖值必须和配置文件值一样被拒绝
        let mut config = create_test_config();

        let result = config.apply_overrides(Some(0), None);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("探测周期间隔"));
    }

    #[test]
    fn test_apply_overrides_rejects_zero_timeout() {
        let mut config = create_test_config();

        let result = config.apply_overrides(None, Some(0));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("请求超时时间"));
    }

    #[test]
    fn test_config_validation_empty_name() {
        let mut config = create_test_config();
        config.endpoints[0].name = "  ".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("端点名称不能为空"));
    }
}
