//! 配置校验模块
//!
//! 校验规则：
//! - 字段取值范围 (由 `validator` derive 声明)
//! - http sink 必须提供 http(s) url
//! - log sink 的 status 参数必须是合法状态码
//! - 自定义 pattern 可编译且包含 timestamp / message 命名分组

use contracts::{ContractError, ForwarderConfig, SinkConfig, SinkType};
use ingestion::RecordExtractor;
use validator::Validate;

/// 校验 ForwarderConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ForwarderConfig) -> Result<(), ContractError> {
    validate_declared(config)?;
    validate_sink(&config.sink)?;
    validate_pattern(config.extract.pattern.as_deref())?;
    Ok(())
}

/// 校验 derive 声明的字段约束
fn validate_declared(config: &ForwarderConfig) -> Result<(), ContractError> {
    config
        .validate()
        .map_err(|e| ContractError::config_validation("config", e.to_string()))
}

/// 校验 sink 参数
fn validate_sink(sink: &SinkConfig) -> Result<(), ContractError> {
    match sink.sink_type {
        SinkType::Http => {
            let url = sink.params.get("url").ok_or_else(|| {
                ContractError::config_validation(
                    format!("sink[{}].params.url", sink.name),
                    "http sink requires a 'url' parameter",
                )
            })?;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ContractError::config_validation(
                    format!("sink[{}].params.url", sink.name),
                    format!("url must start with http:// or https://, got '{url}'"),
                ));
            }
        }
        SinkType::Log => {
            if let Some(status) = sink.params.get("status") {
                let valid = status
                    .parse::<u16>()
                    .is_ok_and(|code| (100..=599).contains(&code));
                if !valid {
                    return Err(ContractError::config_validation(
                        format!("sink[{}].params.status", sink.name),
                        format!("status must be an HTTP status code, got '{status}'"),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// 校验自定义匹配规则 (与运行时 extractor 使用同一套规则)
fn validate_pattern(pattern: Option<&str>) -> Result<(), ContractError> {
    match pattern {
        Some(pattern) => RecordExtractor::with_pattern(pattern).map(|_| ()),
        None => Ok(()),
    }
}
