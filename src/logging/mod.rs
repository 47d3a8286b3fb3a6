//! 日志初始化
//!
//! 引擎代码通过 `log` 门面记录解析过程；`init_logging` 安装
//! `tracing-subscriber` 格式化输出，并把 `log` 记录桥接进来。

use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日志格式配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 人类可读格式
    #[default]
    Pretty,
    /// JSON 格式
    Json,
    /// 紧凑格式
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或 `EnvFilter` 指令，例如 `"info"`、`"definition_interop=trace"`
    pub level: String,
    /// 输出格式
    pub format: LogFormat,
    /// 是否显示目标模块
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            show_target: true,
        }
    }
}

impl LoggingConfig {
    /// 开发环境配置
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            ..Self::default()
        }
    }

    /// 生产环境配置
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            show_target: false,
        }
    }
}

/// 日志初始化错误
#[derive(Debug, Error)]
#[error("Failed to initialize logging: {0}")]
pub struct LoggingInitError(String);

/// 初始化日志系统
///
/// 已有全局订阅者时返回错误，不会 panic。
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LoggingInitError(format!("invalid level '{}': {}", config.level, e)))?;

    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_target(config.show_target))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(config.show_target))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(config.show_target))
            .try_init(),
    };
    result.map_err(|e| LoggingInitError(e.to_string()))?;

    tracing::info!(
        level = %config.level,
        format = ?config.format,
        "Logging system initialized"
    );
    Ok(())
}

/// 操作计时器，结束时记录耗时
pub struct OperationTimer {
    start: Instant,
    operation: String,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
        }
    }

    /// 完成计时并记录日志
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
        duration
    }
}
