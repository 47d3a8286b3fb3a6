//! 引擎配置
//!
//! 从 TOML 文件加载，环境变量优先于文件中的值：
//!
//! ```toml
//! [validation]
//! on_build = true
//! strict_references = false
//! strict_types = false
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! show_target = true
//! ```

use std::collections::HashMap;
use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::logging::{LogFormat, LoggingConfig};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "DEFINITION_INTEROP_";

/// 容器构建时的校验选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// `ContainerBuilder::build` 时校验全部定义
    pub on_build: bool,
    /// 引用必须指向已有的定义
    pub strict_references: bool,
    /// 对象类型与静态工厂类型必须已注册
    pub strict_types: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            on_build: true,
            strict_references: false,
            strict_types: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParse("<inline>".to_string(), e))
    }

    /// 从文件加载配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(display.clone(), e))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::TomlParse(display.clone(), e))?;
        log::debug!("Loaded engine configuration from {}", display);
        Ok(config)
    }

    /// 默认配置叠加当前进程的环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_map: HashMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(ENV_PREFIX)).collect();
        let mut config = Self::default();
        config.apply_env_overrides(&env_map)?;
        Ok(config)
    }

    /// 以预先读取的环境变量覆盖配置
    pub fn apply_env_overrides(
        &mut self,
        env_map: &HashMap<String, String>,
    ) -> Result<(), ConfigError> {
        let var = |name: &str| env_map.get(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = var("VALIDATE_ON_BUILD") {
            self.validation.on_build = parse_bool("VALIDATE_ON_BUILD", v)?;
        }
        if let Some(v) = var("STRICT_REFERENCES") {
            self.validation.strict_references = parse_bool("STRICT_REFERENCES", v)?;
        }
        if let Some(v) = var("STRICT_TYPES") {
            self.validation.strict_types = parse_bool("STRICT_TYPES", v)?;
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.logging.level = v.trim().to_string();
        }
        if let Some(v) = var("LOG_FORMAT") {
            self.logging.format = v.parse::<LogFormat>().map_err(|_| ConfigError::InvalidValue {
                key: format!("{}LOG_FORMAT", ENV_PREFIX),
                value: v.clone(),
            })?;
        }
        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: format!("{}{}", ENV_PREFIX, name),
            value: value.to_string(),
        }),
    }
}
