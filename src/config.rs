//! 配置模块, 负责加载字段别名的JSON配置文件

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ast::FilterField;
use crate::resolver::FieldResolver;

/// 别名配置错误
#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "配置错误: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

/// 字段别名配置结构
///
/// JSON 内容是 `别名 -> 语义字段名` 的映射, 例如:
///
/// ```json
/// { "sender": "from", "label": "tags" }
/// ```
///
/// 这些别名在内置别名表之外额外生效, 内置别名始终保留且不可覆盖。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAliasConfig {
    /// 别名到语义字段名的映射
    #[serde(flatten)]
    pub aliases: HashMap<String, String>,
}

impl FieldAliasConfig {
    /// 从JSON文件加载别名配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::new(format!(
                "配置文件不存在: {}",
                path_ref.display()
            )));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|e| {
            ConfigError::new(format!("无法读取配置文件 {}: {}", path_ref.display(), e))
        })?;

        // 解析JSON
        let aliases: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            ConfigError::new(format!("无法解析JSON配置文件 {}: {}", path_ref.display(), e))
        })?;

        let config = FieldAliasConfig { aliases };
        config.validate()?;
        Ok(config)
    }

    /// 校验所有别名都指向已知的语义字段
    fn validate(&self) -> Result<(), ConfigError> {
        for (alias, target) in &self.aliases {
            if FilterField::from_name(target).is_none() {
                return Err(ConfigError::new(format!(
                    "别名 '{}' 指向未知字段 '{}'",
                    alias, target
                )));
            }
        }
        Ok(())
    }

    /// 构建带有这些额外别名的字段解析器
    pub fn build_resolver(&self) -> FieldResolver {
        let mut resolver = FieldResolver::default();
        for (alias, target) in &self.aliases {
            if let Some(field) = FilterField::from_name(target) {
                resolver.add_alias(alias, field);
            }
        }
        resolver
    }
}
