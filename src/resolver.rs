//! 字段解析器: 将 `name:value` 片段映射为类型化的过滤器
//!
//! 解析规则按顺序检查:
//!
//! 1. `has:attachment` (都大小写不敏感) -> `hasAttachments = true`
//! 2. `before:<date>` -> `timestamp < 当天零点毫秒`, 日期解析失败时放弃
//! 3. `after:<date>` -> `timestamp >= 当天零点毫秒`, 同上
//! 4. 别名表命中 -> `字段 = 值` (值保持原文)
//! 5. 其余返回 None, 调用方应把原文当作关键词处理
//!
//! 字段名与别名键大小写不敏感; 值保持大小写, 只有日期会被解析。

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::ast::{Filter, FilterField, FilterOperator, FilterValue};

/// 内置别名表, 键为小写
const BUILTIN_ALIASES: &[(&str, FilterField)] = &[
    ("from", FilterField::From),
    ("to", FilterField::To),
    ("cc", FilterField::Cc),
    ("bcc", FilterField::Bcc),
    ("subject", FilterField::Subject),
    ("in", FilterField::IngestionSourceId),
    ("tag", FilterField::Tags),
    ("folder", FilterField::Path),
    ("path", FilterField::Path),
];

/// 字段别名到语义字段的解析器
pub struct FieldResolver {
    /// 别名(小写) -> 语义字段
    aliases: HashMap<String, FilterField>,
}

impl Default for FieldResolver {
    fn default() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .map(|(alias, field)| (alias.to_string(), *field))
            .collect();
        Self { aliases }
    }
}

impl FieldResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个额外的别名; 已有别名 (包括内置别名) 不会被覆盖
    pub fn add_alias(&mut self, alias: &str, field: FilterField) {
        self.aliases.entry(alias.to_lowercase()).or_insert(field);
    }

    /// 将字段名和原始值解析为过滤器
    ///
    /// 返回 None 表示"不是已识别的字段", 调用方应按关键词处理。
    pub fn resolve(&self, name: &str, value: &str) -> Option<Filter> {
        if name.eq_ignore_ascii_case("has") && value.eq_ignore_ascii_case("attachment") {
            return Some(Filter {
                field: FilterField::HasAttachments,
                operator: FilterOperator::Eq,
                value: FilterValue::Bool(true),
            });
        }
        if name.eq_ignore_ascii_case("before") {
            return parse_date_millis(value).map(|millis| Filter {
                field: FilterField::Timestamp,
                operator: FilterOperator::Lt,
                value: FilterValue::Number(millis),
            });
        }
        if name.eq_ignore_ascii_case("after") {
            return parse_date_millis(value).map(|millis| Filter {
                field: FilterField::Timestamp,
                operator: FilterOperator::Gte,
                value: FilterValue::Number(millis),
            });
        }

        let field = *self.aliases.get(&name.to_lowercase())?;
        Some(Filter {
            field,
            operator: FilterOperator::Eq,
            value: FilterValue::String(value.to_string()),
        })
    }
}

/// 按 `YYYY-MM-DD` 解析日期, 返回当天零点 (UTC) 的毫秒时间戳
///
/// 只接受这一种格式, 其余一律视为解析失败。
fn parse_date_millis(value: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp_millis())
}
