use serde::Serialize;

/// 解析结果的根节点, 代表一次完整的查询解析
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    /// 剩余的自由文本关键词, 以空格连接
    pub keywords: String,
    /// 按识别顺序排列的叶子过滤器列表
    pub filters: Vec<Filter>,
    /// 过滤器的布尔组合表达式树; 没有识别出任何过滤器时为 None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<FilterExpression>,
}

impl ParsedQuery {
    /// 关键词和过滤器都为空时返回 true, 调用方据此选择全量搜索
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.expression.is_none()
    }
}

/// 过滤器作用的语义字段, 封闭枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    From,
    To,
    Cc,
    Bcc,
    Subject,
    HasAttachments,
    Timestamp,
    IngestionSourceId,
    Tags,
    Path,
}

impl FilterField {
    /// 目标过滤语法中的字段名
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::From => "from",
            FilterField::To => "to",
            FilterField::Cc => "cc",
            FilterField::Bcc => "bcc",
            FilterField::Subject => "subject",
            FilterField::HasAttachments => "hasAttachments",
            FilterField::Timestamp => "timestamp",
            FilterField::IngestionSourceId => "ingestionSourceId",
            FilterField::Tags => "tags",
            FilterField::Path => "path",
        }
    }

    /// 按目标语法中的字段名反查语义字段
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "from" => Some(FilterField::From),
            "to" => Some(FilterField::To),
            "cc" => Some(FilterField::Cc),
            "bcc" => Some(FilterField::Bcc),
            "subject" => Some(FilterField::Subject),
            "hasAttachments" => Some(FilterField::HasAttachments),
            "timestamp" => Some(FilterField::Timestamp),
            "ingestionSourceId" => Some(FilterField::IngestionSourceId),
            "tags" => Some(FilterField::Tags),
            "path" => Some(FilterField::Path),
            _ => None,
        }
    }
}

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,  // =
    Lt,  // <
    Gt,  // >
    Lte, // <=
    Gte, // >=
}

impl FilterOperator {
    /// 目标过滤语法中的运算符
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Lt => "<",
            FilterOperator::Gt => ">",
            FilterOperator::Lte => "<=",
            FilterOperator::Gte => ">=",
        }
    }
}

/// 过滤器的值
///
/// 运行时类型必须与字段的语义类型一致: 布尔值只用于 hasAttachments,
/// 数字只用于 timestamp (毫秒时间戳), 其余字段都是字符串。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    String(String),
    Number(i64),
    Bool(bool),
}

/// 单个叶子过滤器, 过滤表达式树的原子单元
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub field: FilterField,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

/// 过滤器的布尔表达式树
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterExpression {
    /// 叶子节点
    Leaf(Filter),
    /// 逻辑与 (AND), 左结合
    And(Box<FilterExpression>, Box<FilterExpression>),
    /// 逻辑或 (OR), 左结合
    Or(Box<FilterExpression>, Box<FilterExpression>),
    /// 逻辑非 (NOT), 一元前缀, 只绑定最近的后续表达式
    Not(Box<FilterExpression>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_round_trip() {
        let fields = [
            FilterField::From,
            FilterField::To,
            FilterField::Cc,
            FilterField::Bcc,
            FilterField::Subject,
            FilterField::HasAttachments,
            FilterField::Timestamp,
            FilterField::IngestionSourceId,
            FilterField::Tags,
            FilterField::Path,
        ];
        for field in fields {
            assert_eq!(FilterField::from_name(field.as_str()), Some(field));
        }
        assert_eq!(FilterField::from_name("folder"), None);
    }

    #[test]
    fn test_serialized_shape() {
        let parsed = ParsedQuery {
            keywords: "urgent".to_string(),
            filters: vec![Filter {
                field: FilterField::HasAttachments,
                operator: FilterOperator::Eq,
                value: FilterValue::Bool(true),
            }],
            expression: None,
        };
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["keywords"], "urgent");
        assert_eq!(json["filters"][0]["field"], "hasAttachments");
        assert_eq!(json["filters"][0]["operator"], "eq");
        assert_eq!(json["filters"][0]["value"], true);
        // expression 为 None 时整个键被省略
        assert!(json.get("expression").is_none());
    }
}
