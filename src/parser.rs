//! 查询串的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   └─ 顶层循环: 反复调用 parse_or_expression() 直到 token 耗尽
//!       │   (关键词与过滤器可自由交错, 多次调用产出的表达式按出现顺序用 AND 折叠;
//!       │    未消费任何 token 时跳过当前 token, 例如多余的右括号)
//!       │
//!       └─ parse_or_expression() (递归下降解析)
//!            ├─ parse_and_expression()
//!            │    ├─ parse_not_expression()
//!            │    │    └─ parse_primary_expression()
//!            │    │         ├─ "(" → 分组表达式 (递归调用 parse_or_expression)
//!            │    │         ├─ 字段 token → 字段解析成功产出叶子过滤器,
//!            │    │         │               失败时原文回退为关键词
//!            │    │         ├─ 关键词 / 引号短语 → 追加到关键词累加器
//!            │    │         └─ 其他 (运算符、多余右括号) → 不消费, 交由上层
//!            │    │
//!            │    └─ 遇到 AND, 或下一个 token 开启新的 primary (隐式 AND) 时,
//!            │        继续解析右侧 NOT 表达式
//!            │
//!            └─ 遇到 OR 时, 继续解析右侧 AND 表达式
//! ```
//!
//! ## 语法优先级（从高到低）
//!
//! 1. **括号分组** `(expression)`
//! 2. **NOT操作** `NOT expression`
//! 3. **AND操作** `expr1 AND expr2` / 相邻 primary 的隐式 AND
//! 4. **OR操作** `expr1 OR expr2`
//!
//! ## 双路输出
//!
//! 解析同时产出两样东西:
//!
//! - 过滤表达式树: 只由字段解析成功的字段 token 构成, 按上面的布尔结构组合
//! - 关键词累加器: 消费到关键词或引号短语时追加; 字段解析失败时把
//!   `name:value` 原文逐字节追加 (未知字段和非法日期因此表现为普通搜索词)
//!
//! ## 错误恢复 (永不失败)
//!
//! - 未闭合的 `(`: 解析持续到流结束, 返回括号内已解析的内容
//! - 多余的 `)`: 跳过该 token 继续解析
//! - 悬空的布尔运算符 (行尾 NOT、纯运算符输入): 该处不产出表达式, 静默丢弃
//! - 运算符匹配大小写不敏感
//!
//! ## 解析示例
//!
//! ```text
//! // 关键词与过滤器混合
//! urgent from:john
//!
//! // 显式布尔结构
//! (from:john OR from:jane) AND has:attachment
//!
//! // 未知字段回退为关键词
//! foo:bar from:john
//! ```

use crate::ast::{Filter, FilterExpression, ParsedQuery};
use crate::lexer::Lexer;
use crate::resolver::FieldResolver;
use crate::token::{Token, TokenKind};

/// 括号嵌套深度上限; 超过后分组退化为平铺解析, 不再加深递归
const MAX_GROUP_DEPTH: usize = 128;

/// 使用内置别名表解析一条查询串
pub fn parse(input: &str) -> ParsedQuery {
    parse_with_resolver(input, &FieldResolver::default())
}

/// 使用给定的字段解析器解析一条查询串
pub fn parse_with_resolver(input: &str, resolver: &FieldResolver) -> ParsedQuery {
    let tokens: Vec<_> = Lexer::new(input).collect();
    Parser::new(input, &tokens, resolver).parse()
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token<'a>],
    position: usize,
    /// 当前括号嵌套深度
    depth: usize,
    keywords: Vec<String>,
    filters: Vec<Filter>,
    resolver: &'a FieldResolver,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: &'a [Token<'a>], resolver: &'a FieldResolver) -> Self {
        Self {
            source,
            tokens,
            position: 0,
            depth: 0,
            keywords: Vec::new(),
            filters: Vec::new(),
            resolver,
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&Token<'a>> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// 检查当前 token 是否匹配给定类型
    fn match_token(&self, kind: &TokenKind) -> bool {
        match self.peek() {
            Some(token) => std::mem::discriminant(&token.kind) == std::mem::discriminant(kind),
            None => false,
        }
    }

    /// 检查当前 token 是否开启一个新的 primary 表达式 (隐式 AND 的判定)
    fn at_primary_start(&self) -> bool {
        matches!(
            self.peek().map(|token| &token.kind),
            Some(TokenKind::Field { .. }) | Some(TokenKind::Not) | Some(TokenKind::LParen)
        )
    }

    /// 解析整个 token 流, 产出关键词串与过滤表达式
    pub fn parse(mut self) -> ParsedQuery {
        let mut expressions = Vec::new();

        while self.peek().is_some() {
            let before = self.position;
            if let Some(expression) = self.parse_or_expression() {
                expressions.push(expression);
            }
            // 没有消费任何 token (例如多余的右括号), 跳过它继续
            if self.position == before {
                self.advance();
            }
        }

        let expression = expressions
            .into_iter()
            .reduce(|left, right| FilterExpression::And(Box::new(left), Box::new(right)));

        ParsedQuery {
            keywords: self.keywords.join(" "),
            filters: self.filters,
            expression,
        }
    }

    /// 解析OR表达式 (最低优先级)
    ///
    /// 语法: `and_expr (OR and_expr)*`
    fn parse_or_expression(&mut self) -> Option<FilterExpression> {
        let mut left = self.parse_and_expression();

        while self.match_token(&TokenKind::Or) {
            self.advance(); // 消费 OR
            let right = self.parse_and_expression();
            left = combine(left, right, FilterExpression::Or);
        }

        left
    }

    /// 解析AND表达式 (中等优先级)
    ///
    /// 语法: `not_expr ((AND | 隐式AND) not_expr)*`
    ///
    /// 隐式 AND: 没有显式 AND 但下一个 token 开启新的 primary
    /// (字段、NOT、左括号) 时, 相邻的两个表达式仍按 AND 组合。
    fn parse_and_expression(&mut self) -> Option<FilterExpression> {
        let mut left = self.parse_not_expression();

        loop {
            if self.match_token(&TokenKind::And) {
                self.advance(); // 消费 AND
            } else if !self.at_primary_start() {
                break;
            }
            let right = self.parse_not_expression();
            left = combine(left, right, FilterExpression::And);
        }

        left
    }

    /// 解析NOT表达式 (较高优先级)
    ///
    /// 语法: `NOT not_expr | primary_expr`
    ///
    /// 连续的 NOT 在此处迭代计数再逐层包裹, 递归深度与 NOT 个数无关。
    /// 操作数没有产出表达式时 (悬空 NOT), 这些 NOT 全部丢弃。
    fn parse_not_expression(&mut self) -> Option<FilterExpression> {
        let mut negations = 0usize;
        while self.match_token(&TokenKind::Not) {
            self.advance(); // 消费 NOT
            negations += 1;
        }

        let mut expression = self.parse_primary_expression();
        for _ in 0..negations {
            expression = expression.map(|inner| FilterExpression::Not(Box::new(inner)));
        }
        expression
    }

    /// 解析基础表达式 (最高优先级)
    ///
    /// 支持的形式:
    /// - `(or_expr)` - 分组表达式; 右括号缺失时解析到流结束为止
    /// - 字段 token - 解析成功产出叶子过滤器, 失败时原文回退为关键词
    /// - 关键词 / 引号短语 - 追加到关键词累加器, 不产出表达式
    /// - 其他 (布尔运算符、多余右括号) - 不消费, 交由上层处理
    fn parse_primary_expression(&mut self) -> Option<FilterExpression> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::LParen => {
                self.advance(); // 消费 (
                if self.depth >= MAX_GROUP_DEPTH {
                    // 嵌套过深, 该括号退化为普通分隔, 内容由上层循环平铺解析
                    return None;
                }
                self.depth += 1;
                let inner = self.parse_or_expression();
                self.depth -= 1;
                if self.match_token(&TokenKind::RParen) {
                    self.advance(); // 消费 )
                }
                // 右括号缺失时 (未闭合的分组), 保留括号内已解析的内容
                inner
            }
            TokenKind::Field { name, value } => {
                self.advance(); // 消费字段
                match self.resolver.resolve(name, value) {
                    Some(filter) => {
                        self.filters.push(filter.clone());
                        Some(FilterExpression::Leaf(filter))
                    }
                    None => {
                        // 无法识别的字段按原文逐字节回退为关键词
                        self.keywords
                            .push(self.source[token.span.start..token.span.end].to_string());
                        None
                    }
                }
            }
            TokenKind::Keyword(text) => {
                self.advance();
                self.keywords.push(text.to_string());
                None
            }
            TokenKind::Quoted(text) => {
                self.advance();
                // 输出时重新包上双引号, 保持短语语义
                self.keywords.push(format!("\"{}\"", text));
                None
            }
            // 布尔运算符与多余的右括号不构成 primary, 不消费
            _ => None,
        }
    }
}

/// 组合两侧可能为空的子表达式; 只有单侧存在时直接透传, 两侧都空时为空
fn combine(
    left: Option<FilterExpression>,
    right: Option<FilterExpression>,
    join: fn(Box<FilterExpression>, Box<FilterExpression>) -> FilterExpression,
) -> Option<FilterExpression> {
    match (left, right) {
        (Some(left), Some(right)) => Some(join(Box::new(left), Box::new(right))),
        (Some(left), None) => Some(left),
        (None, Some(right)) => Some(right),
        (None, None) => None,
    }
}
