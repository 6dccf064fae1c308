//! 查询串的词法分析器
//!
//! 对原始查询串从左到右扫描, 按以下顺序识别 token (先匹配者优先):
//!
//! 1. `word:"quoted value"` - 带引号值的字段
//! 2. `(` / `)` - 括号永远是独立 token
//! 3. `"quoted phrase"` - 引号短语
//! 4. `word:value` - 普通字段
//! 5. 其余连续的非空白非括号字符 - 普通词; 与 and/or/not
//!    大小写不敏感相等时提升为运算符 token
//!
//! 词法分析没有失败路径: 任何无法按前四类消费的字符都落入普通词。

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 读取一段词字符（字母、数字、下划线）
    fn read_word_run(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 读取一段既非空白也非括号的字符
    fn read_value_run(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            self.bump();
        }
    }

    /// 尝试读取一段双引号包围的内容, 反斜杠转义下一个字符
    ///
    /// 成功时返回引号内的原文 (不含引号, 保留转义用的反斜杠);
    /// 没有结束引号时回退到起始位置并返回 None。
    /// 注意: 调用时当前字符必须是开始引号。
    fn try_read_quoted(&mut self) -> Option<&'a str> {
        let saved = self.position;
        self.bump(); // 消费开始引号
        let content_start = self.position;

        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    let content = &self.input[content_start..self.position];
                    self.bump(); // 消费结束引号
                    return Some(content);
                }
                '\\' => {
                    self.bump();
                    self.bump(); // 被转义的字符
                }
                _ => {
                    self.bump();
                }
            }
        }

        // 没有结束引号, 整段按普通词重新扫描
        self.position = saved;
        None
    }
}

/// 将普通词映射为运算符 token, 大小写不敏感
fn match_word(s: &str) -> TokenKind<'_> {
    if s.eq_ignore_ascii_case("and") {
        TokenKind::And
    } else if s.eq_ignore_ascii_case("or") {
        TokenKind::Or
    } else if s.eq_ignore_ascii_case("not") {
        TokenKind::Not
    } else {
        TokenKind::Keyword(s)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;
        let c = self.peek()?;

        if c == '(' {
            self.bump();
            return Some(Token { kind: TokenKind::LParen, span: Span::new(start, self.position) });
        }
        if c == ')' {
            self.bump();
            return Some(Token { kind: TokenKind::RParen, span: Span::new(start, self.position) });
        }
        if c == '"' {
            if let Some(content) = self.try_read_quoted() {
                return Some(Token {
                    kind: TokenKind::Quoted(content),
                    span: Span::new(start, self.position),
                });
            }
            // 未闭合的引号, 落入下面的普通词逻辑
        }

        // 可能是 word:value 形式的字段
        self.read_word_run();
        if self.position > start && self.peek() == Some(':') {
            let name = &self.input[start..self.position];
            self.bump(); // 消费 ':'

            if self.peek() == Some('"') {
                if let Some(value) = self.try_read_quoted() {
                    return Some(Token {
                        kind: TokenKind::Field { name, value },
                        span: Span::new(start, self.position),
                    });
                }
            }

            let value_start = self.position;
            self.read_value_run();
            if self.position > value_start {
                let value = &self.input[value_start..self.position];
                return Some(Token {
                    kind: TokenKind::Field { name, value },
                    span: Span::new(start, self.position),
                });
            }
            // 冒号后没有值, 整体退化为普通词
        }

        // 普通词: 吞掉剩余的非空白非括号字符
        self.read_value_run();
        let text = &self.input[start..self.position];
        Some(Token { kind: match_word(text), span: Span::new(start, self.position) })
    }
}
