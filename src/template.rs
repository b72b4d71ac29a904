//! 模板解析：把 `"id = $id AND name = ${user.name}"` 这样的字符串拆成节点序列。
//!
//! 这里只做语法切分，不做求值；求值见 [`crate::interpolate`]。

use crate::error::{Error, Result};

/// 占位符引导符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sigil {
    /// `$name` / `${name}` / `$$`
    #[default]
    Dollar,
    /// `:name` / `:{name}` / `::`
    Colon,
}

impl Sigil {
    /// 模板中出现 `:` 就用 `:`，否则用 `$`。
    ///
    /// 注意：含 `::` 类型转换或字符串常量里的 `:` 也会被判定为 `:` 风格。
    pub fn detect(template: &str) -> Self {
        if template.contains(':') {
            Self::Colon
        } else {
            Self::Dollar
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Dollar => '$',
            Self::Colon => ':',
        }
    }
}

/// 模板节点。
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// 原样输出的文本。
    Text(String),
    /// 以数字或引号开头的常量 token，例如 `5`、`'abc'`。
    Literal(String),
    /// 变量名。
    Param(String),
    /// `expr.name`
    GetAttr(Box<Node>, String),
    /// `expr[index]`
    GetItem(Box<Node>, Box<Node>),
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// 递归下降解析器，每次 [`Parser::parse`] 都从头开始。
#[derive(Debug)]
pub struct Parser<'a> {
    text: &'a str,
    sigil: Sigil,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str, sigil: Sigil) -> Self {
        Self {
            text,
            sigil,
            pos: 0,
        }
    }

    /// 解析整个模板，返回节点列表；空文本节点不会出现在结果中。
    pub fn parse(mut self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        let bytes = self.text.as_bytes();
        let sigil = self.sigil.as_char();

        while let Some(offset) = self.text[self.pos..].find(sigil) {
            let at = self.pos + offset;
            let Some(&next) = bytes.get(at + 1) else {
                // 结尾的孤立引导符按普通文本处理
                break;
            };

            if is_name_char(next) {
                self.push_text(&mut nodes, at);
                self.pos = at + 1;
                let expr = self.parse_expr()?;
                nodes.push(expr);
            } else if next == b'{' {
                let saved = self.pos;
                self.pos = at + 2;
                let expr = self.parse_expr()?;
                if bytes.get(self.pos) == Some(&b'}') {
                    self.pos += 1;
                    let before = &self.text[saved..at];
                    if !before.is_empty() {
                        nodes.push(Node::Text(before.to_string()));
                    }
                    nodes.push(expr);
                } else {
                    self.pos = saved;
                    break;
                }
            } else {
                self.push_text(&mut nodes, at + 1);
                self.pos = at + 1;
                if next == sigil as u8 {
                    self.pos += 1;
                }
            }
        }

        if self.pos < self.text.len() {
            nodes.push(Node::Text(self.text[self.pos..].to_string()));
        }
        Ok(nodes)
    }

    fn push_text(&self, nodes: &mut Vec<Node>, end: usize) {
        let s = &self.text[self.pos..end];
        if !s.is_empty() {
            nodes.push(Node::Text(s.to_string()));
        }
    }

    fn next_token(&self) -> Result<(usize, usize)> {
        match_token(self.text.as_bytes(), self.pos).ok_or_else(|| Error::MalformedExpression {
            text: self.text.to_string(),
            pos: self.pos,
        })
    }

    fn parse_expr(&mut self) -> Result<Node> {
        let bytes = self.text.as_bytes();
        let (start, end) = self.next_token()?;
        let token = &self.text[start..end];
        let mut expr = if token.starts_with(|c: char| c.is_ascii_digit() || c == '"' || c == '\'')
        {
            Node::Literal(token.to_string())
        } else {
            Node::Param(token.to_string())
        };
        self.pos = end;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'.' if bytes.get(self.pos + 1).copied().is_some_and(is_name_char) => {
                    self.pos += 1;
                    let (start, end) = self.next_token()?;
                    expr = Node::GetAttr(Box::new(expr), self.text[start..end].to_string());
                    self.pos = end;
                }
                b'[' => {
                    let saved = self.pos;
                    self.pos += 1;
                    match self.parse_expr() {
                        Ok(key) if bytes.get(self.pos) == Some(&b']') => {
                            self.pos += 1;
                            expr = Node::GetItem(Box::new(expr), Box::new(key));
                        }
                        // 下标不完整：退回 `[` 之前，`[` 及之后按普通文本处理
                        _ => {
                            self.pos = saved;
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(expr)
    }
}

/// parse_template：`Parser::new(text, sigil).parse()` 的简写。
pub fn parse_template(text: &str, sigil: Sigil) -> Result<Vec<Node>> {
    Parser::new(text, sigil).parse()
}

/// 在 `pos` 处匹配一个类 Python 的 token，返回 `(token 起点, token 终点)`。
///
/// token 前允许有空白、续行符和注释，这些不计入 token 本身。
/// 备选分支按顺序尝试（先匹配先得，而不是最长匹配）：
/// 数字、运算符、括号、标点、字符串、名字。
fn match_token(b: &[u8], pos: usize) -> Option<(usize, usize)> {
    let mut p = skip_blanks(b, pos);
    // 续行：`\` 换行
    loop {
        let mut q = p;
        if b.get(q) != Some(&b'\\') {
            break;
        }
        q += 1;
        if b.get(q) == Some(&b'\r') {
            q += 1;
        }
        if b.get(q) != Some(&b'\n') {
            break;
        }
        p = skip_blanks(b, q + 1);
    }
    if b.get(p) == Some(&b'#') {
        while p < b.len() && b[p] != b'\r' && b[p] != b'\n' {
            p += 1;
        }
    }

    let start = p;
    let end = number(b, p)
        .or_else(|| operator(b, p))
        .or_else(|| punctuation(b, p))
        .or_else(|| string(b, p))
        .or_else(|| name(b, p))?;
    Some((start, end))
}

fn skip_blanks(b: &[u8], mut p: usize) -> usize {
    while p < b.len() && matches!(b[p], b' ' | b'\t' | 0x0c) {
        p += 1;
    }
    p
}

fn digits(b: &[u8], p: usize) -> Option<usize> {
    let mut q = p;
    while q < b.len() && b[q].is_ascii_digit() {
        q += 1;
    }
    (q > p).then_some(q)
}

fn digits_in(b: &[u8], p: usize, pred: fn(u8) -> bool) -> Option<usize> {
    let mut q = p;
    while q < b.len() && pred(b[q]) {
        q += 1;
    }
    (q > p).then_some(q)
}

fn exponent(b: &[u8], p: usize) -> Option<usize> {
    if !matches!(b.get(p), Some(b'e' | b'E')) {
        return None;
    }
    let mut q = p + 1;
    if matches!(b.get(q), Some(b'+' | b'-')) {
        q += 1;
    }
    digits(b, q)
}

fn one_of(b: &[u8], p: usize, set: &[u8]) -> Option<usize> {
    b.get(p).filter(|c| set.contains(c)).map(|_| p + 1)
}

/// `(\d+\.\d*|\.\d+)([eE][-+]?\d+)?|\d+[eE][-+]?\d+`
fn float(b: &[u8], p: usize) -> Option<usize> {
    let point = match digits(b, p) {
        Some(q) if b.get(q) == Some(&b'.') => Some(digits(b, q + 1).unwrap_or(q + 1)),
        Some(_) => None,
        None if b.get(p) == Some(&b'.') => digits(b, p + 1),
        None => None,
    };
    if let Some(q) = point {
        return Some(exponent(b, q).unwrap_or(q));
    }
    digits(b, p).and_then(|q| exponent(b, q))
}

fn imaginary(b: &[u8], p: usize) -> Option<usize> {
    digits(b, p)
        .and_then(|q| one_of(b, q, b"jJ"))
        .or_else(|| float(b, p).and_then(|q| one_of(b, q, b"jJ")))
}

fn integer(b: &[u8], p: usize) -> Option<usize> {
    let long = |q: usize| one_of(b, q, b"lL").unwrap_or(q);
    match b.get(p) {
        Some(b'0') => {
            let radix = match b.get(p + 1) {
                Some(b'x' | b'X') => digits_in(b, p + 2, |c| c.is_ascii_hexdigit()).map(long),
                Some(b'b' | b'B') => digits_in(b, p + 2, |c| c == b'0' || c == b'1').map(long),
                Some(b'o' | b'O') => digits_in(b, p + 2, |c| (b'0'..=b'7').contains(&c)),
                _ => None,
            };
            radix.or_else(|| {
                let q = digits_in(b, p + 1, |c| (b'0'..=b'7').contains(&c)).unwrap_or(p + 1);
                Some(long(q))
            })
        }
        Some(b'1'..=b'9') => digits(b, p).map(long),
        _ => None,
    }
}

fn number(b: &[u8], p: usize) -> Option<usize> {
    imaginary(b, p)
        .or_else(|| float(b, p))
        .or_else(|| integer(b, p))
}

/// `\*\*=?|>>=?|<<=?|<>|!=|//=?|[+\-*/%&|^=<>]=?|~`
fn operator(b: &[u8], p: usize) -> Option<usize> {
    let eq = |q: usize| one_of(b, q, b"=").unwrap_or(q);
    let rest = b.get(p..).unwrap_or_default();
    if rest.starts_with(b"**") || rest.starts_with(b">>") || rest.starts_with(b"<<") {
        return Some(eq(p + 2));
    }
    if rest.starts_with(b"<>") || rest.starts_with(b"!=") {
        return Some(p + 2);
    }
    if rest.starts_with(b"//") {
        return Some(eq(p + 2));
    }
    if let Some(q) = one_of(b, p, b"+-*/%&|^=<>") {
        return Some(eq(q));
    }
    one_of(b, p, b"~")
}

/// `[][(){}]|\r?\n|[:;.,`@]`
fn punctuation(b: &[u8], p: usize) -> Option<usize> {
    if let Some(q) = one_of(b, p, b"[](){}:;.,`@\n") {
        return Some(q);
    }
    if b.get(p) == Some(&b'\r') && b.get(p + 1) == Some(&b'\n') {
        return Some(p + 2);
    }
    None
}

/// `[uUbB]?[rR]?` 前缀加单引号或双引号字符串，支持反斜杠转义，不能跨行。
fn string(b: &[u8], p: usize) -> Option<usize> {
    let mut q = p;
    if matches!(b.get(q), Some(b'u' | b'U' | b'b' | b'B')) {
        q += 1;
    }
    if matches!(b.get(q), Some(b'r' | b'R')) {
        q += 1;
    }
    let quote = *b.get(q).filter(|c| **c == b'\'' || **c == b'"')?;
    q += 1;
    while q < b.len() {
        match b[q] {
            c if c == quote => return Some(q + 1),
            b'\n' => return None,
            b'\\' => {
                if matches!(b.get(q + 1), None | Some(b'\n')) {
                    return None;
                }
                q += 2;
            }
            _ => q += 1,
        }
    }
    None
}

/// `[a-zA-Z_]\w*`
fn name(b: &[u8], p: usize) -> Option<usize> {
    let first = *b.get(p)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    digits_in(b, p, is_name_char)
}
