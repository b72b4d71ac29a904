//! SqlQuery：由文本片段与绑定参数组成的 SQL 片段，是整个库的核心表示。
//!
//! 所有 builder、模板插值的产物都是 SqlQuery；执行前按 [`ParamStyle`]
//! 渲染成 `(带占位符的 SQL, 参数列表)` 交给驱动。

use crate::error::Result;
use crate::param::SqlParam;
use crate::param_style::ParamStyle;
use crate::quote::sqlify;
use crate::sql_text::SqlText;
use crate::value::SqlValue;
use std::fmt;
use std::ops::{Add, AddAssign};

/// SqlQuery 中的一项。
#[derive(Debug, Clone, PartialEq)]
pub enum SqlItem {
    Text(String),
    Param(SqlParam),
}

impl SqlItem {
    /// 包着 SqlLiteral 的参数在这里被替换成原始文本。
    fn normalize(self) -> Self {
        match self {
            Self::Param(SqlParam {
                value: SqlValue::Literal(lit),
            }) => Self::Text(lit.expr),
            other => other,
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl From<&str> for SqlItem {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlItem {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<SqlParam> for SqlItem {
    fn from(v: SqlParam) -> Self {
        Self::Param(v)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlQuery {
    items: Vec<SqlItem>,
}

impl SqlQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = SqlItem>) -> Self {
        Self {
            items: items.into_iter().map(SqlItem::normalize).collect(),
        }
    }

    pub fn items(&self) -> &[SqlItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<SqlItem> {
        self.items
    }

    /// 没有任何项，或只有空文本。
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(SqlItem::is_blank)
    }

    /// 追加一项（原地修改）。
    pub fn append(&mut self, item: impl Into<SqlItem>) -> &mut Self {
        self.items.push(item.into().normalize());
        self
    }

    pub fn push_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.items.push(SqlItem::Text(text.into()));
        self
    }

    pub fn push_param(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.append(SqlParam::new(value))
    }

    /// 逐项拼接另一个片段（不嵌套）。
    pub fn extend(&mut self, other: impl Into<SqlQuery>) -> &mut Self {
        self.items.extend(other.into().items);
        self
    }

    /// 返回 `self ++ other` 的新片段，`self` 不变。
    pub fn concat(&self, other: impl Into<SqlQuery>) -> SqlQuery {
        let mut out = self.clone();
        out.extend(other);
        out
    }

    /// Query：按 `style` 渲染 SQL 文本。
    ///
    /// `%s` 类风格下会自动把文本里的 `%` 转义成 `%%`；
    /// 如果片段中已经出现 `%%`，认为调用方已转义过，不再处理。
    pub fn query(&self, style: ParamStyle) -> String {
        let mut sql = SqlText::new();
        for item in &self.items {
            match item {
                SqlItem::Param(p) => sql.raw(p.marker(style)),
                SqlItem::Text(s) if style.escapes_percent() && s.contains('%') && !s.contains("%%") => {
                    sql.raw(&s.replace('%', "%%"))
                }
                SqlItem::Text(s) => sql.raw(s),
            };
        }
        sql.finish()
    }

    /// Values：按出现顺序返回所有参数值。
    pub fn values(&self) -> Vec<SqlValue> {
        self.items
            .iter()
            .filter_map(|item| match item {
                SqlItem::Param(p) => Some(p.value.clone()),
                SqlItem::Text(_) => None,
            })
            .collect()
    }

    pub fn param_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, SqlItem::Param(_)))
            .count()
    }

    /// Render：一次得到 `(text, values)`，直接交给驱动。
    pub fn render(&self, style: ParamStyle) -> (String, Vec<SqlValue>) {
        (self.query(style), self.values())
    }

    /// 按风格名渲染；未知风格返回 `UnknownParamStyle`。
    pub fn render_named(&self, style: Option<&str>) -> Result<(String, Vec<SqlValue>)> {
        let style = ParamStyle::parse(style)?;
        Ok(self.render(style))
    }

    /// Join：把若干片段用 `sep` 连接成一个新片段，空元素会被跳过。
    pub fn join<I, T>(items: I, sep: &str) -> SqlQuery
    where
        I: IntoIterator<Item = T>,
        T: Into<SqlQuery>,
    {
        let mut out = SqlQuery::new();
        out.join_into(items, sep, None, None);
        out
    }

    /// 与 [`SqlQuery::join`] 相同，但在前后加上 `prefix` / `suffix`。
    pub fn join_wrapped<I, T>(items: I, sep: &str, prefix: &str, suffix: &str) -> SqlQuery
    where
        I: IntoIterator<Item = T>,
        T: Into<SqlQuery>,
    {
        let mut out = SqlQuery::new();
        out.join_into(items, sep, Some(prefix), Some(suffix));
        out
    }

    /// 把 join 的结果直接追加到 `self`，适合增量构建。
    pub fn join_into<I, T>(
        &mut self,
        items: I,
        sep: &str,
        prefix: Option<&str>,
        suffix: Option<&str>,
    ) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SqlQuery>,
    {
        if let Some(p) = prefix.filter(|p| !p.is_empty()) {
            self.push_text(p);
        }

        let mut first = true;
        for item in items {
            let item: SqlQuery = item.into();
            if item.is_empty() {
                continue;
            }
            if !first && !sep.is_empty() {
                self.push_text(sep);
            }
            first = false;
            self.items.extend(item.items);
        }

        if let Some(s) = suffix.filter(|s| !s.is_empty()) {
            self.push_text(s);
        }
        self
    }

    /// 把参数值直接代入文本，仅用于日志/调试，绝不能拿去执行。
    ///
    /// 占位符数量与参数数量对不上、或文本里有无法识别的 `%` 指令时，
    /// 退回带 `%s` 占位符的原始文本。
    pub fn display(&self) -> String {
        let text = self.query(ParamStyle::Pyformat);
        let values = self.values();
        substitute(&text, &values).unwrap_or(text)
    }
}

fn substitute(text: &str, values: &[SqlValue]) -> Option<String> {
    let mut out = String::with_capacity(text.len() + values.len() * 8);
    let mut it = values.iter();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('s') => out.push_str(&sqlify(it.next()?)),
            _ => return None,
        }
    }
    if it.next().is_some() {
        return None;
    }
    Some(out)
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for SqlQuery {
    fn from(v: &str) -> Self {
        Self::from_items([SqlItem::from(v)])
    }
}

impl From<String> for SqlQuery {
    fn from(v: String) -> Self {
        Self::from_items([SqlItem::from(v)])
    }
}

impl From<&String> for SqlQuery {
    fn from(v: &String) -> Self {
        Self::from(v.as_str())
    }
}

impl From<SqlParam> for SqlQuery {
    fn from(v: SqlParam) -> Self {
        Self::from_items([SqlItem::Param(v)])
    }
}

impl From<SqlItem> for SqlQuery {
    fn from(v: SqlItem) -> Self {
        Self::from_items([v])
    }
}

impl From<&SqlQuery> for SqlQuery {
    fn from(v: &SqlQuery) -> Self {
        v.clone()
    }
}

impl<T: Into<SqlQuery>> Add<T> for SqlQuery {
    type Output = SqlQuery;

    fn add(mut self, rhs: T) -> Self::Output {
        self.extend(rhs);
        self
    }
}

impl Add<SqlQuery> for &str {
    type Output = SqlQuery;

    fn add(self, rhs: SqlQuery) -> Self::Output {
        SqlQuery::from(self) + rhs
    }
}

impl Add<SqlQuery> for String {
    type Output = SqlQuery;

    fn add(self, rhs: SqlQuery) -> Self::Output {
        SqlQuery::from(self) + rhs
    }
}

impl<T: Into<SqlQuery>> Add<T> for SqlParam {
    type Output = SqlQuery;

    fn add(self, rhs: T) -> Self::Output {
        SqlQuery::from(self) + rhs
    }
}

impl Add<SqlParam> for &str {
    type Output = SqlQuery;

    fn add(self, rhs: SqlParam) -> Self::Output {
        SqlQuery::from(self) + rhs
    }
}

impl<T: Into<SqlQuery>> AddAssign<T> for SqlQuery {
    fn add_assign(&mut self, rhs: T) {
        self.extend(rhs);
    }
}
