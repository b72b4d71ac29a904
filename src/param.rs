//! SqlParam 与 SqlLiteral：绑定参数与“已安全”的原始 SQL 标记。

use crate::param_style::ParamStyle;
use crate::query::SqlQuery;
use crate::value::SqlValue;
use std::fmt;

/// 一个绑定参数。渲染时变成占位符，值交给驱动绑定。
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParam {
    pub(crate) value: SqlValue,
}

impl SqlParam {
    pub fn new(value: impl Into<SqlValue>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &SqlValue {
        &self.value
    }

    pub fn into_value(self) -> SqlValue {
        self.value
    }

    pub fn marker(&self, style: ParamStyle) -> &'static str {
        style.marker()
    }

    /// 包装成只含一个参数的 SqlQuery。
    pub fn to_query(&self) -> SqlQuery {
        SqlQuery::from(self.clone())
    }
}

/// sqlparam：`SqlParam::new` 的简写。
pub fn sqlparam(value: impl Into<SqlValue>) -> SqlParam {
    SqlParam::new(value)
}

/// SqlLiteral：标记为原样拼入 SQL（不会成为参数占位符）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlLiteral {
    pub(crate) expr: String,
}

impl SqlLiteral {
    pub fn new(expr: impl Into<String>) -> Self {
        Self { expr: expr.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }
}

impl fmt::Display for SqlLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

/// literal：`SqlValue::Literal` 的简写，例如 `literal("NOW()")`。
pub fn literal(expr: impl Into<String>) -> SqlValue {
    SqlValue::Literal(SqlLiteral::new(expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn param_equality_is_by_value() {
        assert_eq!(sqlparam(1_i64), SqlParam::new(SqlValue::I64(1)));
        assert_ne!(sqlparam(1_i64), sqlparam("1"));
    }

    #[test]
    fn param_marker_follows_style() {
        let p = sqlparam("joe");
        assert_eq!(p.marker(ParamStyle::Qmark), "?");
        assert_eq!(p.marker(ParamStyle::Pyformat), "%s");
    }

    #[test]
    fn param_to_query() {
        let q = sqlparam("joe").to_query();
        assert_eq!(q.values(), vec![SqlValue::from("joe")]);
    }

    #[test]
    fn literal_param_becomes_text() {
        let q = SqlParam::new(literal("NOW()")).to_query();
        assert_eq!(q.values(), Vec::<SqlValue>::new());
        assert_eq!(q.query(ParamStyle::Pyformat), "NOW()");
    }
}
