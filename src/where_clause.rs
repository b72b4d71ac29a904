//! Where：写操作与查询共用的 WHERE 条件输入。

use crate::error::{Error, Result};
use crate::interpolate::{Vars, reparam};
use crate::param::SqlParam;
use crate::query::SqlQuery;
use crate::value::SqlValue;
use std::collections::BTreeMap;

/// WHERE 条件的几种写法。
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// `id = <p>`
    Id(i64),
    /// 每个键生成 `k = <p>`，按键名排序后连接。
    Map(BTreeMap<String, SqlValue>),
    /// 已经构造好的片段，原样使用。
    Query(SqlQuery),
    /// 模板，按变量表插值（见 [`reparam`]）。
    Template(String, Vars),
    /// 带 `%s` 占位符的文本与按顺序对应的值。
    Pair(String, Vec<SqlValue>),
}

impl Where {
    pub fn template(sql: impl Into<String>, vars: Vars) -> Self {
        Self::Template(sql.into(), vars)
    }

    pub fn map<K: Into<String>, V: Into<SqlValue>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// 转成 SqlQuery；`Map` 的各项用 `joiner` 连接（一般是 `" AND "`）。
    pub fn to_query(&self, joiner: &str) -> Result<SqlQuery> {
        match self {
            Self::Id(id) => Ok("id = " + SqlParam::new(*id)),
            Self::Map(entries) => Ok(where_map(entries, "=", joiner)),
            Self::Query(q) => Ok(q.clone()),
            Self::Template(sql, vars) => reparam(sql, vars),
            Self::Pair(sql, values) => pair(sql, values),
        }
    }
}

/// `k <op> <p>` 按键排序后用 `joiner` 连接。
pub(crate) fn where_map<'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a SqlValue)>,
    op: &str,
    joiner: &str,
) -> SqlQuery {
    let mut sorted: Vec<_> = entries.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    SqlQuery::join(
        sorted
            .into_iter()
            .map(|(k, v)| SqlQuery::from(format!("{k} {op} ")) + SqlParam::new(v.clone())),
        joiner,
    )
}

fn pair(sql: &str, values: &[SqlValue]) -> Result<SqlQuery> {
    let parts: Vec<&str> = sql.split("%s").collect();
    if parts.len() != values.len() + 1 {
        return Err(Error::MalformedExpression {
            text: sql.to_string(),
            pos: sql.len(),
        });
    }
    let mut out = SqlQuery::new();
    for (i, part) in parts.iter().enumerate() {
        if !part.is_empty() {
            out.push_text(*part);
        }
        if let Some(v) = values.get(i) {
            out.push_param(v.clone());
        }
    }
    Ok(out)
}

impl From<i64> for Where {
    fn from(v: i64) -> Self {
        Self::Id(v)
    }
}

impl From<SqlQuery> for Where {
    fn from(v: SqlQuery) -> Self {
        Self::Query(v)
    }
}

impl From<&str> for Where {
    fn from(v: &str) -> Self {
        Self::Template(v.to_string(), Vars::new())
    }
}

impl From<String> for Where {
    fn from(v: String) -> Self {
        Self::Template(v, Vars::new())
    }
}

impl From<BTreeMap<String, SqlValue>> for Where {
    fn from(v: BTreeMap<String, SqlValue>) -> Self {
        Self::Map(v)
    }
}
