//! SelectBuilder：构建 SELECT 语句。
//!
//! 条件值全部以参数形式绑定；存在 JOIN 时主表字段与条件会自动加上 `表名.` 前缀。

use crate::builder::Builder;
use crate::error::Result;
use crate::param::SqlParam;
use crate::query::SqlQuery;
use crate::quote::{sqllist, sqlquote};
use crate::sql_text::SqlText;
use crate::value::SqlValue;
use crate::where_clause::{Where, where_map};
use std::collections::BTreeMap;

/// JOIN 类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// 一个 JOIN 子句：`using` 列用于生成 `ON t2.col = t1.col`，
/// `fields` 会追加到 SELECT 列表，`conditions` 追加到 WHERE。
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    kind: JoinKind,
    table: String,
    using: Option<String>,
    fields: Vec<String>,
    conditions: BTreeMap<String, SqlValue>,
}

impl Join {
    pub fn new(kind: JoinKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            using: None,
            fields: Vec::new(),
            conditions: BTreeMap::new(),
        }
    }

    pub fn inner(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, table)
    }

    pub fn left(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Left, table)
    }

    pub fn right(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Right, table)
    }

    pub fn full(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Full, table)
    }

    pub fn using(mut self, column: impl Into<String>) -> Self {
        self.using = Some(column.into());
        self
    }

    pub fn fields<T: Into<String>>(mut self, fields: impl IntoIterator<Item = T>) -> Self {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn filter<K: Into<String>, V: Into<SqlValue>>(
        mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.conditions
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// 主表上的一个条件：列名在 build 时才决定是否加前缀。
#[derive(Debug, Clone, PartialEq)]
struct Condition {
    column: String,
    tail: SqlQuery,
}

#[derive(Debug, Clone, PartialEq)]
enum What {
    Fields,
    Count(Option<String>),
}

#[derive(Debug, Clone)]
pub struct SelectBuilder {
    tables: Vec<String>,
    fields: Vec<String>,
    what: What,
    distinct: bool,
    conditions: Vec<Condition>,
    filter_by: Option<Where>,
    joins: Vec<Join>,
    group_by: Vec<String>,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectBuilder {
    pub fn new<T: Into<String>>(tables: impl IntoIterator<Item = T>) -> Self {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            fields: Vec::new(),
            what: What::Fields,
            distinct: false,
            conditions: Vec::new(),
            filter_by: None,
            joins: Vec::new(),
            group_by: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    /// 查询字段，不设置时为 `*`。
    pub fn fields<T: Into<String>>(&mut self, fields: impl IntoIterator<Item = T>) -> &mut Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    fn op_where<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        op: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        let sorted: BTreeMap<String, SqlValue> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        for (column, value) in sorted {
            let tail = SqlQuery::from(format!(" {op} ")) + SqlParam::new(value);
            self.conditions.push(Condition { column, tail });
        }
        self
    }

    /// `k = v`，同一次调用内按列名排序，多次调用之间用 AND 连接。
    pub fn filter<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.op_where("=", pairs)
    }

    pub fn eq<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.op_where("=", pairs)
    }

    pub fn ne<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.op_where("!=", pairs)
    }

    pub fn lt<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.op_where("<", pairs)
    }

    pub fn lte<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.op_where("<=", pairs)
    }

    pub fn gt<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.op_where(">", pairs)
    }

    pub fn gte<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.op_where(">=", pairs)
    }

    /// 任意 WHERE 输入，与其它条件用 AND 连接。
    pub fn filter_by(&mut self, filter: impl Into<Where>) -> &mut Self {
        self.filter_by = Some(filter.into());
        self
    }

    pub fn between(
        &mut self,
        column: impl Into<String>,
        low: impl Into<SqlValue>,
        high: impl Into<SqlValue>,
    ) -> &mut Self {
        let tail = " BETWEEN " + SqlParam::new(low) + " AND " + SqlParam::new(high);
        self.conditions.push(Condition {
            column: column.into(),
            tail,
        });
        self
    }

    fn list_where<T: Into<SqlValue>>(
        &mut self,
        op: &str,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        let tail = SqlQuery::from(format!(" {op} ")) + sqlquote(SqlValue::list(values));
        self.conditions.push(Condition {
            column: column.into(),
            tail,
        });
        self
    }

    /// `col IN (p1, p2, ...)`
    pub fn in_<T: Into<SqlValue>>(
        &mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.list_where("IN", column, values)
    }

    pub fn not_in<T: Into<SqlValue>>(
        &mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.list_where("NOT IN", column, values)
    }

    pub fn like(&mut self, column: impl Into<String>, pattern: impl Into<SqlValue>) -> &mut Self {
        let tail = " LIKE " + SqlParam::new(pattern);
        self.conditions.push(Condition {
            column: column.into(),
            tail,
        });
        self
    }

    pub fn join(&mut self, join: Join) -> &mut Self {
        self.joins.push(join);
        self
    }

    pub fn inner_join(&mut self, table: impl Into<String>, using: impl Into<String>) -> &mut Self {
        self.join(Join::inner(table).using(using))
    }

    pub fn left_join(&mut self, table: impl Into<String>, using: impl Into<String>) -> &mut Self {
        self.join(Join::left(table).using(using))
    }

    pub fn right_join(&mut self, table: impl Into<String>, using: impl Into<String>) -> &mut Self {
        self.join(Join::right(table).using(using))
    }

    pub fn full_join(&mut self, table: impl Into<String>, using: impl Into<String>) -> &mut Self {
        self.join(Join::full(table).using(using))
    }

    pub fn group_by<T: Into<String>>(&mut self, cols: impl IntoIterator<Item = T>) -> &mut Self {
        self.group_by.extend(cols.into_iter().map(Into::into));
        self
    }

    /// `reversed` 为 true 时每一列都加 `DESC`。
    pub fn order_by<T: Into<String>>(
        &mut self,
        cols: impl IntoIterator<Item = T>,
        reversed: bool,
    ) -> &mut Self {
        let cols: Vec<String> = cols
            .into_iter()
            .map(|c| {
                let c = c.into();
                if reversed { format!("{c} DESC") } else { c }
            })
            .collect();
        self.order_by = (!cols.is_empty()).then(|| cols.join(", "));
        self
    }

    /// 负数表示取消。
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = (limit >= 0).then_some(limit);
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = (offset >= 0).then_some(offset);
        self
    }

    /// 派生一个计数查询：`COUNT(*) AS COUNT` 或 `COUNT(DISTINCT col) AS COUNT`。
    pub fn count(&self, distinct: Option<&str>) -> SelectBuilder {
        let mut sb = self.clone();
        sb.what = What::Count(distinct.map(str::to_string));
        sb
    }

    fn primary_table(&self) -> Option<&str> {
        self.tables.first().map(String::as_str)
    }

    /// 有 JOIN 时给未限定的列加上 `table.` 前缀。
    fn qualify(&self, column: &str, table: Option<&str>) -> String {
        match table {
            Some(t) if !self.joins.is_empty() && !column.contains('.') => format!("{t}.{column}"),
            _ => column.to_string(),
        }
    }

    fn what(&self) -> String {
        let primary = self.primary_table();
        match &self.what {
            What::Count(None) => "COUNT(*) AS COUNT".to_string(),
            What::Count(Some(col)) => {
                format!("COUNT(DISTINCT {}) AS COUNT", self.qualify(col, primary))
            }
            What::Fields => {
                let mut fields: Vec<String> = if self.fields.is_empty() {
                    vec![self.qualify("*", primary)]
                } else {
                    self.fields
                        .iter()
                        .map(|f| self.qualify(f, primary))
                        .collect()
                };
                for join in &self.joins {
                    fields.extend(join.fields.iter().map(|f| self.qualify(f, Some(&join.table))));
                }
                let mut sql = SqlText::new();
                if self.distinct {
                    sql.raw("DISTINCT ");
                }
                sql.list(&fields, ", ");
                sql.finish()
            }
        }
    }

    fn where_clause(&self) -> Result<SqlQuery> {
        let primary = self.primary_table();
        let mut parts: Vec<SqlQuery> = self
            .conditions
            .iter()
            .map(|c| self.qualify(&c.column, primary) + c.tail.clone())
            .collect();
        if let Some(w) = &self.filter_by {
            parts.push(w.to_query(" AND ")?);
        }
        for join in &self.joins {
            let qualified: BTreeMap<String, SqlValue> = join
                .conditions
                .iter()
                .map(|(k, v)| (self.qualify(k, Some(&join.table)), v.clone()))
                .collect();
            parts.push(where_map(&qualified, "=", " AND "));
        }
        Ok(SqlQuery::join(parts, " AND "))
    }
}

impl Builder for SelectBuilder {
    fn to_query(&self) -> Result<SqlQuery> {
        let mut clauses: Vec<SqlQuery> = Vec::new();
        clauses.push(format!("SELECT {}", self.what()).into());
        clauses.push(format!("FROM {}", sqllist(&self.tables)).into());

        for join in &self.joins {
            let mut sql = SqlText::new();
            sql.word(join.kind.as_str()).word(&join.table);
            if let (Some(col), Some(primary)) = (&join.using, self.primary_table()) {
                sql.word(&format!("ON {}.{col} = {primary}.{col}", join.table));
            }
            clauses.push(sql.finish().into());
        }

        let where_clause = self.where_clause()?;
        if !where_clause.is_empty() {
            clauses.push("WHERE " + where_clause);
        }
        if !self.group_by.is_empty() {
            clauses.push(format!("GROUP BY {}", sqllist(&self.group_by)).into());
        }
        if let Some(order) = &self.order_by {
            clauses.push(format!("ORDER BY {order}").into());
        }
        if let Some(limit) = self.limit {
            clauses.push("LIMIT " + SqlParam::new(limit));
        }
        if let Some(offset) = self.offset {
            clauses.push("OFFSET " + SqlParam::new(offset));
        }
        Ok(SqlQuery::join(clauses, " "))
    }
}
