//! InsertBuilder：构建 INSERT 语句，支持单行、多行、`INSERT IGNORE` 与
//! `ON DUPLICATE KEY UPDATE`。列按名字排序。

use crate::backend::Backend;
use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::param::SqlParam;
use crate::query::SqlQuery;
use crate::quote::sqllist;
use crate::value::SqlValue;
use crate::where_clause::Where;
use std::collections::BTreeMap;

pub type RowValues = BTreeMap<String, SqlValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct InsertBuilder {
    table: String,
    rows: Vec<RowValues>,
    ignore: bool,
    default_values: Option<Backend>,
    on_duplicate: Option<Where>,
}

impl InsertBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            rows: Vec::new(),
            ignore: false,
            default_values: None,
            on_duplicate: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn rows(&self) -> &[RowValues] {
        &self.rows
    }

    fn first_row(&mut self) -> &mut RowValues {
        if self.rows.is_empty() {
            self.rows.push(RowValues::new());
        }
        &mut self.rows[0]
    }

    /// 给第一行设置一个列值。
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.first_row().insert(column.into(), value.into());
        self
    }

    /// 给第一行批量设置列值。
    pub fn values<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        let row = self.first_row();
        row.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// 追加一行，多行插入要求每行的列完全相同。
    pub fn add_row<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.rows
            .push(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// `INSERT IGNORE INTO`
    pub fn ignore(&mut self) -> &mut Self {
        self.ignore = true;
        self
    }

    /// 没有列值时改为插入一行默认值（语句由 `backend` 决定）。
    pub fn default_values(&mut self, backend: Backend) -> &mut Self {
        self.default_values = Some(backend);
        self
    }

    /// `ON DUPLICATE KEY UPDATE ...`，`Map` 形式的各项用 `" , "` 连接。
    pub fn on_duplicate_update(&mut self, filter: impl Into<Where>) -> &mut Self {
        self.on_duplicate = Some(filter.into());
        self
    }

    /// 拆成每行一个的 builder，用于不支持多行 VALUES 的数据库。
    pub fn split_rows(&self) -> Vec<InsertBuilder> {
        self.rows
            .iter()
            .map(|row| InsertBuilder {
                rows: vec![row.clone()],
                ..self.clone()
            })
            .collect()
    }

    fn head(&self) -> &'static str {
        if self.ignore {
            "INSERT IGNORE INTO"
        } else {
            "INSERT INTO"
        }
    }
}

fn row_values(row: &RowValues) -> SqlQuery {
    SqlQuery::join_wrapped(row.values().cloned().map(SqlParam::new), ", ", "(", ")")
}

impl Builder for InsertBuilder {
    fn to_query(&self) -> Result<SqlQuery> {
        let rows = &self.rows;
        let first = match rows.first() {
            Some(first) if rows.iter().any(|r| !r.is_empty()) => first,
            _ => {
                return match self.default_values {
                    Some(backend) => Ok(SqlQuery::from(backend.default_values_sql(&self.table))),
                    None => Err(Error::EmptyValues),
                };
            }
        };

        // 空行与其他行的列不同，同样视为形状不一致
        if rows.iter().any(|r| !r.keys().eq(first.keys())) {
            return Err(Error::MismatchedRowShape);
        }

        let mut q = SqlQuery::from(format!(
            "{} {} ({}) VALUES ",
            self.head(),
            self.table,
            sqllist(first.keys())
        ));
        q.join_into(rows.iter().map(|r| row_values(r)), ", ", None, None);

        if let Some(filter) = &self.on_duplicate {
            q += " ON DUPLICATE KEY UPDATE ";
            q += filter.to_query(" , ")?;
        }
        Ok(q)
    }
}
