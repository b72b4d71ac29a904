//! DeleteBuilder：构建 DELETE 语句。

use crate::builder::Builder;
use crate::error::Result;
use crate::query::SqlQuery;
use crate::quote::sqllist;
use crate::where_clause::Where;

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBuilder {
    table: String,
    using: Vec<String>,
    filter: Option<Where>,
}

impl DeleteBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            using: Vec::new(),
            filter: None,
        }
    }

    /// `DELETE FROM t USING a, b`
    pub fn using<T: Into<String>>(&mut self, tables: impl IntoIterator<Item = T>) -> &mut Self {
        self.using = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(&mut self, filter: impl Into<Where>) -> &mut Self {
        self.filter = Some(filter.into());
        self
    }
}

impl Builder for DeleteBuilder {
    fn to_query(&self) -> Result<SqlQuery> {
        let mut q = SqlQuery::from(format!("DELETE FROM {}", self.table));
        if !self.using.is_empty() {
            q += format!(" USING {}", sqllist(&self.using));
        }
        if let Some(filter) = &self.filter {
            let w = filter.to_query(" AND ")?;
            if !w.is_empty() {
                q += " WHERE ";
                q += w;
            }
        }
        Ok(q)
    }
}
