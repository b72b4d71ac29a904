//! UpdateBuilder：构建 UPDATE 语句。

use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::query::SqlQuery;
use crate::quote::{sqllist, sqlwhere};
use crate::value::SqlValue;
use crate::where_clause::Where;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBuilder {
    tables: Vec<String>,
    assignments: BTreeMap<String, SqlValue>,
    filter: Option<Where>,
}

impl UpdateBuilder {
    pub fn new<T: Into<String>>(tables: impl IntoIterator<Item = T>) -> Self {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            assignments: BTreeMap::new(),
            filter: None,
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.assignments.insert(column.into(), value.into());
        self
    }

    pub fn set_all<K: Into<String>, V: Into<SqlValue>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self {
        self.assignments
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn filter(&mut self, filter: impl Into<Where>) -> &mut Self {
        self.filter = Some(filter.into());
        self
    }
}

impl Builder for UpdateBuilder {
    fn to_query(&self) -> Result<SqlQuery> {
        if self.assignments.is_empty() {
            return Err(Error::EmptyValues);
        }
        let mut q = SqlQuery::from(format!("UPDATE {} SET ", sqllist(&self.tables)));
        q += sqlwhere(&self.assignments, ", ");
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
