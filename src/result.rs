//! 查询结果：按列名访问的 [`Row`]，以及只能遍历一次的 [`ResultSet`]。

use crate::driver::{Cursor, RawRow};
use crate::error::{Error, Result};
use crate::value::SqlValue;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// 一行结果，列名与驱动报告的一致。
#[derive(Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: RawRow) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 按列名取值；同名列取第一个。
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    pub fn into_map(self) -> BTreeMap<String, SqlValue> {
        self.columns.iter().cloned().zip(self.values).collect()
    }
}

impl Index<&str> for Row {
    type Output = SqlValue;

    fn index(&self, column: &str) -> &SqlValue {
        match self.get(column) {
            Some(v) => v,
            None => panic!("no such column: {column}"),
        }
    }
}

impl Index<usize> for Row {
    type Output = SqlValue;

    fn index(&self, index: usize) -> &SqlValue {
        &self.values[index]
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.columns.iter().zip(self.values.iter()))
            .finish()
    }
}

/// 查询返回的行序列，惰性地从游标读取，不能重新开始。
pub struct ResultSet {
    cursor: Box<dyn Cursor>,
    columns: Arc<[String]>,
    done: bool,
}

impl ResultSet {
    /// `columns` 为 `None` 表示语句没有结果集，此时迭代直接结束。
    pub fn new(cursor: Box<dyn Cursor>, columns: Option<Vec<String>>) -> Self {
        let done = columns.is_none();
        Self {
            cursor,
            columns: columns.unwrap_or_default().into(),
            done,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 驱动报告的行数，未知时为 -1。
    pub fn len(&self) -> i64 {
        self.cursor.rowcount()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读出剩下的所有行。
    pub fn list(mut self) -> Result<Vec<Row>> {
        if self.done {
            return Ok(Vec::new());
        }
        let rows = self.cursor.fetchall().map_err(Error::Driver)?;
        Ok(rows.into_iter().map(|r| self.row(r)).collect())
    }

    pub fn first(mut self) -> Result<Option<Row>> {
        self.next().transpose()
    }

    fn row(&self, values: RawRow) -> Row {
        Row::new(Arc::clone(&self.columns), values)
    }
}

impl Iterator for ResultSet {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.fetchone() {
            Ok(Some(values)) => Some(Ok(self.row(values))),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(Error::Driver(e)))
            }
        }
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("columns", &self.columns)
            .field("rowcount", &self.len())
            .finish()
    }
}
