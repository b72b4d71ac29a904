//! Session：一个工作线程独占的执行上下文。
//!
//! 会话持有连接、事务栈、语句计数与最近一条语句的调试信息。连接在第一次
//! 执行语句时建立，[`Session::close`] 或 drop 时关闭。
//!
//! 语句执行失败时，先回滚最内层事务（没有事务时回滚整个连接），再把原始错误返回。

use crate::builder::Builder;
use crate::database::Database;
use crate::delete::DeleteBuilder;
use crate::driver::{Connection, Cursor};
use crate::error::{Error, Result};
use crate::insert::InsertBuilder;
use crate::interpolate::{Vars, reparam};
use crate::query::SqlQuery;
use crate::result::{ResultSet, Row};
use crate::select::SelectBuilder;
use crate::transaction::{Transaction, TxKind};
use crate::update::UpdateBuilder;
use crate::value::SqlValue;
use std::fmt;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// 最近一条语句的耗时（毫秒）与展示形式。
#[derive(Debug, Clone, PartialEq)]
pub struct QueryInfo {
    pub run_time_ms: f64,
    pub sql: String,
}

pub struct Session {
    db: Database,
    conn: Option<Box<dyn Connection>>,
    transactions: Vec<TxKind>,
    statement_count: u64,
    last_query: Option<QueryInfo>,
}

impl Session {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            conn: None,
            transactions: Vec::new(),
            statement_count: 0,
            last_query: None,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// 已执行的语句条数（含失败的）。
    pub fn statement_count(&self) -> u64 {
        self.statement_count
    }

    /// 只有开启 `debug_queries` 时才会记录。
    pub fn last_query(&self) -> Option<&QueryInfo> {
        self.last_query.as_ref()
    }

    /// 当前事务栈深度。
    pub fn transaction_depth(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub(crate) fn connection(&mut self) -> Result<&mut Box<dyn Connection>> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                let conn = self
                    .db
                    .driver()
                    .connect(self.db.connect_params())
                    .map_err(Error::Driver)?;
                debug!(backend = %self.db.backend(), "Connected");
                conn
            }
        };
        Ok(self.conn.insert(conn))
    }

    /// 执行一条语句并返回游标，不触发失败回滚。
    pub(crate) fn execute_raw(&mut self, query: &SqlQuery) -> Result<Box<dyn Cursor>> {
        self.statement_count += 1;
        let (sql, values) = query.render(self.db.param_style());
        let start = Instant::now();

        let mut cursor = self.connection()?.cursor().map_err(Error::Driver)?;
        cursor.execute(&sql, &values).map_err(Error::Driver)?;

        let run_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        let options = self.db.options();
        let shown = query.display();
        if options.debug {
            debug!(count = self.statement_count, run_time_ms, sql = %shown, "Executed SQL");
        } else {
            trace!(count = self.statement_count, run_time_ms, sql = %shown, "Executed SQL");
        }
        if options.debug_queries {
            self.last_query = Some(QueryInfo {
                run_time_ms,
                sql: shown,
            });
        }
        Ok(cursor)
    }

    fn run(&mut self, query: &SqlQuery) -> Result<Box<dyn Cursor>> {
        self.connection()?;
        self.execute_raw(query).inspect_err(|e| {
            warn!(sql = %query.display(), error = %e, "ERR");
            self.rollback_after_failure();
        })
    }

    fn rollback_after_failure(&mut self) {
        let result = match self.transactions.len() {
            0 => self.rollback_connection(),
            n => self.rollback_frame(n - 1),
        };
        if let Err(e) = result {
            warn!(error = %e, "Rollback after failed statement also failed");
        }
    }

    fn autocommit(&mut self) -> Result<()> {
        if self.transactions.is_empty() {
            self.commit_connection()?;
        }
        Ok(())
    }

    pub(crate) fn commit_connection(&mut self) -> Result<()> {
        self.connection()?.commit().map_err(Error::Driver)
    }

    pub(crate) fn rollback_connection(&mut self) -> Result<()> {
        self.connection()?.rollback().map_err(Error::Driver)
    }

    /// 执行查询。没有事务时执行后立即提交。
    pub fn query(&mut self, query: impl Into<SqlQuery>) -> Result<ResultSet> {
        let query = query.into();
        let cursor = self.run(&query)?;
        let columns = cursor.description();
        self.autocommit()?;
        Ok(ResultSet::new(cursor, columns))
    }

    /// 先用 `vars` 插值模板（见 [`reparam`]）再执行。
    pub fn query_with(&mut self, template: &str, vars: &Vars) -> Result<ResultSet> {
        let query = reparam(template, vars)?;
        self.query(query)
    }

    /// 执行语句，返回受影响的行数。
    pub fn execute(&mut self, query: impl Into<SqlQuery>) -> Result<i64> {
        let query = query.into();
        let cursor = self.run(&query)?;
        self.autocommit()?;
        Ok(cursor.rowcount())
    }

    pub fn execute_builder(&mut self, builder: &dyn Builder) -> Result<i64> {
        self.execute(builder.to_query()?)
    }

    pub fn select_all(&mut self, select: &SelectBuilder) -> Result<Vec<Row>> {
        self.query(select.to_query()?)?.list()
    }

    pub fn select_first(&mut self, select: &SelectBuilder) -> Result<Option<Row>> {
        self.query(select.to_query()?)?.first()
    }

    /// 执行 `COUNT(*) AS COUNT` 变体并取出计数。
    pub fn select_count(&mut self, select: &SelectBuilder, distinct: Option<&str>) -> Result<i64> {
        let row = self.select_first(&select.count(distinct))?;
        match row.as_ref().and_then(|r| r.get("COUNT")) {
            Some(v) => as_i64(v).ok_or_else(|| Error::InvalidAccess(format!("COUNT = {v:?}"))),
            None => Ok(0),
        }
    }

    /// 插入并返回受影响的行数。
    pub fn insert(&mut self, insert: &InsertBuilder) -> Result<i64> {
        self.execute(insert.to_query()?)
    }

    /// 插入后再查询自增 id。Postgres 需要序列名，缺省为 `<table>_id_seq`。
    pub fn insert_returning_id(&mut self, insert: &InsertBuilder, seqname: Option<&str>) -> Result<i64> {
        let query = insert.to_query()?;
        let id_query = self.db.backend().insert_id_query(insert.table(), seqname);
        self.run(&query)?;
        let mut cursor = self.run(&id_query)?;
        let row = cursor.fetchone().map_err(Error::Driver)?;
        self.autocommit()?;
        let Some(first) = row.as_ref().and_then(|r| r.first()) else {
            return Err(Error::InvalidAccess(format!("no id returned by {id_query}")));
        };
        as_i64(first).ok_or_else(|| Error::InvalidAccess(format!("id = {first:?}")))
    }

    /// 插入多行，返回受影响的行数。
    ///
    /// 后端不支持多行 `VALUES` 时逐行插入。没有任何行时直接返回 0。
    pub fn multiple_insert(&mut self, insert: &InsertBuilder) -> Result<i64> {
        if insert.rows().iter().all(|r| r.is_empty()) {
            return Ok(0);
        }
        let query = insert.to_query()?;
        if self.db.backend().supports_multiple_insert() {
            return self.execute(query);
        }
        let mut total = 0;
        for single in insert.split_rows() {
            total += self.insert(&single)?;
        }
        Ok(total)
    }

    /// 插入多行并返回每一行的 id。
    pub fn multiple_insert_ids(&mut self, insert: &InsertBuilder, seqname: Option<&str>) -> Result<Vec<i64>> {
        if insert.rows().iter().all(|r| r.is_empty()) {
            return Ok(Vec::new());
        }
        let count = insert.rows().len();
        insert.to_query()?;
        if self.db.backend().supports_multiple_insert() {
            let last = self.insert_returning_id(insert, seqname)?;
            let first = last - count as i64 + 1;
            return Ok((first..=last).collect());
        }
        insert
            .split_rows()
            .iter()
            .map(|single| self.insert_returning_id(single, seqname))
            .collect()
    }

    pub fn update(&mut self, update: &UpdateBuilder) -> Result<i64> {
        self.execute(update.to_query()?)
    }

    pub fn delete(&mut self, delete: &DeleteBuilder) -> Result<i64> {
        self.execute(delete.to_query()?)
    }

    /// 开启一个事务。栈顶为空时是顶层事务，否则是 SAVEPOINT
    /// （配置了 `ignore_nested_transactions` 时什么都不做）。
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        let depth = self.transactions.len();
        let kind = TxKind::for_depth(depth, self.db.options().ignore_nested_transactions);
        kind.begin(self, depth)?;
        self.transactions.push(kind);
        debug!(depth, kind = ?kind, "Transaction begin");
        Ok(Transaction::new(self, depth))
    }

    /// 提交 `depth` 处的事务，并丢弃它之上的所有事务。
    pub(crate) fn commit_frame(&mut self, depth: usize) -> Result<()> {
        let Some(&kind) = self.transactions.get(depth) else {
            return Ok(());
        };
        self.transactions.truncate(depth);
        debug!(depth, kind = ?kind, "Transaction commit");
        kind.commit(self, depth)
    }

    /// 回滚 `depth` 处的事务，并丢弃它之上的所有事务。
    pub(crate) fn rollback_frame(&mut self, depth: usize) -> Result<()> {
        let Some(&kind) = self.transactions.get(depth) else {
            return Ok(());
        };
        self.transactions.truncate(depth);
        debug!(depth, kind = ?kind, "Transaction rollback");
        kind.rollback(self, depth)
    }

    /// 关闭连接并清空事务栈。之后再执行语句会重新连接。
    pub fn close(&mut self) -> Result<()> {
        self.transactions.clear();
        match self.conn.take() {
            Some(mut conn) => {
                debug!(statements = self.statement_count, "Closing connection");
                conn.close().map_err(Error::Driver)
            }
            None => Ok(()),
        }
    }
}

fn as_i64(v: &SqlValue) -> Option<i64> {
    match v {
        SqlValue::I64(n) => Some(*n),
        SqlValue::U64(n) => i64::try_from(*n).ok(),
        SqlValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close connection");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("db", &self.db)
            .field("connected", &self.conn.is_some())
            .field("transactions", &self.transactions)
            .field("statement_count", &self.statement_count)
            .finish()
    }
}
