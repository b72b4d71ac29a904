//! 测试用的假驱动：记录所有调用，并按脚本返回结果。

use crate::config::ConnectParams;
use crate::driver::{Connection, Cursor, Driver, RawRow};
use crate::error::DriverError;
use crate::value::SqlValue;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connect,
    Execute(String, Vec<SqlValue>),
    Commit,
    Rollback,
    Close,
}

/// 一条语句执行后的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub columns: Option<Vec<String>>,
    pub rows: Vec<RawRow>,
    pub rowcount: i64,
}

impl Reply {
    pub fn rows(columns: &[&str], rows: Vec<RawRow>) -> Self {
        Self {
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
            rowcount: rows.len() as i64,
            rows,
        }
    }

    pub fn affected(rowcount: i64) -> Self {
        Self {
            columns: None,
            rows: Vec::new(),
            rowcount,
        }
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::affected(1)
    }
}

#[derive(Debug, Default)]
struct State {
    events: Vec<Event>,
    replies: VecDeque<Reply>,
    fail_on: Vec<String>,
    params: Option<ConnectParams>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<State>>,
}

impl FakeDriver {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// 追加下一条语句的结果；没有脚本时返回 `Reply::default()`。
    pub fn reply(&self, reply: Reply) -> &Self {
        self.state().replies.push_back(reply);
        self
    }

    /// SQL 中包含 `pattern` 的语句执行失败。
    pub fn fail_on(&self, pattern: &str) -> &Self {
        self.state().fail_on.push(pattern.to_string());
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// 只看执行过的 SQL。
    pub fn statements(&self) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Execute(sql, _) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_params(&self) -> Option<ConnectParams> {
        self.state().params.clone()
    }
}

impl Driver for FakeDriver {
    fn connect(&self, params: &ConnectParams) -> Result<Box<dyn Connection>, DriverError> {
        let mut state = self.state();
        state.events.push(Event::Connect);
        state.params = Some(params.clone());
        Ok(Box::new(FakeConnection {
            driver: self.clone(),
        }))
    }
}

struct FakeConnection {
    driver: FakeDriver,
}

impl Connection for FakeConnection {
    fn cursor(&mut self) -> Result<Box<dyn Cursor>, DriverError> {
        Ok(Box::new(FakeCursor {
            driver: self.driver.clone(),
            reply: Reply::affected(-1),
        }))
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        self.driver.state().events.push(Event::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        self.driver.state().events.push(Event::Rollback);
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.driver.state().events.push(Event::Close);
        Ok(())
    }
}

struct FakeCursor {
    driver: FakeDriver,
    reply: Reply,
}

impl Cursor for FakeCursor {
    fn execute(&mut self, sql: &str, values: &[SqlValue]) -> Result<(), DriverError> {
        let mut state = self.driver.state();
        state
            .events
            .push(Event::Execute(sql.to_string(), values.to_vec()));
        if state.fail_on.iter().any(|p| sql.contains(p.as_str())) {
            return Err(format!("failed: {sql}").into());
        }
        self.reply = state.replies.pop_front().unwrap_or_default();
        Ok(())
    }

    fn fetchone(&mut self) -> Result<Option<RawRow>, DriverError> {
        if self.reply.rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.reply.rows.remove(0)))
    }

    fn rowcount(&self) -> i64 {
        self.reply.rowcount
    }

    fn description(&self) -> Option<Vec<String>> {
        self.reply.columns.clone()
    }
}
