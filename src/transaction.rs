//! 事务：会话上的一个栈帧，以 RAII 守卫的形式交给调用方。
//!
//! ```ignore
//! let mut tx = session.transaction()?;
//! tx.execute("UPDATE account SET balance = balance - 10")?;
//! tx.commit()?;
//! ```
//!
//! 守卫未提交就被 drop 时自动回滚。

use crate::error::Result;
use crate::query::SqlQuery;
use crate::session::Session;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// 事务帧的实现方式，开启时决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    /// 最外层事务，直接提交/回滚连接。
    TopLevel,
    /// 嵌套事务，使用 `SAVEPOINT crystal_sp_<depth>`。
    Savepoint,
    /// 嵌套事务被忽略。
    Disabled,
}

impl TxKind {
    pub fn for_depth(depth: usize, ignore_nested: bool) -> Self {
        match (depth, ignore_nested) {
            (0, _) => Self::TopLevel,
            (_, true) => Self::Disabled,
            (_, false) => Self::Savepoint,
        }
    }

    pub(crate) fn begin(self, session: &mut Session, depth: usize) -> Result<()> {
        match self {
            // 结束连接上可能残留的隐式事务
            Self::TopLevel => session.commit_connection(),
            Self::Savepoint => savepoint(session, "SAVEPOINT", depth),
            Self::Disabled => Ok(()),
        }
    }

    pub(crate) fn commit(self, session: &mut Session, depth: usize) -> Result<()> {
        match self {
            Self::TopLevel => session.commit_connection(),
            Self::Savepoint => savepoint(session, "RELEASE SAVEPOINT", depth),
            Self::Disabled => Ok(()),
        }
    }

    pub(crate) fn rollback(self, session: &mut Session, depth: usize) -> Result<()> {
        match self {
            Self::TopLevel => session.rollback_connection(),
            Self::Savepoint => savepoint(session, "ROLLBACK TO SAVEPOINT", depth),
            Self::Disabled => Ok(()),
        }
    }
}

pub fn savepoint_name(depth: usize) -> String {
    format!("crystal_sp_{depth}")
}

fn savepoint(session: &mut Session, verb: &str, depth: usize) -> Result<()> {
    let q = SqlQuery::from(format!("{verb} {}", savepoint_name(depth)));
    session.execute_raw(&q).map(drop)
}

/// 事务守卫，可以当作 [`Session`] 使用。
#[derive(Debug)]
pub struct Transaction<'s> {
    session: &'s mut Session,
    depth: usize,
    done: bool,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(session: &'s mut Session, depth: usize) -> Self {
        Self {
            session,
            depth,
            done: false,
        }
    }

    /// 事务在栈中的位置，最外层为 0。
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 提交本事务，并丢弃在它之后开启的所有事务。
    pub fn commit(mut self) -> Result<()> {
        self.done = true;
        self.session.commit_frame(self.depth)
    }

    /// 回滚本事务，并丢弃在它之后开启的所有事务。
    pub fn rollback(mut self) -> Result<()> {
        self.done = true;
        self.session.rollback_frame(self.depth)
    }
}

impl Deref for Transaction<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(e) = self.session.rollback_frame(self.depth) {
            warn!(depth = self.depth, error = %e, "Rollback of dropped transaction failed");
        }
    }
}
