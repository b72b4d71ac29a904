//! 驱动能力：本库只依赖这三个 trait，具体数据库驱动由使用方实现并注册。

use crate::config::ConnectParams;
use crate::error::DriverError;
use crate::value::SqlValue;
use dyn_clone::DynClone;

/// 一行原始数据，列顺序与 [`Cursor::description`] 一致。
pub type RawRow = Vec<SqlValue>;

/// 驱动：负责建立连接。
pub trait Driver: DynClone + Send + Sync {
    fn connect(&self, params: &ConnectParams) -> Result<Box<dyn Connection>, DriverError>;
}

dyn_clone::clone_trait_object!(Driver);

/// 连接。`commit` / `rollback` / `close` 默认什么都不做。
pub trait Connection: Send {
    fn cursor(&mut self) -> Result<Box<dyn Cursor>, DriverError>;

    fn commit(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

/// 游标：执行一条语句并逐行取结果。
pub trait Cursor: Send {
    fn execute(&mut self, sql: &str, values: &[SqlValue]) -> Result<(), DriverError>;

    fn fetchone(&mut self) -> Result<Option<RawRow>, DriverError>;

    fn fetchall(&mut self) -> Result<Vec<RawRow>, DriverError> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetchone()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// 受影响（或返回）的行数，未知时为 -1。
    fn rowcount(&self) -> i64;

    /// 结果集的列名；语句不返回结果集时为 `None`。
    fn description(&self) -> Option<Vec<String>>;
}
