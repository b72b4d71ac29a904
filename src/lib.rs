//! crystaldb：安全的 SQL 片段拼接、模板插值与参数绑定，外加一层轻量的执行上下文。
//!
//! 核心是 [`SqlQuery`]：文本与绑定参数交替组成的片段。模板里的变量经
//! [`reparam`] / [`interpolate`] 求值后一律变成参数，只有 [`SqlLiteral`] 会原样进入 SQL。
//!
//! ```
//! use crystaldb::{ParamStyle, reparam, vars};
//!
//! let q = reparam("SELECT * FROM user WHERE id = $id", &vars! { "id" => 80 }).unwrap();
//! assert_eq!(q.query(ParamStyle::Qmark), "SELECT * FROM user WHERE id = ?");
//! assert_eq!(q.display(), "SELECT * FROM user WHERE id = 80");
//! ```

pub mod backend;
pub mod builder;
pub mod config;
pub mod database;
pub mod delete;
pub mod driver;
pub mod error;
pub mod insert;
pub mod interpolate;
pub mod macros;
pub mod param;
pub mod param_style;
pub mod query;
pub mod quote;
pub mod registry;
pub mod result;
pub mod select;
pub mod session;
#[cfg(test)]
mod session_tests;
mod sql_text;
pub mod template;
#[cfg(test)]
mod testing;
pub mod transaction;
pub mod update;
pub mod value;
pub mod where_clause;

pub use crate::backend::Backend;
pub use crate::builder::{Builder, Table};
pub use crate::config::{ConnectParams, DbConfig};
pub use crate::database::{Database, Options};
pub use crate::delete::DeleteBuilder;
pub use crate::driver::{Connection, Cursor, Driver, RawRow};
pub use crate::error::{DriverError, Error, Result};
pub use crate::insert::{InsertBuilder, RowValues};
pub use crate::interpolate::{Vars, eval_expr, eval_nodes, interpolate, reparam};
pub use crate::param::{SqlLiteral, SqlParam, literal, sqlparam};
pub use crate::param_style::ParamStyle;
pub use crate::query::{SqlItem, SqlQuery};
pub use crate::quote::{sqlify, sqllist, sqlquote, sqlwhere};
pub use crate::registry::Registry;
pub use crate::result::{ResultSet, Row};
pub use crate::select::{Join, JoinKind, SelectBuilder};
pub use crate::session::{QueryInfo, Session};
pub use crate::template::{Node, Parser, Sigil, parse_template};
pub use crate::transaction::{Transaction, TxKind};
pub use crate::update::UpdateBuilder;
pub use crate::value::SqlValue;
pub use crate::where_clause::Where;
