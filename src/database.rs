//! Database：一个数据库的连接信息与驱动，可以在线程间共享。
//!
//! 每个工作线程（或任务）通过 [`Database::session`] 拿到自己的 [`Session`]。

use crate::backend::Backend;
use crate::config::{ConnectParams, DbConfig};
use crate::driver::Driver;
use crate::error::Result;
use crate::param_style::ParamStyle;
use crate::registry::Registry;
use crate::session::Session;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 执行层开关。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub debug: bool,
    pub debug_queries: bool,
    pub ignore_nested_transactions: bool,
}

impl From<&DbConfig> for Options {
    fn from(cfg: &DbConfig) -> Self {
        Self {
            debug: cfg.debug,
            debug_queries: cfg.debug_queries,
            ignore_nested_transactions: cfg.ignore_nested_transactions,
        }
    }
}

#[derive(Clone)]
pub struct Database {
    backend: Backend,
    driver: Arc<dyn Driver>,
    params: ConnectParams,
    options: Options,
}

impl Database {
    /// 按配置选出后端与驱动。
    ///
    /// 配置里指定了 `driver` 时只使用它，否则依次尝试后端的候选驱动。
    pub fn open(config: &DbConfig, registry: &Registry) -> Result<Self> {
        let backend = config.backend()?;
        let driver = registry.resolve(backend.driver_candidates(), config.driver.as_deref())?;
        debug!(backend = %backend, database = ?config.database, "Opening database");
        Ok(Self::with_driver(backend, Arc::from(driver), config))
    }

    pub fn with_driver(backend: Backend, driver: Arc<dyn Driver>, config: &DbConfig) -> Self {
        Self {
            backend,
            driver,
            params: config.connect_params(backend),
            options: Options::from(config),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn param_style(&self) -> ParamStyle {
        self.backend.param_style()
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn connect_params(&self) -> &ConnectParams {
        &self.params
    }

    pub(crate) fn driver(&self) -> &dyn Driver {
        &*self.driver
    }

    /// 新建一个会话；连接在第一次执行语句时才建立。
    pub fn session(&self) -> Session {
        Session::new(self.clone())
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("backend", &self.backend)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
