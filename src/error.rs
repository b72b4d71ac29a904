//! 错误类型：核心（解析/插值/渲染）与执行层共用一个枚举。

/// 驱动返回的错误，原样向上传递。
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 不支持的占位符风格（只认 qmark/numeric/format/pyformat）。
    #[error("unknown paramstyle: {0}")]
    UnknownParamStyle(String),

    /// 模板在 `pos` 处无法识别出任何 token。
    #[error("malformed expression in {text:?} at position {pos}")]
    MalformedExpression { text: String, pos: usize },

    /// 模板引用的变量不在 vars 中。
    #[error("unbound variable: {0}")]
    UnboundVariable(String),

    /// `a.b` / `a[b]` 访问失败。
    #[error("invalid access: {0}")]
    InvalidAccess(String),

    /// 模板里的常量无法求值（例如虚数）。
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("not all rows have the same keys")]
    MismatchedRowShape,

    #[error("values is empty")]
    EmptyValues,

    /// 候选驱动都没有注册。
    #[error("unable to load driver: {}", .0.join(" or "))]
    UnsupportedDriver(Vec<String>),

    #[error("unknown database: {0}")]
    UnknownDatabase(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("driver error: {0}")]
    Driver(#[source] DriverError),
}

impl Error {
    pub fn driver(err: impl Into<DriverError>) -> Self {
        Self::Driver(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
