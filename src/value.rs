//! SQL 值类型：参数、模板变量与结果行共用的封闭枚举。

use crate::param::SqlLiteral;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// SQL 值。
///
/// 模板插值需要对变量做 `a.b` / `a[0]` 访问，所以除标量外还包含
/// `List` 与 `Map` 两种嵌套形态。
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(Cow<'static, str>),
    Bytes(Vec<u8>),
    Date(time::Date),
    /// 不带时区的日期时间。
    DateTime(time::PrimitiveDateTime),
    /// 带偏移量的时间戳。
    Timestamp(time::OffsetDateTime),
    List(Vec<SqlValue>),
    Map(BTreeMap<String, SqlValue>),
    /// 可信的原始 SQL，永远不会作为绑定参数发给驱动。
    Literal(SqlLiteral),
}

impl SqlValue {
    /// 将 `Option<T>` 映射为 `SqlValue`：`None => Null`，`Some(v) => v.into()`。
    pub fn from_option<T: Into<SqlValue>>(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }

    /// 从任意可迭代值构造 `List`。
    pub fn list<T: Into<SqlValue>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// 从键值对构造 `Map`。
    pub fn map<K: Into<String>, V: Into<SqlValue>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(n) => Some(*n),
            Self::U64(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// 用于错误信息的类型名。
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I64(_) | Self::U64(_) => "int",
            Self::F64(_) => "float",
            Self::String(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::DateTime(_) | Self::Timestamp(_) => "datetime",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Literal(_) => "literal",
        }
    }
}

impl From<()> for SqlValue {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for SqlValue {
    fn from(v: i8) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u8> for SqlValue {
    fn from(v: u8) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u16> for SqlValue {
    fn from(v: u16) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::F64(v as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::String(Cow::Owned(v))
    }
}

impl From<&'static str> for SqlValue {
    fn from(v: &'static str) -> Self {
        Self::String(Cow::Borrowed(v))
    }
}

/// `Vec<T>` 一律视为 `List`；二进制数据请直接构造 `SqlValue::Bytes`。
impl<T: Into<SqlValue>> From<Vec<T>> for SqlValue {
    fn from(v: Vec<T>) -> Self {
        Self::list(v)
    }
}

impl<T: Into<SqlValue>, const N: usize> From<[T; N]> for SqlValue {
    fn from(v: [T; N]) -> Self {
        Self::list(v)
    }
}

impl From<BTreeMap<String, SqlValue>> for SqlValue {
    fn from(v: BTreeMap<String, SqlValue>) -> Self {
        Self::Map(v)
    }
}

impl From<time::Date> for SqlValue {
    fn from(v: time::Date) -> Self {
        Self::Date(v)
    }
}

impl From<time::PrimitiveDateTime> for SqlValue {
    fn from(v: time::PrimitiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<time::OffsetDateTime> for SqlValue {
    fn from(v: time::OffsetDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl From<&SqlValue> for SqlValue {
    fn from(v: &SqlValue) -> Self {
        v.clone()
    }
}

impl From<SqlLiteral> for SqlValue {
    fn from(v: SqlLiteral) -> Self {
        Self::Literal(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        Self::from_option(v)
    }
}
