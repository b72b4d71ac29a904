//! Backend：支持的数据库种类，以及每种数据库在 SQL 上的少量差异。

use crate::error::Error;
use crate::param::SqlParam;
use crate::param_style::ParamStyle;
use crate::query::SqlQuery;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    MySql,
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    pub fn param_style(self) -> ParamStyle {
        match self {
            Self::MySql | Self::Postgres => ParamStyle::Pyformat,
            Self::Sqlite => ParamStyle::Qmark,
        }
    }

    /// 没有任何列值时插入一行默认值的语句。
    pub fn default_values_sql(self, table: &str) -> String {
        match self {
            Self::MySql => format!("INSERT INTO {table} () VALUES()"),
            Self::Postgres | Self::Sqlite => format!("INSERT INTO {table} DEFAULT VALUES"),
        }
    }

    /// 插入后获取自增 id 的查询。Postgres 需要序列名，缺省为 `<table>_id_seq`。
    pub fn insert_id_query(self, table: &str, seqname: Option<&str>) -> SqlQuery {
        match self {
            Self::MySql => SqlQuery::from("SELECT last_insert_id();"),
            Self::Postgres => {
                let seq = seqname.map_or_else(|| format!("{table}_id_seq"), str::to_string);
                "SELECT currval(" + SqlParam::new(seq) + ");"
            }
            Self::Sqlite => SqlQuery::from("SELECT last_insert_rowid();"),
        }
    }

    /// 是否支持一条语句插入多行（`VALUES (...), (...)`）。
    pub fn supports_multiple_insert(self) -> bool {
        matches!(self, Self::MySql | Self::Postgres)
    }

    /// 按优先顺序排列的驱动名。
    pub fn driver_candidates(self) -> &'static [&'static str] {
        match self {
            Self::MySql => &["mysql", "mariadb"],
            Self::Postgres => &["postgres", "tokio-postgres"],
            Self::Sqlite => &["sqlite", "rusqlite"],
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(Error::UnknownDatabase(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
