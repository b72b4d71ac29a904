//! 值的引用与列表辅助：`sqlify` 只用于展示，`sqlquote` 总是走参数绑定。

use crate::param::SqlParam;
use crate::query::SqlQuery;
use crate::value::SqlValue;
use time::format_description::FormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const MICROS_FORMAT: &[FormatItem<'static>] = format_description!("[subsecond digits:6]");
const OFFSET_FORMAT: &[FormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

/// Sqlify：把值转成它在 SQL 文本中的字面形式。
///
/// 只用于日志展示（见 [`SqlQuery::display`]），引用方式很朴素，
/// 不能防注入，绝不能用来拼接真正执行的 SQL。
///
/// 布尔值输出 `'t'` / `'f'`，与标准 SQL 的 `TRUE` / `FALSE` 不同。
pub fn sqlify(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(true) => "'t'".to_string(),
        SqlValue::Bool(false) => "'f'".to_string(),
        SqlValue::I64(n) => n.to_string(),
        SqlValue::U64(n) => n.to_string(),
        SqlValue::F64(n) => format!("{n:?}"),
        SqlValue::String(s) => format!("'{s}'"),
        SqlValue::Bytes(b) => format!("'{}'", String::from_utf8_lossy(b)),
        SqlValue::Date(d) => format!("'{}'", iso_date(*d)),
        SqlValue::DateTime(dt) => format!("'{}'", iso_datetime(*dt)),
        SqlValue::Timestamp(ts) => format!("'{}'", iso_timestamp(*ts)),
        SqlValue::List(items) => {
            let parts: Vec<String> = items.iter().map(sqlify).collect();
            format!("[{}]", parts.join(", "))
        }
        SqlValue::Map(entries) => {
            let parts: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("'{k}': {}", sqlify(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        SqlValue::Literal(lit) => lit.as_str().to_string(),
    }
}

fn iso_date(d: time::Date) -> String {
    d.format(DATE_FORMAT).unwrap_or_else(|_| d.to_string())
}

fn iso_time(t: time::Time) -> String {
    let mut s = t.format(TIME_FORMAT).unwrap_or_else(|_| t.to_string());
    // 微秒为 0 时不输出小数部分
    if t.microsecond() != 0 {
        s.push('.');
        s.push_str(&t.format(MICROS_FORMAT).unwrap_or_default());
    }
    s
}

fn iso_datetime(dt: time::PrimitiveDateTime) -> String {
    format!("{}T{}", iso_date(dt.date()), iso_time(dt.time()))
}

fn iso_timestamp(ts: time::OffsetDateTime) -> String {
    let offset = ts
        .offset()
        .format(OFFSET_FORMAT)
        .unwrap_or_else(|_| ts.offset().to_string());
    format!("{}T{}{offset}", iso_date(ts.date()), iso_time(ts.time()))
}

/// Sqlquote：保证值以参数形式进入 SQL。
///
/// `List` 展开成 `(p1, p2, ...)`，方便写 `IN $ids`；其它值包装成单个参数。
pub fn sqlquote(value: impl Into<SqlValue>) -> SqlQuery {
    match value.into() {
        SqlValue::List(items) => sqllist_params(items),
        other => SqlParam::new(other).to_query(),
    }
}

fn sqllist_params(items: Vec<SqlValue>) -> SqlQuery {
    SqlQuery::join_wrapped(items.into_iter().map(SqlParam::new), ", ", "(", ")")
}

/// Sqllist：`["a", "b"]` => `"a, b"`，用于字段列表与表名列表。
pub fn sqllist<T: AsRef<str>>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sqlwhere：把 `(列, 值)` 序列转成 `a = %s AND b = %s`，`grouping` 可改成 `", "`。
pub fn sqlwhere<K, V>(pairs: impl IntoIterator<Item = (K, V)>, grouping: &str) -> SqlQuery
where
    K: AsRef<str>,
    V: Into<SqlValue>,
{
    let clauses: Vec<SqlQuery> = pairs
        .into_iter()
        .map(|(k, v)| SqlQuery::from(format!("{} = ", k.as_ref())) + SqlParam::new(v))
        .collect();
    SqlQuery::join(clauses, grouping)
}
