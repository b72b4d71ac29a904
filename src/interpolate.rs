//! 模板插值：解析 → 按变量表求值 → 每个值都经 [`sqlquote`] 变成绑定参数。
//!
//! 变量值永远不会以文本形式拼进 SQL；只有 [`crate::SqlLiteral`] 会原样输出。

use crate::error::{Error, Result};
use crate::query::SqlQuery;
use crate::quote::sqlquote;
use crate::template::{Node, Sigil, parse_template};
use crate::value::SqlValue;
use std::collections::HashMap;

/// 插值用的变量表。
pub type Vars = HashMap<String, SqlValue>;

/// Interpolate：用 `sigil` 解析 `template` 并按 `vars` 求值。
pub fn interpolate(template: &str, vars: &Vars, sigil: Sigil) -> Result<SqlQuery> {
    let nodes = parse_template(template, sigil)?;
    eval_nodes(&nodes, vars)
}

/// Reparam：自动选择引导符（见 [`Sigil::detect`]）后插值。
///
/// ```
/// use crystaldb::{reparam, vars};
///
/// let q = reparam("s IN $s", &vars! { "s" => vec![1, 2] }).unwrap();
/// assert_eq!(q.display(), "s IN (1, 2)");
/// ```
pub fn reparam(template: &str, vars: &Vars) -> Result<SqlQuery> {
    interpolate(template, vars, Sigil::detect(template))
}

/// 对已经解析好的节点求值，同一份节点可以绑定不同的变量表。
pub fn eval_nodes(nodes: &[Node], vars: &Vars) -> Result<SqlQuery> {
    let parts = nodes
        .iter()
        .map(|node| eval_node(node, vars))
        .collect::<Result<Vec<_>>>()?;
    Ok(SqlQuery::join(parts, ""))
}

fn eval_node(node: &Node, vars: &Vars) -> Result<SqlQuery> {
    match node {
        Node::Text(s) => Ok(SqlQuery::from(s.as_str())),
        other => Ok(sqlquote(eval_expr(other, vars)?)),
    }
}

/// 求出表达式节点的值。
pub fn eval_expr(node: &Node, vars: &Vars) -> Result<SqlValue> {
    match node {
        Node::Text(s) => Ok(SqlValue::from(s.clone())),
        Node::Literal(token) => eval_literal(token),
        Node::Param(name) => vars
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnboundVariable(name.clone())),
        Node::GetAttr(inner, attr) => get_attr(eval_expr(inner, vars)?, attr),
        Node::GetItem(inner, key) => {
            let target = eval_expr(inner, vars)?;
            let key = eval_expr(key, vars)?;
            get_item(target, &key)
        }
    }
}

fn get_attr(target: SqlValue, attr: &str) -> Result<SqlValue> {
    match target {
        SqlValue::Map(mut entries) => entries
            .remove(attr)
            .ok_or_else(|| Error::InvalidAccess(format!("map has no attribute {attr:?}"))),
        other => Err(Error::InvalidAccess(format!(
            "{} has no attribute {attr:?}",
            other.type_name()
        ))),
    }
}

/// 负下标从尾部计数。
fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let i = if index < 0 { len + index } else { index };
    (0..len).contains(&i).then(|| i as usize)
}

fn get_item(target: SqlValue, key: &SqlValue) -> Result<SqlValue> {
    let out_of_range = |kind: &str| Error::InvalidAccess(format!("{kind} index out of range"));
    match (target, key) {
        (SqlValue::List(mut items), key) if key.as_i64().is_some() => {
            let i = key.as_i64().and_then(|i| resolve_index(items.len(), i));
            i.map(|i| items.swap_remove(i))
                .ok_or_else(|| out_of_range("list"))
        }
        (SqlValue::Map(mut entries), SqlValue::String(k)) => entries
            .remove(k.as_ref())
            .ok_or_else(|| Error::InvalidAccess(format!("key not found: {k:?}"))),
        (SqlValue::String(s), key) if key.as_i64().is_some() => {
            let chars: Vec<char> = s.chars().collect();
            let i = key.as_i64().and_then(|i| resolve_index(chars.len(), i));
            i.map(|i| SqlValue::from(chars[i].to_string()))
                .ok_or_else(|| out_of_range("string"))
        }
        (SqlValue::Bytes(bytes), key) if key.as_i64().is_some() => {
            let i = key.as_i64().and_then(|i| resolve_index(bytes.len(), i));
            i.map(|i| SqlValue::U64(u64::from(bytes[i])))
                .ok_or_else(|| out_of_range("bytes"))
        }
        (target, key) => Err(Error::InvalidAccess(format!(
            "{} indices must not be {}",
            target.type_name(),
            key.type_name()
        ))),
    }
}

/// 常量 token 求值：整数（含 `0x` / `0o` / `0b` / 旧式八进制与 `L` 后缀）、浮点数、字符串。
/// 虚数没有对应的 SQL 值，返回 `InvalidLiteral`。
fn eval_literal(token: &str) -> Result<SqlValue> {
    let invalid = || Error::InvalidLiteral(token.to_string());
    let first = token.chars().next().ok_or_else(invalid)?;

    if first == '\'' || first == '"' {
        return eval_string(token).ok_or_else(invalid);
    }
    if token.ends_with(['j', 'J']) {
        return Err(invalid());
    }
    if token.contains(['.', 'e', 'E']) && !token.starts_with("0x") && !token.starts_with("0X") {
        return token
            .parse::<f64>()
            .map(SqlValue::F64)
            .map_err(|_| invalid());
    }
    eval_int(token).ok_or_else(invalid)
}

fn eval_int(token: &str) -> Option<SqlValue> {
    let t = token.trim_end_matches(['l', 'L']);
    let (digits, radix) = match t.get(..2) {
        Some("0x" | "0X") => (&t[2..], 16),
        Some("0o" | "0O") => (&t[2..], 8),
        Some("0b" | "0B") => (&t[2..], 2),
        _ if t.len() > 1 && t.starts_with('0') => (&t[1..], 8),
        _ => (t, 10),
    };
    if let Ok(n) = i64::from_str_radix(digits, radix) {
        return Some(SqlValue::I64(n));
    }
    u64::from_str_radix(digits, radix).ok().map(SqlValue::U64)
}

fn eval_string(token: &str) -> Option<SqlValue> {
    let body = token.get(1..token.len().checked_sub(1)?)?;
    unescape(body).map(SqlValue::from)
}

fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(e) = chars.next() else {
            out.push('\\');
            break;
        };
        match e {
            '\\' | '\'' | '"' => out.push(e),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '\n' => {}
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            '0'..='7' => {
                let mut n = e.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            n = n * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(n)?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

fn hex_escape(chars: &mut impl Iterator<Item = char>, n: usize) -> Option<char> {
    let s: String = chars.take(n).collect();
    if s.len() != n {
        return None;
    }
    char::from_u32(u32::from_str_radix(&s, 16).ok()?)
}
