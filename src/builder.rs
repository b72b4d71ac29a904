//! Builder 抽象与 Table：各类语句 builder 的公共接口。

use crate::delete::DeleteBuilder;
use crate::error::Result;
use crate::insert::InsertBuilder;
use crate::param_style::ParamStyle;
use crate::query::SqlQuery;
use crate::select::SelectBuilder;
use crate::update::UpdateBuilder;
use crate::value::SqlValue;
use crate::where_clause::Where;
use dyn_clone::DynClone;

/// 所有语句 builder 的公共能力：产出一个 [`SqlQuery`]。
pub trait Builder: DynClone {
    fn to_query(&self) -> Result<SqlQuery>;

    /// 按占位符风格渲染成 `(sql, values)`。
    fn build(&self, style: ParamStyle) -> Result<(String, Vec<SqlValue>)> {
        Ok(self.to_query()?.render(style))
    }
}

dyn_clone::clone_trait_object!(Builder);

impl Builder for SqlQuery {
    fn to_query(&self) -> Result<SqlQuery> {
        Ok(self.clone())
    }
}

/// Table：绑定了表名的 builder 工厂。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 查询指定字段；空列表表示 `*`。
    pub fn select<T: Into<String>>(&self, fields: impl IntoIterator<Item = T>) -> SelectBuilder {
        let mut sb = SelectBuilder::new([self.name.as_str()]);
        sb.fields(fields);
        sb
    }

    pub fn insert(&self) -> InsertBuilder {
        InsertBuilder::new(&self.name)
    }

    pub fn update(&self, filter: impl Into<Where>) -> UpdateBuilder {
        let mut ub = UpdateBuilder::new([self.name.as_str()]);
        ub.filter(filter);
        ub
    }

    pub fn delete(&self, filter: impl Into<Where>) -> DeleteBuilder {
        let mut db = DeleteBuilder::new(&self.name);
        db.filter(filter);
        db
    }
}
