//! 宏集合：`vars!` 用来快速构造插值变量表。

/// 构造 [`crate::Vars`]：`vars! { "id" => 1, "name" => "joe" }`。
///
/// 值只要实现 `Into<SqlValue>` 即可。
#[macro_export]
macro_rules! vars {
    () => {
        $crate::Vars::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut vars = $crate::Vars::new();
        $(
            vars.insert(::std::string::String::from($key), $crate::SqlValue::from($value));
        )*
        vars
    }};
}
