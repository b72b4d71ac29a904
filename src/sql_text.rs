//! 拼 SQL 子句文本用的小工具：关键字之间补空格，列表跳过空项。

#[derive(Debug, Default, Clone)]
pub(crate) struct SqlText {
    sql: String,
}

impl SqlText {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 追加一个关键字或名字，与前面的内容以单个空格分隔。
    pub(crate) fn word(&mut self, word: &str) -> &mut Self {
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(word);
        self
    }

    /// 原样追加。
    pub(crate) fn raw(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    /// 列名、表名列表；空字符串不占位，也不产生多余的分隔符。
    pub(crate) fn list<S: AsRef<str>>(&mut self, names: &[S], sep: &str) -> &mut Self {
        let mut names = names.iter().map(AsRef::as_ref).filter(|n| !n.is_empty());
        if let Some(head) = names.next() {
            self.sql.push_str(head);
            for name in names {
                self.sql.push_str(sep);
                self.sql.push_str(name);
            }
        }
        self
    }

    pub(crate) fn finish(self) -> String {
        self.sql
    }
}

#[cfg(test)]
mod tests {
    use super::SqlText;
    use pretty_assertions::assert_eq;

    #[test]
    fn join_clause_words() {
        let mut t = SqlText::new();
        t.word("LEFT JOIN").word("user_2").word("ON user_2.id = user.id");
        assert_eq!(t.finish(), "LEFT JOIN user_2 ON user_2.id = user.id");
    }

    #[test]
    fn field_list_skips_blank_names() {
        let mut t = SqlText::new();
        t.raw("DISTINCT ").list(&["name", "", "age"], ", ");
        assert_eq!(t.finish(), "DISTINCT name, age");
    }
}
