//! 占位符风格（DB-API paramstyle）：决定参数在 SQL 文本中渲染成什么。

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamStyle {
    /// `?`
    Qmark,
    /// `:1`
    Numeric,
    /// `%s`
    Format,
    /// `%s`（默认）
    #[default]
    Pyformat,
}

impl ParamStyle {
    /// 解析可选的风格名，`None` 视为默认风格。
    pub fn parse(name: Option<&str>) -> Result<Self, Error> {
        match name {
            None => Ok(Self::default()),
            Some(s) => s.parse(),
        }
    }

    /// 参数占位符。
    pub fn marker(self) -> &'static str {
        match self {
            Self::Qmark => "?",
            Self::Numeric => ":1",
            Self::Format | Self::Pyformat => "%s",
        }
    }

    /// `%s` 类风格下，文本中的 `%` 需要转义成 `%%`。
    pub fn escapes_percent(self) -> bool {
        matches!(self, Self::Format | Self::Pyformat)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qmark => "qmark",
            Self::Numeric => "numeric",
            Self::Format => "format",
            Self::Pyformat => "pyformat",
        }
    }
}

impl FromStr for ParamStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qmark" => Ok(Self::Qmark),
            "numeric" => Ok(Self::Numeric),
            "format" => Ok(Self::Format),
            "pyformat" => Ok(Self::Pyformat),
            other => Err(Error::UnknownParamStyle(other.to_string())),
        }
    }
}

impl fmt::Display for ParamStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ParamStyle;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn markers() {
        assert_eq!(ParamStyle::Qmark.marker(), "?");
        assert_eq!(ParamStyle::Numeric.marker(), ":1");
        assert_eq!(ParamStyle::Format.marker(), "%s");
        assert_eq!(ParamStyle::Pyformat.marker(), "%s");
    }

    #[test]
    fn parse_default_and_names() {
        assert_eq!(ParamStyle::parse(None).unwrap(), ParamStyle::Pyformat);
        assert_eq!(ParamStyle::parse(Some("qmark")).unwrap(), ParamStyle::Qmark);
        assert_eq!("numeric".parse::<ParamStyle>().unwrap(), ParamStyle::Numeric);
    }

    #[test]
    fn parse_unknown() {
        let err = ParamStyle::parse(Some("named")).unwrap_err();
        assert!(matches!(err, Error::UnknownParamStyle(s) if s == "named"));
    }
}
