use once_cell::sync::Lazy;
use regex::Regex;

use super::str_column;
use crate::error::Result;
use crate::row::Row;
use crate::types::Mapper;

static NON_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new("[^a-zA-Z ]").unwrap());
static WORD_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

/// Strips every character outside `[A-Za-z ]` from a column.
pub struct FilterPunctuation {
    column: String,
}

impl FilterPunctuation {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for FilterPunctuation {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let cleaned = NON_LETTER
            .replace_all(str_column(&row, &self.column)?, "")
            .into_owned();
        row.set(self.column.as_str(), cleaned);
        Ok(vec![row])
    }
}

/// ASCII lower-cases a column.
pub struct LowerCase {
    column: String,
}

impl LowerCase {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for LowerCase {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let lowered = str_column(&row, &self.column)?.to_ascii_lowercase();
        row.set(self.column.as_str(), lowered);
        Ok(vec![row])
    }
}

/// Splits a column into tokens, emitting one copy of the row per token
/// with the column replaced by it.  Without a separator, splitting is on
/// the `\W+` word-break pattern.
pub struct Split {
    column: String,
    separator: Option<String>,
}

impl Split {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            separator: None,
        }
    }

    pub fn with_separator(column: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            separator: Some(separator.into()),
        }
    }
}

impl Mapper for Split {
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        let text = str_column(&row, &self.column)?.to_owned();
        let emit = |token: &str| {
            let mut out = row.clone();
            out.set(self.column.as_str(), token);
            out
        };
        Ok(match &self.separator {
            Some(separator) => text.split(separator.as_str()).map(emit).collect(),
            None => WORD_BREAK.split(&text).map(emit).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::row;

    #[test]
    fn punctuation_is_stripped() {
        let out = FilterPunctuation::new("text")
            .map(row! { "text": "Hello, world! 42", "id": 7 })
            .unwrap();
        assert_eq!(out, vec![row! { "text": "Hello world ", "id": 7 }]);
    }

    #[test]
    fn lower_case_is_ascii() {
        let out = LowerCase::new("text").map(row! { "text": "MiXeD" }).unwrap();
        assert_eq!(out, vec![row! { "text": "mixed" }]);
    }

    #[test]
    fn split_without_separator_breaks_on_non_word_runs() {
        let out = Split::new("text")
            .map(row! { "text": "one  two\tthree", "doc": 1 })
            .unwrap();
        assert_eq!(
            out,
            vec![
                row! { "text": "one", "doc": 1 },
                row! { "text": "two", "doc": 1 },
                row! { "text": "three", "doc": 1 },
            ]
        );
    }

    #[test]
    fn split_with_separator_honours_it() {
        let out = Split::with_separator("csv", ",")
            .map(row! { "csv": "a,b,,c" })
            .unwrap();
        assert_eq!(
            out,
            vec![
                row! { "csv": "a" },
                row! { "csv": "b" },
                row! { "csv": "" },
                row! { "csv": "c" },
            ]
        );
    }

    #[test]
    fn non_string_column_is_a_type_error() {
        let result = LowerCase::new("text").map(row! { "text": 5 });
        assert!(matches!(result, Err(Error::ColumnType { .. })));
    }
}
