use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::Mapper;
use crate::value::Value;

/// Yields every row unchanged.
pub struct Identity;

impl Mapper for Identity {
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        Ok(vec![row])
    }
}

/// Keeps only the listed columns, in the listed order.  A column the row
/// does not carry becomes null.
pub struct Project {
    columns: Vec<String>,
}

impl Project {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|column| column.to_string()).collect(),
        }
    }
}

impl Mapper for Project {
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        let mut out = Row::new();
        for column in &self.columns {
            out.set(
                column.as_str(),
                row.opt(column).cloned().unwrap_or(Value::Null),
            );
        }
        Ok(vec![out])
    }
}

/// Keeps a row iff the predicate holds.
pub struct Filter {
    predicate: Box<dyn Fn(&Row) -> bool>,
}

impl Filter {
    pub fn new(predicate: impl Fn(&Row) -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl Mapper for Filter {
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        Ok(if (self.predicate)(&row) {
            vec![row]
        } else {
            Vec::new()
        })
    }
}

/// Moves a column's value under a new name.  The old column disappears
/// and the new one lands at the end of the row.
pub struct RenameColumn {
    column: String,
    new_column: String,
}

impl RenameColumn {
    pub fn new(column: impl Into<String>, new_column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            new_column: new_column.into(),
        }
    }
}

impl Mapper for RenameColumn {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let value = row
            .remove(&self.column)
            .ok_or_else(|| Error::missing_column(&self.column))?;
        row.set(self.new_column.as_str(), value);
        Ok(vec![row])
    }
}
