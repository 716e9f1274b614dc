use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::Mapper;
use crate::value::{Value, numeric_mul};

/// Multiplies the listed numeric columns into a result column.  An empty
/// column list produces 0.
pub struct Product {
    columns: Vec<String>,
    result: String,
}

impl Product {
    pub fn new(columns: &[&str], result: impl Into<String>) -> Self {
        Self {
            columns: columns.iter().map(|column| column.to_string()).collect(),
            result: result.into(),
        }
    }
}

impl Mapper for Product {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let mut product = if self.columns.is_empty() {
            Value::Int(0)
        } else {
            Value::Int(1)
        };
        for column in &self.columns {
            let value = row.get(column)?;
            product = numeric_mul(&product, value)
                .ok_or_else(|| Error::column_type(column, "number", value.kind()))?;
        }
        row.set(self.result.as_str(), product);
        Ok(vec![row])
    }
}

/// Applies an arbitrary function of the listed columns, storing the
/// outcome in a result column.  The function sees the column values in
/// the listed order.
pub struct Arithmetic {
    func: Box<dyn Fn(&[Value]) -> Result<Value>>,
    columns: Vec<String>,
    result: String,
}

impl Arithmetic {
    pub fn new(
        func: impl Fn(&[Value]) -> Result<Value> + 'static,
        columns: &[&str],
        result: impl Into<String>,
    ) -> Self {
        Self {
            func: Box::new(func),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            result: result.into(),
        }
    }
}

impl Mapper for Arithmetic {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let args: Vec<Value> = self
            .columns
            .iter()
            .map(|column| row.get(column).cloned())
            .collect::<Result<_>>()?;
        row.set(self.result.as_str(), (self.func)(&args)?);
        Ok(vec![row])
    }
}
