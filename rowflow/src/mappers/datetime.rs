use chrono::{NaiveDateTime, Timelike};

use super::{datetime_column, str_column};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::Mapper;

/// The wire format for timestamps: `YYYYMMDDThhmmss.ffffff`, with the
/// fractional seconds optional.
pub const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S%.f";

/// Parses a string column into a datetime column.
pub struct ParseDatetime {
    column: String,
    datetime_column: String,
}

impl ParseDatetime {
    pub fn new(column: impl Into<String>, datetime_column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            datetime_column: datetime_column.into(),
        }
    }
}

impl Mapper for ParseDatetime {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let text = str_column(&row, &self.column)?;
        let parsed =
            NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|source| {
                Error::Datetime {
                    value: text.to_owned(),
                    source,
                }
            })?;
        row.set(self.datetime_column.as_str(), parsed);
        Ok(vec![row])
    }
}

/// Stores `leave - enter` as fractional hours.
pub struct DurationHours {
    enter_column: String,
    leave_column: String,
    result: String,
}

impl DurationHours {
    pub fn new(
        enter_column: impl Into<String>,
        leave_column: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            enter_column: enter_column.into(),
            leave_column: leave_column.into(),
            result: result.into(),
        }
    }
}

impl Mapper for DurationHours {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let enter = datetime_column(&row, &self.enter_column)?;
        let leave = datetime_column(&row, &self.leave_column)?;
        let delta = leave - enter;
        let hours = match delta.num_microseconds() {
            Some(micros) => micros as f64 / 3.6e9,
            None => delta.num_milliseconds() as f64 / 3.6e6,
        };
        row.set(self.result.as_str(), hours);
        Ok(vec![row])
    }
}

/// Derives the 3-letter English weekday (`Mon`..`Sun`) and the hour
/// (0..23) of a datetime column.
pub struct WeekdayHour {
    datetime_column: String,
    weekday_column: String,
    hour_column: String,
}

impl WeekdayHour {
    pub fn new(
        datetime_column: impl Into<String>,
        weekday_column: impl Into<String>,
        hour_column: impl Into<String>,
    ) -> Self {
        Self {
            datetime_column: datetime_column.into(),
            weekday_column: weekday_column.into(),
            hour_column: hour_column.into(),
        }
    }
}

impl Mapper for WeekdayHour {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let datetime = datetime_column(&row, &self.datetime_column)?;
        row.set(
            self.weekday_column.as_str(),
            datetime.format("%a").to_string(),
        );
        row.set(self.hour_column.as_str(), datetime.hour() as i64);
        Ok(vec![row])
    }
}
