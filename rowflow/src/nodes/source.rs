use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::RowStream;

pub(crate) type LineParser = dyn Fn(&str) -> Result<Row>;

/// Streams a file line by line through a user parser, one line one row.
/// The file is opened eagerly so a bad path fails at `run`, but lines are
/// read and parsed only as the stream is pulled.
pub(crate) fn read_file(path: &Path, parser: Rc<LineParser>) -> Result<RowStream> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("reading rows from {}", path.display());
    let path = path.to_path_buf();
    let lines = BufReader::new(file).lines().enumerate();
    let mut failed = false;
    Ok(Box::new(lines.map_while(move |(index, line)| {
        if failed {
            return None;
        }
        let parsed = match line {
            Ok(line) => parser(&line).map_err(|err| Error::Parse {
                line: index + 1,
                message: err.to_string(),
            }),
            Err(source) => Err(Error::Io {
                path: path.clone(),
                source,
            }),
        };
        failed = parsed.is_err();
        Some(parsed)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data").join(name)
    }

    #[test]
    fn reads_parsed_lines_lazily() {
        let stream =
            read_file(&fixture("docs.jsonl"), Rc::new(Row::from_json)).unwrap();
        let rows: Vec<Row> = stream.map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].get("doc_id").unwrap(), &Value::Int(1));
        assert!(rows.iter().all(|row| row.contains("text")));
    }

    #[test]
    fn missing_file_fails_at_wiring() {
        let result = read_file(&fixture("no_such_file"), Rc::new(Row::from_json));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn parser_failure_carries_the_line_number() {
        let parser = Rc::new(|line: &str| {
            if line.starts_with('{') {
                Row::from_json(line)
            } else {
                Err(Error::Json("not an object".into()))
            }
        });
        let stream = read_file(&fixture("mixed.lines"), parser).unwrap();
        let items: Vec<Result<Row>> = stream.collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(&items[1], Err(Error::Parse { line: 2, .. })));
    }
}
