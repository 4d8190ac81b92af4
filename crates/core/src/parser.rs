use std::io::Read;

use crate::error::ParseError;
use crate::model::Record;

/// Reads header-less CSV rows of `path[,size[,heat]]`.
///
/// Empty size or heat fields count as missing. `inf` and `NaN` are rejected.
pub fn parse_csv(input: impl Read) -> Result<Vec<Record>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let Some(path) = row.get(0).filter(|p| !p.is_empty()) else {
            return Err(ParseError::EmptyRow { line });
        };

        let mut record = Record::new(path, 0.0);
        if let Some(size) = parse_field(row.get(1), "size", line)? {
            record.size = size;
        }
        record.heat = parse_field(row.get(2), "heat", line)?;
        records.push(record);
    }
    Ok(records)
}

fn parse_field(raw: Option<&str>, field: &'static str, line: u64) -> Result<Option<f64>, ParseError> {
    match raw {
        None | Some("") => Ok(None),
        Some(v) => match v.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            Ok(_) => Err(ParseError::NotFinite {
                line,
                field,
                value: v.to_string(),
            }),
            Err(_) => Err(ParseError::NotFloat {
                line,
                field,
                value: v.to_string(),
            }),
        },
    }
}

pub fn parse_str(input: &str) -> Result<Vec<Record>, ParseError> {
    parse_csv(input.as_bytes())
}
