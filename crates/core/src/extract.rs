//! CSV extraction into an all-text [`DataFrame`].
//!
//! The header is checked against [`REQUIRED_COLUMNS`] before a single
//! record is parsed. Header names matching a required column ignoring case
//! are rewritten to the required spelling so later stages can rely on
//! exact names.

use std::io::{Cursor, Read};
use std::path::Path;

use polars::prelude::*;

use crate::error::CoreError;
use crate::schema::REQUIRED_COLUMNS;
use crate::schema_validation::{missing_columns, validate_columns};
use crate::source::SourceFs;
use crate::table::column_names;

/// Read and schema-check the CSV file at `path`.
pub fn extract_csv(fs: &dyn SourceFs, path: &Path) -> Result<DataFrame, CoreError> {
    if !fs.exists(path) {
        tracing::error!(path = %path.display(), "Input file not found");
        return Err(CoreError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(path = %path.display(), "Loading CSV file");
    let df = read_csv(fs.open(path)?)?;
    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "CSV file loaded"
    );
    Ok(df)
}

/// Parse CSV content from any reader. Every column is read as text and
/// empty cells become null.
pub fn read_csv<R: Read>(mut reader: R) -> Result<DataFrame, CoreError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let header_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let headers: Vec<String> = parse(header_line.to_vec())?
        .get_column_names()
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    if !validate_columns(&headers, REQUIRED_COLUMNS) {
        return Err(CoreError::SchemaInvalid {
            missing: missing_columns(&headers, REQUIRED_COLUMNS),
        });
    }

    let mut df = parse(bytes)?;
    for (current, header) in column_names(&df).into_iter().zip(&headers) {
        let canonical = canonical_header(header);
        if current != canonical {
            df.rename(&current, canonical.into())?;
        }
    }
    Ok(df)
}

/// Infer no schema so every column stays `String`.
fn parse(bytes: Vec<u8>) -> Result<DataFrame, CoreError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(CoreError::Csv)
}

fn canonical_header(header: &str) -> String {
    REQUIRED_COLUMNS
        .iter()
        .find(|required| required.eq_ignore_ascii_case(header))
        .map_or_else(|| header.to_string(), |required| required.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::LocalFs;
    use assert_matches::assert_matches;
    use std::io::Write;

    const HEADER: &str = "model,year,price,transmission,mileage,fuelType,tax,mpg,engineSize";

    fn text(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn reads_cells_as_text_with_nulls() {
        let data = format!("{HEADER}\n X5 ,2016,25000,Automatic,,Diesel,150,45.5,2.0\n");
        let df = read_csv(data.as_bytes()).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 9);
        assert_eq!(text(&df, "model"), vec![Some(" X5 ".to_string())]);
        assert_eq!(text(&df, "year"), vec![Some("2016".to_string())]);
        assert_eq!(df.column("mileage").unwrap().null_count(), 1);
    }

    #[test]
    fn header_spelling_is_canonicalized() {
        let data = " Model,YEAR,price,transmission,mileage,FuelType,tax,mpg,EngineSize,colour\n";
        let df = read_csv(data.as_bytes()).unwrap();
        assert_eq!(
            column_names(&df),
            vec![
                "model",
                "year",
                "price",
                "transmission",
                "mileage",
                "fuelType",
                "tax",
                "mpg",
                "engineSize",
                "colour"
            ]
        );
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn missing_price_fails_before_rows_are_read() {
        let data = "model,year,transmission,mileage,fuelType,tax,mpg,engineSize\nx5,2016\n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert_matches!(err, CoreError::SchemaInvalid { missing } if missing == vec!["price"]);
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        assert_matches!(
            extract_csv(&LocalFs, &path),
            Err(CoreError::InputNotFound { path: p }) if p == path
        );
    }

    #[test]
    fn extracts_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "x5,2016,25000,Automatic,100,Diesel,150,45.5,2.0").unwrap();
        writeln!(file, "x3,2019,31000,Manual,50,Petrol,145,40.1,3.0").unwrap();

        let df = extract_csv(&LocalFs, file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::String);
    }
}
