use std::{fs::File, path::Path};

use polars::prelude::{CsvParseOptions, CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};

use crate::error::{DataError, GymResult, IoError};

/// Reads a raw market-data table from a delimited file.
///
/// The file must carry a header row. Date-like columns are parsed into
/// temporal dtypes so the series constructor can pick up the timestamp
/// column without a separate conversion pass. Download and retry concerns
/// live outside this crate; the loader only consumes local files.
#[tracing::instrument]
pub fn read_market_csv(path: &Path) -> GymResult<DataFrame> {
    let file = File::open(path).map_err(IoError::from)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(DataError::from)?;

    tracing::info!(rows = df.height(), cols = df.width(), "Loaded market data");
    Ok(df)
}

/// Drops every row containing a missing value in any column.
///
/// The environment contract requires a complete table: rows with gaps must
/// be excluded before the series is constructed.
pub fn drop_incomplete_rows(df: &DataFrame) -> GymResult<DataFrame> {
    let before = df.height();
    let complete = df.drop_nulls::<String>(None).map_err(DataError::from)?;
    if complete.height() < before {
        tracing::debug!(
            dropped = before - complete.height(),
            "Dropped rows with missing values"
        );
    }
    Ok(complete)
}

/// Writes a processed table as a delimited file with a header row.
#[tracing::instrument(skip(df))]
pub fn write_market_csv(df: &mut DataFrame, path: &Path) -> GymResult<()> {
    let mut file = File::create(path).map_err(IoError::from)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| IoError::WriteFailed(e.to_string()))?;

    tracing::info!(rows = df.height(), "Saved market data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;
    use std::io::Write;

    fn temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_csv_with_parsed_dates() {
        let path = temp_csv(
            "marketgym_loader_read.csv",
            "datetime,gold_Close,vix_Close\n\
             2024-01-01,100.0,15.0\n\
             2024-01-02,101.5,14.2\n",
        );
        let df = read_market_csv(&path).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.column("datetime").unwrap().dtype(), &DataType::Date);
        assert_eq!(
            df.column("gold_Close").unwrap().dtype(),
            &DataType::Float64
        );
    }

    #[test]
    fn drops_rows_with_missing_values() {
        let path = temp_csv(
            "marketgym_loader_gaps.csv",
            "datetime,gold_Close,vix_Close\n\
             2024-01-01,100.0,15.0\n\
             2024-01-02,,14.2\n\
             2024-01-03,102.0,13.9\n",
        );
        let df = read_market_csv(&path).unwrap();
        let complete = drop_incomplete_rows(&df).unwrap();

        assert_eq!(complete.height(), 2);
    }

    #[test]
    fn round_trips_through_csv() {
        let path = temp_csv(
            "marketgym_loader_rt.csv",
            "datetime,gold_Close\n2024-01-01,100.0\n2024-01-02,101.0\n",
        );
        let mut df = read_market_csv(&path).unwrap();

        let out = std::env::temp_dir().join("marketgym_loader_rt_out.csv");
        write_market_csv(&mut df, &out).unwrap();
        let back = read_market_csv(&out).unwrap();

        assert_eq!(back.height(), df.height());
        assert_eq!(back.get_column_names(), df.get_column_names());
    }
}
