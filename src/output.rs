use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{HEADER, OutputTable, PullDate, Ticker};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// `<dir>/<TICKER>_<YYYY-MM-DD>.csv`
pub fn output_path(dir: &Path, ticker: &Ticker, pull: PullDate) -> PathBuf {
    dir.join(format!("{}_{}.csv", ticker, pull.iso()))
}

/// Write the header and every row, replacing whatever is at `path`.
pub fn write_csv(path: &Path, table: &OutputTable) -> Result<(), OutputError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |source| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };

    // The header goes out by hand so an empty table still gets one.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(csv_err)?;
    wtr.write_record(HEADER).map_err(csv_err)?;
    for row in table.rows() {
        wtr.serialize(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), rows = table.len(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{ContractRecord, ExpirationDate, OptionSide, OutputRow};

    fn pull() -> PullDate {
        PullDate(NaiveDate::from_ymd_opt(2023, 11, 10).unwrap())
    }

    #[test]
    fn path_uses_ticker_and_pull_date() {
        let ticker = Ticker::parse("AAPL").unwrap();
        assert_eq!(
            output_path(Path::new("/tmp/csv"), &ticker, pull()),
            PathBuf::from("/tmp/csv/AAPL_2023-11-10.csv")
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("X.csv");
        write_csv(&path, &OutputTable::new()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "option_id,quotedate,expiration,strike,contract,type,last_trade,bid,ask,volume,open_interest,implied_vol\n"
        );
    }

    #[test]
    fn absent_fields_are_empty_cells_and_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("XYZ.csv");
        std::fs::write(&path, "stale content that must disappear\n".repeat(20)).unwrap();

        let record = ContractRecord {
            contract_symbol: "XYZ231115C00100000".into(),
            strike: Some(100.0),
            bid: Some(5.4),
            volume: Some(10),
            ..Default::default()
        };
        let exp = ExpirationDate::from_timestamp(1_700_000_000).unwrap();
        let mut table = OutputTable::new();
        table.extend([OutputRow::from_record(record, OptionSide::Call, pull(), &exp)]);
        write_csv(&path, &table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "XYZ231115C00100000231110,2023-11-10,2023-11-14,100.0,XYZ231115C00100000,call,,5.4,,10,,"
        );
    }
}
