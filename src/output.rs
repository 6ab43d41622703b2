use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::chance::{DropChance, HEADER};
use crate::error::{DropChanceError, Result};
use crate::report::DropReport;

pub const INDEX_FILE_NAME: &str = "index.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub output_dir: PathBuf,
    pub award_files: usize,
    pub index_rows: usize,
}

pub fn award_file_name(award_id: i64) -> String {
    format!("award_{award_id}.csv")
}

/// Writes one CSV per award plus `index.csv` into `dir`.
///
/// Awards without any rows still get a header-only file.
pub fn write_reports(report: &DropReport, dir: &Path, precision: usize) -> Result<WriteSummary> {
    fs::create_dir_all(dir).map_err(|source| DropChanceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let rows_by_award = report.rows_by_award();
    for (award_id, rows) in &rows_by_award {
        write_csv(&dir.join(award_file_name(*award_id)), rows, precision)?;
    }

    let mut award_files = rows_by_award.len();
    for award_id in report.award_ids() {
        if !rows_by_award.contains_key(award_id) {
            write_csv(&dir.join(award_file_name(*award_id)), &[], precision)?;
            award_files += 1;
        }
    }

    let index_rows = report.index_rows();
    write_csv(&dir.join(INDEX_FILE_NAME), &index_rows, precision)?;

    tracing::info!(
        dir = %dir.display(),
        award_files,
        index_rows = index_rows.len(),
        "wrote drop chance reports"
    );

    Ok(WriteSummary {
        output_dir: dir.to_path_buf(),
        award_files,
        index_rows: index_rows.len(),
    })
}

fn write_csv(path: &Path, rows: &[&DropChance], precision: usize) -> Result<()> {
    let csv_error = |source: csv::Error| DropChanceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv_writer(path).map_err(csv_error)?;
    writer.write_record(HEADER).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row.record(precision)).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| DropChanceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_writer(path: &Path) -> csv::Result<Writer<fs::File>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_path(path)
}
