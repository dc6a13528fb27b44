use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use log::{info, warn};
use calamine::{open_workbook_auto, Data, Reader};

use crate::error::InputError;
use crate::record::JobId;

pub const JOB_ID_COLUMN: &str = "job_id";

/// Reads the unique job ids of a click-event dataset, sorted.
///
/// `.xlsx`/`.xls` files are read from their first worksheet, anything else as CSV.
pub fn load_job_ids<P: AsRef<Path>>(path: P) -> Result<Vec<JobId>, InputError> {
    let path = path.as_ref();

    let is_excel = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"));

    let raw = if is_excel { load_excel(path)? } else { load_csv(path)? };
    let total = raw.len();
    let ids = unique_sorted(raw);

    info!("Loaded {} unique job ids ({} rows) from {:?}", ids.len(), total, path);
    Ok(ids)
}

fn load_csv(path: &Path) -> Result<Vec<String>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let column = rdr
        .headers()?
        .iter()
        .position(is_job_id_header)
        .ok_or(InputError::MissingColumn(JOB_ID_COLUMN))?;

    let mut ids = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        match result {
            Ok(row) => {
                if let Some(id) = row.get(column).filter(|id| !id.is_empty()) {
                    ids.push(id.to_string());
                }
            }
            // One broken row should not cost the whole dataset.
            Err(e) => warn!("Skipping unreadable row {}: {}", line + 2, e),
        }
    }
    Ok(ids)
}

fn load_excel(path: &Path) -> Result<Vec<String>, InputError> {
    let mut workbook = open_workbook_auto(path)?;

    let Some((_name, range)) = workbook.worksheets().into_iter().next() else {
        return Err(InputError::MissingColumn(JOB_ID_COLUMN));
    };

    let mut rows = range.rows();
    let column = rows
        .next()
        .and_then(|header| header.iter().position(|cell| is_job_id_header(&cell.to_string())))
        .ok_or(InputError::MissingColumn(JOB_ID_COLUMN))?;

    Ok(rows
        .filter_map(|row| row.get(column))
        .filter_map(cell_to_id)
        .collect())
}

fn is_job_id_header(header: &str) -> bool {
    header.trim().eq_ignore_ascii_case(JOB_ID_COLUMN)
}

fn cell_to_id(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::Int(i) => Some(i.to_string()),
        // Spreadsheets store integer ids as floats.
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        other => Some(other.to_string().trim().to_string()).filter(|s| !s.is_empty()),
    }
}

/// Deduplicates and sorts, numerically when every id is an integer.
fn unique_sorted(raw: Vec<String>) -> Vec<JobId> {
    let mut seen = HashSet::new();
    let mut ids: Vec<String> = raw.into_iter().filter(|id| seen.insert(id.clone())).collect();

    if ids.iter().all(|id| id.parse::<u64>().is_ok()) {
        ids.sort_by_key(|id| id.parse::<u64>().unwrap_or_default());
    } else {
        ids.sort();
    }
    ids.into_iter().map(JobId::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "jobinfo_input_{}_{}.csv",
            name,
            std::process::id()
        ));
        fs::write(&path, content).unwrap();
        path
    }

    fn as_strs(ids: &[JobId]) -> Vec<&str> {
        ids.iter().map(JobId::as_str).collect()
    }

    #[test]
    fn reads_unique_sorted_ids() {
        let path = temp_csv(
            "sorted",
            "user_id,job_id,timestamp\nu1,1003,t\nu2,  1001 ,t\nu3,1003,t\nu4,999,t\nu5,,t\n",
        );
        let ids = load_job_ids(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(as_strs(&ids), vec!["999", "1001", "1003"]);
    }

    #[test]
    fn header_match_ignores_case() {
        let path = temp_csv("case", "JOB_ID\nb\na\nb\n");
        let ids = load_job_ids(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(as_strs(&ids), vec!["a", "b"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let path = temp_csv("missing", "user_id,clicks\nu1,3\n");
        let err = load_job_ids(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, InputError::MissingColumn("job_id")));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_job_ids("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }

    #[test]
    fn zero_padded_duplicates_are_removed() {
        let ids = unique_sorted(vec!["1".into(), "01".into(), "1".into(), "2".into()]);
        assert_eq!(as_strs(&ids), vec!["1", "01", "2"]);
    }

    #[test]
    fn float_cells_become_integer_ids() {
        assert_eq!(cell_to_id(&Data::Float(1001.0)).as_deref(), Some("1001"));
        assert_eq!(cell_to_id(&Data::Int(7)).as_deref(), Some("7"));
        assert_eq!(cell_to_id(&Data::String(" x1 ".into())).as_deref(), Some("x1"));
        assert_eq!(cell_to_id(&Data::Empty), None);
    }
}
