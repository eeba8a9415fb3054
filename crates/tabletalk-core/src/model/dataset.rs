use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A loaded CSV file. The core treats its contents as opaque; they are
/// forwarded to the agent as question context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Read a CSV file with a header row. The dataset is named after the file
    /// stem.
    pub fn from_csv_path(path: &Path) -> Result<Self, CoreError> {
        let file = std::fs::File::open(path).map_err(|e| CoreError::Dataset {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mut dataset = Self::from_csv_reader(&name, file)?;
        dataset.source = Some(path.to_path_buf());
        tracing::debug!(
            name = %dataset.name,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_csv_reader(name: &str, reader: impl Read) -> Result<Self, CoreError> {
        let err = |message: String| CoreError::Dataset {
            path: name.to_string(),
            message,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .map_err(|e| err(e.to_string()))?
            .iter()
            .map(String::from)
            .collect();
        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(err("missing header row".into()));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| err(e.to_string()))?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self {
            name: name.to_string(),
            source: None,
            columns,
            rows,
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALES: &str = "region,month,revenue\nNorth,Jan,120\nSouth,Jan,80\nNorth,Feb,95\n";

    #[test]
    fn test_from_reader() {
        let ds = Dataset::from_csv_reader("sales", SALES.as_bytes()).unwrap();
        assert_eq!(ds.name, "sales");
        assert_eq!(ds.columns, vec!["region", "month", "revenue"]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.rows[1], vec!["South", "Jan", "80"]);
        assert!(ds.source.is_none());
    }

    #[test]
    fn test_from_path_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q1_sales.csv");
        std::fs::write(&path, SALES).unwrap();

        let ds = Dataset::from_csv_path(&path).unwrap();
        assert_eq!(ds.name, "q1_sales");
        assert_eq!(ds.source.as_deref(), Some(path.as_path()));
        assert_eq!(ds.column_count(), 3);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Dataset::from_csv_reader("bad", "a,b\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::Dataset { .. }));
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(Dataset::from_csv_reader("empty", "".as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::from_csv_path(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/data.csv"));
    }
}
