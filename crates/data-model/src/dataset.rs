//! Streaming JSONL datasets.
//!
//! A dataset is either a `.jsonl` file or a directory containing
//! `data.jsonl`. Each non-empty line is one row; lines starting with `#`
//! are comments. Relative image and video paths inside rows resolve
//! against the dataset root (the directory holding the rows file).

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use rowcast_common::error::RowcastError;

use crate::cell::CellContext;
use crate::row::Row;

/// Rows file looked up when a dataset is opened from a directory.
pub const DEFAULT_ROWS_FILE: &str = "data.jsonl";

/// A dataset on disk.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    root: PathBuf,
    rows_path: PathBuf,
}

/// Selects the rows of a single episode.
///
/// Rows lacking the episode column are kept, matching datasets that do
/// not split into episodes at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeFilter {
    pub column: String,
    pub episode: i64,
}

/// Lazy row iterator over a dataset file.
pub struct RowIter {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    root: PathBuf,
    line_no: usize,
}

/// Errors that can occur when reading datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid row: {message}")]
    InvalidRow { message: String },

    #[error("Invalid cell in column '{column}': {message}")]
    InvalidCell { column: String, message: String },

    #[error("Failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("{path}:{line}: {source}")]
    AtLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<DatasetError>,
    },
}

impl DatasetError {
    pub fn invalid_cell(column: &str, message: impl Into<String>) -> Self {
        Self::InvalidCell {
            column: column.to_string(),
            message: message.into(),
        }
    }
}

impl From<DatasetError> for RowcastError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::NotFound { path } => RowcastError::FileNotFound { path },
            other => RowcastError::dataset(other.to_string()),
        }
    }
}

impl Dataset {
    /// Open a dataset from a `.jsonl` file or a directory containing one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let (root, rows_path) = if path.is_dir() {
            (path.to_path_buf(), path.join(DEFAULT_ROWS_FILE))
        } else {
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (root, path.to_path_buf())
        };

        if !rows_path.is_file() {
            return Err(DatasetError::NotFound { path: rows_path });
        }

        let name = if path.is_dir() {
            path.file_name()
        } else {
            path.file_stem()
        }
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());

        Ok(Self {
            name,
            root,
            rows_path,
        })
    }

    /// Short dataset name (directory name or file stem).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rows_path(&self) -> &Path {
        &self.rows_path
    }

    /// Directory video references resolve against.
    pub fn videos_root(&self) -> &Path {
        &self.root
    }

    /// Stream all rows from the beginning of the file.
    pub fn rows(&self) -> Result<RowIter, DatasetError> {
        let file = File::open(&self.rows_path).map_err(|source| DatasetError::Io {
            path: self.rows_path.clone(),
            source,
        })?;
        Ok(RowIter {
            lines: BufReader::new(file).lines(),
            path: self.rows_path.clone(),
            root: self.root.clone(),
            line_no: 0,
        })
    }

    /// Stream the rows belonging to one episode.
    ///
    /// Decode errors are passed through so the caller sees them.
    pub fn rows_for_episode(
        &self,
        filter: EpisodeFilter,
    ) -> Result<impl Iterator<Item = Result<Row, DatasetError>>, DatasetError> {
        Ok(self.rows()?.filter(move |row| match row {
            Ok(row) => filter.matches(row),
            Err(_) => true,
        }))
    }

    /// Number of row lines, without decoding them.
    pub fn row_count(&self) -> Result<usize, DatasetError> {
        let file = File::open(&self.rows_path).map_err(|source| DatasetError::Io {
            path: self.rows_path.clone(),
            source,
        })?;
        let mut count = 0;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| DatasetError::Io {
                path: self.rows_path.clone(),
                source,
            })?;
            if is_row_line(&line) {
                count += 1;
            }
        }
        Ok(count)
    }
}

impl EpisodeFilter {
    pub fn new(column: impl Into<String>, episode: i64) -> Self {
        Self {
            column: column.into(),
            episode,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            None => true,
            Some(cell) => cell.as_i64() == Some(self.episode),
        }
    }
}

impl Iterator for RowIter {
    type Item = Result<Row, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(DatasetError::Io {
                        path: self.path.clone(),
                        source,
                    }))
                }
            };
            if !is_row_line(&line) {
                continue;
            }
            let ctx = CellContext { root: &self.root };
            return Some(
                Row::parse_line(&line, ctx).map_err(|source| DatasetError::AtLine {
                    path: self.path.clone(),
                    line: self.line_no,
                    source: Box::new(source),
                }),
            );
        }
    }
}

fn is_row_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    fn write_dataset(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(DEFAULT_ROWS_FILE), content).unwrap();
        dir
    }

    #[test]
    fn test_open_directory_and_stream_rows() {
        let dir = write_dataset(
            "rowcast_test_dataset_dir",
            "# comment\n{\"index\": 0}\n\n{\"index\": 1}\n",
        );

        let dataset = Dataset::open(&dir).unwrap();
        assert_eq!(dataset.name(), "rowcast_test_dataset_dir");
        assert_eq!(dataset.videos_root(), dir.as_path());
        assert_eq!(dataset.row_count().unwrap(), 2);

        let rows: Vec<Row> = dataset.rows().unwrap().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("index"), Some(&CellValue::Int(1)));

        // rows() restarts from the beginning
        assert_eq!(dataset.rows().unwrap().count(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_file_uses_stem_and_parent() {
        let dir = std::env::temp_dir().join("rowcast_test_dataset_file");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pusht.jsonl");
        std::fs::write(&path, "{\"a\": 1}\n").unwrap();

        let dataset = Dataset::open(&path).unwrap();
        assert_eq!(dataset.name(), "pusht");
        assert_eq!(dataset.root(), dir.as_path());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_dataset() {
        let result = Dataset::open(std::env::temp_dir().join("rowcast_no_such_dataset"));
        assert!(matches!(result, Err(DatasetError::NotFound { .. })));

        let err: RowcastError = result.unwrap_err().into();
        assert!(matches!(err, RowcastError::FileNotFound { .. }));

        let err: RowcastError = DatasetError::invalid_cell("action", "bad shape").into();
        assert!(matches!(err, RowcastError::Dataset { .. }));
        assert!(err.to_string().contains("action"));
    }

    #[test]
    fn test_episode_filter_keeps_rows_without_episode_column() {
        let dir = write_dataset(
            "rowcast_test_dataset_episodes",
            concat!(
                "{\"episode_index\": 0, \"index\": 0}\n",
                "{\"episode_index\": 1, \"index\": 1}\n",
                "{\"index\": 2}\n",
                "{\"episode_index\": 1, \"index\": 3}\n",
            ),
        );

        let dataset = Dataset::open(&dir).unwrap();
        let indices: Vec<i64> = dataset
            .rows_for_episode(EpisodeFilter::new("episode_index", 1))
            .unwrap()
            .map(|row| row.unwrap().get("index").and_then(CellValue::as_i64).unwrap())
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let dir = write_dataset(
            "rowcast_test_dataset_bad_line",
            "{\"index\": 0}\n{not json}\n",
        );

        let dataset = Dataset::open(&dir).unwrap();
        let results: Vec<_> = dataset.rows().unwrap().collect();
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(matches!(err, DatasetError::AtLine { line: 2, .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}
