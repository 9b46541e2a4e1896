//! Timeline row logger.
//!
//! For every row the session time point is rebuilt from the row's
//! time-like columns, then every remaining data column is classified and
//! logged under the entity path derived from its name.

use std::collections::HashSet;
use std::path::PathBuf;

use rowcast_common::clock::{ConversionClock, RateController};
use rowcast_common::config::ConversionDefaults;
use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_data_model::cell::Scalar;
use rowcast_data_model::entity_path::EntityPath;
use rowcast_data_model::row::Row;
use rowcast_recording::sink::RecordingSink;
use rowcast_video::cache::VideoCache;
use rowcast_video::decoder::VideoDecoder;

use crate::classifier::{classify, ClassifyContext};
use crate::session::Session;

/// How each column of a row is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    /// Timeline columns, applied in this order.
    pub time_like: Vec<String>,

    /// Columns that are never logged.
    pub ignored: HashSet<String>,
}

impl ColumnRoles {
    pub fn new<T, I>(time_like: T, ignored: I) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            time_like: time_like.into_iter().map(Into::into).collect(),
            ignored: ignored.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_defaults(defaults: &ConversionDefaults) -> Self {
        Self::new(
            defaults.time_like_columns.iter().cloned(),
            defaults.ignored_columns.iter().cloned(),
        )
    }

    pub fn is_time_like(&self, column: &str) -> bool {
        self.time_like.iter().any(|c| c == column)
    }

    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignored.contains(column)
    }

    /// Whether a column is logged as data.
    pub fn should_log(&self, column: &str) -> bool {
        !self.is_time_like(column) && !self.is_ignored(column)
    }
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self::from_defaults(&ConversionDefaults::default())
    }
}

/// Progress snapshot handed to the observer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionProgress {
    pub rows_processed: u64,
    pub total_rows: Option<u64>,
    pub entries_logged: u64,
    pub rows_per_sec: f64,
    pub elapsed_secs: f64,
    pub finished: bool,
}

/// Progress observer.
pub type ProgressCallback = Box<dyn FnMut(ConversionProgress)>;

/// Totals of one `log_rows` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub rows: u64,
    pub entries: u64,
    pub time_warnings: u64,
    pub videos_decoded: usize,
}

/// Logs rows into a session.
#[derive(Debug, Clone)]
pub struct RowLogger {
    roles: ColumnRoles,
    videos_root: PathBuf,
    progress_hz: u32,
    total_rows: Option<u64>,
}

impl RowLogger {
    pub fn new(roles: ColumnRoles, videos_root: impl Into<PathBuf>) -> Self {
        Self {
            roles,
            videos_root: videos_root.into(),
            progress_hz: ConversionDefaults::default().progress_report_hz,
            total_rows: None,
        }
    }

    /// Maximum progress report rate; zero reports after every row.
    pub fn with_progress_hz(mut self, hz: u32) -> Self {
        self.progress_hz = hz;
        self
    }

    /// Row count reported to the progress observer, when known up front.
    pub fn with_total_rows(mut self, total: u64) -> Self {
        self.total_rows = Some(total);
        self
    }

    pub fn roles(&self) -> &ColumnRoles {
        &self.roles
    }

    /// Log every row into `session`.
    ///
    /// Rows are consumed lazily; the first error aborts the run. Decoded
    /// videos live only for the duration of this call.
    pub fn log_rows<S, D, I, E>(
        &self,
        rows: I,
        session: &mut Session<S>,
        decoder: D,
        mut progress: Option<ProgressCallback>,
    ) -> RowcastResult<LogSummary>
    where
        S: RecordingSink,
        D: VideoDecoder,
        I: IntoIterator<Item = Result<Row, E>>,
        E: Into<RowcastError>,
    {
        let clock = ConversionClock::start();
        let mut rate = RateController::new(self.progress_hz);
        let mut video_cache = VideoCache::new(decoder);
        let mut summary = LogSummary::default();
        let entries_before = session.entries_logged();

        for row in rows {
            let row = row.map_err(Into::into)?;
            summary.time_warnings += self.apply_time(&row, session);
            self.log_data(&row, session, &mut video_cache)?;
            summary.rows += 1;

            if let Some(callback) = progress.as_mut() {
                if rate.should_tick(clock.elapsed_ns()) {
                    callback(self.snapshot(&clock, &summary, session, entries_before, false));
                }
            }
        }

        summary.entries = session.entries_logged() - entries_before;
        summary.videos_decoded = video_cache.decode_count();

        if let Some(callback) = progress.as_mut() {
            callback(self.snapshot(&clock, &summary, session, entries_before, true));
        }

        tracing::info!(
            rows = summary.rows,
            entries = summary.entries,
            time_warnings = summary.time_warnings,
            videos_decoded = summary.videos_decoded,
            elapsed_secs = clock.elapsed_secs(),
            "Logged rows"
        );

        Ok(summary)
    }

    /// Rebuild the time point from the row; returns the number of skipped columns.
    fn apply_time<S: RecordingSink>(&self, row: &Row, session: &mut Session<S>) -> u64 {
        session.reset_time();
        let mut warnings = 0;
        for column in &self.roles.time_like {
            let Some(value) = row.get(column) else {
                continue;
            };
            match value.as_scalar() {
                Some(Scalar::Int(v)) => session.set_time_sequence(column, v),
                Some(Scalar::Float(v)) => session.set_time_seconds(column, v),
                None => {
                    tracing::warn!(
                        column = %column,
                        value_type = %value.type_name(),
                        "Unsupported time column type, skipping"
                    );
                    warnings += 1;
                }
            }
        }
        warnings
    }

    fn log_data<S: RecordingSink, D: VideoDecoder>(
        &self,
        row: &Row,
        session: &mut Session<S>,
        video_cache: &mut VideoCache<D>,
    ) -> RowcastResult<()> {
        let mut ctx = ClassifyContext {
            videos_root: &self.videos_root,
            video_cache,
        };
        for (column, value) in row.iter() {
            if !self.roles.should_log(column) {
                continue;
            }
            let archetype = classify(column, value, &mut ctx)?;
            session.log(&EntityPath::from_column(column), &archetype)?;
        }
        Ok(())
    }

    fn snapshot<S: RecordingSink>(
        &self,
        clock: &ConversionClock,
        summary: &LogSummary,
        session: &Session<S>,
        entries_before: u64,
        finished: bool,
    ) -> ConversionProgress {
        ConversionProgress {
            rows_processed: summary.rows,
            total_rows: self.total_rows,
            entries_logged: session.entries_logged() - entries_before,
            rows_per_sec: clock.rate_per_sec(summary.rows),
            elapsed_secs: clock.elapsed_secs(),
            finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use rowcast_data_model::archetype::{Archetype, ArchetypeKind};
    use rowcast_data_model::cell::{CellValue, ImageData, NumericArray, NumericDType, PixelBuffer};
    use rowcast_data_model::time::TimeValue;
    use rowcast_recording::MemoryRecording;
    use rowcast_video::decoder::DecodedVideo;
    use serde_json::json;

    /// Decoder for tests that must never touch video.
    struct NoVideo;

    impl VideoDecoder for NoVideo {
        fn decode(&mut self, path: &Path) -> RowcastResult<DecodedVideo> {
            Err(RowcastError::video(format!("unexpected decode of {}", path.display())))
        }

        fn is_available(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    fn logger() -> RowLogger {
        RowLogger::new(ColumnRoles::default(), "/data")
    }

    fn run(rows: Vec<Row>) -> (MemoryRecording, LogSummary) {
        let mut session = Session::new(MemoryRecording::new());
        let summary = logger()
            .log_rows(
                rows.into_iter().map(Ok::<_, RowcastError>),
                &mut session,
                NoVideo,
                None,
            )
            .unwrap();
        (session.finish().unwrap(), summary)
    }

    fn image() -> CellValue {
        CellValue::Image(ImageData::new(2, 1, 3, PixelBuffer::U8(vec![0; 6])))
    }

    #[test]
    fn test_scenario_timestamp_then_image() {
        let row = Row::new()
            .with("timestamp", CellValue::Float(0.5))
            .with("observation.image", image());
        let (recording, summary) = run(vec![row]);

        assert_eq!(summary.rows, 1);
        assert_eq!(summary.entries, 1);
        let entry = &recording.entries()[0];
        assert_eq!(entry.path.to_string(), "observation/image");
        assert_eq!(entry.archetype.kind(), ArchetypeKind::Image);
        assert_eq!(entry.time.get("timestamp"), Some(TimeValue::Seconds(0.5)));
        assert_eq!(entry.time.len(), 1);
    }

    #[test]
    fn test_scenario_index_then_bar_chart() {
        let row = Row::new().with("index", CellValue::Int(3)).with(
            "action",
            CellValue::List(vec![
                CellValue::Float(0.1),
                CellValue::Float(0.2),
                CellValue::Float(0.3),
            ]),
        );
        let (recording, _) = run(vec![row]);

        assert_eq!(recording.len(), 1);
        let entry = &recording.entries()[0];
        assert_eq!(entry.path.to_string(), "action");
        assert_eq!(entry.archetype, Archetype::bar_chart(vec![0.1, 0.2, 0.3]));
        assert_eq!(entry.time.get("index"), Some(TimeValue::Sequence(3)));
    }

    #[test]
    fn test_scenario_ignored_column_is_not_logged() {
        let row = Row::new()
            .with("episode_id", CellValue::Int(7))
            .with("reward", CellValue::Float(1.0));
        let (recording, _) = run(vec![row]);

        assert_eq!(recording.len(), 1);
        let entry = &recording.entries()[0];
        assert_eq!(entry.path.to_string(), "reward");
        assert_eq!(entry.archetype, Archetype::scalar(1.0));
        assert!(entry.time.is_empty());
    }

    #[test]
    fn test_rows_without_time_never_inherit_previous_time() {
        let rows = vec![
            Row::new()
                .with("frame_id", CellValue::Int(9))
                .with("reward", CellValue::Float(0.0)),
            Row::new().with("reward", CellValue::Float(1.0)),
        ];
        let (recording, _) = run(rows);

        let entries = recording.entries();
        assert_eq!(entries[0].time.get("frame_id"), Some(TimeValue::Sequence(9)));
        assert!(entries[1].time.is_empty());
    }

    #[test]
    fn test_time_columns_apply_before_data_regardless_of_position() {
        let row = Row::new()
            .with("reward", CellValue::Float(0.25))
            .with("state", CellValue::Int(2))
            .with("index", CellValue::Int(11))
            .with("timestamp", CellValue::Float(0.4));
        let (recording, summary) = run(vec![row]);

        assert_eq!(summary.entries, 2);
        for entry in recording.entries() {
            assert_eq!(entry.time.get("index"), Some(TimeValue::Sequence(11)));
            assert_eq!(entry.time.get("timestamp"), Some(TimeValue::Seconds(0.4)));
        }
    }

    #[test]
    fn test_rank_zero_time_value_keeps_dtype() {
        let index = NumericArray::from_shape_vec(vec![], vec![5.0], NumericDType::Int).unwrap();
        let timestamp =
            NumericArray::from_shape_vec(vec![], vec![0.2], NumericDType::Float).unwrap();
        let row = Row::new()
            .with("index", CellValue::Array(index))
            .with("timestamp", CellValue::Array(timestamp))
            .with("reward", CellValue::Int(0));
        let (recording, _) = run(vec![row]);

        let time = &recording.entries()[0].time;
        assert_eq!(time.get("index"), Some(TimeValue::Sequence(5)));
        assert_eq!(time.get("timestamp"), Some(TimeValue::Seconds(0.2)));
    }

    #[test]
    fn test_unsupported_time_value_warns_and_continues() {
        let row = Row::new()
            .with("timestamp", CellValue::Other(json!("noon")))
            .with("index", CellValue::Int(1))
            .with("reward", CellValue::Float(1.0));
        let (recording, summary) = run(vec![row]);

        assert_eq!(summary.time_warnings, 1);
        let time = &recording.entries()[0].time;
        assert_eq!(time.get("timestamp"), None);
        assert_eq!(time.get("index"), Some(TimeValue::Sequence(1)));
    }

    #[test]
    fn test_row_error_aborts_run() {
        let rows: Vec<Result<Row, RowcastError>> = vec![
            Ok(Row::new().with("reward", CellValue::Float(1.0))),
            Err(RowcastError::dataset("broken line")),
            Ok(Row::new().with("reward", CellValue::Float(2.0))),
        ];
        let mut session = Session::new(MemoryRecording::new());
        let err = logger()
            .log_rows(rows, &mut session, NoVideo, None)
            .unwrap_err();

        assert!(matches!(err, RowcastError::Dataset { .. }));
        assert_eq!(session.entries_logged(), 1);
    }

    #[test]
    fn test_progress_ends_with_finished_report() {
        let reports = Rc::new(RefCell::new(Vec::<ConversionProgress>::new()));
        let sink = Rc::clone(&reports);
        let callback: ProgressCallback = Box::new(move |p: ConversionProgress| sink.borrow_mut().push(p));

        let rows: Vec<Result<Row, RowcastError>> = (0..5)
            .map(|i| Ok(Row::new().with("index", CellValue::Int(i)).with("x", CellValue::Int(i))))
            .collect();
        let mut session = Session::new(MemoryRecording::new());
        logger()
            .with_progress_hz(0)
            .with_total_rows(5)
            .log_rows(rows, &mut session, NoVideo, Some(callback))
            .unwrap();

        let reports = reports.borrow();
        assert_eq!(reports.len(), 6);
        let last = reports.last().unwrap();
        assert!(last.finished);
        assert_eq!(last.rows_processed, 5);
        assert_eq!(last.entries_logged, 5);
        assert_eq!(last.total_rows, Some(5));
    }

    #[test]
    fn test_column_roles() {
        let roles = ColumnRoles::default();
        assert!(roles.is_time_like("timestamp"));
        assert!(roles.is_ignored("episode_data_index_from"));
        assert!(!roles.should_log("index"));
        assert!(roles.should_log("observation.state"));
    }
}
