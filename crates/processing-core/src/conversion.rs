//! One-call conversion of a dataset (or one of its episodes) into a sink.

use rowcast_common::config::ConversionDefaults;
use rowcast_common::error::RowcastResult;
use rowcast_data_model::dataset::{Dataset, EpisodeFilter};
use rowcast_recording::sink::RecordingSink;
use rowcast_video::decoder::VideoDecoder;

use crate::row_logger::{ColumnRoles, LogSummary, ProgressCallback, RowLogger};
use crate::session::Session;

/// Log the rows of `dataset` into `sink`, returning the flushed sink.
///
/// With an episode filter only that episode's rows are logged.
pub fn log_dataset<S, D>(
    dataset: &Dataset,
    episode: Option<EpisodeFilter>,
    sink: S,
    decoder: D,
    config: &ConversionDefaults,
    progress: Option<ProgressCallback>,
) -> RowcastResult<(S, LogSummary)>
where
    S: RecordingSink,
    D: VideoDecoder,
{
    tracing::info!(
        dataset = dataset.name(),
        episode = episode.as_ref().map(|f| f.episode),
        sink = sink.name(),
        decoder = decoder.name(),
        "Starting conversion"
    );

    let mut logger = RowLogger::new(ColumnRoles::from_defaults(config), dataset.videos_root())
        .with_progress_hz(config.progress_report_hz);
    if progress.is_some() && episode.is_none() {
        logger = logger.with_total_rows(dataset.row_count()? as u64);
    }

    let mut session = Session::new(sink);
    let summary = match episode {
        Some(filter) => logger.log_rows(
            dataset.rows_for_episode(filter)?,
            &mut session,
            decoder,
            progress,
        )?,
        None => logger.log_rows(dataset.rows()?, &mut session, decoder, progress)?,
    };

    let sink = session.finish()?;
    Ok((sink, summary))
}
