use crate::stream::run::RunUpdate;
use crate::stream::session::{RunId, Session};
use crate::transport::error::user_facing_message;
use crate::transport::{AnalysisBackend, AnalyzeRequest};
use futures::StreamExt;

/// Runs one analysis end to end: begins a run in `session`, opens the stream
/// and feeds every chunk through the reducer until the transport closes.
///
/// Transport failures end the run in the error phase rather than returning
/// `Err`; only an invalid ticker is an error here. `on_update` sees every
/// transition as soon as the frame causing it is processed.
pub async fn drive_run<B, F>(
    backend: &B,
    session: &mut Session,
    raw_ticker: &str,
    mut on_update: F,
) -> anyhow::Result<RunId>
where
    B: AnalysisBackend + ?Sized,
    F: FnMut(&RunUpdate),
{
    let run = session.begin(raw_ticker)?;
    let ticker = session
        .current()
        .map(|r| r.ticker().to_string())
        .unwrap_or_default();

    let mut chunks = match backend.open_stream(AnalyzeRequest::for_ticker(&ticker)).await {
        Ok(chunks) => chunks,
        Err(err) => {
            tracing::error!(run_id = %run, backend = backend.name(), error = %err, "failed to open analysis stream");
            emit(&mut on_update, session.fail(run, user_facing_message(&err)));
            return Ok(run);
        }
    };

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => emit(&mut on_update, session.push_chunk(run, &bytes)),
            Err(err) => {
                tracing::error!(run_id = %run, error = %err, "analysis stream read failed");
                emit(&mut on_update, session.fail(run, user_facing_message(&err)));
                return Ok(run);
            }
        }
    }

    emit(&mut on_update, session.finish(run));
    Ok(run)
}

fn emit<F: FnMut(&RunUpdate)>(on_update: &mut F, updates: Vec<RunUpdate>) {
    for update in &updates {
        on_update(update);
    }
}
