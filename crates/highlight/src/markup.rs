use crate::config::MarkupOptions;
use crate::error::{HighlightError, Result};
use crate::highlighter::Highlighter;
use parking_lot::Mutex;
use stackscope_dump::{FileLocation, Goroutine, Highlight};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Shared cancellation flag for a markup pass
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn markup_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Fill frame highlights of the first `options.limit` goroutines (0 = all).
///
/// Goroutines are enriched concurrently, bounded by the available
/// parallelism; frames of one goroutine are enriched in order and the cancel
/// flag is checked before each frame. The first failure aborts the remaining
/// work and is returned; highlights are committed only when every goroutine
/// succeeded.
pub async fn enrich_markup(
    highlighter: Arc<Highlighter>,
    goroutines: &mut [Goroutine],
    options: MarkupOptions,
    cancel: &CancelFlag,
) -> Result<()> {
    if options.is_disabled() {
        return Ok(());
    }
    let count = match options.limit {
        0 => goroutines.len(),
        limit => limit.min(goroutines.len()),
    };

    let semaphore = Arc::new(Semaphore::new(markup_concurrency()));
    let abort = CancelFlag::new();
    let first_error: Arc<Mutex<Option<HighlightError>>> = Arc::new(Mutex::new(None));
    let mut tasks = JoinSet::new();

    for (index, goroutine) in goroutines.iter().take(count).enumerate() {
        let locations: Vec<FileLocation> = goroutine.locations().cloned().collect();
        let highlighter = Arc::clone(&highlighter);
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        let abort = abort.clone();
        let first_error = Arc::clone(&first_error);
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    highlight_frames(&highlighter, &locations, options.wrap_size, &cancel, &abort)
                        .await
                }
                Err(err) => Err(HighlightError::Task(err.to_string())),
            };
            result
                .map(|highlights| (index, highlights))
                .inspect_err(|err| {
                    first_error.lock().get_or_insert_with(|| err.clone());
                    abort.cancel();
                })
        });
    }

    let mut done = Vec::with_capacity(count);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(highlights)) => done.push(highlights),
            Ok(Err(_)) => {}
            Err(err) => {
                first_error
                    .lock()
                    .get_or_insert_with(|| HighlightError::Task(err.to_string()));
                abort.cancel();
            }
        }
    }

    if let Some(err) = first_error.lock().take() {
        log::warn!("markup aborted after {} of {count} goroutines: {err}", done.len());
        return Err(err);
    }

    for (index, highlights) in done {
        for (frame, highlight) in goroutines[index].call_stack.iter_mut().zip(highlights) {
            frame.highlight = highlight;
        }
    }
    log::debug!("markup: highlighted {count} goroutines");
    Ok(())
}

async fn highlight_frames(
    highlighter: &Highlighter,
    locations: &[FileLocation],
    wrap_size: i32,
    cancel: &CancelFlag,
    abort: &CancelFlag,
) -> Result<Vec<Highlight>> {
    let mut highlights = Vec::with_capacity(locations.len());
    for location in locations {
        if cancel.is_cancelled() || abort.is_cancelled() {
            return Err(HighlightError::Cancelled);
        }
        highlights.push(highlighter.highlight(location, wrap_size).await?);
    }
    Ok(highlights)
}
