use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{EditBuffer, FieldEdit};
use crate::api::RecipeApi;
use crate::lifetime::{Lifetime, RequestToken};
use crate::models::{DraftRecipe, DraftRecipeUpdate};

/// What the pending indicator and the disabled controls read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveStatus {
    /// A save is waiting for the quiet window to pass.
    pub scheduled: bool,
    pub in_flight: usize,
    /// Unsaved local edits exist.
    pub dirty: bool,
    pub last_error: Option<String>,
    pub last_saved: Option<DraftRecipe>,
}

impl SaveStatus {
    pub fn is_pending(&self) -> bool {
        self.scheduled || self.in_flight > 0
    }
}

#[derive(Debug, Default)]
struct Pending {
    buffer: EditBuffer,
    dirty: bool,
    /// Bumped on every accepted edit so a save knows whether it covered the
    /// latest one.
    revision: u64,
    /// Revision carried by the newest save that was sent and has not failed.
    sent: u64,
}

impl Pending {
    fn needs_save(&self) -> bool {
        self.dirty && self.sent != self.revision
    }
}

/// The quiet window timer. The handle stays in its slot until the timer is
/// replaced or cancelled, so a reschedule can always abort it.
struct Timer {
    handle: JoinHandle<()>,
    deadline: Instant,
}

impl Timer {
    fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

#[derive(Debug, Default)]
struct Outcome {
    last_error: Option<String>,
    last_saved: Option<DraftRecipe>,
}

struct Inner {
    api: Arc<dyn RecipeApi>,
    quiet: Duration,
    pending: Mutex<Pending>,
    outcome: Mutex<Outcome>,
    timer: Mutex<Option<Timer>>,
    saves: Mutex<JoinSet<()>>,
    in_flight: AtomicUsize,
    lifetime: Lifetime,
}

/// Debounced autosave of the draft fields.
///
/// Edits land in the local buffer right away. Each one (re)starts a quiet
/// window timer; when it expires the whole buffer is POSTed. A reschedule
/// aborts the previous timer, so only the latest state is ever sent. Saves
/// already on the wire are left alone and may complete out of order; a
/// response older than one already applied is dropped.
#[derive(Clone)]
pub struct AutosaveCoordinator {
    inner: Arc<Inner>,
}

impl AutosaveCoordinator {
    pub fn new(api: Arc<dyn RecipeApi>, quiet: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                quiet,
                pending: Mutex::new(Pending::default()),
                outcome: Mutex::new(Outcome::default()),
                timer: Mutex::new(None),
                saves: Mutex::new(JoinSet::new()),
                in_flight: AtomicUsize::new(0),
                lifetime: Lifetime::new(),
            }),
        }
    }

    /// Loads a freshly fetched draft into the buffer, unless the user has
    /// edits that were not saved yet.
    pub async fn seed(&self, draft: &DraftRecipe) -> bool {
        let mut pending = self.inner.pending.lock().await;
        if pending.dirty {
            debug!("keeping unsaved local edits over fetched draft");
            return false;
        }
        pending.buffer = EditBuffer::from_draft(draft);
        true
    }

    pub async fn buffer(&self) -> EditBuffer {
        self.inner.pending.lock().await.buffer.clone()
    }

    pub async fn update(&self, edit: FieldEdit) {
        {
            let mut pending = self.inner.pending.lock().await;
            if !pending.buffer.apply(edit) {
                return;
            }
            pending.dirty = true;
            pending.revision += 1;
        }
        self.schedule().await;
    }

    /// Input lost focus: save whatever is in the buffer.
    pub async fn blur(&self) {
        self.schedule().await;
    }

    /// Sends the buffer now if a save was due, then waits for every save to
    /// finish.
    ///
    /// Nothing is sent when a save carrying the latest edit is already on the
    /// wire or has landed.
    pub async fn flush(&self) {
        let was_scheduled = match self.inner.timer.lock().await.take() {
            Some(timer) if timer.is_running() => {
                timer.handle.abort();
                true
            }
            _ => false,
        };
        let needs_save = self.inner.pending.lock().await.needs_save();
        if was_scheduled || needs_save {
            Inner::dispatch(&self.inner).await;
        }
        self.settle().await;
    }

    /// Waits for the scheduled save, if any, and every save in flight.
    ///
    /// Edits made while this runs push the timer back and are waited for too.
    pub async fn settle(&self) {
        loop {
            let deadline = self
                .inner
                .timer
                .lock()
                .await
                .as_ref()
                .filter(|timer| timer.is_running())
                .map(|timer| timer.deadline);
            if let Some(deadline) = deadline {
                tokio::time::sleep_until(deadline).await;
                // let the timer task dispatch before looking again
                tokio::task::yield_now().await;
                continue;
            }

            let mut saves = std::mem::take(&mut *self.inner.saves.lock().await);
            if saves.is_empty() {
                break;
            }
            while saves.join_next().await.is_some() {}
        }
    }

    pub async fn status(&self) -> SaveStatus {
        let scheduled = self
            .inner
            .timer
            .lock()
            .await
            .as_ref()
            .is_some_and(Timer::is_running);
        let dirty = self.inner.pending.lock().await.dirty;
        let outcome = self.inner.outcome.lock().await;

        SaveStatus {
            scheduled,
            in_flight: self.inner.in_flight.load(Ordering::SeqCst),
            dirty,
            last_error: outcome.last_error.clone(),
            last_saved: outcome.last_saved.clone(),
        }
    }

    /// Cancels the pending timer and ignores every save still on the wire.
    pub async fn teardown(&self) {
        if let Some(timer) = self.inner.timer.lock().await.take() {
            timer.handle.abort();
        }
        self.inner.lifetime.invalidate();
    }

    async fn schedule(&self) {
        let mut timer = self.inner.timer.lock().await;
        if let Some(previous) = timer.take() {
            previous.handle.abort();
        }

        let deadline = Instant::now() + self.inner.quiet;
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            Inner::dispatch(&inner).await;
        });
        *timer = Some(Timer { handle, deadline });
    }
}

impl Inner {
    async fn dispatch(inner: &Arc<Inner>) {
        let mut saves = inner.saves.lock().await;
        while saves.try_join_next().is_some() {}

        // no awaits once the buffer is marked as sent: an abort either lands
        // before that or not at all
        let (update, revision) = {
            let mut pending = inner.pending.lock().await;
            pending.sent = pending.revision;
            (pending.buffer.to_update(), pending.revision)
        };

        let token = inner.lifetime.issue();
        inner.in_flight.fetch_add(1, Ordering::SeqCst);
        let task_inner = Arc::clone(inner);
        saves.spawn(async move {
            task_inner.save(token, update, revision).await;
            task_inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    async fn save(&self, token: RequestToken, update: DraftRecipeUpdate, revision: u64) {
        debug!(seq = token.sequence(), name = %update.name, "autosaving draft");

        let result = self.api.save_draft(&update).await;

        if !self.lifetime.try_apply(token) {
            debug!(seq = token.sequence(), "ignoring stale autosave response");
            return;
        }

        match result {
            Ok(draft) => {
                {
                    let mut pending = self.pending.lock().await;
                    if pending.revision == revision {
                        pending.dirty = false;
                    }
                }
                let mut outcome = self.outcome.lock().await;
                outcome.last_error = None;
                outcome.last_saved = Some(draft);
                info!(seq = token.sequence(), "draft saved");
            }
            Err(err) => {
                warn!(seq = token.sequence(), "Failed to save draft: {err}");
                {
                    // an explicit flush may send this revision again
                    let mut pending = self.pending.lock().await;
                    if pending.sent == revision {
                        pending.sent = 0;
                    }
                }
                self.outcome.lock().await.last_error = Some(err.to_string());
            }
        }
    }
}
