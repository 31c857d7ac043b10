//! Toast lifecycle: `Entering -> Visible -> Dismissing -> Removed`.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError, bounded};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::Result;
use crate::bridge::ServerAlert;
use crate::config::{Config, HostSpec, ToastSettings};
use crate::error::NotifyError;
use crate::kind::{DismissReason, Kind, Phase};
use crate::render::NotificationView;
use crate::surface::Surface;

/// Identity of a notification. Time-ordered and never reused.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NotificationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Published on every state transition.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LifecycleEvent {
    pub id: NotificationId,
    pub kind: Kind,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DismissReason>,
}

/// Point-in-time view of one live notification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationSnapshot {
    pub id: NotificationId,
    pub kind: Kind,
    pub message: String,
    pub duration: Duration,
    pub phase: Phase,
    /// Whether an auto-dismiss timer is still outstanding.
    pub timer_armed: bool,
}

struct Entry {
    id: NotificationId,
    kind: Kind,
    message: String,
    duration: Duration,
    phase: Phase,
    reveal: CancellationToken,
    auto_dismiss: Option<CancellationToken>,
}

impl Entry {
    fn snapshot(&self) -> NotificationSnapshot {
        NotificationSnapshot {
            id: self.id,
            kind: self.kind,
            message: self.message.clone(),
            duration: self.duration,
            phase: self.phase,
            timer_armed: self.auto_dismiss.is_some(),
        }
    }
}

struct State {
    surface: Box<dyn Surface>,
    host_mounted: bool,
    active: Vec<Entry>,
    events: Option<Sender<LifecycleEvent>>,
}

impl State {
    fn position(&self, id: NotificationId) -> Option<usize> {
        self.active.iter().position(|entry| entry.id == id)
    }

    /// Applies `phase` to the entry at `index`, which must be its successor.
    fn advance(&mut self, index: usize, phase: Phase, reason: Option<DismissReason>) {
        let entry = &mut self.active[index];
        debug_assert_eq!(entry.phase.next(), Some(phase));
        entry.phase = phase;
        let (id, kind) = (entry.id, entry.kind);
        self.surface.set_phase(id, phase);
        self.publish(id, kind, phase, reason);
    }

    fn publish(&self, id: NotificationId, kind: Kind, phase: Phase, reason: Option<DismissReason>) {
        debug!(%id, %kind, %phase, ?reason, "notification transition");
        let Some(events) = self.events.as_ref() else {
            return;
        };
        let event = LifecycleEvent {
            id,
            kind,
            phase,
            reason,
        };
        match events.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                warn!(id = %event.id, phase = %event.phase, "lifecycle event queue full; dropping event");
            }
        }
    }
}

struct Shared {
    settings: ToastSettings,
    host: HostSpec,
    runtime: Handle,
    state: Mutex<State>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reveal(&self, id: NotificationId) {
        let mut state = self.state();
        let Some(index) = state.position(id) else {
            return;
        };
        if state.active[index].phase == Phase::Entering {
            state.advance(index, Phase::Visible, None);
        }
    }

    /// Starts the exit sequence. Returns `false` when one already ran.
    fn dismiss(self: &Arc<Self>, id: NotificationId, reason: DismissReason) -> bool {
        let mut state = self.state();
        let Some(index) = state.position(id) else {
            return false;
        };

        let entry = &mut state.active[index];
        if entry.phase >= Phase::Dismissing {
            return false;
        }
        entry.reveal.cancel();
        if let Some(timer) = entry.auto_dismiss.take() {
            timer.cancel();
        }

        if entry.phase == Phase::Entering {
            state.advance(index, Phase::Visible, None);
        }
        state.advance(index, Phase::Dismissing, Some(reason));
        drop(state);

        let weak = Arc::downgrade(self);
        let removal_at = Instant::now() + self.settings.exit_duration;
        self.runtime.spawn(async move {
            sleep_until(removal_at).await;
            if let Some(shared) = weak.upgrade() {
                shared.remove(id);
            }
        });
        true
    }

    fn remove(&self, id: NotificationId) {
        let mut state = self.state();
        let Some(index) = state.position(id) else {
            return;
        };
        // `Vec::remove` shifts the tail down, keeping display order intact.
        let entry = state.active.remove(index);
        state.surface.detach(id);
        state.publish(id, entry.kind, Phase::Removed, None);
    }
}

/// Owns the notification host and every live notification on the page.
///
/// `dismiss` cancels the reveal and auto-dismiss timers before anything
/// else, so a racing timer and a close click start only one removal.
///
/// Build exactly one per page and pass it by reference to whatever needs to
/// post notifications. Timers run on the tokio runtime that was current
/// when the manager was built.
pub struct NotificationManager {
    shared: Arc<Shared>,
}

impl NotificationManager {
    /// # Errors
    ///
    /// Returns [`NotifyError::NoRuntime`] when called outside a tokio runtime.
    pub fn new(surface: impl Surface + 'static, config: &Config) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        Ok(Self {
            shared: Arc::new(Shared {
                settings: config.toasts.clone(),
                host: config.host.clone(),
                runtime,
                state: Mutex::new(State {
                    surface: Box::new(surface),
                    host_mounted: false,
                    active: Vec::new(),
                    events: None,
                }),
            }),
        })
    }

    /// Shows a notification and schedules its lifecycle.
    ///
    /// `duration` defaults to the configured display time; `Duration::ZERO`
    /// keeps the notification until it is dismissed.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::HostUnavailable`] when the host cannot be
    /// mounted on the page.
    pub fn show(
        &self,
        message: impl Into<String>,
        kind: Kind,
        duration: Option<Duration>,
    ) -> Result<NotificationHandle> {
        let shown_at = Instant::now();
        let message = message.into();
        let duration = duration.unwrap_or(self.shared.settings.default_duration);
        let id = NotificationId::new();
        let reveal = CancellationToken::new();
        let auto_dismiss = (!duration.is_zero()).then(CancellationToken::new);

        {
            let mut state = self.shared.state();
            if !state.host_mounted {
                state.surface.mount_host(&self.shared.host)?;
                state.host_mounted = true;
                debug!(host = %self.shared.host.element_id, "notification host mounted");
            }
            state
                .surface
                .attach(NotificationView::new(id, kind, &message, duration));
            state.active.push(Entry {
                id,
                kind,
                message,
                duration,
                phase: Phase::Entering,
                reveal: reveal.clone(),
                auto_dismiss: auto_dismiss.clone(),
            });
            state.publish(id, kind, Phase::Entering, None);
        }

        let weak = Arc::downgrade(&self.shared);
        let reveal_at = shown_at + self.shared.settings.enter_delay;
        self.shared.runtime.spawn(async move {
            tokio::select! {
                () = reveal.cancelled() => {}
                () = sleep_until(reveal_at) => {
                    if let Some(shared) = weak.upgrade() {
                        shared.reveal(id);
                    }
                }
            }
        });

        if let Some(token) = auto_dismiss {
            let weak = Arc::downgrade(&self.shared);
            let expires_at = shown_at + duration;
            self.shared.runtime.spawn(async move {
                tokio::select! {
                    () = token.cancelled() => {}
                    () = sleep_until(expires_at) => {
                        if let Some(shared) = weak.upgrade() {
                            shared.dismiss(id, DismissReason::Expired);
                        }
                    }
                }
            });
        }

        Ok(NotificationHandle {
            id,
            shared: Arc::downgrade(&self.shared),
        })
    }

    /// # Errors
    ///
    /// See [`NotificationManager::show`].
    pub fn success(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Result<NotificationHandle> {
        self.show(message, Kind::Success, duration)
    }

    /// # Errors
    ///
    /// See [`NotificationManager::show`].
    pub fn error(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Result<NotificationHandle> {
        self.show(message, Kind::Error, duration)
    }

    /// # Errors
    ///
    /// See [`NotificationManager::show`].
    pub fn warning(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Result<NotificationHandle> {
        self.show(message, Kind::Warning, duration)
    }

    /// # Errors
    ///
    /// See [`NotificationManager::show`].
    pub fn info(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Result<NotificationHandle> {
        self.show(message, Kind::Info, duration)
    }

    /// Starts the exit animation. A no-op for notifications already leaving
    /// or gone; returns whether a removal sequence was started.
    pub fn dismiss(&self, handle: &NotificationHandle) -> bool {
        self.dismiss_id(handle.id)
    }

    /// Entry point for the close control, which only knows the id it carries.
    pub fn dismiss_id(&self, id: NotificationId) -> bool {
        self.shared.dismiss(id, DismissReason::Closed)
    }

    /// Live notifications in display order.
    #[must_use]
    pub fn active(&self) -> Vec<NotificationSnapshot> {
        self.shared.state().active.iter().map(Entry::snapshot).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state().active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.state().active.is_empty()
    }

    /// Streams lifecycle events from now on. A new subscription replaces the
    /// previous one.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        let (tx, rx) = bounded(self.shared.settings.event_buffer);
        self.shared.state().events = Some(tx);
        rx
    }

    pub(crate) fn take_server_alerts(&self) -> Vec<ServerAlert> {
        self.shared.state().surface.take_server_alerts()
    }
}

impl Drop for NotificationManager {
    fn drop(&mut self) {
        for entry in &self.shared.state().active {
            entry.reveal.cancel();
            if let Some(timer) = entry.auto_dismiss.as_ref() {
                timer.cancel();
            }
        }
    }
}

/// Caller-side reference to a notification. Does not keep it alive.
#[derive(Clone)]
pub struct NotificationHandle {
    id: NotificationId,
    shared: Weak<Shared>,
}

impl NotificationHandle {
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Current phase; `Removed` once the notification left the host.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared
            .upgrade()
            .and_then(|shared| {
                let state = shared.state();
                state.position(self.id).map(|index| state.active[index].phase)
            })
            .unwrap_or(Phase::Removed)
    }

    /// Same as [`NotificationManager::dismiss`].
    pub fn dismiss(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.dismiss(self.id, DismissReason::Closed))
    }
}

impl fmt::Debug for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{LifecycleEvent, NotificationId, NotificationManager};
    use crate::config::Config;
    use crate::error::{Error, NotifyError};
    use crate::kind::{DismissReason, Kind, Phase};
    use crate::surface::MemoryPage;
    use std::str::FromStr;

    fn fixed_id() -> NotificationId {
        match NotificationId::from_str("01890a5d-ac96-774b-bcce-b302099a8057") {
            Ok(id) => id,
            Err(err) => panic!("fixture id should parse: {err}"),
        }
    }

    #[test]
    fn lifecycle_event_serializes_reason_only_when_dismissing() {
        let expired = LifecycleEvent {
            id: fixed_id(),
            kind: Kind::Error,
            phase: Phase::Dismissing,
            reason: Some(DismissReason::Expired),
        };
        let visible = LifecycleEvent {
            phase: Phase::Visible,
            reason: None,
            ..expired.clone()
        };
        insta::assert_json_snapshot!(expired, @r#"
        {
          "id": "01890a5d-ac96-774b-bcce-b302099a8057",
          "kind": "error",
          "phase": "dismissing",
          "reason": "expired"
        }
        "#);

        insta::assert_json_snapshot!(visible, @r#"
        {
          "id": "01890a5d-ac96-774b-bcce-b302099a8057",
          "kind": "error",
          "phase": "visible"
        }
        "#);
    }

    #[test]
    fn ids_are_unique_and_round_trip_through_markup() {
        let a = NotificationId::new();
        let b = NotificationId::new();
        assert_ne!(a, b);
        assert_eq!(NotificationId::from_str(&a.to_string()).ok(), Some(a));
        assert!(NotificationId::from_str("not-an-id").is_err());
    }

    #[test]
    fn manager_requires_a_runtime() {
        let result = NotificationManager::new(MemoryPage::new(), &Config::default());
        assert!(matches!(result, Err(Error::Notify(NotifyError::NoRuntime))));
    }
}
