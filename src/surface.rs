use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bridge::{ServerAlert, scan_alerts};
use crate::config::HostSpec;
use crate::error::{ImportError, NotifyError};
use crate::kind::Phase;
use crate::manager::NotificationId;
use crate::render::{NotificationView, host_markup};

/// The document a manager renders into.
///
/// Calls arrive in lifecycle order for any one notification; the manager
/// never attaches before `mount_host` succeeded.
pub trait Surface: Send {
    /// Creates the live-region host. Called at most once per manager.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::HostUnavailable`] when there is no document to
    /// attach to.
    fn mount_host(&mut self, host: &HostSpec) -> Result<(), NotifyError>;

    /// Appends a notification block as the last child of the host.
    fn attach(&mut self, view: NotificationView);

    fn set_phase(&mut self, id: NotificationId, phase: Phase);

    fn detach(&mut self, id: NotificationId);

    /// Returns the server-rendered alerts still shown on the page and hides
    /// them. Hidden alerts are never returned again.
    fn take_server_alerts(&mut self) -> Vec<ServerAlert>;
}

/// In-memory document. Clones share the same page, so a test or the CLI can
/// keep a clone while the manager owns another.
#[derive(Clone, Debug)]
pub struct MemoryPage {
    inner: Arc<Mutex<PageState>>,
}

#[derive(Debug)]
struct PageState {
    has_document: bool,
    host: Option<HostSpec>,
    host_mounts: usize,
    nodes: Vec<Node>,
    phase_log: Vec<(NotificationId, Phase)>,
    alerts: Vec<PageAlert>,
}

#[derive(Debug)]
struct Node {
    view: NotificationView,
    phase: Phase,
}

#[derive(Debug)]
struct PageAlert {
    alert: ServerAlert,
    hidden: bool,
}

impl MemoryPage {
    /// An empty page with a document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(true, Vec::new())
    }

    /// A page with no document; mounting the host fails.
    #[must_use]
    pub fn detached() -> Self {
        Self::with_state(false, Vec::new())
    }

    /// A page whose server-rendered markup may carry `role="alert"` messages.
    ///
    /// # Errors
    ///
    /// Returns an error when the markup cannot be scanned.
    pub fn from_markup(markup: &str) -> Result<Self, ImportError> {
        let alerts = scan_alerts(markup)?;
        Ok(Self::with_state(true, alerts))
    }

    fn with_state(has_document: bool, alerts: Vec<ServerAlert>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PageState {
                has_document,
                host: None,
                host_mounts: 0,
                nodes: Vec::new(),
                phase_log: Vec::new(),
                alerts: alerts
                    .into_iter()
                    .map(|alert| PageAlert {
                        alert,
                        hidden: false,
                    })
                    .collect(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn host_mounts(&self) -> usize {
        self.state().host_mounts
    }

    /// Ids of the attached blocks, top to bottom.
    #[must_use]
    pub fn attached(&self) -> Vec<NotificationId> {
        self.state().nodes.iter().map(|node| node.view.id).collect()
    }

    /// Every phase the surface was told about for `id`, in order.
    #[must_use]
    pub fn phase_log(&self, id: NotificationId) -> Vec<Phase> {
        self.state()
            .phase_log
            .iter()
            .filter(|(logged, _)| *logged == id)
            .map(|(_, phase)| *phase)
            .collect()
    }

    #[must_use]
    pub fn block_markup(&self, id: NotificationId) -> Option<String> {
        self.state()
            .nodes
            .iter()
            .find(|node| node.view.id == id)
            .map(|node| node.view.markup(node.phase))
    }

    /// Server alerts found on the page, with whether each is hidden.
    #[must_use]
    pub fn server_alerts(&self) -> Vec<(ServerAlert, bool)> {
        self.state()
            .alerts
            .iter()
            .map(|entry| (entry.alert.clone(), entry.hidden))
            .collect()
    }

    /// Host markup with its current children, or `None` before the first
    /// notification mounted it.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        let state = self.state();
        let host = state.host.as_ref()?;
        let children: String = state
            .nodes
            .iter()
            .map(|node| node.view.markup(node.phase))
            .collect();
        Some(host_markup(host, &children))
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for MemoryPage {
    fn mount_host(&mut self, host: &HostSpec) -> Result<(), NotifyError> {
        let mut state = self.state();
        if !state.has_document {
            return Err(NotifyError::HostUnavailable(
                "page has no document body".to_string(),
            ));
        }
        state.host = Some(host.clone());
        state.host_mounts += 1;
        Ok(())
    }

    fn attach(&mut self, view: NotificationView) {
        let mut state = self.state();
        state.phase_log.push((view.id, Phase::Entering));
        state.nodes.push(Node {
            view,
            phase: Phase::Entering,
        });
    }

    fn set_phase(&mut self, id: NotificationId, phase: Phase) {
        let mut guard = self.state();
        let state = &mut *guard;
        if let Some(node) = state.nodes.iter_mut().find(|node| node.view.id == id) {
            node.phase = phase;
            state.phase_log.push((id, phase));
        }
    }

    fn detach(&mut self, id: NotificationId) {
        let mut state = self.state();
        let before = state.nodes.len();
        state.nodes.retain(|node| node.view.id != id);
        if state.nodes.len() < before {
            state.phase_log.push((id, Phase::Removed));
        }
    }

    fn take_server_alerts(&mut self) -> Vec<ServerAlert> {
        self.state()
            .alerts
            .iter_mut()
            .filter(|entry| !entry.hidden)
            .map(|entry| {
                entry.hidden = true;
                entry.alert.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryPage, Surface};
    use crate::config::HostSpec;
    use crate::error::NotifyError;
    use crate::kind::{Kind, Phase};
    use crate::manager::NotificationId;
    use crate::render::NotificationView;
    use std::time::Duration;

    #[test]
    fn detached_page_refuses_host() {
        let mut page = MemoryPage::detached();
        let result = page.mount_host(&HostSpec::default());
        assert!(matches!(result, Err(NotifyError::HostUnavailable(_))));
        assert!(page.render().is_none());
    }

    #[test]
    fn clones_share_the_document() {
        let page = MemoryPage::new();
        let mut owned = page.clone();
        let id = NotificationId::new();
        assert!(owned.mount_host(&HostSpec::default()).is_ok());
        owned.attach(NotificationView::new(id, Kind::Info, "hi", Duration::ZERO));
        owned.set_phase(id, Phase::Visible);
        assert_eq!(page.attached(), vec![id]);
        assert_eq!(page.phase_log(id), vec![Phase::Entering, Phase::Visible]);
    }

    #[test]
    fn take_server_alerts_hides_once() {
        let markup = r#"<main><div role="alert" class="alert alert-success">Saved</div></main>"#;
        let mut page = match MemoryPage::from_markup(markup) {
            Ok(page) => page,
            Err(err) => panic!("markup should scan: {err}"),
        };
        assert_eq!(page.take_server_alerts().len(), 1);
        assert!(page.take_server_alerts().is_empty());
        assert!(page.server_alerts().iter().all(|(_, hidden)| *hidden));
    }
}
