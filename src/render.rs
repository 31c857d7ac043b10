//! Markup for the notification host and its blocks.

use std::borrow::Cow;
use std::time::Duration;

use crate::config::HostSpec;
use crate::kind::{Kind, Phase};
use crate::manager::NotificationId;

const BLOCK_CLASSES: &str = "transform transition-all duration-300 ease-out pointer-events-auto \
     flex items-start p-4 rounded-xl shadow-2xl backdrop-blur-md border-l-4";
const HIDDEN_CLASSES: &str = "translate-x-[-120%] opacity-0";
const SHOWN_CLASSES: &str = "translate-x-0 opacity-100";
const PROGRESS_CLASSES: &str =
    "absolute bottom-0 left-0 h-1 bg-current opacity-30 rounded-bl-xl transition-all";
const CLOSE_CLASSES: &str = "notification-close ml-3 flex-shrink-0 inline-flex text-current \
     hover:opacity-70 focus:outline-none focus:ring-2 focus:ring-offset-2 focus:ring-current \
     rounded-lg transition-opacity";
const CLOSE_ICON_PATH: &str = "M6 18L18 6M6 6l12 12";

/// Colour treatment and icon for one kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Presentation {
    pub container_classes: &'static str,
    pub icon_classes: &'static str,
    pub icon_path: &'static str,
}

#[must_use]
pub const fn presentation(kind: Kind) -> Presentation {
    match kind {
        Kind::Success => Presentation {
            container_classes: "bg-green-50/95 dark:bg-green-900/80 text-green-800 dark:text-green-100 border-green-500",
            icon_classes: "text-green-600 dark:text-green-400",
            icon_path: "M9 12l2 2 4-4m6 2a9 9 0 11-18 0 9 9 0 0118 0z",
        },
        Kind::Error => Presentation {
            container_classes: "bg-red-50/95 dark:bg-red-900/80 text-red-800 dark:text-red-100 border-red-500",
            icon_classes: "text-red-600 dark:text-red-400",
            icon_path: "M10 14l2-2m0 0l2-2m-2 2l-2-2m2 2l2 2m7-2a9 9 0 11-18 0 9 9 0 0118 0z",
        },
        Kind::Warning => Presentation {
            container_classes: "bg-yellow-50/95 dark:bg-yellow-900/80 text-yellow-800 dark:text-yellow-100 border-yellow-500",
            icon_classes: "text-yellow-600 dark:text-yellow-400",
            icon_path: "M12 9v2m0 4h.01m-6.938 4h13.856c1.54 0 2.502-1.667 1.732-3L13.732 4c-.77-1.333-2.694-1.333-3.464 0L3.34 16c-.77 1.333.192 3 1.732 3z",
        },
        Kind::Info => Presentation {
            container_classes: "bg-blue-50/95 dark:bg-blue-900/80 text-blue-800 dark:text-blue-100 border-blue-500",
            icon_classes: "text-blue-600 dark:text-blue-400",
            icon_path: "M13 16h-1v-4h-1m1-4h.01M21 12a9 9 0 11-18 0 9 9 0 0118 0z",
        },
    }
}

/// Encodes text so it can only ever be read as text inside markup.
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Animation classes for a phase. Entering and dismissing share the
/// off-screen treatment so both edges animate.
#[must_use]
pub const fn phase_classes(phase: Phase) -> &'static str {
    match phase {
        Phase::Visible => SHOWN_CLASSES,
        Phase::Entering | Phase::Dismissing | Phase::Removed => HIDDEN_CLASSES,
    }
}

/// Everything a surface needs to draw one notification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationView {
    pub id: NotificationId,
    pub kind: Kind,
    /// Inner markup with the message already escaped.
    pub body: String,
    /// Zero when the notification has no auto-dismiss timer.
    pub duration: Duration,
}

impl NotificationView {
    #[must_use]
    pub fn new(id: NotificationId, kind: Kind, message: &str, duration: Duration) -> Self {
        let look = presentation(kind);
        let body = format!(
            concat!(
                r#"<div class="flex-shrink-0"><svg class="h-6 w-6 {icon_classes}" fill="none" viewBox="0 0 24 24" stroke="currentColor" aria-hidden="true"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="{icon_path}"/></svg></div>"#,
                r#"<div class="ml-3 flex-1"><p class="text-sm font-medium">{message}</p></div>"#,
                r#"<button type="button" class="{close_classes}" data-notification-id="{id}"><span class="sr-only">Close</span><svg class="h-5 w-5" fill="none" viewBox="0 0 24 24" stroke="currentColor" aria-hidden="true"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="{close_path}"/></svg></button>"#,
            ),
            icon_classes = look.icon_classes,
            icon_path = look.icon_path,
            message = escape_text(message),
            close_classes = CLOSE_CLASSES,
            id = id,
            close_path = CLOSE_ICON_PATH,
        );
        Self {
            id,
            kind,
            body,
            duration,
        }
    }

    /// Full block markup as it looks in the given phase.
    #[must_use]
    pub fn markup(&self, phase: Phase) -> String {
        let look = presentation(self.kind);
        let timed = !self.duration.is_zero();
        let mut out = format!(
            r#"<div data-notification-id="{id}" data-kind="{kind}" class="{BLOCK_CLASSES} {phase} {colours}{relative}">"#,
            id = self.id,
            kind = self.kind,
            phase = phase_classes(phase),
            colours = look.container_classes,
            relative = if timed { " relative" } else { "" },
        );
        out.push_str(&self.body);
        if timed {
            // The bar drains over the display time once the block is on screen.
            let width = if phase == Phase::Entering { 100 } else { 0 };
            out.push_str(&format!(
                r#"<div class="{PROGRESS_CLASSES}" style="width: {width}%; transition-duration: {ms}ms; transition-property: width"></div>"#,
                ms = self.duration.as_millis(),
            ));
        }
        out.push_str("</div>");
        out
    }
}

/// Opening and closing tags of the live region wrapped around `children`.
#[must_use]
pub fn host_markup(host: &HostSpec, children: &str) -> String {
    format!(
        r#"<div id="{id}" class="{classes}" aria-live="{live}" aria-atomic="{atomic}">{children}</div>"#,
        id = escape_text(&host.element_id),
        classes = escape_text(&host.classes),
        live = host.politeness,
        atomic = host.atomic,
    )
}

#[cfg(test)]
mod tests {
    use super::{NotificationView, escape_text, host_markup, phase_classes, presentation};
    use crate::config::HostSpec;
    use crate::kind::{Kind, Phase};
    use crate::manager::NotificationId;
    use std::time::Duration;

    #[test]
    fn escape_text_neutralises_markup() {
        insta::assert_snapshot!(
            escape_text("<img src=x onerror=alert(1)>"),
            @"&lt;img src=x onerror=alert(1)&gt;"
        );
        insta::assert_snapshot!(escape_text(r#"Tom & "Jerry""#), @"Tom &amp; &quot;Jerry&quot;");
    }

    #[test]
    fn every_kind_has_a_distinct_treatment() {
        for (i, a) in Kind::ALL.iter().enumerate() {
            for b in &Kind::ALL[i + 1..] {
                assert_ne!(presentation(*a), presentation(*b));
            }
        }
        assert!(presentation(Kind::Error).container_classes.contains("red"));
    }

    #[test]
    fn message_is_rendered_as_text() {
        let view = NotificationView::new(
            NotificationId::new(),
            Kind::Info,
            "<script>alert(1)</script>",
            Duration::ZERO,
        );
        let markup = view.markup(Phase::Visible);
        assert!(markup.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!markup.contains("<script>"));
    }

    #[test]
    fn progress_bar_only_when_timed() {
        let id = NotificationId::new();
        let sticky = NotificationView::new(id, Kind::Success, "Saved", Duration::ZERO);
        assert!(!sticky.markup(Phase::Visible).contains("transition-property: width"));

        let timed = NotificationView::new(id, Kind::Success, "Saved", Duration::from_secs(3));
        assert!(timed.markup(Phase::Entering).contains("width: 100%; transition-duration: 3000ms"));
        assert!(timed.markup(Phase::Visible).contains("width: 0%; transition-duration: 3000ms"));
    }

    #[test]
    fn phase_classes_toggle_visibility() {
        assert_eq!(phase_classes(Phase::Entering), phase_classes(Phase::Dismissing));
        assert_ne!(phase_classes(Phase::Entering), phase_classes(Phase::Visible));
    }

    #[test]
    fn host_is_a_polite_atomic_live_region() {
        let markup = host_markup(&HostSpec::default(), "");
        assert!(markup.starts_with(r#"<div id="notification-container""#));
        assert!(markup.contains(r#"aria-live="polite""#));
        assert!(markup.contains(r#"aria-atomic="true""#));
        assert!(markup.contains("bottom-6 left-6"));
    }
}
