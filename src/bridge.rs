//! One-shot import of server-rendered `role="alert"` messages.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};
use tracing::{debug, info};

use crate::Result;
use crate::error::ImportError;
use crate::kind::Kind;
use crate::manager::{NotificationHandle, NotificationManager};

const VOID_ELEMENTS: &[&[u8]] = &[
    b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta",
    b"param", b"source", b"track", b"wbr",
];

/// A message found in the page markup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerAlert {
    /// Text content with outer whitespace trimmed.
    pub text: String,
    /// Raw `class` attribute.
    pub classes: String,
}

impl ServerAlert {
    #[must_use]
    pub fn kind(&self) -> Kind {
        infer_kind(&self.classes)
    }
}

/// Maps a class list to a kind by case-insensitive substring match.
///
/// Success markers win over error markers, which win over warning markers.
#[must_use]
pub fn infer_kind(class_list: &str) -> Kind {
    let classes = class_list.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|needle| classes.contains(needle));
    if has(&["success", "green"]) {
        Kind::Success
    } else if has(&["error", "red", "danger"]) {
        Kind::Error
    } else if has(&["warning", "yellow"]) {
        Kind::Warning
    } else {
        Kind::Info
    }
}

/// An element that has been opened but not yet closed.
struct OpenElement {
    name: Vec<u8>,
    /// Index into the found alerts when this element is one.
    alert: Option<usize>,
}

/// Finds every `role="alert"` element in document order.
///
/// Nested alerts are reported too; an outer alert's text includes the text
/// of the alerts inside it. An end tag closes the nearest open element with
/// the same name along with everything opened after it, so an omitted
/// optional end tag does not leak sibling text into an alert.
///
/// # Errors
///
/// Returns [`ImportError::Markup`] when the markup is too broken to tokenize.
pub fn scan_alerts(markup: &str) -> std::result::Result<Vec<ServerAlert>, ImportError> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut found: Vec<ServerAlert> = Vec::new();
    let mut open: Vec<OpenElement> = Vec::new();
    // Indexes of alerts still collecting text.
    let mut capturing: Vec<usize> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|err| ImportError::Markup {
            position: u64::try_from(reader.error_position()).unwrap_or(u64::MAX),
            message: err.to_string(),
        })?;
        match event {
            Event::Start(ref element) if is_void(element) => {
                if let Some(classes) = alert_classes(element) {
                    found.push(ServerAlert {
                        text: String::new(),
                        classes,
                    });
                }
            }
            Event::Start(ref element) => {
                let alert = alert_classes(element).map(|classes| {
                    found.push(ServerAlert {
                        text: String::new(),
                        classes,
                    });
                    found.len() - 1
                });
                capturing.extend(alert);
                open.push(OpenElement {
                    name: element.local_name().as_ref().to_ascii_lowercase(),
                    alert,
                });
            }
            Event::Empty(ref element) => {
                if let Some(classes) = alert_classes(element) {
                    found.push(ServerAlert {
                        text: String::new(),
                        classes,
                    });
                }
            }
            Event::Text(ref text) => {
                if !capturing.is_empty() {
                    let chunk = text_content(text);
                    for &slot in &capturing {
                        found[slot].text.push_str(&chunk);
                    }
                }
            }
            Event::CData(ref data) => {
                if !capturing.is_empty() {
                    let chunk = String::from_utf8_lossy(data);
                    for &slot in &capturing {
                        found[slot].text.push_str(&chunk);
                    }
                }
            }
            Event::End(ref element) => {
                let name = element.local_name();
                // Stray end tags with no open counterpart are ignored.
                let Some(at) = open
                    .iter()
                    .rposition(|el| el.name.eq_ignore_ascii_case(name.as_ref()))
                else {
                    continue;
                };
                for closed in open.drain(at..) {
                    if closed.alert.is_some() {
                        capturing.pop();
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    for alert in &mut found {
        alert.text = alert.text.trim().to_string();
    }

    debug!(count = found.len(), "scanned page for server alerts");
    Ok(found)
}

fn is_void(element: &BytesStart<'_>) -> bool {
    let name = element.local_name();
    VOID_ELEMENTS
        .iter()
        .any(|void| name.as_ref().eq_ignore_ascii_case(void))
}

fn alert_classes(element: &BytesStart<'_>) -> Option<String> {
    let mut is_alert = false;
    let mut classes = String::new();
    for attr in element.html_attributes().flatten() {
        let key = attr.key.as_ref();
        if key.eq_ignore_ascii_case(b"role") {
            is_alert = attr
                .unescape_value()
                .is_ok_and(|value| value.trim().eq_ignore_ascii_case("alert"));
        } else if key.eq_ignore_ascii_case(b"class") {
            classes = attr
                .unescape_value()
                .map(|value| value.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    is_alert.then_some(classes)
}

fn text_content(text: &BytesText<'_>) -> String {
    // HTML-only entities such as `&nbsp;` are kept verbatim.
    text.unescape().map_or_else(
        |_| String::from_utf8_lossy(text).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

/// Turns every visible server alert into a notification and hides it.
///
/// Alerts with no text still produce a notification. Alerts imported by an
/// earlier call are not imported again.
///
/// # Errors
///
/// Propagates the first error from [`NotificationManager::show`].
pub fn import_server_alerts(manager: &NotificationManager) -> Result<Vec<NotificationHandle>> {
    let alerts = manager.take_server_alerts();
    let mut handles = Vec::with_capacity(alerts.len());
    for alert in alerts {
        let kind = alert.kind();
        info!(%kind, classes = %alert.classes, "importing server message");
        handles.push(manager.show(alert.text, kind, None)?);
    }
    Ok(handles)
}
