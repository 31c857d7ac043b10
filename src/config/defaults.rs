use std::time::Duration;

use super::{DEFAULT_DURATION, DEFAULT_ENTER_DELAY, DEFAULT_EXIT_DURATION};

pub(super) const fn default_duration() -> Duration {
    DEFAULT_DURATION
}

pub(super) const fn default_enter_delay() -> Duration {
    DEFAULT_ENTER_DELAY
}

pub(super) const fn default_exit_duration() -> Duration {
    DEFAULT_EXIT_DURATION
}

pub(super) const fn default_event_buffer() -> usize {
    64
}

pub(super) fn default_element_id() -> String {
    "notification-container".to_string()
}

pub(super) fn default_host_classes() -> String {
    "fixed bottom-6 left-6 z-50 space-y-3 max-w-sm w-full pointer-events-none".to_string()
}

pub(super) fn default_politeness() -> String {
    "polite".to_string()
}

pub(super) const fn default_atomic() -> bool {
    true
}
