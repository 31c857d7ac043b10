use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Visual treatment of a notification. Carries no behaviour of its own.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl Kind {
    pub const ALL: [Self; 4] = [Self::Success, Self::Error, Self::Warning, Self::Info];

    /// Lenient parse: unknown labels fall back to [`Kind::Info`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl From<&str> for Kind {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a notification. Transitions only move forward.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Entering,
    Visible,
    Dismissing,
    Removed,
}

impl Phase {
    /// The only state this one may transition to.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Entering => Some(Self::Visible),
            Self::Visible => Some(Self::Dismissing),
            Self::Dismissing => Some(Self::Removed),
            Self::Removed => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Removed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entering => "entering",
            Self::Visible => "visible",
            Self::Dismissing => "dismissing",
            Self::Removed => "removed",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What started the exit animation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissReason {
    /// The auto-dismiss timer fired.
    Expired,
    /// The close control or application code asked for it.
    Closed,
}

#[cfg(test)]
mod tests {
    use super::{Kind, Phase};

    #[test]
    fn kind_from_label_accepts_known_labels() {
        assert_eq!(Kind::from_label("success"), Kind::Success);
        assert_eq!(Kind::from_label("ERROR"), Kind::Error);
        assert_eq!(Kind::from_label(" Warning "), Kind::Warning);
        assert_eq!(Kind::from_label("info"), Kind::Info);
    }

    #[test]
    fn kind_from_label_falls_back_to_info() {
        assert_eq!(Kind::from_label("danger"), Kind::Info);
        assert_eq!(Kind::from_label(""), Kind::Info);
        assert_eq!(Kind::from("celebration"), Kind::Info);
    }

    #[test]
    fn phase_only_moves_forward() {
        let mut seen = vec![Phase::Entering];
        let mut current = Phase::Entering;
        while let Some(next) = current.next() {
            assert!(next > current);
            seen.push(next);
            current = next;
        }
        assert_eq!(
            seen,
            [Phase::Entering, Phase::Visible, Phase::Dismissing, Phase::Removed]
        );
        assert!(current.is_terminal());
    }
}
