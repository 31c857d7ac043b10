#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod kind;
pub mod manager;
pub mod render;
pub mod surface;
pub mod telemetry;

pub use kind::{DismissReason, Kind, Phase};
pub use manager::{LifecycleEvent, NotificationHandle, NotificationId, NotificationManager};

pub type Result<T> = std::result::Result<T, error::Error>;
