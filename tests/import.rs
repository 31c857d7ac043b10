#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use mercato_toasts::bridge::import_server_alerts;
use mercato_toasts::config::Config;
use mercato_toasts::surface::MemoryPage;
use mercato_toasts::{Kind, NotificationManager, Phase};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <div class="messages">
      <div role="alert" class="alert alert-error">Your card was declined.</div>
      <div role="alert" class="rounded bg-green-100 text-green-800">Booking confirmed</div>
      <div role="alert" class="alert"></div>
      <div class="alert alert-warning">Not marked as an alert</div>
    </div>
  </body>
</html>"#;

fn setup() -> (NotificationManager, MemoryPage) {
    let page = MemoryPage::from_markup(PAGE).unwrap();
    let manager = NotificationManager::new(page.clone(), &Config::default()).unwrap();
    (manager, page)
}

#[tokio::test(start_paused = true)]
async fn server_alerts_become_notifications() {
    let (manager, page) = setup();

    let handles = import_server_alerts(&manager).unwrap();
    assert_eq!(handles.len(), 3);

    let active = manager.active();
    assert_eq!(active[0].kind, Kind::Error);
    assert_eq!(active[0].message, "Your card was declined.");
    assert_eq!(active[1].kind, Kind::Success);
    assert_eq!(active[1].message, "Booking confirmed");
    assert_eq!(active[2].kind, Kind::Info);
    assert_eq!(active[2].message, "");
    assert!(active.iter().all(|n| n.duration == Duration::from_secs(5)));

    // Every alert is hidden; nothing is removed.
    let alerts = page.server_alerts();
    assert_eq!(alerts.len(), 3);
    assert!(alerts.iter().all(|(_, hidden)| *hidden));
}

#[tokio::test(start_paused = true)]
async fn import_twice_does_not_duplicate() {
    let (manager, _page) = setup();
    assert_eq!(import_server_alerts(&manager).unwrap().len(), 3);
    assert!(import_server_alerts(&manager).unwrap().is_empty());
    assert_eq!(manager.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn imported_notifications_expire_like_any_other() {
    let (manager, _page) = setup();
    let handles = import_server_alerts(&manager).unwrap();
    tokio::time::sleep(Duration::from_millis(5400)).await;
    assert!(handles.iter().all(|h| h.phase() == Phase::Removed));
    assert!(manager.is_empty());
}

#[tokio::test(start_paused = true)]
async fn blank_alert_still_becomes_a_notification() {
    let page = MemoryPage::from_markup(r#"<div role="alert" class="alert-error">   </div>"#).unwrap();
    let manager = NotificationManager::new(page.clone(), &Config::default()).unwrap();

    let handles = import_server_alerts(&manager).unwrap();
    assert_eq!(handles.len(), 1);
    let active = manager.active();
    assert_eq!(active[0].kind, Kind::Error);
    assert!(active[0].message.is_empty());
    assert!(page.server_alerts().iter().all(|(_, hidden)| *hidden));
}

#[tokio::test(start_paused = true)]
async fn page_without_alerts_imports_nothing() {
    let page = MemoryPage::from_markup("<main><h1>Rooms</h1></main>").unwrap();
    let manager = NotificationManager::new(page.clone(), &Config::default()).unwrap();
    assert!(import_server_alerts(&manager).unwrap().is_empty());
    assert!(page.render().is_none());
}
