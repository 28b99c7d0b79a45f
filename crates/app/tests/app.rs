//! The assembled application over in-memory backends.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::resolver;
use folio_app::{App, AppConfig, Form};
use folio_auth::{AdminView, LoginForm, MemoryIdentity};
use folio_core::models::NewSkill;
use folio_store::{MemoryStore, RestStore};
use folio_tracker::{TrackerConfig, VisitorTracker, PRIVATE_IP};
use serde_json::json;

fn app_with(store: Arc<MemoryStore>) -> App {
    let identity = MemoryIdentity::new().with_account("admin@example.com", "hunter22");
    let tracker = VisitorTracker::new(store.clone(), resolver(Some("203.0.113.7")), "admin");
    App::new(store, Arc::new(identity), tracker)
}

async fn wait_for_visits(app: &App, count: usize) {
    let mut analytics = app.state().analytics();
    tokio::time::timeout(
        Duration::from_secs(5),
        analytics.wait_for(|s| s.items.len() >= count),
    )
    .await
    .expect("visits were not recorded")
    .unwrap();
}

// ---------------------------------------------------------------------------
// Test: public navigation is tracked, admin navigation is not
// ---------------------------------------------------------------------------

#[tokio::test]
async fn navigation_records_public_visits() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());

    // The initial route counts as the first visit.
    wait_for_visits(&app, 1).await;

    app.navigate("/services");
    wait_for_visits(&app, 2).await;

    app.navigate("/admin");
    app.navigate("/blog");
    wait_for_visits(&app, 3).await;

    let view = app.view();
    let mut pages: Vec<&str> = view.analytics.iter().map(|a| a.page.as_str()).collect();
    pages.sort_unstable();
    assert_eq!(pages, vec!["/", "/blog", "/services"]);
    assert!(view.analytics.iter().all(|a| a.ip == "203.0.113.7"));

    app.shutdown().await;
    assert_eq!(store.subscriber_count(), 0);
}

// ---------------------------------------------------------------------------
// Test: gate and mutations share the running app
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_signs_in_and_creates_a_skill() {
    let store = Arc::new(MemoryStore::with_data(json!({
        "skills": {"s1": {"name": "SEO"}}
    })));
    let mut app = app_with(store);
    let mut gate = app.gate();
    assert_eq!(gate.view(), AdminView::Login);

    let mut form = LoginForm::new("admin@example.com", "wrong");
    assert!(!app.gate().login(&mut form).await);
    assert!(form.error.is_some());

    let mut form = LoginForm::new("admin@example.com", "hunter22");
    assert!(app.gate().login(&mut form).await);
    assert_eq!(gate.changed().await, Some(AdminView::Console));

    let mut skill = Form::new(NewSkill { name: "PPC".into() });
    app.mutations().create_skill(&mut skill).await.unwrap();

    let mut skills = app.state().skills();
    skills.wait_for(|s| s.items.len() == 2).await.unwrap();
    assert_eq!(app.take_notices().len(), 1);

    gate.sign_out().await.unwrap();
    assert_eq!(gate.changed().await, Some(AdminView::Login));

    app.shutdown().await;
}

// ---------------------------------------------------------------------------
// Test: unconfigured backends fall back to memory and sign in at startup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn from_config_without_backends_runs_in_memory() {
    let config = AppConfig {
        admin_email: Some("admin@example.com".into()),
        admin_password: Some("hunter22".into()),
        tracker: TrackerConfig {
            primary_url: "http://127.0.0.1:1/".into(),
            fallback_url: "http://127.0.0.1:1/".into(),
            timeout: Duration::from_millis(200),
            ..Default::default()
        },
        ..Default::default()
    };

    let app = App::from_config(config).await.unwrap();
    assert_eq!(app.gate().view(), AdminView::Console);

    tokio::time::timeout(Duration::from_secs(5), app.state().wait_until_loaded())
        .await
        .unwrap();

    // Both lookups are unreachable.
    wait_for_visits(&app, 1).await;
    assert_eq!(app.view().analytics[0].ip, PRIVATE_IP);

    app.shutdown().await;
}

// ---------------------------------------------------------------------------
// Test: shutdown is honored while the store is still unreachable
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_stops_before_state_loads() {
    let store = Arc::new(RestStore::new("http://127.0.0.1:1"));
    let tracker = VisitorTracker::new(store.clone(), resolver(Some("203.0.113.7")), "admin");
    let app = App::new(store, Arc::new(MemoryIdentity::new()), tracker);
    assert!(!app.state().is_loaded());

    let stopped = tokio::time::timeout(
        Duration::from_secs(5),
        app.run_until(tokio::time::sleep(Duration::from_millis(200))),
    )
    .await;
    assert!(stopped.is_ok());
}

#[tokio::test]
async fn run_waits_for_shutdown_after_loading() {
    let store = Arc::new(MemoryStore::with_data(json!({"skills": {"s1": {"name": "SEO"}}})));
    let app = app_with(store.clone());
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let running = tokio::spawn(app.run_until(async {
        let _ = stopped.await;
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!running.is_finished());
    assert!(store.subscriber_count() > 0);

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(store.subscriber_count(), 0);
}
