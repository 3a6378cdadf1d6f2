use axum::{Json, Router, routing::get};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use url::Url;

use tome::Tome;
use tome::config::Config;
use tome::db::Row;
use tome::notify::ToastKind;
use tome::updates::{self, ManifestUpdateSource};

fn unique_sqlite_path(prefix: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "tome-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

async fn manifest_server(version: &'static str) -> Url {
    let app = Router::new().route(
        "/latest.json",
        get(move || async move { Json(json!({"version": version, "notes": "Bug fixes"})) }),
    );
    spawn_test_server(app).await.join("latest.json").expect("join")
}

#[tokio::test]
async fn manifest_source_reports_newer_versions_only() {
    let newer = manifest_server("9.0.0").await;
    let source = ManifestUpdateSource::with_http(newer, reqwest::Client::new(), "0.4.0");
    let update = updates::available_update(&source).await.expect("update available");
    assert_eq!(update.version, "9.0.0");
    assert_eq!(update.notes.as_deref(), Some("Bug fixes"));
    assert!(!updates::is_up_to_date(Some(&source), &[]).await);
    assert!(updates::is_up_to_date(Some(&source), &["9.0.0".to_string()]).await);

    let same = manifest_server("0.4.0").await;
    let source = ManifestUpdateSource::with_http(same, reqwest::Client::new(), "0.4.0");
    assert!(updates::is_up_to_date(Some(&source), &[]).await);

    let missing = spawn_test_server(Router::new()).await.join("latest.json").expect("join");
    let source = ManifestUpdateSource::with_http(missing, reqwest::Client::new(), "0.4.0");
    assert!(updates::available_update(&source).await.is_none());
    assert!(updates::is_up_to_date(Some(&source), &[]).await);
}

#[tokio::test]
async fn bootstrap_sync_reports_bad_rows_as_toasts() {
    let temp_path = unique_sqlite_path("bootstrap");

    let mut cfg = Config::default();
    cfg.basic.database_url = format!("sqlite:{}", temp_path.display());
    cfg.basic.update_manifest_url = Some(manifest_server("9.0.0").await);
    cfg.basic.skipped_versions = vec!["9.0.0".to_string()];
    cfg.basic.toast_duration_ms = 60_000;

    let app = Tome::bootstrap(&cfg).await.expect("bootstrap");

    app.db
        .insert(
            "engines",
            Row::new()
                .with("name", "Mystery")
                .with("type", "anthropic")
                .with("options", "{}"),
        )
        .await
        .expect("insert engine row");

    let reports = app.sync_all().await.expect("sync all");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].table, "engines");
    assert_eq!(reports[0].failures.len(), 1);

    let toasts = app.toasts.list();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert!(toasts[0].message.contains("engines"));
    assert_eq!(toasts[0].duration_ms, 60_000);

    assert!(app.is_up_to_date().await, "skipped version counts as up to date");

    app.shutdown();
    let _ = tokio::fs::remove_file(&temp_path).await;
}
