use std::net::SocketAddr;
use std::path::PathBuf;

use configs::AppConfig;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Isolated directories per test run
    let root = std::env::temp_dir().join(format!("e2e_{}", Uuid::new_v4()));
    let mut cfg = AppConfig::default();
    cfg.storage.data_dir = root.join("data").to_string_lossy().into_owned();
    cfg.storage.uploads_dir = root.join("uploads").to_string_lossy().into_owned();
    cfg.storage.frontend_dir = root.join("frontend").to_string_lossy().into_owned();
    cfg.normalize_and_validate()?;

    let app = server::startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, root })
}

#[tokio::test]
async fn e2e_save_and_reload_collection() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let res = c.get(format!("{}/api/data/leaderboard", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"success": true, "data": []}));

    let board = json!([{"name": "Alice", "score": 10}]);
    let res = c.post(format!("{}/api/data/leaderboard", app.base_url)).json(&board).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["success"], true);

    let res = c.get(format!("{}/api/data/leaderboard", app.base_url)).send().await?;
    assert_eq!(res.json::<Value>().await?["data"], board);

    // persisted where the config says, pretty-printed
    let text = tokio::fs::read_to_string(app.root.join("data/leaderboard.json")).await?;
    assert_eq!(serde_json::from_str::<Value>(&text)?, board);
    assert!(text.contains('\n'));
    Ok(())
}

#[tokio::test]
async fn e2e_non_json_body_is_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::Client::new()
        .post(format!("{}/api/data/users", app.base_url))
        .header("content-type", "text/plain")
        .body("definitely not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["success"], false);
    assert!(!app.root.join("data/users.json").exists());
    Ok(())
}

#[tokio::test]
async fn e2e_upload_screenshots_and_fetch_them_back() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let form = Form::new()
        .part("files", Part::bytes(b"first-image".to_vec()).file_name("shot one.png"))
        .part("files", Part::bytes(b"second-image".to_vec()).file_name("shot2.jpg"))
        .text("submissionId", "sub-77");
    let res = c.post(format!("{}/api/upload-screenshots", app.base_url)).multipart(form).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    let files = body["files"].as_array().expect("files array");
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["fileName"], "shot_one.png");
    assert_eq!(files[1]["fileName"], "shot2.jpg");

    let url = files[0]["url"].as_str().expect("url");
    assert!(url.starts_with("/uploads/task_submissions/sub-77/"));
    let res = c.get(format!("{}{}", app.base_url, url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.bytes().await?.as_ref(), b"first-image");
    Ok(())
}

#[tokio::test]
async fn e2e_upload_without_submission_id_gets_generated_one() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new().part("files", Part::bytes(b"img".to_vec()).file_name("a.png"));
    let res = reqwest::Client::new()
        .post(format!("{}/api/upload-screenshots", app.base_url))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    let url = body["files"][0]["url"].as_str().expect("url");
    let segments: Vec<&str> = url.trim_start_matches('/').split('/').collect();
    assert_eq!(segments[..2], ["uploads", "task_submissions"]);
    assert_eq!(segments[2].len(), 32);
    Ok(())
}

#[tokio::test]
async fn e2e_missing_frontend_index_is_not_found() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/some/page", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}
