use std::net::SocketAddr;
use std::path::PathBuf;

use configs::{AppConfig, MissingUserPolicy};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    store_path: PathBuf,
}

impl TestApp {
    fn users(&self) -> String {
        format!("{}/api/v1/users/", self.base_url)
    }

    fn user(&self, id: &str) -> String {
        format!("{}/api/v1/users/{}", self.base_url, id)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.store_path);
    }
}

fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("e2e_users_{}.json", Uuid::new_v4()))
}

async fn start_server_with(store_path: PathBuf, missing_user: MissingUserPolicy) -> anyhow::Result<TestApp> {
    start_server_cfg(store_path, |cfg| cfg.storage.missing_user = missing_user).await
}

async fn start_server_cfg(store_path: PathBuf, tweak: impl FnOnce(&mut AppConfig)) -> anyhow::Result<TestApp> {
    let mut cfg = AppConfig::default();
    cfg.storage.path = store_path.to_string_lossy().into_owned();
    tweak(&mut cfg);
    cfg.normalize_and_validate()?;

    let app = server::build_app(&cfg);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, store_path })
}

async fn start_server() -> anyhow::Result<TestApp> {
    start_server_with(temp_store_path(), MissingUserPolicy::Empty).await
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

async fn create(app: &TestApp, name: &str, email: &str) -> anyhow::Result<String> {
    let res = client()
        .post(app.users())
        .json(&json!({"display_name": name, "email": email}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let body = res.json::<Value>().await?;
    body["user_id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("user_id missing in {body}"))
}

#[tokio::test]
async fn root_answers_with_server_time() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    assert!(res.headers().contains_key("x-request-id"));
    let text = res.text().await?;
    assert!(!text.trim().is_empty());
    Ok(())
}

#[tokio::test]
async fn create_then_get() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.users())
        .json(&json!({"display_name": "Ann", "email": "a@x.com"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?, json!({"user_id": "1"}));

    let res = client().get(app.user("1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let user = res.json::<Value>().await?;
    assert_eq!(user["display_name"], "Ann");
    assert_eq!(user["email"], "a@x.com");
    assert!(user["created_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn sequential_creates_are_both_listed() -> anyhow::Result<()> {
    let app = start_server().await?;
    assert_eq!(create(&app, "Ann", "a@x.com").await?, "1");
    assert_eq!(create(&app, "Bo", "b@x.com").await?, "2");

    // same collection without the trailing slash
    let res = client().get(format!("{}/api/v1/users", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let list = res.json::<Value>().await?;
    assert_eq!(list["1"]["display_name"], "Ann");
    assert_eq!(list["2"]["display_name"], "Bo");
    Ok(())
}

#[tokio::test]
async fn empty_body_fields_default_to_empty_strings() -> anyhow::Result<()> {
    let app = start_server().await?;
    let id = create_raw(&app, json!({})).await?;
    let user = client().get(app.user(&id)).send().await?.json::<Value>().await?;
    assert_eq!(user["display_name"], "");
    assert_eq!(user["email"], "");
    Ok(())
}

async fn create_raw(app: &TestApp, body: Value) -> anyhow::Result<String> {
    let res = client().post(app.users()).json(&body).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let body = res.json::<Value>().await?;
    Ok(body["user_id"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn delete_then_list() -> anyhow::Result<()> {
    let app = start_server().await?;
    create(&app, "Ann", "a@x.com").await?;
    create(&app, "Bo", "b@x.com").await?;

    let res = client().delete(app.user("1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    assert!(res.bytes().await?.is_empty());

    let list = client().get(app.users()).send().await?.json::<Value>().await?;
    assert!(list.get("1").is_none());
    assert_eq!(list["2"]["display_name"], "Bo");

    // ids are not reused after a delete
    assert_eq!(create(&app, "Cy", "c@x.com").await?, "3");
    Ok(())
}

#[tokio::test]
async fn delete_unknown_is_not_found() -> anyhow::Result<()> {
    let app = start_server().await?;
    create(&app, "Ann", "a@x.com").await?;

    let res = client().delete(app.user("999")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(
        res.json::<Value>().await?,
        json!({"status": "Resource not found.", "error": "user_not_found"})
    );

    let list = client().get(app.users()).send().await?.json::<Value>().await?;
    assert_eq!(list.as_object().map(|m| m.len()), Some(1));
    Ok(())
}

#[tokio::test]
async fn update_unknown_is_not_found() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .patch(app.user("999"))
        .json(&json!({"display_name": "Nobody"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    // unknown id wins over a malformed body
    let res = client()
        .patch(app.user("999"))
        .header("content-type", "application/json")
        .body("{")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_changes_display_name_only() -> anyhow::Result<()> {
    let app = start_server().await?;
    let id = create(&app, "Ann", "a@x.com").await?;
    let before = client().get(app.user(&id)).send().await?.json::<Value>().await?;

    let res = client()
        .patch(app.user(&id))
        .json(&json!({"display_name": "Annie", "email": "ignored@x.com"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);

    let after = client().get(app.user(&id)).send().await?.json::<Value>().await?;
    assert_eq!(after["display_name"], "Annie");
    assert_eq!(after["email"], before["email"]);
    assert_eq!(after["created_at"], before["created_at"]);
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.users())
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "Invalid request.");
    assert!(body["error"].is_string());

    let id = create(&app, "Ann", "a@x.com").await?;
    let res = client()
        .patch(app.user(&id))
        .header("content-type", "application/json")
        .body("[1, 2")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // nothing was minted by the rejected create
    let list = client().get(app.users()).send().await?.json::<Value>().await?;
    assert_eq!(list.as_object().map(|m| m.len()), Some(1));
    Ok(())
}

#[tokio::test]
async fn get_unknown_answers_zero_user_by_default() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.user("42")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?,
        json!({"created_at": "0001-01-01T00:00:00Z", "display_name": "", "email": ""})
    );
    Ok(())
}

#[tokio::test]
async fn get_unknown_is_not_found_under_strict_policy() -> anyhow::Result<()> {
    let app = start_server_with(temp_store_path(), MissingUserPolicy::NotFound).await?;
    let res = client().get(app.user("42")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn persisted_file_keeps_documented_shape() -> anyhow::Result<()> {
    let app = start_server().await?;
    create(&app, "Ann", "a@x.com").await?;

    let raw = tokio::fs::read(&app.store_path).await?;
    let stored: Value = serde_json::from_slice(&raw)?;
    assert_eq!(stored["increment"], 1);
    assert_eq!(stored["list"]["1"]["display_name"], "Ann");
    assert_eq!(stored["list"]["1"]["email"], "a@x.com");
    assert!(stored["list"]["1"]["created_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn save_failure_is_internal_error_without_detail() -> anyhow::Result<()> {
    // a directory where the store file should be: reads fail open, the rename fails
    let dir = temp_store_path();
    tokio::fs::create_dir_all(&dir).await?;
    let app = start_server_with(dir.clone(), MissingUserPolicy::Empty).await?;

    let res = client()
        .post(app.users())
        .json(&json!({"display_name": "Ann", "email": "a@x.com"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await?, json!({"status": "Internal server error."}));

    let res = client().delete(app.user("1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

#[tokio::test]
async fn corrupt_store_is_internal_error_under_strict_load() -> anyhow::Result<()> {
    let path = temp_store_path();
    tokio::fs::write(&path, b"{\"increment\": 2, \"list\": {").await?;
    let app = start_server_cfg(path, |cfg| cfg.storage.strict_load = true).await?;

    let res = client().get(app.users()).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await?, json!({"status": "Internal server error."}));

    let res = client()
        .post(app.users())
        .json(&json!({"display_name": "Ann", "email": "a@x.com"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);

    // the corrupt file is left for an operator to inspect
    let raw = tokio::fs::read(&app.store_path).await?;
    assert_eq!(raw, b"{\"increment\": 2, \"list\": {");
    Ok(())
}

#[tokio::test]
async fn corrupt_store_fails_open_by_default() -> anyhow::Result<()> {
    let path = temp_store_path();
    tokio::fs::write(&path, b"not json").await?;
    let app = start_server_cfg(path, |_| {}).await?;

    let res = client().get(app.users()).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({}));
    Ok(())
}

#[tokio::test]
async fn serve_runs_until_shutdown_resolves() -> anyhow::Result<()> {
    let store_path = temp_store_path();
    let mut cfg = AppConfig::default();
    cfg.storage.path = store_path.to_string_lossy().into_owned();
    cfg.normalize_and_validate()?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(server::serve(cfg, listener, async {
        let _ = stop_rx.await;
    }));

    let app = TestApp { base_url: format!("http://{}:{}", addr.ip(), addr.port()), store_path };
    assert_eq!(create(&app, "Ann", "a@x.com").await?, "1");

    let _ = stop_tx.send(());
    server.await??;
    Ok(())
}

#[tokio::test]
async fn concurrent_creates_never_collide() -> anyhow::Result<()> {
    let app = start_server().await?;
    let mut handles = Vec::new();
    for n in 0..20 {
        let url = app.users();
        handles.push(tokio::spawn(async move {
            client()
                .post(url)
                .json(&json!({"display_name": format!("user{n}"), "email": ""}))
                .send()
                .await
        }));
    }
    let mut ids = Vec::new();
    for h in handles {
        let res = h.await??;
        assert_eq!(res.status(), HttpStatusCode::CREATED);
        let body = res.json::<Value>().await?;
        ids.push(body["user_id"].as_str().unwrap_or_default().parse::<u64>()?);
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());

    let list = client().get(app.users()).send().await?.json::<Value>().await?;
    assert_eq!(list.as_object().map(|m| m.len()), Some(20));
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/api-docs/openapi.json", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<Value>().await?;
    assert!(doc["paths"]["/api/v1/users/{id}"].is_object());
    Ok(())
}
