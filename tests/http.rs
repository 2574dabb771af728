use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct TimerResponse {
    phase: String,
    duration_minutes: i64,
    total_seconds: i64,
    remaining_seconds: i64,
    display: String,
}

#[derive(Debug, Deserialize)]
struct ActivityResponse {
    today: String,
    days: BTreeMap<String, u32>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("focusgrid_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/timer")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_focusgrid"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_timer(client: &Client, base_url: &str) -> TimerResponse {
    client
        .get(format!("{base_url}/api/timer"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn post_timer(client: &Client, base_url: &str, action: &str) -> TimerResponse {
    client
        .post(format!("{base_url}/api/timer/{action}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn commit_duration(client: &Client, base_url: &str, value: &str) -> TimerResponse {
    post_timer(client, base_url, "edit/begin").await;
    client
        .post(format!("{base_url}/api/timer/edit/commit"))
        .json(&serde_json::json!({ "value": value }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_duration_edit_applies_and_resets_countdown() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    post_timer(&client, &server.base_url, "reset").await;
    let after = commit_duration(&client, &server.base_url, "25").await;

    assert_eq!(after.phase, "idle");
    assert_eq!(after.duration_minutes, 25);
    assert_eq!(after.total_seconds, 1500);
    assert_eq!(after.remaining_seconds, 1500);
    assert_eq!(after.display, "25:00");
}

#[tokio::test]
async fn http_invalid_duration_edit_keeps_prior_value() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    post_timer(&client, &server.base_url, "reset").await;
    let before = get_timer(&client, &server.base_url).await;

    for value in ["999", "0", "nonsense", "-10"] {
        let after = commit_duration(&client, &server.base_url, value).await;
        assert_eq!(after.phase, "idle", "value {value:?}");
        assert_eq!(after.duration_minutes, before.duration_minutes, "value {value:?}");
    }
}

#[tokio::test]
async fn http_start_pause_reset_cycle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    post_timer(&client, &server.base_url, "reset").await;
    commit_duration(&client, &server.base_url, "240").await;

    let running = post_timer(&client, &server.base_url, "start").await;
    assert_eq!(running.phase, "running");
    assert!(running.remaining_seconds <= running.total_seconds);

    sleep(Duration::from_millis(300)).await;
    let paused = post_timer(&client, &server.base_url, "pause").await;
    assert_eq!(paused.phase, "paused");

    // A second pause is a no-op and keeps the snapshot.
    let paused_again = post_timer(&client, &server.base_url, "pause").await;
    assert_eq!(paused_again.phase, "paused");
    assert_eq!(paused_again.remaining_seconds, paused.remaining_seconds);

    let resumed = post_timer(&client, &server.base_url, "start").await;
    assert_eq!(resumed.phase, "running");
    assert!(resumed.remaining_seconds <= paused.remaining_seconds);

    let idle = post_timer(&client, &server.base_url, "reset").await;
    assert_eq!(idle.phase, "idle");
    assert_eq!(idle.remaining_seconds, idle.total_seconds);
}

#[tokio::test]
async fn http_activity_reset_requires_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let refused = client
        .post(format!("{}/api/activity/reset", server.base_url))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(refused.status(), reqwest::StatusCode::BAD_REQUEST);

    let confirmed = client
        .post(format!("{}/api/activity/reset", server.base_url))
        .json(&serde_json::json!({ "confirm": true }))
        .send()
        .await
        .unwrap();
    assert!(confirmed.status().is_success());

    let activity: ActivityResponse = client
        .get(format!("{}/api/activity", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(activity.days.is_empty());
    assert!(!activity.today.is_empty());
}

#[tokio::test]
async fn http_index_serves_year_grid() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let body = client
        .get(&server.base_url)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Focusgrid"));
    assert!(body.contains("id=\"d-2026-01-01\""));
    assert!(body.contains("id=\"d-2026-12-31\""));
    assert!(body.contains("2026-01-01: No activity") || body.contains("2026-01-01: 1 session"));
    // The page script announces a day change before the full re-render.
    assert!(body.contains("New day: "));
}
