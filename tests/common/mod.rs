#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum_test::TestServer;
use shortener::application::services::{ShortenerService, UserAuthService};
use shortener::domain::deletion::{BatchDeleter, DeleterConfig};
use shortener::domain::entities::UrlRecord;
use shortener::domain::repositories::{StoreError, UrlRepository};
use shortener::infrastructure::persistence::MemoryUrlRepository;
use shortener::routes::app_router;
use shortener::state::AppState;

pub const BASE_URL: &str = "http://localhost:8080";
pub const SECRET: &str = "test-signing-secret";

/// A `mark_urls_deleted` call seen by [`RecordingRepository`].
#[derive(Debug, Clone)]
pub struct MarkCall {
    pub user_id: String,
    pub short_ids: Vec<String>,
    pub at: Instant,
}

impl MarkCall {
    pub fn sorted_ids(&self) -> Vec<String> {
        let mut ids = self.short_ids.clone();
        ids.sort();
        ids
    }
}

/// Repository that records deletion calls and can be told to misbehave.
#[derive(Default)]
pub struct RecordingRepository {
    calls: Mutex<Vec<MarkCall>>,
    failing_users: Vec<String>,
    slow_users: Vec<String>,
    slow_delay: Duration,
    ping_fails: bool,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, user_id: &str) -> Self {
        self.failing_users.push(user_id.to_string());
        self
    }

    pub fn slow_for(mut self, user_id: &str, delay: Duration) -> Self {
        self.slow_users.push(user_id.to_string());
        self.slow_delay = delay;
        self
    }

    pub fn with_failing_ping(mut self) -> Self {
        self.ping_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<MarkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, user_id: &str) -> Vec<MarkCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect()
    }

    /// Polls until at least `count` calls were recorded or `timeout` passes.
    pub async fn wait_for_calls(&self, count: usize, timeout: Duration) -> Vec<MarkCall> {
        let deadline = Instant::now() + timeout;
        loop {
            let calls = self.calls();
            if calls.len() >= count || Instant::now() >= deadline {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl UrlRepository for RecordingRepository {
    async fn save_url(&self, _record: UrlRecord) -> Result<(), StoreError> {
        Ok(())
    }

    async fn save_urls(&self, _records: Vec<UrlRecord>) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_url(&self, _short_url: &str) -> Result<Option<UrlRecord>, StoreError> {
        Ok(None)
    }

    async fn get_user_urls(&self, _user_id: &str) -> Result<Vec<UrlRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn mark_urls_deleted(&self, user_id: &str, short_ids: &[String]) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(MarkCall {
            user_id: user_id.to_string(),
            short_ids: short_ids.to_vec(),
            at: Instant::now(),
        });

        if self.slow_users.iter().any(|u| u == user_id) {
            tokio::time::sleep(self.slow_delay).await;
        }

        if self.failing_users.iter().any(|u| u == user_id) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.ping_fails {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

/// Deleter settings that flush quickly enough for HTTP-level tests.
pub fn fast_deleter_config() -> DeleterConfig {
    DeleterConfig {
        flush_interval: Duration::from_millis(50),
        ..Default::default()
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub deleter: Arc<BatchDeleter>,
    pub repository: Arc<dyn UrlRepository>,
    pub auth: Arc<UserAuthService>,
}

impl TestApp {
    /// `Cookie` header value identifying `user_id`.
    pub fn cookie_for(&self, user_id: &str) -> HeaderValue {
        let token = self.auth.issue_token(user_id);
        HeaderValue::from_str(&format!("auth_token={token}")).unwrap()
    }
}

pub fn spawn_app_with(repository: Arc<dyn UrlRepository>) -> TestApp {
    let deleter =
        Arc::new(BatchDeleter::spawn(repository.clone(), fast_deleter_config()).unwrap());
    let auth = Arc::new(UserAuthService::new(SECRET));
    let shortener = Arc::new(ShortenerService::new(
        repository.clone(),
        deleter.clone(),
        BASE_URL,
    ));

    let state = AppState::new(shortener, auth.clone());
    let server = TestServer::new(app_router(state)).unwrap();

    TestApp {
        server,
        deleter,
        repository,
        auth,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(MemoryUrlRepository::new()))
}
