#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, web};
use anyhow::bail;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use coderunner::codec::encode_for_transport;
use coderunner::config::RemoteConfig;
use coderunner::executor::{Interpreter, InterpreterLoader};

/// Scripted Judge0 stand-in
pub struct MockJudge {
    pub submit_status: u16,
    pub token: Option<String>,
    /// Served in order on each poll; the last entry repeats forever
    pub polls: Vec<Value>,
    pub poll_count: AtomicUsize,
    pub submissions: Mutex<Vec<Value>>,
}

impl MockJudge {
    pub fn new(polls: Vec<Value>) -> Self {
        Self {
            submit_status: 201,
            token: Some("d85cd024-1548-4165-96c7-7bc88673f194".to_string()),
            polls,
            poll_count: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_submit(status: u16) -> Self {
        Self {
            submit_status: status,
            ..Self::new(vec![pending()])
        }
    }

    pub fn without_token() -> Self {
        Self {
            token: None,
            ..Self::new(vec![pending()])
        }
    }

    pub fn polls(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }
}

async fn create_submission(
    judge: web::Data<MockJudge>,
    query: web::Query<std::collections::HashMap<String, String>>,
    body: web::Json<Value>,
) -> HttpResponse {
    judge.submissions.lock().push(json!({
        "query": query.into_inner(),
        "body": body.into_inner(),
    }));

    if judge.submit_status != 201 {
        let status = StatusCode::from_u16(judge.submit_status).unwrap();
        return HttpResponse::build(status).json(json!({ "error": "Something went wrong" }));
    }

    match &judge.token {
        Some(token) => HttpResponse::Created().json(json!({ "token": token })),
        None => HttpResponse::Created().json(json!({})),
    }
}

async fn get_submission(judge: web::Data<MockJudge>, path: web::Path<String>) -> HttpResponse {
    if Some(path.into_inner()) != judge.token {
        return HttpResponse::NotFound().json(json!({ "error": "Not found" }));
    }
    let n = judge.poll_count.fetch_add(1, Ordering::SeqCst);
    let idx = n.min(judge.polls.len() - 1);
    HttpResponse::Ok().json(&judge.polls[idx])
}

/// Starts the mock on an ephemeral port and returns its base URL
pub fn start_mock_judge(judge: MockJudge) -> (String, web::Data<MockJudge>) {
    let judge = web::Data::new(judge);
    let app_judge = judge.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_judge.clone())
            .route("/submissions", web::post().to(create_submission))
            .route("/submissions/{token}", web::get().to(get_submission))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    (format!("http://{addr}"), judge)
}

pub fn remote_config(base_url: &str) -> RemoteConfig {
    RemoteConfig {
        base_url: base_url.to_string(),
        max_attempts: 5,
        poll_interval_ms: 10,
        request_timeout_ms: 5_000,
        auth_token: None,
    }
}

pub fn pending() -> Value {
    json!({
        "stdout": null,
        "stderr": null,
        "compile_output": null,
        "status": { "id": 2, "description": "Processing" }
    })
}

pub fn finished(id: u32, description: &str, stdout: &str, stderr: &str, compile: &str) -> Value {
    let encoded = |s: &str| {
        if s.is_empty() {
            Value::Null
        } else {
            Value::String(encode_for_transport(s))
        }
    };
    json!({
        "stdout": encoded(stdout),
        "stderr": encoded(stderr),
        "compile_output": encoded(compile),
        "time": "0.002",
        "memory": 3188,
        "status": { "id": id, "description": description }
    })
}

/// Understands `print("...")` lines and `raise`
pub struct FakePython {
    pub delay: Duration,
}

#[async_trait]
impl Interpreter for FakePython {
    async fn execute(&self, source: &str) -> anyhow::Result<String> {
        tokio::time::sleep(self.delay).await;

        let mut out = String::new();
        for line in source.lines().map(str::trim) {
            if line.starts_with("raise") {
                bail!("Traceback (most recent call last):\n  File \"<exec>\", line 1\nRuntimeError");
            }
            if let Some(text) = line
                .strip_prefix("print(\"")
                .and_then(|rest| rest.strip_suffix("\")"))
            {
                out.push_str(text);
                out.push('\n');
            }
        }
        Ok(out)
    }
}

/// Counts loads and takes `load_delay` to finish each one
pub struct CountingLoader {
    pub loads: Arc<AtomicUsize>,
    pub load_delay: Duration,
    pub run_delay: Duration,
}

impl CountingLoader {
    pub fn new(load_delay: Duration, run_delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                loads: loads.clone(),
                load_delay,
                run_delay,
            },
            loads,
        )
    }
}

#[async_trait]
impl InterpreterLoader for CountingLoader {
    async fn load(&self) -> anyhow::Result<Arc<dyn Interpreter>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.load_delay).await;
        Ok(Arc::new(FakePython {
            delay: self.run_delay,
        }))
    }
}
