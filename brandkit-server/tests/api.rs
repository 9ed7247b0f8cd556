//! HTTP acceptance tests for the wizard API.
//!
//! Each test starts a real server on an ephemeral port with in-process
//! text and image backends, then talks to it over HTTP.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use brandkit_core::llm::{LlmError, TextGenerator};
use brandkit_server::config::ServerConfig;
use brandkit_server::pipeline::{ImagePipeline, ImageTensor, PipelineError, StageRequest};
use brandkit_server::server::Server;
use serde_json::{json, Value};

struct Names;

#[async_trait]
impl TextGenerator for Names {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        Ok("Sure!\n1. Nova\n2. Brightline\n3. Kite\n4. Extra".to_string())
    }
}

/// Pipeline that returns a flat 8x8 image, or fails in stage two.
#[derive(Default)]
struct FlatPipeline {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl ImagePipeline for FlatPipeline {
    async fn base(&self, _req: &StageRequest<'_>) -> Result<ImageTensor, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ImageTensor {
            shape: [3, 2, 2],
            data: vec![0.2; 12],
        })
    }

    async fn upscale(
        &self,
        _req: &StageRequest<'_>,
        _image: &ImageTensor,
    ) -> Result<ImageTensor, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PipelineError::Tensor("backend exploded".into()));
        }
        Ok(ImageTensor {
            shape: [3, 8, 8],
            data: vec![0.8; 192],
        })
    }
}

struct TestServer {
    base: String,
    http: reqwest::Client,
    pipeline: Arc<FlatPipeline>,
    _dir: tempfile::TempDir,
}

async fn start_server(failing_pipeline: bool) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        static_dir: dir.path().to_path_buf(),
        logo_dir: dir.path().join("logos"),
        ..Default::default()
    };
    let pipeline = Arc::new(FlatPipeline {
        fail: failing_pipeline,
        ..Default::default()
    });
    let server = Server::with_backends(config, Some(Arc::new(Names)), pipeline.clone());
    let (addr, _handle) = server.start().await.unwrap();
    TestServer {
        base: format!("http://{addr}"),
        http: reqwest::Client::new(),
        pipeline,
        _dir: dir,
    }
}

impl TestServer {
    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .http
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn start(&self) -> String {
        let (status, body) = self.post("/start_conversation", json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(body["message"], "Do you have a name for your brand/company?");
        body["conversation_id"].as_str().unwrap().to_string()
    }

    async fn reply(&self, id: &str, text: &str) -> (u16, Value) {
        self.post(
            "/process_response",
            json!({ "conversation_id": id, "user_response": text }),
        )
        .await
    }
}

#[tokio::test]
async fn guided_flow_end_to_end() {
    let srv = start_server(false).await;
    let id = srv.start().await;

    let (status, body) = srv.reply(&id, "no").await;
    assert_eq!(status, 200);
    assert_eq!(body["stage"], "industry");
    assert_eq!(body["options"][0], "Technology");

    let (_, body) = srv.reply(&id, "1").await;
    assert_eq!(body["stage"], "theme");
    let (_, body) = srv.reply(&id, "1").await;
    assert_eq!(body["stage"], "color_scheme");

    let (_, body) = srv.reply(&id, "1").await;
    assert_eq!(body["stage"], "brand_name_selection");
    assert_eq!(body["suggestions"], json!(["1. Nova", "2. Brightline", "3. Kite"]));
    assert_eq!(body["suggestion_source"], "generated");

    let (_, body) = srv.reply(&id, "more").await;
    assert_eq!(body["stage"], "brand_name_selection");
    assert_eq!(body["suggestions"][0], "1. TechPro");

    let (_, body) = srv.reply(&id, "Nova").await;
    assert_eq!(body["stage"], "logo_generation");
    assert_eq!(body["next_step"], "generate_logo");

    let (status, body) = srv
        .post("/generate_logo", json!({ "conversation_id": id }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        body["prompt_used"],
        "a minimalist style logo design for Nova, a technology brand, using blue color scheme"
    );
    let logo_path = body["logo_path"].as_str().unwrap();
    assert!(logo_path.starts_with("static/logos/Nova_"), "{logo_path}");
    assert!(logo_path.ends_with(".png"));
    assert_eq!(srv.pipeline.calls.load(Ordering::SeqCst), 2);

    let preview = srv
        .http
        .get(format!("{}/{logo_path}", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(preview.status(), 200);

    let file_name = std::path::Path::new(logo_path).file_name().unwrap().to_str().unwrap();
    let resp = srv
        .http
        .get(format!("{}/download_logo/{file_name}", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/png");
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment"), "{disposition}");
    let bytes = resp.bytes().await.unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn custom_prompt_flow_uses_prompt_verbatim() {
    let srv = start_server(false).await;
    let id = srv.start().await;

    let (_, body) = srv.reply(&id, "Yes").await;
    assert_eq!(body["stage"], "brand_name_input");
    let (_, body) = srv.reply(&id, "Acme Labs").await;
    assert_eq!(body["stage"], "prompt_input");
    let (_, body) = srv.reply(&id, "a hexagon made of light").await;
    assert_eq!(body["next_step"], "generate_logo");

    let (status, body) = srv
        .post(
            "/generate_logo",
            json!({ "brand_details": { "brand_name": "Acme Labs", "custom_prompt": "a hexagon made of light" } }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["prompt_used"], "a hexagon made of light");
    assert!(body["logo_path"].as_str().unwrap().contains("Acme_Labs_"));
}

#[tokio::test]
async fn unknown_conversation_is_404() {
    let srv = start_server(false).await;
    let (status, body) = srv.reply("does-not-exist", "yes").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Conversation not found");
}

#[tokio::test]
async fn invalid_selection_is_400_and_recoverable() {
    let srv = start_server(false).await;
    let id = srv.start().await;
    srv.reply(&id, "no").await;

    let (status, body) = srv.reply(&id, "42").await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("between 1 and 7"));

    let (status, body) = srv.reply(&id, "2").await;
    assert_eq!(status, 200);
    assert_eq!(body["stage"], "theme");
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let srv = start_server(false).await;
    let id = srv.start().await;

    let (status, body) = srv
        .post(
            "/process_response",
            json!({ "conversation_id": id, "user_response": 5 }),
        )
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("user_response"), "{body}");

    let (status, body) = srv
        .post("/generate_logo", json!({ "brand_details": "Nova" }))
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let resp = srv
        .http
        .post(format!("{}/process_response", srv.base))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    // The session was never touched.
    let (_, body) = srv.reply(&id, "yes").await;
    assert_eq!(body["stage"], "brand_name_input");
    assert_eq!(srv.pipeline.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pipeline_failure_is_500() {
    let srv = start_server(true).await;
    let (status, body) = srv
        .post(
            "/generate_logo",
            json!({ "brand_details": { "industry": "Finance", "theme": "Playful", "color_scheme": "Green", "brand_name": "Kin" } }),
        )
        .await;
    assert_eq!(status, 500);
    assert!(body["error"].as_str().unwrap().contains("backend exploded"));
}

#[tokio::test]
async fn generate_requires_details_or_conversation() {
    let srv = start_server(false).await;
    let (status, _) = srv.post("/generate_logo", json!({})).await;
    assert_eq!(status, 400);

    let (status, _) = srv
        .post("/generate_logo", json!({ "conversation_id": "missing" }))
        .await;
    assert_eq!(status, 404);
    assert_eq!(srv.pipeline.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn download_rejects_missing_and_escaping_paths() {
    let srv = start_server(false).await;

    let resp = srv
        .http
        .get(format!("{}/download_logo/nothing.png", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = srv
        .http
        .get(format!("{}/download_logo/%2E%2E%2Fsecret.png", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn health_reports_sessions() {
    let srv = start_server(false).await;
    srv.start().await;
    srv.start().await;
    let body: Value = srv
        .http
        .get(format!("{}/health", srv.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 2);
}
