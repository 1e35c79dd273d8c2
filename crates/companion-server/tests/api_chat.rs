use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use companion_characters::CharacterService;
use companion_chat::{
    ChatError, ChatModel, GeminiClient, GeminiConfig, ModelFuture, ModelRequest,
    PipelineSettings, UtterancePipeline,
};
use companion_server::{app, AppState};
use companion_voice::{SpeechSynthesizer, VoiceError, VoiceFuture};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

enum Reply {
    Text(&'static str),
    Fail,
}

struct FakeModel {
    reply: Reply,
    calls: AtomicUsize,
}

impl ChatModel for FakeModel {
    fn name(&self) -> &str {
        "fake"
    }

    fn generate<'a>(&'a self, _request: &'a ModelRequest) -> ModelFuture<'a, Result<String, ChatError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Text(raw) => Ok(raw.to_string()),
                Reply::Fail => Err(ChatError::Model("upstream unavailable".to_string())),
            }
        })
    }
}

struct FakeSynth {
    fail: bool,
}

impl SpeechSynthesizer for FakeSynth {
    fn synthesize<'a>(
        &'a self,
        text: &'a str,
        destination: &'a Path,
    ) -> VoiceFuture<'a, Result<(), VoiceError>> {
        Box::pin(async move {
            if self.fail {
                return Err(VoiceError::Synthesis("no engine".to_string()));
            }
            std::fs::write(destination, format!("AUDIO:{}", text)).map_err(|source| {
                VoiceError::Io {
                    path: destination.to_path_buf(),
                    source,
                }
            })
        })
    }
}

struct TestApp {
    _dir: TempDir,
    model: Arc<FakeModel>,
    router: axum::Router,
}

fn write_greeting(dir: &TempDir) -> PathBuf {
    let greeting_dir = dir.path().join("audios");
    std::fs::create_dir_all(&greeting_dir).unwrap();
    std::fs::write(greeting_dir.join("intro_0.wav"), b"hello-0").unwrap();
    std::fs::write(greeting_dir.join("intro_1.wav"), b"hello-1").unwrap();
    greeting_dir
}

fn test_app(reply: Reply, synth_fails: bool) -> TestApp {
    let dir = TempDir::new().unwrap();
    let greeting_dir = write_greeting(&dir);

    let model = Arc::new(FakeModel {
        reply,
        calls: AtomicUsize::new(0),
    });
    let pipeline = UtterancePipeline::new(
        model.clone(),
        Arc::new(FakeSynth { fail: synth_fails }),
        PipelineSettings {
            greeting_dir,
            work_dir: dir.path().join("work"),
            ..PipelineSettings::default()
        },
    );
    let state = AppState {
        pipeline: Arc::new(pipeline),
        characters: CharacterService::new(None, dir.path().join("samples")),
    };

    TestApp {
        _dir: dir,
        model,
        router: app(state),
    }
}

async fn post_chat(router: axum::Router, body: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const REPLY: &str = r#"{"messages": [
    {"text": "Nice to see you", "facialExpression": "smile", "animation": "Talking_2"},
    {"text": "Shall we dance?", "facialExpression": "surprised", "animation": "Rumba"}
]}"#;

#[tokio::test]
async fn chat_returns_voiced_utterances() {
    let t = test_app(Reply::Text(REPLY), false);
    let (status, json) = post_chat(t.router, r#"{"message": "hello"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["text"], "Nice to see you");
    assert_eq!(messages[0]["facialExpression"], "smile");
    assert_eq!(messages[0]["animation"], "Talking_2");
    let audio = STANDARD
        .decode(messages[1]["audio"].as_str().unwrap())
        .unwrap();
    assert_eq!(audio, b"AUDIO:Shall we dance?");
    assert_eq!(t.model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn chat_without_message_greets() {
    for body in ["{}", "", r#"{"message": ""}"#] {
        let t = test_app(Reply::Text(REPLY), false);
        let (status, json) = post_chat(t.router, body).await;

        assert_eq!(status, StatusCode::OK, "body {:?}", body);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["text"], "Hey dear... How was your day?");
        assert_eq!(messages[1]["animation"], "Crying");
        assert_eq!(
            STANDARD.decode(messages[0]["audio"].as_str().unwrap()).unwrap(),
            b"hello-0"
        );
        assert_eq!(t.model.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn malformed_model_output_is_bad_gateway() {
    let t = test_app(Reply::Text(r#"{"foo": 1}"#), false);
    let (status, json) = post_chat(t.router, r#"{"message": "hello"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("malformed model output"));
}

#[tokio::test]
async fn model_failure_is_bad_gateway() {
    let t = test_app(Reply::Fail, false);
    let (status, json) = post_chat(t.router, r#"{"message": "hello"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("upstream unavailable"));
}

#[tokio::test]
async fn synthesis_failure_is_internal_error() {
    let t = test_app(Reply::Text(REPLY), true);
    let (status, json) = post_chat(t.router, r#"{"message": "hello"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("no engine"));
}

#[tokio::test]
async fn server_without_api_key_still_greets() {
    let dir = TempDir::new().unwrap();
    let greeting_dir = write_greeting(&dir);
    let model = GeminiClient::new(GeminiConfig::default()).unwrap();
    let pipeline = UtterancePipeline::new(
        Arc::new(model),
        Arc::new(FakeSynth { fail: false }),
        PipelineSettings {
            greeting_dir,
            work_dir: dir.path().join("work"),
            ..PipelineSettings::default()
        },
    );
    let router = app(AppState {
        pipeline: Arc::new(pipeline),
        characters: CharacterService::new(None, dir.path().join("samples")),
    });

    let (status, json) = post_chat(router.clone(), "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["messages"].as_array().unwrap().len(), 2);

    let (status, json) = post_chat(router, r#"{"message": "hello"}"#).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("API key is not configured"));
}

#[tokio::test]
async fn invalid_json_body_is_bad_request() {
    let t = test_app(Reply::Text(REPLY), false);
    let (status, json) = post_chat(t.router, "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert_eq!(t.model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn static_routes() {
    let t = test_app(Reply::Text(REPLY), false);

    let response = t
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"Hello World!");

    let response = t
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));

    let response = t
        .router
        .oneshot(Request::builder().uri("/voices").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let t = test_app(Reply::Text(REPLY), false);
    let response = t
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
