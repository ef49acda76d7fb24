//! HTTP Endpoints
//!
//! Telephony webhooks plus the call trigger and health endpoints. Webhooks
//! always answer 200 with TwiML; a failed step is spoken as an apology.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Json, MatchedPath, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use call_agent_core::CallRequest;
use call_agent_flow::{FlowContext, Step};
use call_agent_telephony::TWIML_CONTENT_TYPE;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let request_timeout = Duration::from_secs(config.server.timeout_seconds);
    drop(config); // Release lock before building router

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthcheck", get(health_check))
        .route("/make-call", get(make_call))
        .route("/metrics", get(metrics_handler));

    for step in Step::ALL {
        router = router.route(step.path(), post(webhook));
    }

    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty or all invalid, defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "Calling agent server is running" }))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let organization = state.get_config().organization.clone();
    Json(serde_json::json!({
        "status": "healthy",
        "message": format!("{} Call Agent is operational", organization),
    }))
}

/// Place an outbound call to the configured number
async fn make_call(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let (to, from) = {
        let config = state.get_config();
        (
            config.telephony.to_number.clone(),
            config.telephony.from_number.clone(),
        )
    };
    let webhook_url = state.entry_webhook_url();

    let result = if webhook_url.starts_with("http") {
        let request = CallRequest {
            to: to.clone(),
            from,
            webhook_url,
        };
        state
            .gateway
            .place_call(&request)
            .await
            .map_err(ServerError::from)
    } else {
        Err(ServerError::Config(
            "server.public_url must be an absolute URL reachable by the telephony platform"
                .to_string(),
        ))
    };

    match result {
        Ok(call) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("Call initiated to {}", to),
                "sid": call.sid,
            })),
        ),
        Err(e) => {
            tracing::error!(to = %to, error = %e, "Error making call");
            let error = e.to_string();
            (
                StatusCode::from(e),
                Json(serde_json::json!({
                    "message": "Error making call",
                    "error": error,
                })),
            )
        }
    }
}

/// Fields the telephony platform posts with every webhook; the rest are ignored
#[derive(Debug, Default, Deserialize)]
struct WebhookForm {
    #[serde(rename = "SpeechResult", default)]
    speech_result: Option<String>,
    #[serde(rename = "CallSid", default)]
    call_sid: Option<String>,
    /// Callee of the outbound call
    #[serde(rename = "To", default)]
    to: Option<String>,
}

/// Shared handler for every flow step
async fn webhook(
    State(state): State<AppState>,
    path: MatchedPath,
    Query(params): Query<HashMap<String, String>>,
    form: Option<Form<WebhookForm>>,
) -> impl IntoResponse {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let ctx = FlowContext::from_params(&params)
        .with_call_sid(form.call_sid.as_deref())
        .with_phone_number(form.to.as_deref());

    tracing::debug!(
        path = %path.as_str(),
        call_sid = ?ctx.call_sid,
        attempt = ctx.attempt,
        speech = ?form.speech_result,
        "Webhook received"
    );

    let response = state
        .flow
        .respond_to_path(path.as_str(), ctx, form.speech_result.as_deref())
        .await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TWIML_CONTENT_TYPE)],
        response.to_xml(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tower::ServiceExt;

    use call_agent_config::{FlowConfig, FlowScript, Settings};
    use call_agent_core::{
        AnswerEngine, Language, PlacedCall, ProfileSink, Result, TelephonyGateway, Translator,
        UserProfile,
    };
    use call_agent_flow::CallFlow;

    struct EchoTranslator;

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, _from: Language, _to: Language) -> Result<String> {
            Ok(text.to_string())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct FixedAnswers;

    #[async_trait]
    impl AnswerEngine for FixedAnswers {
        async fn answer(&self, _question: &str) -> Result<String> {
            Ok("ठीक है".to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[derive(Default)]
    struct MemorySink {
        rows: Mutex<Vec<UserProfile>>,
    }

    #[async_trait]
    impl ProfileSink for MemorySink {
        async fn record(&self, profile: &UserProfile) -> Result<()> {
            self.rows.lock().push(profile.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    struct FakeGateway {
        requests: Mutex<Vec<CallRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl TelephonyGateway for FakeGateway {
        async fn place_call(&self, request: &CallRequest) -> Result<PlacedCall> {
            self.requests.lock().push(request.clone());
            if self.fail {
                return Err(call_agent_core::Error::Telephony("invalid number".to_string()));
            }
            Ok(PlacedCall {
                sid: "CA42".to_string(),
                status: "queued".to_string(),
            })
        }
    }

    struct Fixture {
        router: Router,
        sink: Arc<MemorySink>,
        gateway: Arc<FakeGateway>,
    }

    fn fixture(public_url: &str, fail: bool) -> Fixture {
        let mut settings = Settings::default();
        settings.server.public_url = public_url.to_string();
        settings.telephony.to_number = "+919876543210".to_string();
        settings.telephony.from_number = "+15005550006".to_string();

        let sink = Arc::new(MemorySink::default());
        let gateway = Arc::new(FakeGateway {
            requests: Mutex::new(Vec::new()),
            fail,
        });
        let flow = CallFlow::new(
            Arc::new(EchoTranslator),
            Arc::new(FixedAnswers),
            sink.clone(),
            FlowScript::default(),
            FlowConfig::default(),
            settings.organization.clone(),
        );
        let state = AppState::new(settings, flow, gateway.clone());

        Fixture {
            router: create_router(state),
            sink,
            gateway,
        }
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_and_healthcheck() {
        let f = fixture("https://agent.example.org", false);

        let response = f
            .router
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Calling agent server is running"));

        let response = f
            .router
            .oneshot(Request::get("/healthcheck").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_make_call_uses_public_entry_url() {
        let f = fixture("https://agent.example.org/", false);
        let response = f
            .router
            .oneshot(Request::get("/make-call").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["sid"], "CA42");

        let requests = f.gateway.requests.lock();
        assert_eq!(requests[0].webhook_url, "https://agent.example.org/voice");
        assert_eq!(requests[0].to, "+919876543210");
    }

    #[tokio::test]
    async fn test_make_call_failure_payload() {
        let f = fixture("https://agent.example.org", true);
        let response = f
            .router
            .oneshot(Request::get("/make-call").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["message"], "Error making call");
        assert!(body["error"].as_str().unwrap().contains("invalid number"));
    }

    #[tokio::test]
    async fn test_make_call_without_public_url() {
        let f = fixture("", false);
        let response = f
            .router
            .oneshot(Request::get("/make-call").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(f.gateway.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_voice_webhook_returns_twiml() {
        let f = fixture("https://agent.example.org", false);
        let response = f
            .router
            .oneshot(form_post("/voice?attempt=1", "CallSid=CA42&From=%2B919876543210"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            TWIML_CONTENT_TYPE
        );
        let xml = body_string(response).await;
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<Gather"));
        assert!(xml.contains("/handle-name?v=1&amp;attempt=1&amp;call_sid=CA42"));
    }

    #[tokio::test]
    async fn test_blood_webhook_records_profile() {
        let f = fixture("https://agent.example.org", false);
        let response = f
            .router
            .oneshot(form_post(
                "/handle-blood?v=1&attempt=1&name=Ram",
                "SpeechResult=B+positive&CallSid=CA7&To=%2B919876543210",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let xml = body_string(response).await;
        assert!(xml.contains("<Redirect"));

        let rows = f.sink.rows.lock();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].blood_group, "B+");
        assert_eq!(rows[0].conversation_id.as_deref(), Some("CA7"));
        assert_eq!(rows[0].phone_number.as_deref(), Some("+919876543210"));
    }

    #[tokio::test]
    async fn test_tampered_attempt_gets_apology_with_200() {
        let f = fixture("https://agent.example.org", false);
        let response = f
            .router
            .oneshot(form_post("/handle-name?v=1&attempt=9", "CallSid=CA9"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let xml = body_string(response).await;
        assert!(xml.contains("Sorry, there was an error with the application."));
        assert!(xml.contains("voice=\"Polly.Aditi\""));
        assert!(xml.contains("<Hangup"));
        assert!(f.sink.rows.lock().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_without_form_body() {
        let f = fixture("https://agent.example.org", false);
        let response = f
            .router
            .oneshot(Request::post("/thank-you").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("<Hangup"));
    }
}
