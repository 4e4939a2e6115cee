//! HTTP surface:
//!
//! - `POST /slack/{command}` runs one of the five slash commands. Accepts the
//!   form body Slack sends, or the same fields as JSON.
//! - `GET  /health` reports service and database readiness.
//!
//! Anything else is answered with the 404 `{status, message}` envelope.

use std::{any::Any, sync::Arc, time::Duration};

use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Uri},
    middleware::{self, Next},
    response::Response,
    routing::post,
    Extension, Form, Json, Router,
};
use expertise_core::{config::DeploymentMode, errors::InterfaceError};
use expertise_db::{repositories::ExpertiseRepository, DbPool};
use expertise_slack::{
    CommandRouteError, CommandRouter, SlackMessage, SlashCommand, SlashCommandPayload,
};
use tokio::task_local;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{info, info_span, Span};
use uuid::Uuid;

use crate::{
    error::{panic_response, ApiError},
    health,
};

pub const CORRELATION_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

pub type SharedCommandRouter = Arc<CommandRouter<Arc<dyn ExpertiseRepository>>>;

#[derive(Clone)]
pub struct AppState {
    pub commands: SharedCommandRouter,
    pub deployment_mode: DeploymentMode,
}

task_local! {
    static CURRENT_CORRELATION_ID: String;
}

#[derive(Clone, Debug)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Id of the request being served, for code that cannot reach its extensions.
    pub fn current() -> Option<String> {
        CURRENT_CORRELATION_ID.try_with(Clone::clone).ok()
    }

    pub fn current_or_unknown() -> String {
        Self::current().unwrap_or_else(|| "unknown".to_owned())
    }
}

/// Slash-command fields decoded from either a form or a JSON body.
#[derive(Debug)]
pub struct SlashCommandBody(pub SlashCommandPayload);

#[derive(Debug)]
pub struct BodyRejection(pub String);

impl axum::response::IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        (axum::http::StatusCode::BAD_REQUEST, self.0).into_response()
    }
}

impl<S> FromRequest<S> for SlashCommandBody
where
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(payload) = Json::<SlashCommandPayload>::from_request(request, state)
                .await
                .map_err(|rejection| BodyRejection(rejection.body_text()))?;
            Ok(Self(payload))
        } else {
            let Form(payload) = Form::<SlashCommandPayload>::from_request(request, state)
                .await
                .map_err(|rejection| BodyRejection(rejection.body_text()))?;
            Ok(Self(payload))
        }
    }
}

pub fn router(state: AppState, db_pool: DbPool) -> Router {
    let mode = state.deployment_mode;
    with_layers(routes(state, db_pool), mode)
}

fn routes(state: AppState, db_pool: DbPool) -> Router {
    Router::new()
        .route("/slack/{command}", post(slash_command))
        .merge(health::router::<AppState>(db_pool))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
}

/// Layers run outermost first: correlation id, access log, panic catcher.
/// The panic catcher sits inside the correlation scope so a 500 built from a
/// panic still carries the request's id.
fn with_layers(routes: Router, mode: DeploymentMode) -> Router {
    routes
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(mode, &CorrelationId::current_or_unknown(), panic)
        }))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    info_span!(
                        "http.request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        correlation_id = %CorrelationId::current_or_unknown(),
                    )
                })
                .on_response(|response: &Response, latency: Duration, _span: &Span| {
                    info!(
                        event_name = "http.request.completed",
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis() as u64,
                        "request completed"
                    );
                }),
        )
        .layer(middleware::from_fn(assign_correlation_id))
}

async fn slash_command(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Extension(CorrelationId(correlation_id)): Extension<CorrelationId>,
    uri: Uri,
    body: Result<SlashCommandBody, BodyRejection>,
) -> Result<Json<SlackMessage>, ApiError> {
    let Some(command) = SlashCommand::from_route(&segment) else {
        let error = InterfaceError::NotFound { path: uri.path().to_owned(), correlation_id };
        return Err(ApiError::from_interface(&error, state.deployment_mode));
    };

    let SlashCommandBody(payload) = body.map_err(|BodyRejection(message)| {
        let error = InterfaceError::BadRequest { message, correlation_id: correlation_id.clone() };
        ApiError::from_interface(&error, state.deployment_mode)
    })?;

    match state.commands.route(command, payload, &correlation_id).await {
        Ok(message) => Ok(Json(message)),
        Err(CommandRouteError::InvalidToken(_)) => {
            let error = InterfaceError::InvalidToken { correlation_id };
            Err(ApiError::from_interface(&error, state.deployment_mode))
        }
    }
}

async fn not_found(
    State(state): State<AppState>,
    Extension(CorrelationId(correlation_id)): Extension<CorrelationId>,
    uri: Uri,
) -> ApiError {
    let error = InterfaceError::NotFound { path: uri.path().to_owned(), correlation_id };
    ApiError::from_interface(&error, state.deployment_mode)
}

async fn assign_correlation_id(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(CorrelationId(correlation_id.clone()));

    let mut response =
        CURRENT_CORRELATION_ID.scope(correlation_id.clone(), next.run(request)).await;
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
        response::Response,
        routing::get,
        Router,
    };
    use expertise_core::{
        config::DeploymentMode,
        content::{CONTENT_VERSION, FIELD_GUIDELINES},
        domain::expertise::ExpertiseKey,
        errors::PRODUCTION_INTERNAL_MESSAGE,
        token::TokenVerifier,
    };
    use expertise_db::{
        connect_with_settings, migrations,
        repositories::{ExpertiseRepository, InMemoryExpertiseRepository},
        DbPool,
    };
    use expertise_slack::{CommandRouter, SlashCommand};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, routes, with_layers, AppState, CorrelationId, CORRELATION_HEADER};

    const TOKEN: &str = "test-verification-token";

    struct Harness {
        app: Router,
        state: AppState,
        repository: Arc<InMemoryExpertiseRepository>,
        pool: DbPool,
    }

    async fn harness(mode: DeploymentMode) -> Harness {
        let repository = Arc::new(InMemoryExpertiseRepository::default());
        let shared: Arc<dyn ExpertiseRepository> = repository.clone();
        let commands =
            Arc::new(CommandRouter::new(shared, TokenVerifier::new(TOKEN.to_owned().into())));
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrations");

        let state = AppState { commands, deployment_mode: mode };
        let app = router(state.clone(), pool.clone());
        Harness { app, state, repository, pool }
    }

    async fn explode() -> &'static str {
        panic!("kaboom")
    }

    fn form(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .expect("request")
    }

    fn json_request(path: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn read_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn slack_form(text: &str) -> String {
        format!("token={TOKEN}&team_id=T1&user_id=U1&user_name=grace&text={text}")
    }

    #[tokio::test]
    async fn set_expertise_form_body_is_saved_and_confirmed() {
        let harness = harness(DeploymentMode::Development).await;

        let response = harness
            .app
            .clone()
            .oneshot(form("/slack/set_expertise", &slack_form("compilers%2C+navy")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(CORRELATION_HEADER));
        let body = read_json(response).await;
        assert!(body["text"].as_str().expect("text").contains("compilers"));

        let record = harness
            .repository
            .find_by_key(&ExpertiseKey::new("T1", "U1"))
            .await
            .expect("lookup")
            .expect("record");
        assert_eq!(record.expertise, vec!["compilers".to_owned(), " navy".to_owned()]);
        harness.pool.close().await;
    }

    #[tokio::test]
    async fn json_body_is_accepted() {
        let harness = harness(DeploymentMode::Development).await;

        let response = harness
            .app
            .clone()
            .oneshot(json_request(
                "/slack/expertise_guideline",
                json!({ "token": TOKEN, "team_id": "T1", "user_id": "U1" }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["text"], FIELD_GUIDELINES);
    }

    #[tokio::test]
    async fn invalid_token_gets_the_not_found_envelope_on_every_command() {
        let harness = harness(DeploymentMode::Production).await;

        for command in SlashCommand::ALL {
            let path = format!("/slack/{}", command.as_str());
            let response = harness
                .app
                .clone()
                .oneshot(form(&path, "token=wrong&team_id=T1&user_id=U1&user_name=grace&text=math"))
                .await
                .expect("response");

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
            assert!(response.headers().contains_key(CORRELATION_HEADER), "{path}");
            assert_eq!(
                read_json(response).await,
                json!({ "status": 404, "message": "Invalid Slack token" }),
                "{path}"
            );
        }
        assert!(harness.repository.is_empty().await);
    }

    #[tokio::test]
    async fn invalid_fields_are_a_200_with_guidelines() {
        let harness = harness(DeploymentMode::Development).await;

        let response = harness
            .app
            .clone()
            .oneshot(form("/slack/set_expertise", &slack_form("abc123%2C+def")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["attachments"][0]["text"], FIELD_GUIDELINES);
        assert!(harness.repository.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_command_and_unknown_path_are_not_found() {
        let harness = harness(DeploymentMode::Development).await;

        for path in ["/slack/delete_expertise", "/nowhere"] {
            let response =
                harness.app.clone().oneshot(form(path, &slack_form("math"))).await.expect("response");

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
            assert_eq!(
                read_json(response).await,
                json!({ "status": 404, "message": "The requested resource was not found" })
            );
        }
    }

    #[tokio::test]
    async fn wrong_method_is_not_found() {
        let harness = harness(DeploymentMode::Development).await;

        let request = Request::builder()
            .method("GET")
            .uri("/slack/team_experts")
            .body(Body::empty())
            .expect("request");
        let response = harness.app.clone().oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let harness = harness(DeploymentMode::Development).await;

        let request = Request::builder()
            .method("POST")
            .uri("/slack/team_experts")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let response = harness.app.clone().oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["status"], 400);
    }

    #[tokio::test]
    async fn panics_become_a_500_envelope_hidden_in_production() {
        let harness = harness(DeploymentMode::Production).await;
        let app = with_layers(
            routes(harness.state.clone(), harness.pool.clone()).route("/explode", get(explode)),
            DeploymentMode::Production,
        );

        let request =
            Request::builder().uri("/explode").body(Body::empty()).expect("request");
        let response = app.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let correlation_id = response
            .headers()
            .get(CORRELATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .expect("panic responses keep the correlation header");
        assert!(uuid::Uuid::parse_str(correlation_id).is_ok());
        assert_eq!(
            read_json(response).await,
            json!({ "status": 500, "message": PRODUCTION_INTERNAL_MESSAGE })
        );
    }

    #[tokio::test]
    async fn correlation_id_is_only_visible_inside_a_request() {
        assert_eq!(CorrelationId::current(), None);
        assert_eq!(CorrelationId::current_or_unknown(), "unknown");

        let observed = super::CURRENT_CORRELATION_ID
            .scope("req-7".to_owned(), async { CorrelationId::current() })
            .await;
        assert_eq!(observed.as_deref(), Some("req-7"));
    }

    #[tokio::test]
    async fn health_is_served_on_the_same_router() {
        let harness = harness(DeploymentMode::Development).await;

        let request = Request::builder().uri("/health").body(Body::empty()).expect("request");
        let response = harness.app.clone().oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["content_version"], CONTENT_VERSION);
    }
}
