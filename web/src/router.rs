use crate::{controller::health_check_controller, params, response, AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::*;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::controller::{
    auth_controller, call_controller, organization_controller, settings_controller,
    user_controller,
};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// Extra room for multipart boundaries and headers on top of the configured
// maximum file size; the exact size check happens in the upload handler.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Callsight API"
        ),
        paths(
            auth_controller::register,
            auth_controller::login,
            auth_controller::me,
            call_controller::upload,
            call_controller::index,
            call_controller::read,
            call_controller::read_analysis,
            organization_controller::create,
            settings_controller::read,
            settings_controller::update,
            user_controller::create,
        ),
        components(
            schemas(
                domain::calls::Model,
                domain::call_analyses::Model,
                domain::organizations::Model,
                domain::users::Model,
                params::auth::LoginParams,
                params::auth::RegisterParams,
                params::organization::CreateOrganizationParams,
                params::settings::TemplatesParams,
                params::user::CreateUserParams,
                response::auth::TokenResponse,
                response::call::CallWithAnalysis,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "callsight", description = "Sales call transcription & analysis API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Registers the bearer-token requirement for the protected endpoints in the
// rendered OpenAPI spec.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state);

    Router::new()
        .merge(auth_routes(app_state.clone()))
        .merge(call_routes(app_state.clone()))
        .merge(health_routes())
        .merge(organization_routes(app_state.clone()))
        .merge(settings_routes(app_state.clone()))
        .merge(user_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(cors)
}

fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(auth_controller::register))
        .route("/auth/login", post(auth_controller::login))
        .route("/auth/me", get(auth_controller::me))
        .with_state(app_state)
}

fn call_routes(app_state: AppState) -> Router {
    let upload_limit = app_state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route(
            "/calls/upload",
            post(call_controller::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/calls", get(call_controller::index))
        .route("/calls/:id", get(call_controller::read))
        .route("/calls/:id/analysis", get(call_controller::read_analysis))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn organization_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/organizations", post(organization_controller::create))
        .with_state(app_state)
}

fn settings_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/settings/templates",
            get(settings_controller::read).put(settings_controller::update),
        )
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", post(user_controller::create))
        .with_state(app_state)
}

fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparseable CORS origin {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
