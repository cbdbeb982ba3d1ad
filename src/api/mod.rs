use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    routing::{get, patch, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use url::Url;

pub mod handlers;
mod openapi;
pub mod records;
mod state;
pub mod views;

pub use openapi::openapi;
pub use state::{AppState, Collections, SharedState, WebConfig};

use handlers::{
    auth, children, dashboards, donations, health, opportunities, photos, profile, requests,
    root, volunteers,
};

/// Build the application router.
///
/// Every view except the public ones sits behind the session gate: the gate
/// asks the backend first and the view runs only once a session is
/// confirmed.
#[must_use]
pub fn router(state: SharedState) -> Router {
    let protected = Router::new()
        .route("/home", get(dashboards::home))
        .route("/board", get(dashboards::board))
        .route("/orphanage", get(dashboards::orphanage))
        .route("/volunteer", get(dashboards::volunteer))
        .route("/role", get(auth::role::role))
        .route("/children-page", get(children::list_children))
        .route(
            "/children",
            get(children::list_children).post(children::create_child),
        )
        .route("/create-child-profile", post(children::create_child))
        .route(
            "/children/:id",
            get(children::child_detail)
                .patch(children::update_child)
                .delete(children::delete_child),
        )
        .route(
            "/volunteers",
            get(volunteers::list_volunteers).post(volunteers::create_volunteer),
        )
        .route("/volunteer-form", post(volunteers::create_volunteer))
        .route("/volunteer-details/:id", get(volunteers::volunteer_detail))
        .route(
            "/volunteers/:id",
            patch(volunteers::update_volunteer).delete(volunteers::delete_volunteer),
        )
        .route("/volunteers/:id/contact", patch(volunteers::update_contact))
        .route("/opportunities", get(opportunities::list_opportunities))
        .route("/opportunity", post(opportunities::create_opportunity))
        .route(
            "/opportunities/:id/availability",
            patch(opportunities::update_availability),
        )
        .route("/donations/child", post(donations::donate_to_child))
        .route("/donations/orphanage", post(donations::donate_to_orphanage))
        .route("/goods", post(donations::donate_goods))
        .route("/donation-details", get(donations::donation_details))
        .route("/payment", get(donations::payment))
        .route("/request", post(requests::submit_request))
        .route("/requests", get(requests::list_requests))
        .route("/requests/:id", patch(requests::decide_request))
        .route("/profile", get(profile::profile))
        .route("/photos", post(photos::upload_photo))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let public = Router::new()
        .route("/", get(root::root))
        .route("/login", post(auth::login::login))
        .route("/signup", post(auth::signup::signup))
        .route("/logout", post(auth::logout::logout))
        .route("/recovery", post(auth::recovery::recovery))
        .route("/session", get(auth::session::session))
        .route(
            "/health",
            get(health::health)
                .head(health::health)
                .options(health::health),
        )
        .route("/api-docs/openapi.json", get(openapi::openapi_json));

    public.merge(protected).layer(Extension(state))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: AppState) -> Result<()> {
    let frontend_origin = frontend_origin(state.config().frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    let app = router(Arc::new(state)).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}
