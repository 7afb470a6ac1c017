// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, attendance, auth, certificate, profile, quiz},
    state::AppState,
    utils::session_guard::{session_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, profile, quiz, attendance, staff, certificates).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (the academy core).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let session_layer = middleware::from_fn_with_state(state.academy.clone(), session_middleware);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::current_session))
        .route("/verify", post(auth::verify_code))
        .route("/staff-tap", post(auth::staff_tap))
        .route("/staff-pin", post(auth::staff_pin));

    let profile_routes = Router::new()
        .route("/", get(profile::get_profile))
        .route("/name", put(profile::update_name))
        .route("/photo", put(profile::update_photo))
        .layer(session_layer.clone());

    let quiz_routes = Router::new()
        .route("/attempts", post(quiz::start_attempt))
        .route("/generate", post(quiz::generate_attempt))
        .route("/attempts/{id}", get(quiz::get_attempt))
        .route("/attempts/{id}/answers", put(quiz::select_answer))
        .route("/attempts/{id}/next", post(quiz::next_question))
        .route("/attempts/{id}/previous", post(quiz::previous_question))
        .route("/attempts/{id}/finish", post(quiz::finish_attempt))
        .route("/history", get(quiz::get_history))
        .route("/analytics", get(quiz::get_analytics))
        .layer(session_layer.clone());

    let attendance_routes = Router::new()
        .route("/me", get(attendance::my_attendance))
        .layer(session_layer.clone());

    // Session first, then the role check
    let staff_routes = Router::new()
        .route("/students", get(admin::list_students))
        .route("/students/{code}/access", post(admin::toggle_access))
        .route(
            "/attendance",
            get(attendance::get_ledger).put(attendance::mark_attendance),
        )
        .layer(middleware::from_fn(staff_middleware))
        .layer(session_layer.clone());

    let certificate_routes = Router::new()
        .route("/{id}", get(certificate::verify_certificate))
        .merge(
            Router::new()
                .route("/", post(certificate::issue_certificate))
                .layer(session_layer),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/profile", profile_routes)
        .route("/api/courses", get(quiz::list_courses))
        .nest("/api/quiz", quiz_routes)
        .nest("/api/attendance", attendance_routes)
        .nest("/api/staff", staff_routes)
        .nest("/api/certificates", certificate_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
