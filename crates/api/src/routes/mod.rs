pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::surveys;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /surveys                        create (POST), list (GET)
/// /surveys/{id}                   get (GET), soft-delete (DELETE)
/// /surveys/{id}/approve           approve + email fan-out (POST)
/// /surveys/{id}/generate-email    fresh draft email preview (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/surveys",
            post(surveys::create_survey).get(surveys::list_surveys),
        )
        .route(
            "/surveys/{id}",
            get(surveys::get_survey).delete(surveys::delete_survey),
        )
        .route("/surveys/{id}/approve", post(surveys::approve_survey))
        .route(
            "/surveys/{id}/generate-email",
            post(surveys::generate_email),
        )
}
