use axum::{
    routing::{get, post},
    Router,
    extract::{rejection::JsonRejection, Json},
    http::Method,
    response::{IntoResponse, Response},
};
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::api::models::LinkRequest;
use crate::api::response;
use crate::scraper::scrape;
use crate::config::Config;

pub fn create_router(config: &Config) -> Router {
    Router::new()
        .route("/", get(test_handler))
        .route("/getLink", post(get_link_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(config.allowed_origin.clone())
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ]),
        )
}

async fn test_handler() -> impl IntoResponse {
    response::message("This is a Test Route")
}

async fn get_link_handler(payload: Result<Json<LinkRequest>, JsonRejection>) -> Response {
    tracing::info!("Received the link request");

    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return AppError::MalformedRequest(rejection.body_text()).into_response();
        }
    };

    let start_time = std::time::Instant::now();
    match scrape(&req.url).await {
        Ok(artifact) => {
            tracing::info!(
                "Serving {} rows for {} after {:?}",
                artifact.rows,
                req.url,
                start_time.elapsed()
            );
            response::csv_attachment(artifact)
        }
        Err(err) => err.into_response(),
    }
}
