use axum::Json;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::models::{ErrorResponse, MessageResponse};
use crate::export::{OutputArtifact, CONTENT_DISPOSITION};

pub const GENERIC_ERROR: &str = "Internal Server Error";

pub fn message(text: &str) -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::OK,
        Json(MessageResponse {
            message: text.to_string(),
        }),
    )
}

/// Opaque error body. The status is the only thing that varies.
pub fn error(status: StatusCode) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: GENERIC_ERROR.to_string(),
        }),
    )
}

pub fn csv_attachment(artifact: OutputArtifact) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv")),
            (header::CONTENT_DISPOSITION, HeaderValue::from_static(CONTENT_DISPOSITION)),
        ],
        artifact.bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn attachment_carries_csv_headers_and_bytes() {
        let artifact = OutputArtifact {
            bytes: b"Title\n".to_vec(),
            rows: 0,
        };
        let response = csv_attachment(artifact);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=WebScrape.csv"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Title\n");
    }

    #[tokio::test]
    async fn error_body_is_generic() {
        let response = error(StatusCode::INTERNAL_SERVER_ERROR).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Internal Server Error" }));
    }
}
