//! HTTP API endpoint handlers.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::SignedCookieJar;

use crate::{
    domain::RepositoryError,
    infrastructure::dto::http::{
        CanvasDto, ColorsDto, CooldownDto, ErrorDto, PlacePixelForm, PlacePixelResponseDto,
    },
    ui::{session::resolve_user, state::AppState},
    usecase::PlacePixelError,
};
use tsubu_shared::time::timestamp_to_utc_rfc3339;

/// Error response of the HTTP API
///
/// Rendered as `{"detail": ...}` with the matching status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    TooManyRequests(String),
    Internal(String),
    /// Request body the extractor could not accept
    Rejected { status: StatusCode, detail: String },
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
        }
    }
}

impl From<PlacePixelError> for ApiError {
    fn from(err: PlacePixelError) -> Self {
        match err {
            PlacePixelError::OutOfBounds { .. } | PlacePixelError::InvalidColor(_) => {
                ApiError::BadRequest(err.to_string())
            }
            PlacePixelError::CooldownActive { .. } => ApiError::TooManyRequests(err.to_string()),
            PlacePixelError::Store(e) => e.into(),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!("Store failure: {}", err);
        ApiError::Internal("Internal server error".to_string())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            ApiError::BadRequest(detail)
            | ApiError::TooManyRequests(detail)
            | ApiError::Internal(detail)
            | ApiError::Rejected { detail, .. } => detail,
        };
        (status, Json(ErrorDto { detail })).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the full canvas state
pub async fn get_canvas(State(state): State<AppState>) -> Result<Json<CanvasDto>, ApiError> {
    let snapshot = state.get_canvas_usecase.execute().await?;

    // Domain Model から DTO への変換
    Ok(Json(snapshot.into()))
}

/// Parse a coordinate form field.
///
/// Integers beyond the `i64` range saturate, so they still fail the bounds
/// check as out-of-canvas coordinates. Anything else is `None`.
fn parse_coordinate(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }

    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// Place a pixel as the session user
///
/// The placement runs in its own task so that a client dropping the request
/// cannot cancel it halfway.
pub async fn place_pixel(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: Result<Form<PlacePixelForm>, FormRejection>,
) -> (SignedCookieJar, Result<Json<PlacePixelResponseDto>, ApiError>) {
    let (jar, user_id) = resolve_user(jar);

    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!("Rejected placement form: {}", rejection.body_text());
            return (jar, Err(rejection.into()));
        }
    };
    let (Some(x), Some(y)) = (parse_coordinate(&form.x), parse_coordinate(&form.y)) else {
        return (
            jar,
            Err(ApiError::BadRequest("Invalid coordinates".to_string())),
        );
    };

    let usecase = state.place_pixel_usecase.clone();
    let handle = tokio::spawn(async move { usecase.execute(user_id, x, y, &form.color).await });

    let result = match handle.await {
        Ok(Ok(receipt)) => Ok(Json(PlacePixelResponseDto {
            success: true,
            cooldown_until: timestamp_to_utc_rfc3339(receipt.cooldown_until.value()),
        })),
        Ok(Err(e)) => {
            tracing::debug!("Placement rejected: {}", e);
            Err(e.into())
        }
        Err(e) => {
            tracing::error!("Placement task failed: {}", e);
            Err(ApiError::Internal("Internal server error".to_string()))
        }
    };

    (jar, result)
}

/// Get the cooldown status of the session user
pub async fn get_cooldown(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Result<Json<CooldownDto>, ApiError>) {
    let (jar, user_id) = resolve_user(jar);

    let result = state
        .get_cooldown_usecase
        .execute(&user_id)
        .await
        .map(|check| Json(check.into()))
        .map_err(ApiError::from);

    (jar, result)
}

/// Get the allowed colors
pub async fn get_colors(State(state): State<AppState>) -> Json<ColorsDto> {
    Json(state.get_palette_usecase.execute().into())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_place_pixel_error_status_codes() {
        // テスト項目: 配置エラーが適切なステータスコードに変換される
        let cases = [
            (
                PlacePixelError::OutOfBounds { x: 3, y: 0 },
                StatusCode::BAD_REQUEST,
            ),
            (
                PlacePixelError::InvalidColor("#123456".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PlacePixelError::CooldownActive {
                    retry_after: Duration::from_secs(25),
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                PlacePixelError::Store(RepositoryError::Storage("disk full".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_parse_coordinate() {
        // テスト項目: 整数はサイズに関わらず座標として解釈され、範囲外の整数は飽和する
        assert_eq!(parse_coordinate("2"), Some(2));
        assert_eq!(parse_coordinate(" -1 "), Some(-1));
        assert_eq!(parse_coordinate("+7"), Some(7));
        assert_eq!(parse_coordinate("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_coordinate("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("-"), None);
        assert_eq!(parse_coordinate("1.5"), None);
        assert_eq!(parse_coordinate("abc"), None);
    }

    #[test]
    fn test_store_failure_detail_is_not_leaked() {
        // テスト項目: ストアのエラー内容はレスポンスに含めない
        let err = ApiError::from(RepositoryError::Storage("disk full".to_string()));
        match err {
            ApiError::Internal(detail) => assert!(!detail.contains("disk full")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
