use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::usecases::u501_import_products::ApiErrorBody;

use crate::usecases::u501_import_products::ImportError;

/// Handler failure rendered as `{ "detail": ... }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiErrorBody::new(self.detail))).into_response()
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

/// Unreadable or oversized JSON bodies keep their status and get a `detail`
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        tracing::warn!("Request body rejected: {}", rejection.body_text());
        let detail = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "El lote de productos supera el tamaño máximo permitido".to_string()
        } else {
            format!("Solicitud inválida: {}", rejection.body_text())
        };
        Self { status, detail }
    }
}

/// Import errors are the client's fault; anything else is logged and hidden
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ImportError>() {
            Ok(import_error) => import_error.into(),
            Err(other) => {
                tracing::error!("Request failed: {:#}", other);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "Error interno del servidor".to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_errors_are_bad_requests() {
        let err: ApiError = anyhow::Error::from(ImportError::EmptyFile).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail, "El archivo no contiene productos");
    }

    #[test]
    fn test_other_errors_are_hidden() {
        let err: ApiError = anyhow::anyhow!("disk I/O error").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.detail.contains("disk"));
    }
}
