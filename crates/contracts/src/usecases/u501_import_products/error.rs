use thiserror::Error;

use super::file_rules::MAX_FILE_SIZE_BYTES;
use super::preview::ProductField;
use super::response::ApiErrorBody;

/// Shown when a request fails without a `detail` from the server
pub const GENERIC_CONNECTION_ERROR: &str = "Error de conexión con el servidor";

/// Rejection of a selected file, raised before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileSelectionError {
    #[error("Formato no soportado: \"{name}\". Use archivos .csv, .xlsx o .xls")]
    UnsupportedExtension { name: String },

    #[error("El archivo pesa {} y supera el máximo permitido de {}", format_mib(.size), format_mib(.max))]
    FileTooLarge { size: u64, max: u64 },
}

impl FileSelectionError {
    pub fn too_large(size: u64) -> Self {
        FileSelectionError::FileTooLarge {
            size,
            max: MAX_FILE_SIZE_BYTES,
        }
    }
}

fn format_mib(bytes: &u64) -> String {
    format!("{:.1} MB", *bytes as f64 / (1024.0 * 1024.0))
}

/// Misuse of the editable preview grid
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("Fila {index} fuera de rango (hay {len} filas)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Campo desconocido: {0}")]
    UnknownField(String),

    #[error("Valor inválido para {field}: \"{value}\"")]
    InvalidValue { field: ProductField, value: String },
}

/// Failure of a backend round-trip
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    /// No response at all (network down, CORS, aborted)
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx answer, with the server `detail` when it sent one
    #[error("HTTP {status}: {}", detail_or_placeholder(.detail))]
    Http { status: u16, detail: Option<String> },

    /// 2xx answer whose body did not match the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

fn detail_or_placeholder(detail: &Option<String>) -> &str {
    detail.as_deref().unwrap_or("<no detail>")
}

impl ApiFailure {
    /// Build from a non-2xx status and the raw response body
    pub fn from_error_body(status: u16, body: &str) -> Self {
        ApiFailure::Http {
            status,
            detail: ApiErrorBody::detail_from(body),
        }
    }

    /// Message for the UI: server detail verbatim, otherwise the generic one
    pub fn user_message(&self) -> String {
        match self {
            ApiFailure::Http {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_CONNECTION_ERROR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_used_verbatim() {
        let failure = ApiFailure::from_error_body(400, r#"{"detail":"Columna 'sku' no encontrada"}"#);
        assert_eq!(failure.user_message(), "Columna 'sku' no encontrada");
    }

    #[test]
    fn test_generic_message_without_detail() {
        assert_eq!(
            ApiFailure::from_error_body(502, "<html>Bad Gateway</html>").user_message(),
            GENERIC_CONNECTION_ERROR
        );
        assert_eq!(
            ApiFailure::Transport("Failed to fetch".into()).user_message(),
            GENERIC_CONNECTION_ERROR
        );
        assert_eq!(
            ApiFailure::Decode("missing field".into()).user_message(),
            GENERIC_CONNECTION_ERROR
        );
    }

    #[test]
    fn test_size_message_mentions_limit() {
        let msg = FileSelectionError::too_large(11 * 1024 * 1024).to_string();
        assert!(msg.contains("11.0 MB"), "{msg}");
        assert!(msg.contains("10.0 MB"), "{msg}");
    }
}
