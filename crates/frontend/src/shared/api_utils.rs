//! API utilities for frontend-backend communication

use contracts::usecases::u501_import_products::ApiFailure;

/// Get the base URL for API requests
///
/// Constructs the API base URL from the current window location,
/// using port 3000 for the backend server.
/// Empty string if window is not available.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:3000", protocol, hostname)
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url("/categories");
/// ```
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

/// Decode a `gloo_net` response: JSON body on 2xx, `{ detail }` otherwise
pub async fn read_json<T>(response: gloo_net::http::Response) -> Result<T, ApiFailure>
where
    T: serde::de::DeserializeOwned,
{
    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiFailure::from_error_body(status, &body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiFailure::Decode(e.to_string()))
}
