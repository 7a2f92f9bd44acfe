use contracts::domain::a001_category::Category;
use contracts::usecases::u501_import_products::{
    ApiFailure, ImportConfirmRequest, ImportPreviewResponse, ImportResult, CATEGORIES_ENDPOINT,
    CONFIRM_ENDPOINT, PREVIEW_ENDPOINT, UPLOAD_FIELD,
};
use gloo_net::http::Request;
use wasm_bindgen::JsCast;

use crate::shared::api_utils::{api_url, read_json};

fn transport(e: impl std::fmt::Debug) -> ApiFailure {
    ApiFailure::Transport(format!("{e:?}"))
}

/// Known categories, used to resolve detected category names to ids
pub async fn fetch_categories() -> Result<Vec<Category>, ApiFailure> {
    let response = Request::get(&api_url(CATEGORIES_ENDPOINT))
        .send()
        .await
        .map_err(|e| ApiFailure::Transport(e.to_string()))?;
    read_json(response).await
}

/// Upload the file as multipart field `file` and get the parsed rows back
pub async fn load_preview(file: web_sys::File) -> Result<ImportPreviewResponse, ApiFailure> {
    use web_sys::{FormData, RequestInit, RequestMode, Response};

    let form_data = FormData::new().map_err(transport)?;
    form_data
        .append_with_blob_and_filename(UPLOAD_FIELD, &file, &file.name())
        .map_err(transport)?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&form_data);

    let request = web_sys::Request::new_with_str_and_init(&api_url(PREVIEW_ENDPOINT), &opts)
        .map_err(transport)?;

    let window = web_sys::window().ok_or_else(|| ApiFailure::Transport("no window".to_string()))?;
    let resp_value = wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?;
    let resp: Response = resp_value.dyn_into().map_err(transport)?;

    let text = wasm_bindgen_futures::JsFuture::from(resp.text().map_err(transport)?)
        .await
        .map_err(transport)?
        .as_string()
        .unwrap_or_default();

    if !resp.ok() {
        return Err(ApiFailure::from_error_body(resp.status(), &text));
    }
    serde_json::from_str(&text).map_err(|e| ApiFailure::Decode(e.to_string()))
}

/// Send the whole edited grid in one request
pub async fn confirm_import(request: &ImportConfirmRequest) -> Result<ImportResult, ApiFailure> {
    let response = Request::post(&api_url(CONFIRM_ENDPOINT))
        .json(request)
        .map_err(|e| ApiFailure::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiFailure::Transport(e.to_string()))?;
    read_json(response).await
}
