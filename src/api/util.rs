use log::debug;
use reqwest::StatusCode;

use crate::forms::FormError;

/// Form rejections are the user's fault and keep their message, anything else
/// is ours.
pub fn map_any_err_and_code(e: anyhow::Error) -> (StatusCode, String) {
    debug!("Error: {:#}", e);
    if let Some(e) = e.downcast_ref::<FormError>() {
        return (StatusCode::BAD_REQUEST, e.to_string());
    }
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
}
