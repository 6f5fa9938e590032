use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use crate::domain::session::models::Principal;

pub async fn get_message(Extension(principal): Extension<Principal>) -> ApiSuccess<String> {
    ApiSuccess::new(
        StatusCode::OK,
        format!(
            "you are logged in and you are userid: {}!",
            principal.subject_id
        ),
    )
}
