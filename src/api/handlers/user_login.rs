use crate::credentials::{CredentialError, CredentialService};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

/// Login payload, same shape as signup.
#[derive(ToSchema, Deserialize, Debug)]
pub struct UserLogin {
    email: String,
    #[schema(value_type = String, format = Password)]
    password: SecretString,
}

#[utoipa::path(
    post,
    path = "/user/login",
    request_body = UserLogin,
    responses(
        (status = 200, description = "Login successful"),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 500, description = "Credential store failure"),
    ),
    tag = "login"
)]
#[instrument(skip_all)]
pub async fn login(
    service: Extension<Arc<CredentialService>>,
    payload: Option<Json<UserLogin>>,
) -> impl IntoResponse {
    let user: UserLogin = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing payload"})),
            )
        }
    };

    match service.verify(&user.email, &user.password).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"message": "Login successful."})),
        ),
        // One response for unknown email and wrong password, so callers
        // cannot probe which emails are registered.
        Err(CredentialError::InvalidCredentials | CredentialError::InvalidInput) => {
            debug!("Failed login attempt");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid email or password."})),
            )
        }
        Err(err) => {
            error!("Login failed: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error during login"})),
            )
        }
    }
}
