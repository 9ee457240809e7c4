use crate::credentials::{CredentialError, CredentialService};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

/// Signup payload. The password deserializes into a [`SecretString`] so it
/// never appears in debug output or spans.
#[derive(ToSchema, Deserialize, Debug)]
pub struct UserRegister {
    email: String,
    #[schema(value_type = String, format = Password)]
    password: SecretString,
}

#[utoipa::path(
    post,
    path = "/user/register",
    request_body = UserRegister,
    responses(
        (status = 201, description = "Registration successful"),
        (status = 400, description = "Missing payload or blank email/password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Credential store failure"),
    ),
    tag = "register"
)]
#[instrument(skip_all)]
pub async fn register(
    service: Extension<Arc<CredentialService>>,
    payload: Option<Json<UserRegister>>,
) -> impl IntoResponse {
    let user: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing payload"})),
            )
        }
    };

    match service.register(&user.email, &user.password).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({"message": "Signup successful."})),
        ),
        Err(CredentialError::InvalidInput) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email and password are required."})),
        ),
        Err(CredentialError::DuplicateIdentity) => (
            StatusCode::CONFLICT,
            Json(json!({"error": "Email already registered."})),
        ),
        Err(err) => {
            error!("Registration failed: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Signup failed"})),
            )
        }
    }
}
