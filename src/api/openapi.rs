use crate::api::handlers::{health, user_login, user_register};
use utoipa::OpenApi;

/// OpenAPI document served next to the API; Swagger UI renders it at
/// `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        user_register::register,
        user_login::login,
    ),
    components(schemas(
        health::Health,
        user_register::UserRegister,
        user_login::UserLogin,
    )),
    tags(
        (name = "register", description = "Credential registration"),
        (name = "login", description = "Credential verification"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/health".to_string()));
        assert!(paths.contains(&"/user/register".to_string()));
        assert!(paths.contains(&"/user/login".to_string()));
    }
}
