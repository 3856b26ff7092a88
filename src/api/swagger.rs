use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social Service API",
        version = "1.0.0",
        description = "REST API for a small social network: accounts, connections and tagged posts.\n\n**Authentication:** connection and post-mutation endpoints require a JWT Bearer token obtained from `/user/new` or `/user/login`.",
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Users
        crate::api::users::sign_up,
        crate::api::users::login,
        crate::api::users::get_all_users,
        crate::api::users::get_user_by_id,

        // Connections
        crate::api::users::request_connect,
        crate::api::users::accept_connect,

        // Posts
        crate::api::posts::list_posts,
        crate::api::posts::search_posts,
        crate::api::posts::create_post,
        crate::api::posts::vote_post,
        crate::api::posts::edit_post,
        crate::api::posts::delete_post,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,

            crate::services::user_service::SignUpRequest,
            crate::services::user_service::LoginRequest,
            crate::services::user_service::AuthResponse,
            crate::models::UserResponse,

            crate::models::CreatePostRequest,
            crate::models::EditPostRequest,
            crate::models::VoteRequest,
            crate::models::PostResponse,
            crate::models::Votes,
        )
    ),
    tags(
        (name = "Health", description = "Service and database status."),
        (name = "User", description = "Sign up, login and user lookup."),
        (name = "Connections", description = "Connection requests between users: request, then accept."),
        (name = "Post", description = "Create, list, search by tag, vote, edit and delete posts."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /user/new or /user/login"))
                        .build()
                ),
            );
        }
    }
}
