pub mod health;
pub mod posts;
pub mod swagger;
pub mod users;

use actix_web::web;

use crate::{middleware::AuthMiddleware, utils::error::AppError};

/// Route table. Expects `web::Data<MongoDB>` and `web::Data<Config>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Malformed JSON bodies get the same error envelope as every other failure
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("⚠️  Rejected request body: {}", err);
        AppError::InvalidRequest(err.to_string()).into()
    });

    cfg.app_data(json_config)
        // Health check
        .route("/health", web::get().to(health::health_check))

        // ==================== USERS ====================
        .service(
            web::scope("/user")
                .route("/new", web::post().to(users::sign_up))
                .route("/login", web::post().to(users::login))
                .route("/all", web::get().to(users::get_all_users))
                // Connections require JWT
                .service(
                    web::resource("/connect/{uid}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::request_connect))
                )
                .service(
                    web::resource("/connect/{uid}/accept")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::accept_connect))
                )
                .route("/{uid}", web::get().to(users::get_user_by_id))  // catch-all, keep last
        )

        // ==================== POSTS ====================
        .service(
            web::scope("/post")
                .route("", web::get().to(posts::list_posts))
                .route("/search", web::get().to(posts::search_posts))
                // Mutations require JWT
                .service(
                    web::resource("/new")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(posts::create_post))
                )
                .service(
                    web::resource("/vote/{pid}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(posts::vote_post))
                )
                .service(
                    web::resource("/edit/{pid}")
                        .wrap(AuthMiddleware)
                        .route(web::patch().to(posts::edit_post))
                )
                .service(
                    web::resource("/delete/{pid}")
                        .wrap(AuthMiddleware)
                        .route(web::delete().to(posts::delete_post))
                )
        );
}
