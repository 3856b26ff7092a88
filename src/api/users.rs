use actix_web::{web, HttpResponse, ResponseError};
use crate::{
    config::Config,
    database::MongoDB,
    middleware::auth::Claims,
    models::{parse_object_id, UserResponse},
    services::{connection_service, user_service},
    services::user_service::{AuthResponse, LoginRequest, SignUpRequest},
};

#[utoipa::path(
    post,
    path = "/user/new",
    tag = "User",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing name/email or password too short"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn sign_up(
    db: web::Data<MongoDB>,
    config: web::Data<Config>,
    request: web::Json<SignUpRequest>,
) -> HttpResponse {
    log::info!("📝 POST /user/new - email: {}", request.email);

    match user_service::sign_up(&db, &config, request.into_inner()).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => {
            log::warn!("❌ Sign up failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/user/login",
    tag = "User",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 403, description = "Invalid email/password")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    config: web::Data<Config>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /user/login - email: {}", request.email);

    let email = request.email.clone();
    match user_service::login(&db, &config, request.into_inner()).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/user/all",
    tag = "User",
    responses(
        (status = 200, description = "All users", body = [UserResponse])
    )
)]
pub async fn get_all_users(db: web::Data<MongoDB>) -> HttpResponse {
    match user_service::get_all_users(&db).await {
        Ok(users) => {
            log::info!("👥 GET /user/all - {} users", users.len());
            HttpResponse::Ok().json(users.into_iter().map(UserResponse::from).collect::<Vec<_>>())
        }
        Err(e) => {
            log::warn!("❌ Listing users failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/user/{uid}",
    tag = "User",
    params(("uid" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_by_id(db: web::Data<MongoDB>, uid: web::Path<String>) -> HttpResponse {
    log::info!("👤 GET /user/{}", uid);

    let result = async {
        let user_id = parse_object_id(&uid, "user")?;
        user_service::get_user_by_id(&db, &user_id).await
    }
    .await;

    match result {
        Ok(user) => HttpResponse::Ok().json(UserResponse::from(user)),
        Err(e) => {
            log::warn!("❌ Lookup of user {} failed: {}", uid, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/user/connect/{uid}",
    tag = "Connections",
    params(("uid" = String, Path, description = "User to send the request to")),
    responses(
        (status = 200, description = "Request sent; body is {thisUser, userConnect}"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Already connected or already requested")
    ),
    security(("bearer_auth" = []))
)]
pub async fn request_connect(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    uid: web::Path<String>,
) -> HttpResponse {
    log::info!("🤝 POST /user/connect/{} - from {}", uid, user.sub);

    let result = async {
        let requester_id = user.user_id()?;
        let target_id = parse_object_id(&uid, "user")?;
        connection_service::request_connect(&db, &requester_id, &target_id).await
    }
    .await;

    match result {
        Ok((this_user, user_connect)) => HttpResponse::Ok().json(serde_json::json!({
            "thisUser": UserResponse::from(this_user),
            "userConnect": UserResponse::from(user_connect)
        })),
        Err(e) => {
            log::warn!("❌ Connection request {} -> {} failed: {}", user.sub, uid, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/user/connect/{uid}/accept",
    tag = "Connections",
    params(("uid" = String, Path, description = "User whose request is accepted")),
    responses(
        (status = 200, description = "Connected; body is {thisUser, acceptedUser}"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Already connected")
    ),
    security(("bearer_auth" = []))
)]
pub async fn accept_connect(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    uid: web::Path<String>,
) -> HttpResponse {
    log::info!("🤝 POST /user/connect/{}/accept - by {}", uid, user.sub);

    let result = async {
        let accepter_id = user.user_id()?;
        let requester_id = parse_object_id(&uid, "user")?;
        connection_service::accept_connect(&db, &accepter_id, &requester_id).await
    }
    .await;

    match result {
        Ok((this_user, accepted_user)) => HttpResponse::Ok().json(serde_json::json!({
            "thisUser": UserResponse::from(this_user),
            "acceptedUser": UserResponse::from(accepted_user)
        })),
        Err(e) => {
            log::warn!("❌ Accepting {} by {} failed: {}", uid, user.sub, e);
            e.error_response()
        }
    }
}
