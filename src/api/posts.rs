use actix_web::{web, HttpResponse, ResponseError};
use crate::{
    database::MongoDB,
    middleware::auth::Claims,
    models::{parse_object_id, CreatePostRequest, EditPostRequest, PostResponse, TagQuery, VoteRequest, VoteType},
    services::post_service,
};

fn to_responses(posts: Vec<crate::models::Post>) -> Vec<PostResponse> {
    posts.into_iter().map(PostResponse::from).collect()
}

/// GET /post - every post, wrapped as {posts}
#[utoipa::path(
    get,
    path = "/post",
    tag = "Post",
    responses(
        (status = 200, description = "All posts, as {posts: [...]}")
    )
)]
pub async fn list_posts(db: web::Data<MongoDB>) -> HttpResponse {
    match post_service::list_posts(&db).await {
        Ok(posts) => {
            log::info!("📰 GET /post - {} posts", posts.len());
            HttpResponse::Ok().json(serde_json::json!({
                "posts": to_responses(posts)
            }))
        }
        Err(e) => {
            log::warn!("❌ Listing posts failed: {}", e);
            e.error_response()
        }
    }
}

/// GET /post/search?tag= - posts carrying the tag; without a tag, every post
#[utoipa::path(
    get,
    path = "/post/search",
    tag = "Post",
    params(("tag" = Option<String>, Query, description = "Exact tag to match; omitted or blank returns all posts")),
    responses(
        (status = 200, description = "Matching posts", body = [PostResponse])
    )
)]
pub async fn search_posts(db: web::Data<MongoDB>, query: web::Query<TagQuery>) -> HttpResponse {
    let tag = query.tag.as_deref().map(str::trim).filter(|tag| !tag.is_empty());
    log::info!("🔎 GET /post/search - tag: {:?}", tag);

    let result = match tag {
        Some(tag) => post_service::list_posts_by_tag(&db, tag).await,
        None => post_service::list_posts(&db).await,
    };

    match result {
        Ok(posts) => HttpResponse::Ok().json(to_responses(posts)),
        Err(e) => {
            log::warn!("❌ Tag search failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/post/new",
    tag = "Post",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created, as {post}"),
        (status = 400, description = "Missing title or text"),
        (status = 404, description = "Owner not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_post(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    request: web::Json<CreatePostRequest>,
) -> HttpResponse {
    log::info!("📝 POST /post/new - owner: {}", user.sub);

    let result = async {
        let owner_id = user.user_id()?;
        post_service::create_post(&db, &owner_id, request.into_inner()).await
    }
    .await;

    match result {
        Ok(post) => HttpResponse::Created().json(serde_json::json!({
            "post": PostResponse::from(post)
        })),
        Err(e) => {
            log::warn!("❌ Create post failed for {}: {}", user.sub, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/post/vote/{pid}",
    tag = "Post",
    params(("pid" = String, Path, description = "Post id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn vote_post(
    db: web::Data<MongoDB>,
    pid: web::Path<String>,
    request: Option<web::Json<VoteRequest>>,
) -> HttpResponse {
    let vote = VoteType::parse(request.as_ref().and_then(|r| r.vote_type.as_deref()));
    log::info!("👍 POST /post/vote/{} - {:?}", pid, vote);

    let result = async {
        let post_id = parse_object_id(&pid, "post")?;
        post_service::vote_post(&db, &post_id, vote).await
    }
    .await;

    match result {
        Ok(post) => HttpResponse::Ok().json(PostResponse::from(post)),
        Err(e) => {
            log::warn!("❌ Vote on post {} failed: {}", pid, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    patch,
    path = "/post/edit/{pid}",
    tag = "Post",
    params(("pid" = String, Path, description = "Post id")),
    request_body = EditPostRequest,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn edit_post(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    pid: web::Path<String>,
    request: web::Json<EditPostRequest>,
) -> HttpResponse {
    log::info!("✏️  PATCH /post/edit/{} - by {}", pid, user.sub);

    let result = async {
        let requester_id = user.user_id()?;
        let post_id = parse_object_id(&pid, "post")?;
        post_service::edit_post(&db, &post_id, &requester_id, request.into_inner()).await
    }
    .await;

    match result {
        Ok(post) => HttpResponse::Ok().json(PostResponse::from(post)),
        Err(e) => {
            log::warn!("❌ Edit of post {} by {} failed: {}", pid, user.sub, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/post/delete/{pid}",
    tag = "Post",
    params(("pid" = String, Path, description = "Post id")),
    responses(
        (status = 201, description = "Post deleted, as {message}"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_post(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    pid: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️  DELETE /post/delete/{} - by {}", pid, user.sub);

    let result = async {
        let requester_id = user.user_id()?;
        let post_id = parse_object_id(&pid, "post")?;
        post_service::delete_post(&db, &post_id, &requester_id).await
    }
    .await;

    match result {
        Ok(()) => HttpResponse::Created().json(serde_json::json!({
            "message": "Deleted post"
        })),
        Err(e) => {
            log::warn!("❌ Delete of post {} by {} failed: {}", pid, user.sub, e);
            e.error_response()
        }
    }
}
