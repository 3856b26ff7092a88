use crate::{
    database::{MongoDB, POSTS, USERS},
    models::{CreatePostRequest, EditPostRequest, Post, User, VoteType},
    services::user_service::find_user,
    utils::error::{internal, AppError},
};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;

const NOT_FOUND: &str = "Could not find post for the provided id";

fn require_title_and_text(title: &str, text: &str) -> Result<(), AppError> {
    if title.trim().is_empty() || text.trim().is_empty() {
        return Err(AppError::InvalidRequest("Title and text are required".to_string()));
    }
    Ok(())
}

/// Trims tags and drops empty ones; order and duplicates are kept as sent.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

async fn collect_posts(db: &MongoDB, filter: Document) -> Result<Vec<Post>, AppError> {
    let mut cursor = db
        .collection::<Post>(POSTS)
        .find(filter)
        .await
        .map_err(internal("Can't get list of post, please try again"))?;

    let mut posts = Vec::new();
    while let Some(result) = cursor.next().await {
        posts.push(result.map_err(internal("Can't get list of post, please try again"))?);
    }

    Ok(posts)
}

pub async fn list_posts(db: &MongoDB) -> Result<Vec<Post>, AppError> {
    collect_posts(db, doc! {}).await
}

/// Posts whose tag list contains `tag` exactly
pub async fn list_posts_by_tag(db: &MongoDB, tag: &str) -> Result<Vec<Post>, AppError> {
    collect_posts(db, doc! { "tags": tag }).await
}

async fn get_post(db: &MongoDB, post_id: &ObjectId) -> Result<Post, AppError> {
    db.collection::<Post>(POSTS)
        .find_one(doc! { "_id": post_id })
        .await
        .map_err(internal(NOT_FOUND))?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

/// Inserts the post and links it to its owner in one transaction
pub async fn create_post(
    db: &MongoDB,
    owner_id: &ObjectId,
    request: CreatePostRequest,
) -> Result<Post, AppError> {
    require_title_and_text(&request.title, &request.text)?;

    if find_user(db, owner_id).await?.is_none() {
        return Err(AppError::NotFound(
            "Could not find the user for the provided id".to_string(),
        ));
    }

    let post = Post::new(*owner_id, request.title, request.text, normalize_tags(request.tags));

    let posts = db.collection::<Post>(POSTS);
    let users = db.collection::<User>(USERS);

    let mut session = db
        .start_transaction()
        .await
        .map_err(internal("Create post failed"))?;

    let result = async {
        posts
            .insert_one(&post)
            .session(&mut session)
            .await
            .map_err(internal("Create post failed"))?;

        let owner = users
            .update_one(doc! { "_id": owner_id }, doc! { "$push": { "posts": post.id } })
            .session(&mut session)
            .await
            .map_err(internal("Create post failed"))?;

        if owner.matched_count == 0 {
            return Err(AppError::NotFound(
                "Could not find the user for the provided id".to_string(),
            ));
        }

        Ok::<_, AppError>(())
    }
    .await;

    MongoDB::commit_or_abort(&mut session, result, "Create post failed").await?;

    log::info!("✅ Post {} created by {}", post.id.map(|id| id.to_hex()).unwrap_or_default(), owner_id);

    Ok(post)
}

/// Adds exactly one vote to the chosen counter
pub async fn vote_post(db: &MongoDB, post_id: &ObjectId, vote: VoteType) -> Result<Post, AppError> {
    let mut counter = Document::new();
    counter.insert(vote.field(), 1_i64);

    db.collection::<Post>(POSTS)
        .find_one_and_update(doc! { "_id": post_id }, doc! { "$inc": counter })
        .return_document(ReturnDocument::After)
        .await
        .map_err(internal("Something went wrong, could not vote"))?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

/// Replaces title and text; tags and votes are left alone
pub async fn edit_post(
    db: &MongoDB,
    post_id: &ObjectId,
    requester_id: &ObjectId,
    request: EditPostRequest,
) -> Result<Post, AppError> {
    let post = get_post(db, post_id).await?;

    if !post.is_owned_by(requester_id) {
        return Err(AppError::Forbidden("You are not allowed to edit this post".to_string()));
    }

    require_title_and_text(&request.title, &request.text)?;

    db.collection::<Post>(POSTS)
        .find_one_and_update(
            doc! { "_id": post_id, "userOwner": requester_id },
            doc! { "$set": { "title": &request.title, "text": &request.text } },
        )
        .return_document(ReturnDocument::After)
        .await
        .map_err(internal("Something went wrong, can't update post"))?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

/// Removes the post and unlinks it from its owner in one transaction
pub async fn delete_post(
    db: &MongoDB,
    post_id: &ObjectId,
    requester_id: &ObjectId,
) -> Result<(), AppError> {
    let post = get_post(db, post_id).await?;

    if !post.is_owned_by(requester_id) {
        return Err(AppError::Forbidden("You are not allowed to delete this post".to_string()));
    }

    let posts = db.collection::<Post>(POSTS);
    let users = db.collection::<User>(USERS);

    let mut session = db
        .start_transaction()
        .await
        .map_err(internal("Something went wrong, could not delete post"))?;

    let result = async {
        let deleted = posts
            .delete_one(doc! { "_id": post_id, "userOwner": requester_id })
            .session(&mut session)
            .await
            .map_err(internal("Something went wrong, could not delete post"))?;

        if deleted.deleted_count == 0 {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }

        users
            .update_one(doc! { "_id": post.user_owner }, doc! { "$pull": { "posts": post_id } })
            .session(&mut session)
            .await
            .map_err(internal("Something went wrong, could not delete post"))?;

        Ok::<_, AppError>(())
    }
    .await;

    MongoDB::commit_or_abort(&mut session, result, "Something went wrong, could not delete post").await?;

    log::info!("🗑️  Post {} deleted by {}", post_id, requester_id);

    Ok(())
}
