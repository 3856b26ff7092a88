// ==================== CONNECTION HANDSHAKE ====================
// NONE --request--> PENDING --accept--> CONNECTED
// Accepting clears requests in both directions, so crossed requests leave nothing behind.
// There is no reject/cancel: a request stays pending until accepted.

use crate::{
    database::{MongoDB, USERS},
    models::{Relation, User},
    services::user_service::get_user_by_id,
    utils::error::{internal, AppError},
};
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;
use mongodb::{ClientSession, Collection};

const FAILED: &str = "Something went wrong, please try again later";

/// A request may be sent unless the pair is connected or already pending
pub fn ensure_can_request(requester: &User, target_id: &ObjectId) -> Result<(), AppError> {
    match requester.relation_to(target_id) {
        Relation::Connected => Err(AppError::Conflict("Already connected".to_string())),
        Relation::Pending => Err(AppError::Conflict("Already requested".to_string())),
        Relation::None | Relation::Incoming => Ok(()),
    }
}

/// Accepting only fails when the pair is already connected
pub fn ensure_can_accept(accepter: &User, requester_id: &ObjectId) -> Result<(), AppError> {
    match accepter.relation_to(requester_id) {
        Relation::Connected => Err(AppError::Conflict("Already connected".to_string())),
        _ => Ok(()),
    }
}

fn ensure_distinct(a: &ObjectId, b: &ObjectId) -> Result<(), AppError> {
    if a == b {
        return Err(AppError::InvalidRequest("You can't connect with yourself".to_string()));
    }
    Ok(())
}

/// Marks `other` as connected and drops any request with it, whichever side sent it
fn connected_with(other: &ObjectId) -> Document {
    doc! {
        "$pull": { "pendingRequest": other, "incomingRequest": other },
        "$addToSet": { "peopleConnected": other },
    }
}

async fn update_in_session(
    users: &Collection<User>,
    session: &mut ClientSession,
    user_id: &ObjectId,
    update: Document,
) -> Result<User, AppError> {
    users
        .find_one_and_update(doc! { "_id": user_id }, update)
        .return_document(ReturnDocument::After)
        .session(session)
        .await
        .map_err(internal(FAILED))?
        .ok_or_else(|| AppError::NotFound("Could not find the user for the provided id".to_string()))
}

/// `requester` asks `target` to connect. Returns (requester, target) after the update.
pub async fn request_connect(
    db: &MongoDB,
    requester_id: &ObjectId,
    target_id: &ObjectId,
) -> Result<(User, User), AppError> {
    ensure_distinct(requester_id, target_id)?;

    let requester = get_user_by_id(db, requester_id).await?;
    get_user_by_id(db, target_id).await?;

    ensure_can_request(&requester, target_id)?;

    let users = db.collection::<User>(USERS);
    let mut session = db.start_transaction().await.map_err(internal(FAILED))?;

    let result = async {
        let target = update_in_session(
            &users,
            &mut session,
            target_id,
            doc! { "$addToSet": { "incomingRequest": requester_id } },
        )
        .await?;

        let requester = update_in_session(
            &users,
            &mut session,
            requester_id,
            doc! { "$addToSet": { "pendingRequest": target_id } },
        )
        .await?;

        Ok::<_, AppError>((requester, target))
    }
    .await;

    let pair = MongoDB::commit_or_abort(&mut session, result, FAILED).await?;

    log::info!("🤝 Connection requested: {} -> {}", requester_id, target_id);

    Ok(pair)
}

/// `accepter` accepts `requester`. Returns (accepter, requester) after the update.
pub async fn accept_connect(
    db: &MongoDB,
    accepter_id: &ObjectId,
    requester_id: &ObjectId,
) -> Result<(User, User), AppError> {
    ensure_distinct(accepter_id, requester_id)?;

    let accepter = get_user_by_id(db, accepter_id).await?;
    get_user_by_id(db, requester_id).await?;

    ensure_can_accept(&accepter, requester_id)?;

    let users = db.collection::<User>(USERS);
    let mut session = db.start_transaction().await.map_err(internal(FAILED))?;

    let result = async {
        let requester = update_in_session(
            &users,
            &mut session,
            requester_id,
            connected_with(accepter_id),
        )
        .await?;

        let accepter = update_in_session(
            &users,
            &mut session,
            accepter_id,
            connected_with(requester_id),
        )
        .await?;

        Ok::<_, AppError>((accepter, requester))
    }
    .await;

    let pair = MongoDB::commit_or_abort(&mut session, result, FAILED).await?;

    log::info!("✅ Connection accepted: {} <-> {}", accepter_id, requester_id);

    Ok(pair)
}
