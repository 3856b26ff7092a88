pub mod auth_service;
pub mod connection_service;
pub mod post_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{
        database::{MongoDB, USERS},
        models::User,
    };
    use mongodb::bson::oid::ObjectId;

    /// Inserts a user straight into the store, bypassing sign-up.
    pub async fn insert_user(db: &MongoDB, name: &str) -> User {
        let email = format!("{}-{}@test.local", name, ObjectId::new().to_hex());
        let user = User::new(name.to_string(), email, "not-a-real-hash".to_string());
        db.collection::<User>(USERS).insert_one(&user).await.unwrap();
        user
    }
}
