use crate::{
    config::Config,
    database::{is_duplicate_key, MongoDB, USERS},
    models::User,
    services::auth_service::{generate_jwt, hash_password, verify_password},
    utils::error::{internal, AppError},
};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

const MIN_PASSWORD_LEN: usize = 6;

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    pub token: String,
}

impl SignUpRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(AppError::InvalidRequest("Name and email are required".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

// User registration
pub async fn sign_up(
    db: &MongoDB,
    config: &Config,
    request: SignUpRequest,
) -> Result<AuthResponse, AppError> {
    request.validate()?;

    let collection = db.collection::<User>(USERS);
    let email = request.email.trim().to_string();

    let existing = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(internal("Signing up failed, please try again later"))?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "User already existed, please try login instead".to_string(),
        ));
    }

    let hashed_password = hash_password(request.password, config.bcrypt_cost).await?;
    let new_user = User::new(request.name.trim().to_string(), email, hashed_password);

    collection.insert_one(&new_user).await.map_err(|e| {
        // Lost a race against another sign-up with the same email
        if is_duplicate_key(&e) {
            AppError::Conflict("User already existed, please try login instead".to_string())
        } else {
            internal("Could not create user, please try again later")(e)
        }
    })?;

    let user_id = new_user.id_hex();
    let token = generate_jwt(&user_id, &new_user.email, config)?;

    log::info!("✅ User registered successfully: {} ({})", new_user.email, user_id);

    Ok(AuthResponse {
        user_id,
        email: new_user.email,
        token,
    })
}

// User login
pub async fn login(
    db: &MongoDB,
    config: &Config,
    request: LoginRequest,
) -> Result<AuthResponse, AppError> {
    let invalid = || AppError::Forbidden("Invalid email/password".to_string());

    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "email": request.email.trim() })
        .await
        .map_err(internal("Logging in failed, please try again later"))?
        .ok_or_else(invalid)?;

    if !verify_password(request.password, user.password.clone()).await? {
        return Err(invalid());
    }

    let user_id = user.id_hex();
    let token = generate_jwt(&user_id, &user.email, config)?;

    Ok(AuthResponse {
        user_id,
        email: user.email,
        token,
    })
}

/// Looks a user up, `None` when absent
pub async fn find_user(db: &MongoDB, user_id: &ObjectId) -> Result<Option<User>, AppError> {
    db.collection::<User>(USERS)
        .find_one(doc! { "_id": user_id })
        .await
        .map_err(internal("Could not find the user for the provided id"))
}

pub async fn get_user_by_id(db: &MongoDB, user_id: &ObjectId) -> Result<User, AppError> {
    find_user(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find the user for the provided id".to_string()))
}

pub async fn get_all_users(db: &MongoDB) -> Result<Vec<User>, AppError> {
    let mut cursor = db
        .collection::<User>(USERS)
        .find(doc! {})
        .await
        .map_err(internal("Something went wrong, could not list users"))?;

    let mut users = Vec::new();
    while let Some(result) = cursor.next().await {
        users.push(result.map_err(internal("Something went wrong, could not list users"))?);
    }

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::test_db, services::auth_service::verify_token};

    fn unique_email() -> String {
        format!("{}@test.local", ObjectId::new().to_hex())
    }

    fn sign_up_request(email: &str) -> SignUpRequest {
        SignUpRequest {
            name: "alice".to_string(),
            email: email.to_string(),
            password: "pw123456".to_string(),
        }
    }

    #[test]
    fn test_sign_up_validation() {
        assert!(sign_up_request("a@x.com").validate().is_ok());

        let mut request = sign_up_request("a@x.com");
        request.password = "12345".to_string();
        assert!(matches!(request.validate(), Err(AppError::InvalidRequest(_))));

        let mut request = sign_up_request("   ");
        request.password = "pw123456".to_string();
        assert!(matches!(request.validate(), Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_sign_up_token_binds_new_user() {
        let db = test_db().await;
        let config = Config::for_tests();
        let email = unique_email();

        let response = sign_up(&db, &config, sign_up_request(&email)).await.unwrap();
        let claims = verify_token(&response.token, &config.jwt_secret).unwrap();
        assert_eq!(claims.sub, response.user_id);
        assert_eq!(claims.email, email);

        let stored = get_user_by_id(&db, &ObjectId::parse_str(&response.user_id).unwrap())
            .await
            .unwrap();
        assert_eq!(stored.email, email);
        assert_ne!(stored.password, "pw123456");
        assert_eq!(stored.age, 18);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_duplicate_sign_up_conflicts() {
        let db = test_db().await;
        let config = Config::for_tests();
        let email = unique_email();

        sign_up(&db, &config, sign_up_request(&email)).await.unwrap();
        let second = sign_up(&db, &config, sign_up_request(&email)).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_login_flow() {
        let db = test_db().await;
        let config = Config::for_tests();
        let email = unique_email();
        let created = sign_up(&db, &config, sign_up_request(&email)).await.unwrap();

        let logged_in = login(
            &db,
            &config,
            LoginRequest { email: email.clone(), password: "pw123456".to_string() },
        )
        .await
        .unwrap();
        assert_eq!(logged_in.user_id, created.user_id);
        assert!(verify_token(&logged_in.token, &config.jwt_secret).is_ok());

        let wrong = login(
            &db,
            &config,
            LoginRequest { email: email.clone(), password: "nope-nope".to_string() },
        )
        .await;
        assert!(matches!(wrong, Err(AppError::Forbidden(_))));

        let unknown = login(
            &db,
            &config,
            LoginRequest { email: unique_email(), password: "pw123456".to_string() },
        )
        .await;
        assert!(matches!(unknown, Err(AppError::Forbidden(_))));

        let users = get_all_users(&db).await.unwrap();
        assert!(users.iter().any(|u| u.email == email));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_missing_user_is_not_found() {
        let db = test_db().await;
        let result = get_user_by_id(&db, &ObjectId::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
