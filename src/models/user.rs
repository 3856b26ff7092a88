use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// User document (collection "users")
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    #[serde(default = "default_age")]
    pub age: i32,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub posts: Vec<ObjectId>,
    /// Confirmed connections, mirrored on the other user
    #[serde(default)]
    pub people_connected: Vec<ObjectId>,
    /// Requests this user sent and that are not accepted yet
    #[serde(default)]
    pub pending_request: Vec<ObjectId>,
    /// Requests sent to this user, awaiting their decision
    #[serde(default)]
    pub incoming_request: Vec<ObjectId>,
}

fn default_age() -> i32 {
    18
}

fn default_gender() -> String {
    "Male".to_string()
}

/// How one user relates to another, seen from the first user's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    None,
    /// This user asked, the other has not answered
    Pending,
    /// The other user asked this one
    Incoming,
    Connected,
}

impl User {
    /// New account with default profile fields and a fresh id.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Some(ObjectId::new()),
            name,
            email,
            password: password_hash,
            age: default_age(),
            gender: default_gender(),
            images: Vec::new(),
            posts: Vec::new(),
            people_connected: Vec::new(),
            pending_request: Vec::new(),
            incoming_request: Vec::new(),
        }
    }

    pub fn relation_to(&self, other: &ObjectId) -> Relation {
        if self.people_connected.contains(other) {
            Relation::Connected
        } else if self.pending_request.contains(other) {
            Relation::Pending
        } else if self.incoming_request.contains(other) {
            Relation::Incoming
        } else {
            Relation::None
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// User as returned by the API (no password hash, ids as hex)
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub gender: String,
    pub images: Vec<String>,
    pub posts: Vec<String>,
    pub people_connected: Vec<String>,
    pub pending_request: Vec<String>,
    pub incoming_request: Vec<String>,
}

pub(crate) fn hex_ids(ids: &[ObjectId]) -> Vec<String> {
    ids.iter().map(|id| id.to_hex()).collect()
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id_hex(),
            name: user.name,
            email: user.email,
            age: user.age,
            gender: user.gender,
            images: user.images,
            posts: hex_ids(&user.posts),
            people_connected: hex_ids(&user.people_connected),
            pending_request: hex_ids(&user.pending_request),
            incoming_request: hex_ids(&user.incoming_request),
        }
    }
}
