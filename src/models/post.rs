use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Post document (collection "posts")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owner; the only user allowed to edit or delete the post
    pub user_owner: ObjectId,

    pub title: String,

    pub text: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub votes: Votes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Votes {
    pub upvote: i64,
    pub downvote: i64,
}

impl Post {
    pub fn new(owner: ObjectId, title: String, text: String, tags: Vec<String>) -> Self {
        Post {
            id: Some(ObjectId::new()),
            user_owner: owner,
            title,
            text,
            tags,
            votes: Votes::default(),
        }
    }

    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.user_owner == user_id
    }
}

/// Which counter a vote increments. Anything other than "upvote" counts as a downvote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("upvote") => VoteType::Up,
            _ => VoteType::Down,
        }
    }

    /// Dotted path of the counter inside the post document
    pub fn field(self) -> &'static str {
        match self {
            VoteType::Up => "votes.upvote",
            VoteType::Down => "votes.downvote",
        }
    }
}

/// Request to create a post
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to edit a post (title and text are replaced together)
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EditPostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    pub tag: Option<String>,
}

/// Post as returned by the API
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_owner: String,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub votes: Votes,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        PostResponse {
            id: post.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_owner: post.user_owner.to_hex(),
            title: post.title,
            text: post.text,
            tags: post.tags,
            votes: post.votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_vote_type_discriminator() {
        assert_eq!(VoteType::parse(Some("upvote")), VoteType::Up);
        assert_eq!(VoteType::parse(Some("downvote")), VoteType::Down);
        assert_eq!(VoteType::parse(Some("UPVOTE")), VoteType::Down);
        assert_eq!(VoteType::parse(None), VoteType::Down);
        assert_eq!(VoteType::Up.field(), "votes.upvote");
        assert_eq!(VoteType::Down.field(), "votes.downvote");
    }

    #[test]
    fn test_new_post_starts_without_votes() {
        let owner = ObjectId::new();
        let post = Post::new(owner, "t".into(), "body".into(), vec!["rust".into()]);
        assert_eq!(post.votes, Votes { upvote: 0, downvote: 0 });
        assert!(post.is_owned_by(&owner));
        assert!(!post.is_owned_by(&ObjectId::new()));
    }

    #[test]
    fn test_document_layout() {
        let post = Post::new(ObjectId::new(), "t".into(), "body".into(), vec!["a".into()]);
        let doc = bson::to_document(&post).unwrap();
        assert!(doc.contains_key("userOwner"));
        assert_eq!(doc.get_document("votes").unwrap().get_i64("upvote").unwrap(), 0);
    }

    #[test]
    fn test_vote_request_accepts_missing_type() {
        let request: VoteRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(VoteType::parse(request.vote_type.as_deref()), VoteType::Down);

        let request: VoteRequest = serde_json::from_str(r#"{"voteType":"upvote"}"#).unwrap();
        assert_eq!(VoteType::parse(request.vote_type.as_deref()), VoteType::Up);
    }
}
