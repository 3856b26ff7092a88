pub mod post;
pub mod user;

pub use post::*;
pub use user::*;

use crate::utils::error::AppError;
use mongodb::bson::oid::ObjectId;

/// Parses a path id, `what` names the entity in the error message
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::InvalidRequest(format!("Invalid {} id", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "post").unwrap(), id);
        assert_eq!(
            parse_object_id("not-an-id", "post").unwrap_err(),
            AppError::InvalidRequest("Invalid post id".to_string())
        );
    }
}
