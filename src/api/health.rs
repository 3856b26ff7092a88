use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::MongoDB;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// "connected" or "unreachable"
    pub database: String,
    pub timestamp: i64,
}

impl HealthResponse {
    fn new(database_up: bool) -> Self {
        Self {
            status: if database_up { "healthy" } else { "degraded" }.to_string(),
            service: "social-service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: if database_up { "connected" } else { "unreachable" }.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up; database state is reported in the body", body = HealthResponse)
    )
)]
pub async fn health_check(db: web::Data<MongoDB>) -> impl Responder {
    let database_up = db.ping().await;
    if !database_up {
        log::warn!("⚠️  Health check: MongoDB ping failed");
    }

    HttpResponse::Ok().json(HealthResponse::new(database_up))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_reflects_database() {
        let up = HealthResponse::new(true);
        assert_eq!(up.status, "healthy");
        assert_eq!(up.database, "connected");
        assert_eq!(up.service, "social-service");

        let down = HealthResponse::new(false);
        assert_eq!(down.status, "degraded");
        assert_eq!(down.database, "unreachable");
    }
}
