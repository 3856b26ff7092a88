use crate::utils::error::{internal, AppError};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, ClientSession, Collection, Database};
use std::error::Error;

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";

const DUPLICATE_KEY: i32 = 11000;

/// True when a write was rejected by a unique index
pub fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Timeouts
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the services rely on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS);

        // users(email) is unique: sign-up races end up as duplicate key errors
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        // Must exist, unlike the lookup indexes below
        users.create_index(email_index).await?;
        log::info!("   ✅ Index ready: users(email) unique");

        let posts = self.collection::<mongodb::bson::Document>(POSTS);

        let tags_index = IndexModel::builder()
            .keys(doc! { "tags": 1 })
            .build();

        match posts.create_index(tags_index).await {
            Ok(_) => log::info!("   ✅ Index created: posts(tags)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let owner_index = IndexModel::builder()
            .keys(doc! { "userOwner": 1 })
            .build();

        match posts.create_index(owner_index).await {
            Ok(_) => log::info!("   ✅ Index created: posts(userOwner)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Starts a session with an open transaction. Callers must commit or abort.
    pub async fn start_transaction(&self) -> mongodb::error::Result<ClientSession> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;
        Ok(session)
    }

    /// Commits when `result` is Ok, otherwise aborts and hands the error back.
    pub async fn commit_or_abort<T>(
        session: &mut ClientSession,
        result: Result<T, AppError>,
        context: &'static str,
    ) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                session.commit_transaction().await.map_err(internal(context))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_error) = session.abort_transaction().await {
                    log::warn!("⚠️  Failed to abort transaction ({}): {}", context, abort_error);
                }
                Err(e)
            }
        }
    }

    /// Round-trip to the server, used by the health check.
    pub async fn ping(&self) -> bool {
        self.db
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await
            .is_ok()
    }
}

/// A handle whose server never answers, for routing tests that must not reach a store.
#[cfg(test)]
pub fn unreachable_db() -> MongoDB {
    use mongodb::options::{ClientOptions, ServerAddress};

    let mut options = ClientOptions::default();
    options.hosts = vec![ServerAddress::Tcp { host: "127.0.0.1".to_string(), port: Some(9) }];
    options.server_selection_timeout = Some(std::time::Duration::from_millis(200));

    let client = Client::with_options(options).expect("client options are valid");
    let db = client.database("social_unreachable");
    MongoDB { client, db }
}

/// Connects to the replica set used by the `#[ignore]`d store tests.
#[cfg(test)]
pub async fn test_db() -> MongoDB {
    let uri = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "mongodb://localhost:27017/?replicaSet=rs0".to_string());
    MongoDB::new(&uri, "social_test")
        .await
        .expect("MongoDB replica set must be running for this test")
}
