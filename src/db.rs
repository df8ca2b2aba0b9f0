// linkhub-backend/src/db.rs
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection};

// Type alias pour le pool de connexions
pub type DbPool = Pool<AsyncPgConnection>;

const DEFAULT_POOL_MAX_SIZE: u32 = 10;

// Fonction pour créer le pool de connexions.
// La taille maximale est surchargeable via DB_POOL_MAX_SIZE.
pub async fn create_pool(database_url: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    let max_size = std::env::var("DB_POOL_MAX_SIZE")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_POOL_MAX_SIZE);

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder().max_size(max_size).build(config).await?;

    Ok(pool)
}
