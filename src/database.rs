use sea_orm::{Database, DatabaseConnection, DbErr};

/// Connect to the backing store. Pooling, isolation levels and engine
/// options stay with SeaORM and the URL.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    tracing::info!("Database connected successfully");
    Ok(db)
}
