use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open the async connection to the durable store located in the
/// given directory.
pub async fn async_db(path: &str) -> Result<Connection> {
    let db_path = format!("{}/charla.db", path.trim_end_matches('/'));
    let db = Connection::open(db_path).await?;
    Ok(db)
}

/// Durable state is a single key-value table. Each value holds the
/// full serialized log or index for its key and every write replaces
/// it wholesale.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );",
    )
}
