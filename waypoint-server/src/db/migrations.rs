//! Schema migrations, run on startup

use sqlx::PgPool;

/// Create tables and indexes if missing
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS places (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            name TEXT,
            country TEXT,
            kind TEXT,
            image TEXT,
            url TEXT,
            description TEXT,
            season_to_go TEXT,
            visited BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_places_username_created ON places(username, created_at DESC, id DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Migrations complete");
    Ok(())
}
