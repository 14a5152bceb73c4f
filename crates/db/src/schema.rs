use eyre::Result;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(255) NOT NULL UNIQUE,
            first_name VARCHAR(255) NOT NULL,
            last_name VARCHAR(255) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create meetings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meetings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title VARCHAR(255) NOT NULL,
            description TEXT NULL,
            location VARCHAR(255) NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            window_start INTEGER NULL,
            window_end INTEGER NULL,
            creator_id UUID NULL REFERENCES users(id) ON DELETE SET NULL,
            share_link VARCHAR(32) NOT NULL UNIQUE,
            is_private BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_date_range CHECK (end_date >= start_date),
            CONSTRAINT valid_time_window CHECK (
                (window_start IS NULL AND window_end IS NULL)
                OR (window_start >= 0 AND window_end <= 1440 AND window_end > window_start)
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create meeting_invites table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meeting_invites (
            meeting_id UUID NOT NULL REFERENCES meetings(id) ON DELETE CASCADE,
            email VARCHAR(255) NOT NULL,
            PRIMARY KEY (meeting_id, email)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create meeting_responses table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meeting_responses (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            meeting_id UUID NOT NULL REFERENCES meetings(id) ON DELETE CASCADE,
            name VARCHAR(255) NOT NULL,
            user_id UUID NULL REFERENCES users(id) ON DELETE SET NULL,
            edit_token_hash VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT one_response_per_user UNIQUE (meeting_id, user_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create availability_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_slots (
            response_id UUID NOT NULL REFERENCES meeting_responses(id) ON DELETE CASCADE,
            date DATE NOT NULL,
            start_minutes INTEGER NOT NULL,
            end_minutes INTEGER NOT NULL,
            PRIMARY KEY (response_id, date, start_minutes),
            CONSTRAINT half_hour_slot CHECK (
                start_minutes % 30 = 0 AND end_minutes = start_minutes + 30
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Late columns and indexes; several statements, so run as a simple query
    pool.execute(
        r#"
        ALTER TABLE meeting_responses ADD COLUMN IF NOT EXISTS edit_token_hash VARCHAR(255) NULL;
        CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
        CREATE INDEX IF NOT EXISTS idx_meetings_creator_id ON meetings(creator_id);
        CREATE INDEX IF NOT EXISTS idx_meeting_responses_meeting_id ON meeting_responses(meeting_id);
        CREATE INDEX IF NOT EXISTS idx_meeting_responses_user_id ON meeting_responses(user_id);
        "#,
    )
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
