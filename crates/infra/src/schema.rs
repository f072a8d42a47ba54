//! Idempotent schema bootstrap. Statements use `IF NOT EXISTS` so `migrate`
//! can run on every startup.

use sqlx::PgPool;

use coalition_members::store::StoreError;

use crate::errors::map_sqlx_error;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id                UUID PRIMARY KEY,
        name              TEXT NOT NULL,
        email             TEXT,
        role              TEXT NOT NULL,
        club_id           UUID,
        membership_status TEXT NOT NULL,
        country           TEXT,
        member_code       TEXT,
        member_sequence   BIGINT,
        created_at        TIMESTAMPTZ NOT NULL,
        updated_at        TIMESTAMPTZ NOT NULL,
        deleted_at        TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS accounts_club_idx ON accounts (club_id)",
    r#"
    CREATE TABLE IF NOT EXISTS clubs (
        id           UUID PRIMARY KEY,
        name         TEXT NOT NULL,
        description  TEXT,
        country      TEXT,
        president_id UUID,
        created_at   TIMESTAMPTZ NOT NULL,
        updated_at   TIMESTAMPTZ NOT NULL,
        deleted_at   TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS membership_requests (
        id           UUID PRIMARY KEY,
        account_id   UUID NOT NULL,
        club_id      UUID NOT NULL,
        status       TEXT NOT NULL,
        message      TEXT,
        reviewed_by  UUID,
        review_notes TEXT,
        reviewed_at  TIMESTAMPTZ,
        created_at   TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS requests_account_idx ON membership_requests (account_id)",
    "CREATE INDEX IF NOT EXISTS requests_club_idx ON membership_requests (club_id)",
    "CREATE SEQUENCE IF NOT EXISTS member_code_seq START 1",
    r#"
    CREATE TABLE IF NOT EXISTS network_memberships (
        id               UUID PRIMARY KEY,
        account_id       UUID NOT NULL UNIQUE,
        organization_id  UUID,
        category         TEXT,
        sector           TEXT,
        work_phone       TEXT,
        functional_email TEXT,
        onboarded        BOOLEAN NOT NULL DEFAULT FALSE,
        nominated_by     UUID,
        created_at       TIMESTAMPTZ NOT NULL,
        updated_at       TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS organizations (
        id         UUID PRIMARY KEY,
        name       TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reports (
        id         UUID PRIMARY KEY,
        author_id  UUID NOT NULL,
        title      TEXT NOT NULL,
        body       TEXT NOT NULL,
        status     TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS report_reads (
        report_id  UUID NOT NULL,
        account_id UUID NOT NULL,
        PRIMARY KEY (report_id, account_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS demands (
        id              UUID PRIMARY KEY,
        author_id       UUID NOT NULL,
        title           TEXT NOT NULL,
        body            TEXT NOT NULL,
        priority        TEXT NOT NULL,
        kind            TEXT NOT NULL,
        status          TEXT NOT NULL,
        target_agent_id UUID,
        created_at      TIMESTAMPTZ NOT NULL,
        updated_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id             UUID PRIMARY KEY,
        author_id      UUID NOT NULL,
        title          TEXT NOT NULL,
        body           TEXT NOT NULL,
        target_club_id UUID,
        created_at     TIMESTAMPTZ NOT NULL,
        updated_at     TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS posts_club_idx ON posts (target_club_id)",
    r#"
    CREATE TABLE IF NOT EXISTS likes (
        post_id    UUID NOT NULL,
        account_id UUID NOT NULL,
        PRIMARY KEY (post_id, account_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id         UUID PRIMARY KEY,
        post_id    UUID NOT NULL,
        author_id  UUID NOT NULL,
        body       TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS comments_post_idx ON comments (post_id)",
];

/// Apply the schema. Safe to call on every startup.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
    }
    tracing::info!("database schema up to date");
    Ok(())
}
