//! Postgres-backed feed store (posts, likes, comments).

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use coalition_core::{AccountId, ClubId, CommentId, PostId};
use coalition_feed::records::{Comment, Post};
use coalition_feed::store::{FeedStore, VisibilityScope};
use coalition_members::store::StoreError;

use crate::errors::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresFeed {
    pool: Arc<PgPool>,
}

impl PostgresFeed {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const POST_COLUMNS: &str = "id, author_id, title, body, target_club_id, created_at, updated_at";

fn post_from_row(row: &PgRow) -> Result<Post, StoreError> {
    let get = |e| map_sqlx_error("post", e);
    Ok(Post {
        id: PostId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        author_id: AccountId::from_uuid(row.try_get::<Uuid, _>("author_id").map_err(get)?),
        title: row.try_get("title").map_err(get)?,
        body: row.try_get("body").map_err(get)?,
        target_club_id: row
            .try_get::<Option<Uuid>, _>("target_club_id")
            .map_err(get)?
            .map(ClubId::from_uuid),
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, StoreError> {
    let get = |e| map_sqlx_error("comment", e);
    Ok(Comment {
        id: CommentId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        post_id: PostId::from_uuid(row.try_get::<Uuid, _>("post_id").map_err(get)?),
        author_id: AccountId::from_uuid(row.try_get::<Uuid, _>("author_id").map_err(get)?),
        body: row.try_get("body").map_err(get)?,
        created_at: row.try_get("created_at").map_err(get)?,
    })
}

#[async_trait]
impl FeedStore for PostgresFeed {
    async fn post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("post", e))?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn insert_post(&self, post: Post) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, title, body, target_club_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.author_id.as_uuid())
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.target_club_id.map(|c| c.as_uuid()))
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_post", e))?;
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE posts SET title = $2, body = $3, updated_at = $4 WHERE id = $1")
                .bind(post.id.as_uuid())
                .bind(&post.title)
                .bind(&post.body)
                .bind(post.updated_at)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("update_post", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_posts(&self, scope: VisibilityScope) -> Result<Vec<Post>, StoreError> {
        let (club, all) = match scope {
            VisibilityScope::GlobalOnly => (None, false),
            VisibilityScope::GlobalAndClub(club) => (Some(club.as_uuid()), false),
            VisibilityScope::All => (None, true),
        };
        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE $2 OR target_club_id IS NULL OR target_club_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(club)
        .bind(all)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_posts", e))?;
        rows.iter().map(post_from_row).collect()
    }

    #[instrument(skip(self), fields(post_id = %id.as_uuid()), err)]
    async fn delete_post_cascade(&self, id: PostId) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_post_cascade", e))?;

        sqlx::query("DELETE FROM likes WHERE post_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_post_cascade", e))?;
        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_post_cascade", e))?;
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_post_cascade", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_post_cascade", e))
    }

    async fn toggle_like(
        &self,
        post_id: PostId,
        account_id: AccountId,
    ) -> Result<bool, StoreError> {
        let removed = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND account_id = $2")
            .bind(post_id.as_uuid())
            .bind(account_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("toggle_like", e))?;
        if removed.rows_affected() > 0 {
            return Ok(false);
        }
        sqlx::query(
            r#"
            INSERT INTO likes (post_id, account_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(account_id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("toggle_like", e))?;
        Ok(true)
    }

    async fn like_count(&self, post_id: PostId) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM likes WHERE post_id = $1")
            .bind(post_id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("like_count", e))?;
        let n: i64 = row.try_get("n").map_err(|e| map_sqlx_error("like_count", e))?;
        Ok(n as usize)
    }

    async fn has_liked(&self, post_id: PostId, account_id: AccountId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM likes WHERE post_id = $1 AND account_id = $2")
            .bind(post_id.as_uuid())
            .bind(account_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("has_liked", e))?;
        Ok(row.is_some())
    }

    async fn insert_comment(&self, comment: Comment) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id.as_uuid())
        .bind(comment.post_id.as_uuid())
        .bind(comment.author_id.as_uuid())
        .bind(&comment.body)
        .bind(comment.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_comment", e))?;
        Ok(())
    }

    async fn comments_for(&self, post_id: PostId) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, author_id, body, created_at FROM comments
            WHERE post_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(post_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("comments_for", e))?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn comment_count(&self, post_id: PostId) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM comments WHERE post_id = $1")
            .bind(post_id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("comment_count", e))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| map_sqlx_error("comment_count", e))?;
        Ok(n as usize)
    }
}
