use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coalition_core::{AccountId, ClubId, CommentId, Entity, PostId};

/// A feed post. `target_club_id = None` makes it federation-wide; a club
/// id narrows it to that club's members. The scope is fixed at creation
/// and never changes across edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: AccountId,
    pub title: String,
    pub body: String,
    pub target_club_id: Option<ClubId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        author_id: AccountId,
        title: impl Into<String>,
        body: impl Into<String>,
        target_club_id: Option<ClubId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PostId::new(),
            author_id,
            title: title.into(),
            body: body.into(),
            target_club_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_global(&self) -> bool {
        self.target_club_id.is_none()
    }
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: AccountId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        post_id: PostId,
        author_id: AccountId,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CommentId::new(),
            post_id,
            author_id,
            body: body.into(),
            created_at: now,
        }
    }
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of<E: Entity>(entity: &E) -> &E::Id {
        entity.id()
    }

    #[test]
    fn records_expose_their_ids_by_reference() {
        let now = Utc::now();
        let post = Post::new(AccountId::new(), "t", "b", None, now);
        assert_eq!(key_of(&post), &post.id);

        let comment = Comment::new(post.id, post.author_id, "c", now);
        assert_eq!(key_of(&comment), &comment.id);
    }
}
