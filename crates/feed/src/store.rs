use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use coalition_core::{AccountId, ClubId, CommentId, PostId};
use coalition_members::store::StoreError;

use crate::records::{Comment, Post};

/// Which posts a feed query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Global posts only (clubless viewers).
    GlobalOnly,
    /// Global posts plus the given club's posts (the normal member view).
    GlobalAndClub(ClubId),
    /// Everything (super admin moderation view).
    All,
}

impl VisibilityScope {
    pub fn admits(&self, post: &Post) -> bool {
        match self {
            VisibilityScope::GlobalOnly => post.is_global(),
            VisibilityScope::GlobalAndClub(club) => {
                post.is_global() || post.target_club_id == Some(*club)
            }
            VisibilityScope::All => true,
        }
    }
}

#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn post(&self, id: PostId) -> Result<Option<Post>, StoreError>;
    async fn insert_post(&self, post: Post) -> Result<(), StoreError>;
    async fn update_post(&self, post: &Post) -> Result<(), StoreError>;
    /// Posts admitted by the scope, newest first.
    async fn list_posts(&self, scope: VisibilityScope) -> Result<Vec<Post>, StoreError>;
    /// Removes the post together with its likes and comments, all-or-nothing.
    async fn delete_post_cascade(&self, id: PostId) -> Result<(), StoreError>;

    /// Returns `true` when the toggle ended in a like, `false` on unlike.
    async fn toggle_like(&self, post_id: PostId, account_id: AccountId)
        -> Result<bool, StoreError>;
    async fn like_count(&self, post_id: PostId) -> Result<usize, StoreError>;
    async fn has_liked(&self, post_id: PostId, account_id: AccountId) -> Result<bool, StoreError>;

    async fn insert_comment(&self, comment: Comment) -> Result<(), StoreError>;
    /// Comments oldest first, the way a thread reads.
    async fn comments_for(&self, post_id: PostId) -> Result<Vec<Comment>, StoreError>;
    async fn comment_count(&self, post_id: PostId) -> Result<usize, StoreError>;
}

// ─── In-memory implementation ────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryFeed {
    posts: RwLock<HashMap<PostId, Post>>,
    likes: RwLock<HashSet<(PostId, AccountId)>>,
    comments: RwLock<HashMap<CommentId, Comment>>,
}

impl InMemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedStore for InMemoryFeed {
    async fn post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().unwrap().get(&id).cloned())
    }

    async fn insert_post(&self, post: Post) -> Result<(), StoreError> {
        self.posts.write().unwrap().insert(post.id, post);
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> Result<(), StoreError> {
        let mut posts = self.posts.write().unwrap();
        match posts.get_mut(&post.id) {
            Some(slot) => {
                *slot = post.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_posts(&self, scope: VisibilityScope) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().unwrap();
        let mut rows: Vec<_> = posts
            .values()
            .filter(|p| scope.admits(p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete_post_cascade(&self, id: PostId) -> Result<(), StoreError> {
        // Lock ordering mirrors the field order above.
        let mut posts = self.posts.write().unwrap();
        let mut likes = self.likes.write().unwrap();
        let mut comments = self.comments.write().unwrap();
        if posts.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        likes.retain(|(post, _)| *post != id);
        comments.retain(|_, c| c.post_id != id);
        Ok(())
    }

    async fn toggle_like(
        &self,
        post_id: PostId,
        account_id: AccountId,
    ) -> Result<bool, StoreError> {
        let mut likes = self.likes.write().unwrap();
        let key = (post_id, account_id);
        if likes.remove(&key) {
            Ok(false)
        } else {
            likes.insert(key);
            Ok(true)
        }
    }

    async fn like_count(&self, post_id: PostId) -> Result<usize, StoreError> {
        let likes = self.likes.read().unwrap();
        Ok(likes.iter().filter(|(post, _)| *post == post_id).count())
    }

    async fn has_liked(&self, post_id: PostId, account_id: AccountId) -> Result<bool, StoreError> {
        Ok(self.likes.read().unwrap().contains(&(post_id, account_id)))
    }

    async fn insert_comment(&self, comment: Comment) -> Result<(), StoreError> {
        self.comments.write().unwrap().insert(comment.id, comment);
        Ok(())
    }

    async fn comments_for(&self, post_id: PostId) -> Result<Vec<Comment>, StoreError> {
        let comments = self.comments.read().unwrap();
        let mut rows: Vec<_> = comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.created_at);
        Ok(rows)
    }

    async fn comment_count(&self, post_id: PostId) -> Result<usize, StoreError> {
        let comments = self.comments.read().unwrap();
        Ok(comments.values().filter(|c| c.post_id == post_id).count())
    }
}
