//! Feed operations: posting, visibility-scoped listing, author edits, the
//! deletion authority matrix, likes and comments.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use coalition_auth::Actor;
use coalition_core::{ClubId, DomainError, DomainResult, PostId};
use coalition_members::store::DirectoryStore;

use crate::records::{Comment, Post};
use crate::store::{FeedStore, VisibilityScope};

const MAX_COMMENT_LEN: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    /// `true` narrows the post to the author's own club.
    #[serde(default)]
    pub club_only: bool,
}

/// Author edit. The target club is deliberately absent: scope is fixed at
/// creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub body: String,
}

/// A post joined with its author name and engagement counters.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author_name: Option<String>,
    pub like_count: usize,
    pub comment_count: usize,
    pub has_liked: bool,
}

pub struct FeedService {
    feed: Arc<dyn FeedStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl FeedService {
    pub fn new(feed: Arc<dyn FeedStore>, directory: Arc<dyn DirectoryStore>) -> Self {
        Self { feed, directory }
    }

    pub async fn create_post(&self, actor: &Actor, input: NewPost) -> DomainResult<Post> {
        if input.title.trim().is_empty() && input.body.trim().is_empty() {
            return Err(DomainError::bad_request("post cannot be empty"));
        }
        let target_club_id = if input.club_only {
            match actor.club_id {
                Some(club) => Some(club),
                None => {
                    return Err(DomainError::bad_request(
                        "club-scoped posts require a club membership",
                    ));
                }
            }
        } else {
            None
        };

        let post = Post::new(
            actor.account_id,
            input.title,
            input.body,
            target_club_id,
            Utc::now(),
        );
        self.feed.insert_post(post.clone()).await?;
        Ok(post)
    }

    /// The caller's feed: global posts plus their own club's, or everything
    /// for super admins. An explicit `club_filter` returns exactly that
    /// club's posts regardless of the caller's own club (the club profile
    /// view).
    pub async fn list_feed(
        &self,
        actor: &Actor,
        club_filter: Option<ClubId>,
    ) -> DomainResult<Vec<PostView>> {
        let posts = match club_filter {
            Some(club) => {
                let mut posts = self.feed.list_posts(VisibilityScope::All).await?;
                posts.retain(|p| p.target_club_id == Some(club));
                posts
            }
            None => self.feed.list_posts(self.scope_for(actor)).await?,
        };
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            views.push(self.view(actor, post).await?);
        }
        Ok(views)
    }

    pub async fn post(&self, actor: &Actor, post_id: PostId) -> DomainResult<PostView> {
        let post = self.visible_post(actor, post_id).await?;
        self.view(actor, post).await
    }

    /// Author-only edit. The target club never changes, whatever the patch.
    pub async fn edit_post(
        &self,
        actor: &Actor,
        post_id: PostId,
        patch: PostPatch,
    ) -> DomainResult<Post> {
        let mut post = self.existing_post(post_id).await?;
        if post.author_id != actor.account_id {
            return Err(DomainError::forbidden("only the author can edit a post"));
        }

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(body) = patch.body {
            post.body = body;
        }
        if post.title.trim().is_empty() && post.body.trim().is_empty() {
            return Err(DomainError::bad_request("post cannot be empty"));
        }
        post.updated_at = Utc::now();
        self.feed.update_post(&post).await?;
        Ok(post)
    }

    /// Delete a post and everything hanging off it. Allowed for the author,
    /// a super admin, or a club admin of the post's target club.
    pub async fn delete_post(&self, actor: &Actor, post_id: PostId) -> DomainResult<()> {
        let post = self.existing_post(post_id).await?;
        if !actor.can_delete_post(post.author_id, post.target_club_id) {
            return Err(DomainError::forbidden(
                "you are not allowed to delete this post",
            ));
        }
        self.feed.delete_post_cascade(post_id).await?;
        tracing::info!(post = %post_id, by = %actor.account_id, "post deleted");
        Ok(())
    }

    /// Returns the new like state.
    pub async fn toggle_like(&self, actor: &Actor, post_id: PostId) -> DomainResult<bool> {
        self.visible_post(actor, post_id).await?;
        Ok(self.feed.toggle_like(post_id, actor.account_id).await?)
    }

    pub async fn add_comment(
        &self,
        actor: &Actor,
        post_id: PostId,
        input: NewComment,
    ) -> DomainResult<Comment> {
        self.visible_post(actor, post_id).await?;
        let body = input.body.trim();
        if body.is_empty() {
            return Err(DomainError::bad_request("comment cannot be empty"));
        }
        if body.chars().count() > MAX_COMMENT_LEN {
            return Err(DomainError::bad_request(format!(
                "comment exceeds {MAX_COMMENT_LEN} characters"
            )));
        }
        let comment = Comment::new(post_id, actor.account_id, body, Utc::now());
        self.feed.insert_comment(comment.clone()).await?;
        Ok(comment)
    }

    pub async fn list_comments(&self, actor: &Actor, post_id: PostId) -> DomainResult<Vec<Comment>> {
        self.visible_post(actor, post_id).await?;
        Ok(self.feed.comments_for(post_id).await?)
    }

    fn scope_for(&self, actor: &Actor) -> VisibilityScope {
        if actor.role.is_super_admin() {
            VisibilityScope::All
        } else {
            match actor.club_id {
                Some(club) => VisibilityScope::GlobalAndClub(club),
                None => VisibilityScope::GlobalOnly,
            }
        }
    }

    async fn existing_post(&self, post_id: PostId) -> DomainResult<Post> {
        match self.feed.post(post_id).await? {
            Some(post) => Ok(post),
            None => Err(DomainError::not_found(format!("post {post_id}"))),
        }
    }

    /// Load a post the actor is allowed to see; scoped-out posts read as
    /// missing rather than forbidden.
    async fn visible_post(&self, actor: &Actor, post_id: PostId) -> DomainResult<Post> {
        let post = self.existing_post(post_id).await?;
        if self.scope_for(actor).admits(&post) {
            Ok(post)
        } else {
            Err(DomainError::not_found(format!("post {post_id}")))
        }
    }

    async fn view(&self, actor: &Actor, post: Post) -> DomainResult<PostView> {
        let author_name = self
            .directory
            .account(post.author_id)
            .await?
            .map(|a| a.name);
        let like_count = self.feed.like_count(post.id).await?;
        let comment_count = self.feed.comment_count(post.id).await?;
        let has_liked = self.feed.has_liked(post.id, actor.account_id).await?;
        Ok(PostView {
            post,
            author_name,
            like_count,
            comment_count,
            has_liked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalition_auth::Role;
    use coalition_core::AccountId;
    use coalition_members::records::Account;
    use coalition_members::store::InMemoryDirectory;
    use crate::store::InMemoryFeed;

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        service: FeedService,
    }

    impl Fixture {
        fn new() -> Self {
            let directory = Arc::new(InMemoryDirectory::new());
            let service = FeedService::new(Arc::new(InMemoryFeed::new()), directory.clone());
            Self { directory, service }
        }

        async fn account(&self, role: Role, club: Option<ClubId>) -> Account {
            let mut account = Account::new(AccountId::new(), "poster", Utc::now());
            account.role = role;
            account.club_id = club;
            self.directory.insert_account(account.clone()).await.unwrap();
            account
        }

        async fn post(&self, author: &Account, club_only: bool) -> Post {
            self.service
                .create_post(
                    &author.actor(),
                    NewPost {
                        title: "t".into(),
                        body: "b".into(),
                        club_only,
                    },
                )
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn feed_partitions_by_club() {
        let fx = Fixture::new();
        let club_a = ClubId::new();
        let club_b = ClubId::new();
        let alice = fx.account(Role::Member, Some(club_a)).await;
        let bob = fx.account(Role::Member, Some(club_b)).await;
        let loner = fx.account(Role::Member, None).await;
        let root = fx.account(Role::SuperAdmin, None).await;

        fx.post(&alice, false).await;
        fx.post(&alice, true).await;
        fx.post(&bob, true).await;

        assert_eq!(fx.service.list_feed(&alice.actor(), None).await.unwrap().len(), 2);
        assert_eq!(fx.service.list_feed(&bob.actor(), None).await.unwrap().len(), 2);
        assert_eq!(fx.service.list_feed(&loner.actor(), None).await.unwrap().len(), 1);
        assert_eq!(fx.service.list_feed(&root.actor(), None).await.unwrap().len(), 3);

        // An explicit club filter narrows to that club's posts.
        let filtered = fx
            .service
            .list_feed(&root.actor(), Some(club_a))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].post.target_club_id, Some(club_a));
    }

    #[tokio::test]
    async fn club_filter_crosses_the_callers_own_club() {
        let fx = Fixture::new();
        let club_a = ClubId::new();
        let club_b = ClubId::new();
        let alice = fx.account(Role::Member, Some(club_a)).await;
        let bob = fx.account(Role::Member, Some(club_b)).await;

        fx.post(&alice, false).await;
        fx.post(&bob, true).await;

        // Viewing club B's profile page from a club A membership.
        let filtered = fx
            .service
            .list_feed(&alice.actor(), Some(club_b))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].post.target_club_id, Some(club_b));

        // The filter never mixes in global posts.
        let filtered = fx
            .service
            .list_feed(&alice.actor(), Some(club_a))
            .await
            .unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn clubless_author_cannot_narrow_a_post() {
        let fx = Fixture::new();
        let loner = fx.account(Role::Member, None).await;
        let err = fx
            .service
            .create_post(
                &loner.actor(),
                NewPost {
                    title: "t".into(),
                    body: "b".into(),
                    club_only: true,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    #[tokio::test]
    async fn edit_is_author_only_and_keeps_scope() {
        let fx = Fixture::new();
        let club = ClubId::new();
        let author = fx.account(Role::Member, Some(club)).await;
        let other = fx.account(Role::ClubAdmin, Some(club)).await;
        let post = fx.post(&author, true).await;

        let err = fx
            .service
            .edit_post(&other.actor(), post.id, PostPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let edited = fx
            .service
            .edit_post(
                &author.actor(),
                post.id,
                PostPatch {
                    title: Some("new title".into()),
                    body: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.title, "new title");
        assert_eq!(edited.target_club_id, Some(club));
    }

    #[tokio::test]
    async fn delete_authority_matrix() {
        let fx = Fixture::new();
        let club = ClubId::new();
        let author = fx.account(Role::Member, Some(club)).await;
        let club_admin = fx.account(Role::ClubAdmin, Some(club)).await;
        let foreign_admin = fx.account(Role::ClubAdmin, Some(ClubId::new())).await;
        let root = fx.account(Role::SuperAdmin, None).await;

        // A club admin moderates posts scoped to their club.
        let scoped = fx.post(&author, true).await;
        fx.service
            .delete_post(&club_admin.actor(), scoped.id)
            .await
            .unwrap();

        // But has no authority over the author's global posts.
        let global = fx.post(&author, false).await;
        let err = fx
            .service
            .delete_post(&club_admin.actor(), global.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = fx
            .service
            .delete_post(&foreign_admin.actor(), global.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        fx.service.delete_post(&root.actor(), global.id).await.unwrap();

        // Authors always delete their own.
        let own = fx.post(&author, false).await;
        fx.service.delete_post(&author.actor(), own.id).await.unwrap();
    }

    #[tokio::test]
    async fn delete_cascades_likes_and_comments() {
        let fx = Fixture::new();
        let author = fx.account(Role::Member, Some(ClubId::new())).await;
        let post = fx.post(&author, false).await;

        fx.service.toggle_like(&author.actor(), post.id).await.unwrap();
        fx.service
            .add_comment(
                &author.actor(),
                post.id,
                NewComment { body: "hi".into() },
            )
            .await
            .unwrap();

        fx.service.delete_post(&author.actor(), post.id).await.unwrap();
        let err = fx.service.post(&author.actor(), post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn like_toggles_and_counts() {
        let fx = Fixture::new();
        let author = fx.account(Role::Member, Some(ClubId::new())).await;
        let reader = fx.account(Role::Member, None).await;
        let post = fx.post(&author, false).await;

        assert!(fx.service.toggle_like(&reader.actor(), post.id).await.unwrap());
        let view = fx.service.post(&reader.actor(), post.id).await.unwrap();
        assert_eq!(view.like_count, 1);
        assert!(view.has_liked);

        assert!(!fx.service.toggle_like(&reader.actor(), post.id).await.unwrap());
        let view = fx.service.post(&reader.actor(), post.id).await.unwrap();
        assert_eq!(view.like_count, 0);
        assert!(!view.has_liked);
    }

    #[tokio::test]
    async fn comments_are_bounded_and_ordered() {
        let fx = Fixture::new();
        let author = fx.account(Role::Member, Some(ClubId::new())).await;
        let post = fx.post(&author, false).await;

        let err = fx
            .service
            .add_comment(
                &author.actor(),
                post.id,
                NewComment {
                    body: "x".repeat(MAX_COMMENT_LEN + 1),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));

        fx.service
            .add_comment(&author.actor(), post.id, NewComment { body: "first".into() })
            .await
            .unwrap();
        fx.service
            .add_comment(&author.actor(), post.id, NewComment { body: "second".into() })
            .await
            .unwrap();

        let comments = fx
            .service
            .list_comments(&author.actor(), post.id)
            .await
            .unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].body, "first");
    }

    #[tokio::test]
    async fn scoped_posts_read_as_missing_to_outsiders() {
        let fx = Fixture::new();
        let insider = fx.account(Role::Member, Some(ClubId::new())).await;
        let outsider = fx.account(Role::Member, Some(ClubId::new())).await;
        let post = fx.post(&insider, true).await;

        let err = fx.service.post(&outsider.actor(), post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
