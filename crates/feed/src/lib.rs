//! The shared activity feed: posts scoped globally or to a single club,
//! with likes and comments.

pub mod records;
pub mod service;
pub mod store;

pub use records::{Comment, Post};
pub use service::{FeedService, NewComment, NewPost, PostPatch, PostView};
pub use store::{FeedStore, InMemoryFeed, VisibilityScope};
