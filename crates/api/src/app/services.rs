//! Service wiring: one place that decides which store implementations back
//! the domain services.

use std::sync::Arc;

use sqlx::PgPool;

use coalition_auth::{InMemorySessions, SessionService};
use coalition_feed::{FeedService, InMemoryFeed};
use coalition_infra::{PostgresDirectory, PostgresFeed, PostgresNetwork};
use coalition_members::store::{DirectoryStore, InMemoryDirectory};
use coalition_members::MembershipWorkflow;
use coalition_network::{InMemoryNetwork, NetworkGate};

pub struct AppServices {
    pub sessions: Arc<dyn SessionService>,
    pub directory: Arc<dyn DirectoryStore>,
    pub workflow: MembershipWorkflow,
    pub gate: NetworkGate,
    pub feed: FeedService,
}

fn assemble(sessions: Arc<dyn SessionService>, directory: Arc<dyn DirectoryStore>,
            network: Arc<dyn coalition_network::NetworkStore>,
            feed: Arc<dyn coalition_feed::FeedStore>) -> AppServices {
    AppServices {
        workflow: MembershipWorkflow::new(directory.clone()),
        gate: NetworkGate::new(network, directory.clone()),
        feed: FeedService::new(feed, directory.clone()),
        sessions,
        directory,
    }
}

/// Everything in process memory; used for development and tests.
pub fn build_in_memory() -> AppServices {
    assemble(
        Arc::new(InMemorySessions::new()),
        Arc::new(InMemoryDirectory::new()),
        Arc::new(InMemoryNetwork::new()),
        Arc::new(InMemoryFeed::new()),
    )
}

/// Postgres-backed stores sharing one pool. Sessions stay in process
/// memory; they are transport state, not domain state.
pub fn build_postgres(pool: PgPool) -> AppServices {
    assemble(
        Arc::new(InMemorySessions::new()),
        Arc::new(PostgresDirectory::new(pool.clone())),
        Arc::new(PostgresNetwork::new(pool.clone())),
        Arc::new(PostgresFeed::new(pool)),
    )
}
