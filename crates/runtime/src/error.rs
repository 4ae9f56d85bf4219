//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, and builder
//! validation so clients can bubble them up with consistent context.

use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("script worker command channel closed")]
    CommandChannelClosed,

    #[error("script worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("script worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires a world sink to be configured before building")]
    MissingWorld,

    #[error("runtime requires a player directory to be configured before building")]
    MissingPlayers,

    #[error("no script named `{name}` is loaded")]
    UnknownScript { name: String },
}
