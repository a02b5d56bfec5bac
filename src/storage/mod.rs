use crate::{
    domain::{Board, BoardId, ColumnId, JobId},
    error::Result,
};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub mod memory_storage;

pub use memory_storage::InMemoryBoardService;

/// Persistence and live-feed collaborator for a board
#[async_trait]
pub trait BoardService: Send + Sync {
    /// Streams canonical snapshots of the board
    ///
    /// The first item is the current board; a new snapshot follows every
    /// change to any column or card. The stream never ends on its own.
    async fn subscribe_board(&self, board_id: &BoardId) -> Result<BoxStream<'static, Board>>;

    /// Persists a move of `job_id` to `target_index` in `target_column_id`
    ///
    /// Fails with `JobNotFound`/`ColumnNotFound` for stale references and
    /// `Conflict` for concurrent modification. Moving a card to where it
    /// already is succeeds without changing anything.
    async fn move_job(
        &self,
        job_id: &JobId,
        target_column_id: &ColumnId,
        target_index: usize,
    ) -> Result<()>;
}
