use crate::{
    config::ReorderStrategy,
    domain::{Board, BoardId, ColumnId, JobId},
    engine::{apply::apply_move, resolver::MoveDescriptor},
    error::{JobTrackError, Result},
    storage::BoardService,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use tracing::debug;

/// In-process board service
///
/// Holds the canonical board in a watch channel: every accepted change is
/// published to all feed subscribers, and writes are serialised by the
/// channel's lock.
pub struct InMemoryBoardService {
    board: watch::Sender<Board>,
    move_calls: AtomicUsize,
    pending_conflicts: AtomicUsize,
}

impl InMemoryBoardService {
    pub fn new(board: Board) -> Self {
        let (board, _) = watch::channel(board);
        Self {
            board,
            move_calls: AtomicUsize::new(0),
            pending_conflicts: AtomicUsize::new(0),
        }
    }

    /// Current canonical board
    pub fn board(&self) -> Board {
        self.board.borrow().clone()
    }

    pub fn board_id(&self) -> BoardId {
        self.board.borrow().id
    }

    /// Number of `move_job` requests received so far
    pub fn move_calls(&self) -> usize {
        self.move_calls.load(Ordering::SeqCst)
    }

    /// Makes the next `move_job` request fail with `Conflict`
    pub fn inject_conflict(&self) {
        self.pending_conflicts.fetch_add(1, Ordering::SeqCst);
    }

    /// Creates a card at the end of `column_id`
    pub fn create_job(
        &self,
        column_id: &ColumnId,
        company: impl Into<String>,
        position: impl Into<String>,
    ) -> Result<JobId> {
        let mut created = None;
        self.update(|board| {
            created = Some(board.add_job(column_id, company, position)?);
            Ok(true)
        })?;
        created.ok_or_else(|| JobTrackError::StorageError("job was not created".to_string()))
    }

    pub fn delete_job(&self, job_id: &JobId) -> Result<()> {
        self.update(|board| board.remove_job(job_id).map(|_| true))
    }

    pub fn delete_column(&self, column_id: &ColumnId) -> Result<()> {
        self.update(|board| board.remove_column(column_id).map(|_| true))
    }

    /// Replaces the whole board, as an external edit would
    pub fn replace_board(&self, board: Board) {
        self.board.send_replace(board);
    }

    /// Runs `change` on a copy of the board and publishes it if the change
    /// succeeded and reported a modification
    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Board) -> Result<bool>,
    {
        let mut outcome = Ok(());
        self.board.send_if_modified(|board| {
            let mut next = board.clone();
            match change(&mut next) {
                Ok(true) => {
                    *board = next;
                    true
                }
                Ok(false) => false,
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        outcome
    }
}

#[async_trait]
impl BoardService for InMemoryBoardService {
    async fn subscribe_board(&self, board_id: &BoardId) -> Result<BoxStream<'static, Board>> {
        if &self.board_id() != board_id {
            return Err(JobTrackError::BoardNotFound(board_id.to_string()));
        }

        let rx = self.board.subscribe();
        let feed = stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first {
                rx.changed().await.ok()?;
            }
            let board = rx.borrow_and_update().clone();
            Some((board, (rx, false)))
        });
        Ok(feed.boxed())
    }

    async fn move_job(
        &self,
        job_id: &JobId,
        target_column_id: &ColumnId,
        target_index: usize,
    ) -> Result<()> {
        self.move_calls.fetch_add(1, Ordering::SeqCst);

        let conflicted = self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if conflicted {
            return Err(JobTrackError::Conflict(format!(
                "job {} was modified concurrently",
                job_id
            )));
        }

        let descriptor = MoveDescriptor::new(*job_id, *target_column_id, target_index);
        self.update(|board| {
            let next = apply_move(board, &descriptor, ReorderStrategy::Reindex)?;
            if next == *board {
                debug!(job = %job_id, "Move already satisfied");
                return Ok(false);
            }
            *board = next;
            Ok(true)
        })
    }
}
