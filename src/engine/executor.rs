use crate::config::{EngineConfig, ReconcileStrategy, ReorderStrategy};
use crate::domain::{ColumnId, JobId};
use crate::engine::apply::apply_move;
use crate::engine::resolver::MoveDescriptor;
use crate::engine::state::BoardState;
use crate::error::Result;
use crate::storage::BoardService;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies resolved moves: local view first (when optimistic), then one
/// persistence request
pub struct MoveExecutor<S: BoardService + ?Sized> {
    service: Arc<S>,
    state: Arc<BoardState>,
    reorder: ReorderStrategy,
    reconcile: ReconcileStrategy,
}

impl<S: BoardService + ?Sized> MoveExecutor<S> {
    pub fn new(service: Arc<S>, state: Arc<BoardState>, config: &EngineConfig) -> Self {
        Self {
            service,
            state,
            reorder: config.reorder,
            reconcile: config.reconcile,
        }
    }

    pub fn state(&self) -> &Arc<BoardState> {
        &self.state
    }

    /// Moves `job_id` to `target_index` (clamped) in `target_column_id`
    pub async fn move_job(
        &self,
        job_id: JobId,
        target_column_id: ColumnId,
        target_index: usize,
    ) -> Result<()> {
        self.execute(MoveDescriptor::new(job_id, target_column_id, target_index))
            .await
    }

    /// Runs a resolved move: `stage` followed by `commit`
    pub async fn execute(&self, descriptor: MoveDescriptor) -> Result<()> {
        self.stage(&descriptor);
        self.commit(descriptor).await
    }

    /// Shows the locally applied move as the rendered board
    ///
    /// Only acts under `ReconcileStrategy::Optimistic`. Never talks to the
    /// service.
    pub fn stage(&self, descriptor: &MoveDescriptor) {
        if self.reconcile != ReconcileStrategy::Optimistic {
            return;
        }
        let current = self.state.rendered();
        match apply_move(&current, descriptor, self.reorder) {
            Ok(next) if next == *current => {
                debug!(job = %descriptor.job_id, "Move leaves board unchanged")
            }
            Ok(next) => self.state.stage(*descriptor, next),
            // The service has the final word on stale references
            Err(e) => debug!(job = %descriptor.job_id, "Skipping optimistic update: {}", e),
        }
    }

    /// Sends the single `BoardService::move_job` request for `descriptor`
    ///
    /// If it fails, the rendered board returns to the last canonical
    /// snapshot and the error is handed back to the caller.
    pub async fn commit(&self, descriptor: MoveDescriptor) -> Result<()> {
        let result = self
            .service
            .move_job(
                &descriptor.job_id,
                &descriptor.target_column_id,
                descriptor.target_index,
            )
            .await;

        match result {
            Ok(()) => {
                info!(
                    job = %descriptor.job_id,
                    column = %descriptor.target_column_id,
                    index = descriptor.target_index,
                    "Move persisted"
                );
                Ok(())
            }
            Err(e) => {
                warn!(job = %descriptor.job_id, "Move rejected, rolling back: {}", e);
                self.state.rollback();
                Err(e)
            }
        }
    }
}

impl<S: BoardService + ?Sized> Clone for MoveExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            state: self.state.clone(),
            reorder: self.reorder,
            reconcile: self.reconcile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{sorted_jobs, Board};
    use crate::error::JobTrackError;
    use crate::storage::InMemoryBoardService;

    fn setup(config: EngineConfig) -> (Arc<InMemoryBoardService>, MoveExecutor<InMemoryBoardService>, Board) {
        let mut board = Board::default();
        let col = board.columns[0].id;
        for i in 0..3 {
            board.add_job(&col, format!("Company {}", i), "Role").unwrap();
        }
        let service = Arc::new(InMemoryBoardService::new(board.clone()));
        let state = Arc::new(BoardState::new(board.clone()));
        let executor = MoveExecutor::new(service.clone(), state, &config);
        (service, executor, board)
    }

    #[tokio::test]
    async fn test_optimistic_move_is_staged() {
        let (service, executor, board) = setup(EngineConfig::default());
        let job = board.columns[0].jobs[0].id;
        let target = board.columns[1].id;

        executor.move_job(job, target, 0).await.unwrap();

        let snapshot = executor.state().snapshot();
        assert!(snapshot.is_pending());
        assert!(snapshot.rendered.column(&target).unwrap().contains(&job));
        assert!(!snapshot.canonical.column(&target).unwrap().contains(&job));
        assert_eq!(service.move_calls(), 1);
        assert!(service.board().column(&target).unwrap().contains(&job));
    }

    #[tokio::test]
    async fn test_await_confirmation_does_not_stage() {
        let (service, executor, board) = setup(EngineConfig::strict());
        let job = board.columns[0].jobs[0].id;
        let target = board.columns[1].id;

        executor.move_job(job, target, 0).await.unwrap();

        let snapshot = executor.state().snapshot();
        assert!(!snapshot.is_pending());
        assert_eq!(*snapshot.rendered, board);
        assert_eq!(service.move_calls(), 1);
    }

    #[tokio::test]
    async fn test_not_found_rolls_back() {
        let (service, executor, board) = setup(EngineConfig::default());
        let job = board.columns[0].jobs[0].id;
        let target = board.columns[1].id;
        service.delete_column(&target).unwrap();

        let result = executor.move_job(job, target, 0).await;

        assert!(matches!(result, Err(JobTrackError::ColumnNotFound(_))));
        assert_eq!(*executor.state().rendered(), board);
        assert!(!executor.state().snapshot().is_pending());
        assert_eq!(service.move_calls(), 1);
    }

    #[tokio::test]
    async fn test_conflict_rolls_back() {
        let (service, executor, board) = setup(EngineConfig::default());
        let job = board.columns[0].jobs[2].id;
        let target = board.columns[0].id;
        service.inject_conflict();

        let result = executor.move_job(job, target, 0).await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(*executor.state().rendered(), board);
        // Canonical board on the service side is untouched
        assert_eq!(service.board(), board);
    }

    #[tokio::test]
    async fn test_stale_local_view_still_calls_service() {
        let (service, executor, board) = setup(EngineConfig::default());
        let ghost = JobId::new();

        let result = executor.move_job(ghost, board.columns[1].id, 0).await;

        assert!(matches!(result, Err(JobTrackError::JobNotFound(_))));
        assert_eq!(service.move_calls(), 1);
        assert_eq!(*executor.state().rendered(), board);
    }

    #[tokio::test]
    async fn test_stage_does_not_call_service() {
        let (service, executor, board) = setup(EngineConfig::default());
        let job = board.columns[0].jobs[0].id;
        let target = board.columns[1].id;
        let descriptor = MoveDescriptor::new(job, target, 0);

        executor.stage(&descriptor);
        assert!(executor.state().rendered().column(&target).unwrap().contains(&job));
        assert_eq!(service.move_calls(), 0);

        executor.clone().commit(descriptor).await.unwrap();
        assert_eq!(service.move_calls(), 1);
    }

    #[tokio::test]
    async fn test_self_move_is_idempotent() {
        let (service, executor, board) = setup(EngineConfig::default());
        let col = board.columns[0].id;
        let job = sorted_jobs(&board.columns[0].jobs)[1].id;

        executor.move_job(job, col, 1).await.unwrap();

        assert_eq!(*executor.state().rendered(), board);
        assert_eq!(service.board(), board);
        assert_eq!(service.move_calls(), 1);
    }
}
