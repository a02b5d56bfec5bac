use crate::domain::Board;
use crate::engine::resolver::MoveDescriptor;
use crate::error::{JobTrackError, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// What readers of the board observe at one instant
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Latest board pushed by the live feed
    pub canonical: Arc<Board>,
    /// Board to render: the canonical one, or an optimistic copy while a move is pending
    pub rendered: Arc<Board>,
    pub pending: Option<MoveDescriptor>,
}

impl Snapshot {
    fn settled(board: Arc<Board>) -> Self {
        Self {
            canonical: board.clone(),
            rendered: board,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// The single owned cell holding a session's board
///
/// Writers are the live feed (`accept_canonical`) and the move executor
/// (`stage` / `rollback`). Readers take immutable snapshots or subscribe to
/// changes; they never see a half-applied move.
#[derive(Debug)]
pub struct BoardState {
    cell: watch::Sender<Snapshot>,
}

impl BoardState {
    pub fn new(board: Board) -> Self {
        let (cell, _) = watch::channel(Snapshot::settled(Arc::new(board)));
        Self { cell }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.cell.borrow().clone()
    }

    pub fn rendered(&self) -> Arc<Board> {
        self.cell.borrow().rendered.clone()
    }

    pub fn canonical(&self) -> Arc<Board> {
        self.cell.borrow().canonical.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.cell.subscribe()
    }

    /// Replaces the canonical board with a feed snapshot
    ///
    /// The feed is authoritative: any optimistic view is discarded.
    pub fn accept_canonical(&self, board: Board) {
        self.cell.send_modify(|snapshot| {
            if let Some(pending) = snapshot.pending {
                debug!(job = %pending.job_id, "Feed snapshot superseded pending move");
            }
            *snapshot = Snapshot::settled(Arc::new(board));
        });
    }

    /// Shows `board` as the result of `descriptor` until the feed catches up
    pub fn stage(&self, descriptor: MoveDescriptor, board: Board) {
        self.cell.send_modify(|snapshot| {
            snapshot.rendered = Arc::new(board);
            snapshot.pending = Some(descriptor);
        });
    }

    /// Drops any optimistic view, returning to the last canonical board
    ///
    /// Returns whether there was anything to drop.
    pub fn rollback(&self) -> bool {
        self.cell.send_if_modified(|snapshot| {
            if snapshot.pending.is_none() && Arc::ptr_eq(&snapshot.rendered, &snapshot.canonical)
            {
                return false;
            }
            *snapshot = Snapshot::settled(snapshot.canonical.clone());
            true
        })
    }

    /// Waits until a snapshot satisfies `predicate`
    pub async fn wait_for(&self, mut predicate: impl FnMut(&Snapshot) -> bool) -> Result<Snapshot> {
        let mut rx = self.cell.subscribe();
        let snapshot = rx
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|e| JobTrackError::Other(format!("board state closed: {}", e)))?;
        Ok(snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JobId;

    fn two_boards() -> (Board, Board) {
        let mut first = Board::default();
        let col = first.columns[0].id;
        first.add_job(&col, "Acme", "Engineer").unwrap();
        let mut second = first.clone();
        second.name = "Renamed".to_string();
        (first, second)
    }

    #[test]
    fn test_new_state_is_settled() {
        let (board, _) = two_boards();
        let state = BoardState::new(board.clone());
        let snapshot = state.snapshot();
        assert!(!snapshot.is_pending());
        assert_eq!(*snapshot.rendered, board);
        assert_eq!(*snapshot.canonical, board);
    }

    #[test]
    fn test_stage_and_rollback() {
        let (board, optimistic) = two_boards();
        let state = BoardState::new(board.clone());
        let descriptor = MoveDescriptor::new(JobId::new(), board.columns[1].id, 0);

        state.stage(descriptor, optimistic.clone());
        assert_eq!(*state.rendered(), optimistic);
        assert_eq!(*state.canonical(), board);
        assert_eq!(state.snapshot().pending, Some(descriptor));

        assert!(state.rollback());
        assert_eq!(*state.rendered(), board);
        assert!(!state.snapshot().is_pending());
        assert!(!state.rollback());
    }

    #[test]
    fn test_feed_supersedes_optimistic_view() {
        let (board, optimistic) = two_boards();
        let state = BoardState::new(board.clone());
        let descriptor = MoveDescriptor::new(JobId::new(), board.columns[1].id, 0);
        state.stage(descriptor, optimistic);

        let mut pushed = board.clone();
        pushed.name = "From feed".to_string();
        state.accept_canonical(pushed.clone());

        let snapshot = state.snapshot();
        assert!(!snapshot.is_pending());
        assert_eq!(*snapshot.rendered, pushed);
        assert_eq!(*snapshot.canonical, pushed);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (board, second) = two_boards();
        let state = BoardState::new(board);
        let mut rx = state.subscribe();

        state.accept_canonical(second.clone());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow().rendered, second);
    }

    #[tokio::test]
    async fn test_wait_for_returns_matching_snapshot() {
        let (board, second) = two_boards();
        let state = BoardState::new(board);
        state.accept_canonical(second);

        let snapshot = state
            .wait_for(|snapshot| snapshot.rendered.name == "Renamed")
            .await
            .unwrap();
        assert_eq!(snapshot.canonical.name, "Renamed");
    }
}
