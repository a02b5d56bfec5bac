//! Board view binding
//!
//! Derives render-ready, sorted column lists from the current board and
//! drives the drag lifecycle: sensor -> resolver -> executor. Rendering
//! itself lives elsewhere; this is the contract a UI layer calls into.

use crate::config::{ColumnDropPolicy, EngineConfig};
use crate::domain::ordering::compare_columns;
use crate::domain::{sorted_jobs, Board, BoardId, ColumnId, JobApplication, JobId, Order};
use crate::engine::executor::MoveExecutor;
use crate::engine::resolver::{resolve_drop, CancelReason, DropResolution, DropTarget, MoveDescriptor};
use crate::engine::sensor::{Point, PointerSensor};
use crate::engine::state::BoardState;
use crate::error::{JobTrackError, Result};
use crate::storage::BoardService;
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One column as it should be rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnView {
    pub id: ColumnId,
    pub name: String,
    pub order: Order,
    pub jobs: Vec<JobApplication>,
}

/// The whole board as it should be rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub board_id: BoardId,
    pub name: String,
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    pub fn column(&self, column_id: &ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|col| &col.id == column_id)
    }

    /// Column and display index of a card
    pub fn position_of(&self, job_id: &JobId) -> Option<(ColumnId, usize)> {
        self.columns.iter().find_map(|col| {
            col.jobs
                .iter()
                .position(|job| &job.id == job_id)
                .map(|index| (col.id, index))
        })
    }
}

/// Builds sorted per-column card lists without touching `board`
pub fn derive_view(board: &Board) -> BoardView {
    let mut columns: Vec<_> = board.columns.iter().collect();
    columns.sort_by(|a, b| compare_columns(a, b));

    BoardView {
        board_id: board.id,
        name: board.name.clone(),
        columns: columns
            .into_iter()
            .map(|col| ColumnView {
                id: col.id,
                name: col.name.clone(),
                order: col.order,
                jobs: sorted_jobs(&col.jobs),
            })
            .collect(),
    }
}

/// How a drag gesture ended
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No move was attempted
    Cancelled(CancelReason),
    /// The move was persisted
    Moved(MoveDescriptor),
    /// The service rejected the move; the view was rolled back
    Rejected {
        descriptor: MoveDescriptor,
        warning: String,
    },
}

/// A resolved drop whose persistence request has not been sent yet
///
/// Owns its own handles on the service and the board state, so it can be
/// awaited or spawned while the binding keeps handling new gestures.
#[must_use = "the move is not persisted until it is committed"]
pub struct PendingMove<S: BoardService + ?Sized> {
    executor: MoveExecutor<S>,
    descriptor: MoveDescriptor,
}

impl<S: BoardService + ?Sized> PendingMove<S> {
    pub fn descriptor(&self) -> MoveDescriptor {
        self.descriptor
    }

    /// Issues the move's single service request
    pub async fn commit(self) -> DragOutcome {
        let descriptor = self.descriptor;
        match self.executor.commit(descriptor).await {
            Ok(()) => DragOutcome::Moved(descriptor),
            Err(e) => {
                warn!(job = %descriptor.job_id, "Move could not be applied: {}", e);
                DragOutcome::Rejected {
                    descriptor,
                    warning: e.to_string(),
                }
            }
        }
    }
}

/// Result of releasing a drag, before any persistence happens
#[must_use = "a resolved drop is not persisted until it is committed"]
pub enum DragEnd<S: BoardService + ?Sized> {
    Cancelled(CancelReason),
    Resolved(PendingMove<S>),
}

impl<S: BoardService + ?Sized> DragEnd<S> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DragEnd::Cancelled(_))
    }

    /// Commits a resolved drop, or reports why there was nothing to commit
    pub async fn finish(self) -> DragOutcome {
        match self {
            DragEnd::Cancelled(reason) => DragOutcome::Cancelled(reason),
            DragEnd::Resolved(pending) => pending.commit().await,
        }
    }
}

/// Drag lifecycle and view derivation for one board session
pub struct BoardBinding<S: BoardService + ?Sized> {
    executor: MoveExecutor<S>,
    sensor: PointerSensor,
    column_drop: ColumnDropPolicy,
    active: Option<JobId>,
}

impl<S: BoardService + ?Sized> BoardBinding<S> {
    pub fn new(service: Arc<S>, state: Arc<BoardState>, config: &EngineConfig) -> Self {
        Self {
            executor: MoveExecutor::new(service, state, config),
            sensor: PointerSensor::new(config.activation_distance),
            column_drop: config.column_drop,
            active: None,
        }
    }

    pub fn state(&self) -> &Arc<BoardState> {
        self.executor.state()
    }

    pub fn executor(&self) -> &MoveExecutor<S> {
        &self.executor
    }

    /// Sorted view of the board as currently rendered
    pub fn view(&self) -> BoardView {
        derive_view(&self.state().rendered())
    }

    pub fn active(&self) -> Option<JobId> {
        self.active
    }

    /// The card under drag, for drawing an overlay
    pub fn active_job(&self) -> Option<JobApplication> {
        let id = self.active?;
        self.state()
            .rendered()
            .find_job(&id)
            .map(|(_, job)| job.clone())
    }

    pub fn drag_start(&mut self, job_id: JobId) {
        debug!(job = %job_id, "Drag started");
        self.active = Some(job_id);
    }

    pub fn drag_cancel(&mut self) {
        self.sensor.cancel();
        self.active = None;
    }

    /// Ends the current drag over `over`
    ///
    /// Resolution and the optimistic update happen here, synchronously. The
    /// returned `DragEnd` carries the persistence request, so the next drag
    /// can start while it is in flight.
    pub fn drag_end(&mut self, over: Option<DropTarget>) -> DragEnd<S> {
        let Some(job_id) = self.active.take() else {
            return DragEnd::Cancelled(CancelReason::NoActiveDrag);
        };
        let Some(target) = over else {
            debug!(job = %job_id, "Drag released outside any drop target");
            return DragEnd::Cancelled(CancelReason::NoDropTarget);
        };

        let board = self.state().rendered();
        let descriptor = match resolve_drop(&board, &job_id, &target, self.column_drop) {
            DropResolution::Move(descriptor) => descriptor,
            DropResolution::Cancelled(reason) => return DragEnd::Cancelled(reason),
        };

        self.executor.stage(&descriptor);
        DragEnd::Resolved(PendingMove {
            executor: self.executor.clone(),
            descriptor,
        })
    }

    /// Pointer went down on a card
    pub fn pointer_down(&mut self, job_id: JobId, at: Point) {
        self.sensor.press(job_id, at);
    }

    /// Pointer moved; returns true when this movement started a drag
    pub fn pointer_move(&mut self, at: Point) -> bool {
        match self.sensor.movement(at) {
            Some(job_id) => {
                self.drag_start(job_id);
                true
            }
            None => false,
        }
    }

    /// Pointer released over `over`. `None` means the press never became a drag.
    pub fn pointer_up(&mut self, over: Option<DropTarget>) -> Option<DragEnd<S>> {
        self.sensor.release()?;
        Some(self.drag_end(over))
    }
}

/// Pushes every feed snapshot into `state` until the feed ends
pub fn spawn_feed_sync(state: Arc<BoardState>, mut feed: BoxStream<'static, Board>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(board) = feed.next().await {
            debug!(board = %board.id, "Feed snapshot received");
            state.accept_canonical(board);
        }
        info!("Board feed ended");
    })
}

/// Opens a board session: waits for the first feed snapshot, then keeps the
/// state in sync in the background
pub async fn connect<S: BoardService + ?Sized + 'static>(
    service: Arc<S>,
    board_id: &BoardId,
    config: &EngineConfig,
) -> Result<(BoardBinding<S>, JoinHandle<()>)> {
    let mut feed = service.subscribe_board(board_id).await?;
    let first = feed
        .next()
        .await
        .ok_or_else(|| JobTrackError::BoardNotFound(board_id.to_string()))?;

    let state = Arc::new(BoardState::new(first));
    let sync = spawn_feed_sync(state.clone(), feed);
    info!(board = %board_id, "Board session connected");
    Ok((BoardBinding::new(service, state, config), sync))
}
