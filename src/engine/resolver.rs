//! Drop resolution
//!
//! Turns "card X was released over element Y" into a target column and index.
//! Resolution is pure: it reads a board snapshot and never fails. A drop that
//! cannot be interpreted is a cancelled drag, not an error.

use crate::config::ColumnDropPolicy;
use crate::domain::{sorted_jobs, Board, BoardIndex, ColumnId, JobId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The element a drag was released over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DropTarget {
    /// A column's drop surface. `nearest_index` is the slot closest to the
    /// pointer when the sensor can work one out.
    Column {
        column_id: ColumnId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nearest_index: Option<usize>,
    },
    /// Another card
    Card { job_id: JobId },
}

impl DropTarget {
    pub fn column(column_id: ColumnId) -> Self {
        Self::Column {
            column_id,
            nearest_index: None,
        }
    }

    pub fn column_near(column_id: ColumnId, nearest_index: usize) -> Self {
        Self::Column {
            column_id,
            nearest_index: Some(nearest_index),
        }
    }

    pub fn card(job_id: JobId) -> Self {
        Self::Card { job_id }
    }

    /// Interprets a raw droppable element id against a snapshot
    ///
    /// Column surfaces and cards share one id space on the page, so column
    /// ids are tried first and card ids second.
    pub fn classify(board: &Board, raw_id: &str) -> Option<Self> {
        if let Ok(column_id) = ColumnId::from_str(raw_id) {
            if board.column(&column_id).is_some() {
                return Some(Self::column(column_id));
            }
        }
        let job_id = JobId::from_str(raw_id).ok()?;
        board.find_job(&job_id).map(|_| Self::card(job_id))
    }
}

/// A resolved move: where the dragged card should end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    pub job_id: JobId,
    pub target_column_id: ColumnId,
    pub target_index: usize,
}

impl MoveDescriptor {
    pub fn new(job_id: JobId, target_column_id: ColumnId, target_index: usize) -> Self {
        Self {
            job_id,
            target_column_id,
            target_index,
        }
    }
}

/// Why a drag ended without a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Released outside any drop surface
    NoDropTarget,
    /// Drag end arrived without a drag in progress
    NoActiveDrag,
    /// The dragged card is no longer on the board
    DraggedJobMissing(JobId),
    /// The column surface is no longer on the board
    ColumnMissing(ColumnId),
    /// The card dropped on is no longer on the board
    TargetCardMissing(JobId),
    /// The card dropped on references a column that is not on the board
    TargetColumnMissing(ColumnId),
    /// Dropped on its own column, which holds no other cards
    NothingToReorder,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDropTarget => write!(f, "released outside any drop target"),
            Self::NoActiveDrag => write!(f, "no drag in progress"),
            Self::DraggedJobMissing(id) => write!(f, "dragged job {} not found", id),
            Self::ColumnMissing(id) => write!(f, "column {} not found", id),
            Self::TargetCardMissing(id) => write!(f, "target job {} not found", id),
            Self::TargetColumnMissing(id) => write!(f, "target column {} not found", id),
            Self::NothingToReorder => write!(f, "nothing to reorder"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResolution {
    Move(MoveDescriptor),
    Cancelled(CancelReason),
}

impl DropResolution {
    pub fn into_move(self) -> Option<MoveDescriptor> {
        match self {
            Self::Move(descriptor) => Some(descriptor),
            Self::Cancelled(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Resolves a drop against `board`, building a fresh index
pub fn resolve_drop(
    board: &Board,
    dragged: &JobId,
    target: &DropTarget,
    policy: ColumnDropPolicy,
) -> DropResolution {
    let index = BoardIndex::build(board);
    resolve_drop_indexed(board, &index, dragged, target, policy)
}

/// Resolves a drop using an index already built for `board`
pub fn resolve_drop_indexed(
    board: &Board,
    index: &BoardIndex,
    dragged: &JobId,
    target: &DropTarget,
    policy: ColumnDropPolicy,
) -> DropResolution {
    let resolution = resolve(board, index, dragged, target, policy);
    match &resolution {
        DropResolution::Move(descriptor) => debug!(
            job = %descriptor.job_id,
            column = %descriptor.target_column_id,
            index = descriptor.target_index,
            "Resolved drop"
        ),
        DropResolution::Cancelled(reason) => {
            debug!(job = %dragged, "Drop cancelled: {}", reason)
        }
    }
    resolution
}

fn resolve(
    board: &Board,
    index: &BoardIndex,
    dragged: &JobId,
    target: &DropTarget,
    policy: ColumnDropPolicy,
) -> DropResolution {
    let Some(source_column_id) = index.column_of(dragged) else {
        return DropResolution::Cancelled(CancelReason::DraggedJobMissing(*dragged));
    };

    match *target {
        DropTarget::Column {
            column_id,
            nearest_index,
        } => {
            let Some(column) = index.column(board, &column_id) else {
                return DropResolution::Cancelled(CancelReason::ColumnMissing(column_id));
            };
            if column_id == source_column_id && column.len() == 1 {
                return DropResolution::Cancelled(CancelReason::NothingToReorder);
            }

            let target_index = match (policy, nearest_index) {
                (ColumnDropPolicy::Proximity, Some(hint)) => hint.min(column.len()),
                _ => column.len(),
            };
            DropResolution::Move(MoveDescriptor::new(*dragged, column_id, target_index))
        }
        DropTarget::Card { job_id } => {
            let Some(target_job) = index.job(board, &job_id) else {
                return DropResolution::Cancelled(CancelReason::TargetCardMissing(job_id));
            };
            let target_column_id = target_job.column_id;
            let Some(column) = index.column(board, &target_column_id) else {
                return DropResolution::Cancelled(CancelReason::TargetColumnMissing(
                    target_column_id,
                ));
            };

            let jobs = sorted_jobs(&column.jobs);
            let target_index = jobs
                .iter()
                .position(|job| job.id == job_id)
                .unwrap_or(jobs.len());
            DropResolution::Move(MoveDescriptor::new(*dragged, target_column_id, target_index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        board: Board,
        a: ColumnId,
        b: ColumnId,
        empty: ColumnId,
        a_jobs: Vec<JobId>,
        b_jobs: Vec<JobId>,
    }

    fn fixture() -> Fixture {
        let mut board = Board::default();
        let a = board.columns[0].id;
        let b = board.columns[1].id;
        let empty = board.columns[2].id;
        let a_jobs = (0..3)
            .map(|i| board.add_job(&a, format!("A{}", i), "Role").unwrap())
            .collect();
        let b_jobs = (0..3)
            .map(|i| board.add_job(&b, format!("B{}", i), "Role").unwrap())
            .collect();
        Fixture {
            board,
            a,
            b,
            empty,
            a_jobs,
            b_jobs,
        }
    }

    #[test]
    fn test_column_drop_appends() {
        let f = fixture();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::column(f.b),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution,
            DropResolution::Move(MoveDescriptor::new(f.a_jobs[0], f.b, 3))
        );
    }

    #[test]
    fn test_column_drop_on_empty_column() {
        let f = fixture();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[1],
            &DropTarget::column(f.empty),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution.into_move(),
            Some(MoveDescriptor::new(f.a_jobs[1], f.empty, 0))
        );
    }

    #[test]
    fn test_append_policy_ignores_hint() {
        let f = fixture();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::column_near(f.b, 1),
            ColumnDropPolicy::Append,
        );
        assert_eq!(resolution.into_move().unwrap().target_index, 3);
    }

    #[test]
    fn test_proximity_policy_uses_hint() {
        let f = fixture();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::column_near(f.b, 1),
            ColumnDropPolicy::Proximity,
        );
        assert_eq!(resolution.into_move().unwrap().target_index, 1);

        let clamped = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::column_near(f.b, 40),
            ColumnDropPolicy::Proximity,
        );
        assert_eq!(clamped.into_move().unwrap().target_index, 3);

        let no_hint = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::column(f.b),
            ColumnDropPolicy::Proximity,
        );
        assert_eq!(no_hint.into_move().unwrap().target_index, 3);
    }

    #[test]
    fn test_card_drop_takes_target_slot() {
        let f = fixture();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::card(f.b_jobs[1]),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution,
            DropResolution::Move(MoveDescriptor::new(f.a_jobs[0], f.b, 1))
        );
    }

    #[test]
    fn test_card_drop_uses_sorted_position() {
        let mut f = fixture();
        // Stored out of display order
        f.board.column_mut(&f.b).unwrap().jobs.reverse();

        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::card(f.b_jobs[0]),
            ColumnDropPolicy::Append,
        );
        assert_eq!(resolution.into_move().unwrap().target_index, 0);
    }

    #[test]
    fn test_drop_on_self() {
        let f = fixture();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[1],
            &DropTarget::card(f.a_jobs[1]),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution,
            DropResolution::Move(MoveDescriptor::new(f.a_jobs[1], f.a, 1))
        );
    }

    #[test]
    fn test_missing_dragged_job_cancels() {
        let f = fixture();
        let ghost = JobId::new();
        let resolution = resolve_drop(
            &f.board,
            &ghost,
            &DropTarget::column(f.b),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution,
            DropResolution::Cancelled(CancelReason::DraggedJobMissing(ghost))
        );
    }

    #[test]
    fn test_missing_column_cancels() {
        let f = fixture();
        let ghost = ColumnId::new();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::column(ghost),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution,
            DropResolution::Cancelled(CancelReason::ColumnMissing(ghost))
        );
    }

    #[test]
    fn test_target_card_with_unknown_column_cancels() {
        let mut f = fixture();
        let ghost = ColumnId::new();
        f.board.column_mut(&f.b).unwrap().jobs[2].column_id = ghost;

        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::card(f.b_jobs[2]),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution,
            DropResolution::Cancelled(CancelReason::TargetColumnMissing(ghost))
        );
    }

    #[test]
    fn test_missing_target_card_cancels() {
        let f = fixture();
        let ghost = JobId::new();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::card(ghost),
            ColumnDropPolicy::Append,
        );
        assert!(resolution.is_cancelled());
    }

    #[test]
    fn test_own_column_with_no_other_cards_cancels() {
        let mut board = Board::default();
        let col = board.columns[0].id;
        let only = board.add_job(&col, "Solo", "Role").unwrap();

        let resolution = resolve_drop(
            &board,
            &only,
            &DropTarget::column(col),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution,
            DropResolution::Cancelled(CancelReason::NothingToReorder)
        );
    }

    #[test]
    fn test_own_column_surface_with_siblings_appends() {
        let f = fixture();
        let resolution = resolve_drop(
            &f.board,
            &f.a_jobs[0],
            &DropTarget::column(f.a),
            ColumnDropPolicy::Append,
        );
        assert_eq!(
            resolution.into_move(),
            Some(MoveDescriptor::new(f.a_jobs[0], f.a, 3))
        );
    }

    #[test]
    fn test_classify_prefers_columns() {
        let f = fixture();
        assert_eq!(
            DropTarget::classify(&f.board, &f.b.to_string()),
            Some(DropTarget::column(f.b))
        );
        assert_eq!(
            DropTarget::classify(&f.board, &f.b_jobs[0].to_string()),
            Some(DropTarget::card(f.b_jobs[0]))
        );
        assert_eq!(
            DropTarget::classify(&f.board, &JobId::new().to_string()),
            None
        );
        assert_eq!(DropTarget::classify(&f.board, "sidebar"), None);
    }

    #[test]
    fn test_drop_target_serde_shape() {
        let target = DropTarget::card(JobId::new());
        let json = serde_json::to_value(target).unwrap();
        assert_eq!(json["type"], "card");

        let back: DropTarget = serde_json::from_value(json).unwrap();
        assert_eq!(back, target);
    }
}
