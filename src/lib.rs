//! # Jobtrack Core
//!
//! Board reordering engine for a Kanban-style job application tracker.
//!
//! This crate interprets drag-and-drop gestures on a board of pipeline
//! columns, computes where a card lands, keeps order values consistent, and
//! reconciles optimistic local moves with the canonical board pushed by a
//! live feed. Rendering and the storage backend stay outside; the backend is
//! reached through the [`BoardService`] trait.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use config::{ColumnDropPolicy, EngineConfig, ReconcileStrategy, ReorderStrategy};
pub use domain::{
    board::{Board, BoardId, Column, ColumnId},
    job::{JobApplication, JobId, Order},
};
pub use engine::{
    BoardBinding, BoardState, BoardView, DragEnd, DragOutcome, DropResolution, DropTarget,
    MoveDescriptor, MoveExecutor, PendingMove,
};
pub use error::{JobTrackError, Result};
pub use storage::{BoardService, InMemoryBoardService};
