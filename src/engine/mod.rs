//! Board reordering engine: drop resolution, move execution and view binding

pub mod apply;
pub mod binding;
pub mod executor;
pub mod resolver;
pub mod sensor;
pub mod state;

pub use apply::apply_move;
pub use binding::{
    connect, derive_view, spawn_feed_sync, BoardBinding, BoardView, ColumnView, DragEnd, DragOutcome,
    PendingMove,
};
pub use executor::MoveExecutor;
pub use resolver::{
    resolve_drop, resolve_drop_indexed, CancelReason, DropResolution, DropTarget, MoveDescriptor,
};
pub use sensor::{Point, PointerSensor};
pub use state::{BoardState, Snapshot};
