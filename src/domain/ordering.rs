use crate::domain::board::{Board, Column, ColumnId};
use crate::domain::job::{JobApplication, JobId};
use crate::error::{JobTrackError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Display order of two cards in the same column
///
/// Ascending by order value. Equal order values fall back to creation time
/// and then identity, so a re-render never swaps untouched cards.
pub fn compare_jobs(a: &JobApplication, b: &JobApplication) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Display order of two columns on a board
pub fn compare_columns(a: &Column, b: &Column) -> Ordering {
    a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id))
}

/// Sorts cards in-place into display order
///
/// # Examples
/// ```
/// use jobtrack_core::domain::{sort_jobs, ColumnId, JobApplication, Order};
///
/// let column = ColumnId::new();
/// let mut jobs = vec![
///     JobApplication::new(column, Order::new(2.0), "C", "Role"),
///     JobApplication::new(column, Order::new(0.0), "A", "Role"),
///     JobApplication::new(column, Order::new(1.0), "B", "Role"),
/// ];
///
/// sort_jobs(&mut jobs);
/// assert_eq!(jobs[0].company, "A");
/// ```
pub fn sort_jobs(jobs: &mut [JobApplication]) {
    jobs.sort_by(compare_jobs);
}

/// Returns a freshly sorted copy, leaving the source untouched
pub fn sorted_jobs(jobs: &[JobApplication]) -> Vec<JobApplication> {
    let mut sorted = jobs.to_vec();
    sort_jobs(&mut sorted);
    sorted
}

pub fn sort_columns(columns: &mut [Column]) {
    columns.sort_by(compare_columns);
}

pub fn sorted_columns(columns: &[Column]) -> Vec<Column> {
    let mut sorted = columns.to_vec();
    sort_columns(&mut sorted);
    sorted
}

/// Checks the board invariants, reporting the first violation found
///
/// A board is valid when:
/// - column order values are unique
/// - each column's card order values are unique within that column
/// - every card references an existing column, and it is the column holding it
/// - no card appears in more than one column
pub fn validate(board: &Board) -> Result<()> {
    let mut column_orders: Vec<_> = board.columns.iter().map(|col| col.order).collect();
    column_orders.sort();
    if column_orders.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(JobTrackError::InvalidBoard(
            "duplicate column order values".to_string(),
        ));
    }

    let mut seen: HashMap<JobId, ColumnId> = HashMap::new();
    for column in &board.columns {
        let mut orders: Vec<_> = column.jobs.iter().map(|job| job.order).collect();
        orders.sort();
        if let Some(pair) = orders.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(JobTrackError::InvalidBoard(format!(
                "column '{}' has duplicate order value {}",
                column.name, pair[0]
            )));
        }

        for job in &column.jobs {
            if board.column(&job.column_id).is_none() {
                return Err(JobTrackError::InvalidBoard(format!(
                    "job {} references missing column {}",
                    job.id, job.column_id
                )));
            }
            if job.column_id != column.id {
                return Err(JobTrackError::InvalidBoard(format!(
                    "job {} is held by column {} but references column {}",
                    job.id, column.id, job.column_id
                )));
            }
            if let Some(other) = seen.insert(job.id, column.id) {
                return Err(JobTrackError::InvalidBoard(format!(
                    "job {} appears in columns {} and {}",
                    job.id, other, column.id
                )));
            }
        }
    }

    Ok(())
}

pub fn is_valid(board: &Board) -> bool {
    validate(board).is_ok()
}

/// Lookup tables built once per snapshot so a move does not rescan every column
#[derive(Debug, Clone, Default)]
pub struct BoardIndex {
    job_columns: HashMap<JobId, ColumnId>,
    column_slots: HashMap<ColumnId, usize>,
}

impl BoardIndex {
    pub fn build(board: &Board) -> Self {
        let mut index = Self::default();
        for (slot, column) in board.columns.iter().enumerate() {
            index.column_slots.insert(column.id, slot);
            for job in &column.jobs {
                // Keyed by the column actually holding the card, not its stored reference
                index.job_columns.insert(job.id, column.id);
            }
        }
        index
    }

    /// The column currently holding `job_id`
    pub fn column_of(&self, job_id: &JobId) -> Option<ColumnId> {
        self.job_columns.get(job_id).copied()
    }

    /// Position of `column_id` within `board.columns`
    pub fn column_slot(&self, column_id: &ColumnId) -> Option<usize> {
        self.column_slots.get(column_id).copied()
    }

    pub fn column<'a>(&self, board: &'a Board, column_id: &ColumnId) -> Option<&'a Column> {
        self.column_slot(column_id)
            .and_then(|slot| board.columns.get(slot))
    }

    pub fn job<'a>(&self, board: &'a Board, job_id: &JobId) -> Option<&'a JobApplication> {
        let column_id = self.column_of(job_id)?;
        self.column(board, &column_id)?.job(job_id)
    }

    pub fn len(&self) -> usize {
        self.job_columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.job_columns.is_empty()
    }
}
