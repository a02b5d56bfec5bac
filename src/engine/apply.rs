use crate::config::ReorderStrategy;
use crate::domain::{sorted_jobs, Board, BoardIndex, JobApplication, Order};
use crate::engine::resolver::MoveDescriptor;
use crate::error::{JobTrackError, Result};
use tracing::debug;

/// Applies a resolved move to a copy of `board`
///
/// The card leaves its source column and is inserted at `target_index`
/// (clamped to the number of cards already in the target column) as one
/// step; the input board is never modified, so no observer can see the card
/// in two columns or in none. A move to the card's current slot returns an
/// identical board.
pub fn apply_move(
    board: &Board,
    descriptor: &MoveDescriptor,
    strategy: ReorderStrategy,
) -> Result<Board> {
    let index = BoardIndex::build(board);
    let job_id = descriptor.job_id;
    let target_id = descriptor.target_column_id;

    let source_id = index
        .column_of(&job_id)
        .ok_or_else(|| JobTrackError::JobNotFound(job_id.to_string()))?;
    let source_slot = index
        .column_slot(&source_id)
        .ok_or_else(|| JobTrackError::ColumnNotFound(source_id.to_string()))?;
    let target_slot = index
        .column_slot(&target_id)
        .ok_or_else(|| JobTrackError::ColumnNotFound(target_id.to_string()))?;

    let mut remaining = sorted_jobs(&board.columns[source_slot].jobs);
    let current_index = remaining
        .iter()
        .position(|job| job.id == job_id)
        .ok_or_else(|| JobTrackError::JobNotFound(job_id.to_string()))?;
    let mut job = remaining.remove(current_index);

    let same_column = source_id == target_id;
    let mut siblings = if same_column {
        std::mem::take(&mut remaining)
    } else {
        sorted_jobs(&board.columns[target_slot].jobs)
    };
    let insert_at = descriptor.target_index.min(siblings.len());

    if same_column && insert_at == current_index {
        debug!(job = %job_id, index = insert_at, "Move leaves card in place");
        return Ok(board.clone());
    }

    let slotted = match strategy {
        ReorderStrategy::Fractional => fractional_order(&siblings, insert_at),
        ReorderStrategy::Reindex => None,
    };
    job.relocate(target_id, slotted.unwrap_or(Order::from_index(insert_at)));
    siblings.insert(insert_at, job);
    if slotted.is_none() {
        reindex(&mut siblings);
    }

    let mut next = board.clone();
    next.columns[target_slot].jobs = siblings;
    if !same_column {
        if strategy == ReorderStrategy::Reindex {
            reindex(&mut remaining);
        }
        next.columns[source_slot].jobs = remaining;
    }

    debug!(
        job = %job_id,
        from = %source_id,
        to = %target_id,
        index = insert_at,
        "Applied move"
    );
    Ok(next)
}

/// Renumbers cards 0, 1, 2, ... in their current sequence
fn reindex(jobs: &mut [JobApplication]) {
    for (i, job) in jobs.iter_mut().enumerate() {
        job.order = Order::from_index(i);
    }
}

/// Order value for a card inserted at `index` among `siblings`, if one fits
fn fractional_order(siblings: &[JobApplication], index: usize) -> Option<Order> {
    let prev = index
        .checked_sub(1)
        .and_then(|i| siblings.get(i))
        .map(|job| job.order);
    let next = siblings.get(index).map(|job| job.order);

    match (prev, next) {
        (None, None) => Some(Order::ZERO),
        (Some(prev), None) => Some(prev.after()).filter(|order| *order > prev),
        (None, Some(next)) => Some(next.before()).filter(|order| *order < next),
        (Some(prev), Some(next)) => Order::between(prev, next),
    }
}
