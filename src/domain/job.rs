use crate::domain::board::ColumnId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

uuid_id!(
    /// Unique identifier for a job application card
    JobId,
    "job id"
);

/// Position key of a card among its siblings (or of a column among columns).
///
/// Values only need to be totally ordered, not contiguous, so a card can be
/// slotted between two neighbours without renumbering the rest of the column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Order(f64);

impl Order {
    pub const ZERO: Order = Order(0.0);

    pub fn new(value: f64) -> Self {
        // -0.0 and 0.0 compare unequal under total_cmp
        Self(value + 0.0)
    }

    /// Order value for a contiguous 0-based position
    pub fn from_index(index: usize) -> Self {
        Self(index as f64)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The next whole slot after this one
    pub fn after(self) -> Self {
        Self::new((self.0 + 1.0).floor())
    }

    /// The previous whole slot before this one
    pub fn before(self) -> Self {
        Self::new((self.0 - 1.0).ceil())
    }

    /// Midpoint strictly between `low` and `high`, if the float space allows one
    pub fn between(low: Order, high: Order) -> Option<Self> {
        let mid = low.0 + (high.0 - low.0) / 2.0;
        if mid > low.0 && mid < high.0 {
            Some(Self::new(mid))
        } else {
            None
        }
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Order {}

impl PartialOrd for Order {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Order {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Order {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Order> for f64 {
    fn from(order: Order) -> Self {
        order.0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job application card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: JobId,
    pub column_id: ColumnId,
    pub order: Order,
    pub company: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    /// Creates a card bound to `column_id` at `order`
    pub fn new(
        column_id: ColumnId,
        order: Order,
        company: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            column_id,
            order,
            company: company.into(),
            position: position.into(),
            location: None,
            salary: None,
            job_url: None,
            notes: None,
            applied_date: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds a tag, ignoring duplicates
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.updated_at = Utc::now();
        }
    }

    /// Reassigns the card's column and position. Only a move may call this.
    pub(crate) fn relocate(&mut self, column_id: ColumnId, order: Order) {
        self.column_id = column_id;
        self.order = order;
        self.updated_at = Utc::now();
    }
}
