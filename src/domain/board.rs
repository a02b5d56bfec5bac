use crate::domain::job::{JobApplication, JobId, Order};
use crate::error::{JobTrackError, Result};
use serde::{Deserialize, Serialize};

uuid_id!(
    /// Unique identifier for a pipeline column
    ColumnId,
    "column id"
);

uuid_id!(
    /// Unique identifier for a board
    BoardId,
    "board id"
);

/// Pipeline stages a fresh board starts with
pub const DEFAULT_COLUMNS: [&str; 5] = ["Wish List", "Applied", "Interviewing", "Offer", "Rejected"];

/// A pipeline stage holding job application cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub order: Order,
    #[serde(default)]
    pub jobs: Vec<JobApplication>,
}

impl Column {
    pub fn new(name: impl Into<String>, order: Order) -> Self {
        Self {
            id: ColumnId::new(),
            name: name.into(),
            order,
            jobs: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, job_id: &JobId) -> bool {
        self.jobs.iter().any(|job| &job.id == job_id)
    }

    pub fn job(&self, job_id: &JobId) -> Option<&JobApplication> {
        self.jobs.iter().find(|job| &job.id == job_id)
    }

    /// Order value that places a new card after every existing one
    pub fn next_order(&self) -> Order {
        self.jobs
            .iter()
            .map(|job| job.order)
            .max()
            .map(Order::after)
            .unwrap_or(Order::ZERO)
    }
}

/// A job search board: an ordered set of pipeline columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Board {
    /// Creates a board with no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Creates a board with the standard job search pipeline
    pub fn with_default_columns(name: impl Into<String>) -> Self {
        let mut board = Self::new(name);
        for column in DEFAULT_COLUMNS {
            board.add_column(column);
        }
        board
    }

    /// Appends a column after the existing ones
    pub fn add_column(&mut self, name: impl Into<String>) -> ColumnId {
        let order = self
            .columns
            .iter()
            .map(|col| col.order)
            .max()
            .map(Order::after)
            .unwrap_or(Order::ZERO);
        let column = Column::new(name, order);
        let id = column.id;
        self.columns.push(column);
        id
    }

    /// Removes a column together with its cards
    pub fn remove_column(&mut self, column_id: &ColumnId) -> Result<Column> {
        let pos = self
            .columns
            .iter()
            .position(|col| &col.id == column_id)
            .ok_or_else(|| JobTrackError::ColumnNotFound(column_id.to_string()))?;
        Ok(self.columns.remove(pos))
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|col| &col.id == column_id)
    }

    /// Finds a card and the column holding it by scanning every column
    pub fn find_job(&self, job_id: &JobId) -> Option<(&Column, &JobApplication)> {
        self.columns
            .iter()
            .find_map(|col| col.job(job_id).map(|job| (col, job)))
    }

    pub fn job_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Creates a card at the end of `column_id`
    pub fn add_job(
        &mut self,
        column_id: &ColumnId,
        company: impl Into<String>,
        position: impl Into<String>,
    ) -> Result<JobId> {
        let column = self
            .column_mut(column_id)
            .ok_or_else(|| JobTrackError::ColumnNotFound(column_id.to_string()))?;
        let job = JobApplication::new(column.id, column.next_order(), company, position);
        let id = job.id;
        column.jobs.push(job);
        Ok(id)
    }

    /// Deletes a card. Remaining order values keep their gaps.
    pub fn remove_job(&mut self, job_id: &JobId) -> Result<JobApplication> {
        for column in &mut self.columns {
            if let Some(pos) = column.jobs.iter().position(|job| &job.id == job_id) {
                return Ok(column.jobs.remove(pos));
            }
        }
        Err(JobTrackError::JobNotFound(job_id.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::with_default_columns("Job Search")
    }
}
