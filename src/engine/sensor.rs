use crate::domain::JobId;
use serde::{Deserialize, Serialize};

/// Pointer position in board coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Turns raw pointer input into drag start/end
///
/// A press on a card only becomes a drag once the pointer has travelled
/// `activation_distance` from where it went down, so plain clicks on a card
/// (menus, links) never start a drag.
#[derive(Debug, Clone)]
pub struct PointerSensor {
    activation_distance: f64,
    pressed: Option<(JobId, Point)>,
    active: Option<JobId>,
}

impl PointerSensor {
    pub fn new(activation_distance: f64) -> Self {
        Self {
            activation_distance,
            pressed: None,
            active: None,
        }
    }

    /// Pointer went down on a card
    pub fn press(&mut self, job_id: JobId, at: Point) {
        self.pressed = Some((job_id, at));
        self.active = None;
    }

    /// Pointer moved; returns the card once, at the moment the drag activates
    pub fn movement(&mut self, at: Point) -> Option<JobId> {
        if self.active.is_some() {
            return None;
        }
        let (job_id, origin) = self.pressed?;
        if origin.distance_to(&at) >= self.activation_distance {
            self.active = Some(job_id);
            return Some(job_id);
        }
        None
    }

    /// Pointer released; returns the card if a drag was in progress
    pub fn release(&mut self) -> Option<JobId> {
        self.pressed = None;
        self.active.take()
    }

    pub fn cancel(&mut self) {
        self.pressed = None;
        self.active = None;
    }

    pub fn active(&self) -> Option<JobId> {
        self.active
    }
}
