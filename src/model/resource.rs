use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ResourceId = Uuid;

/// A row on the timeline (a person, machine, project...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    /// Display colour as a CSS-style hex string (`#4285f4`).
    #[serde(default)]
    pub colour: Option<String>,
    /// Explicit planned range; overrides the span derived from events.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            colour: None,
            start_date: None,
            due_date: None,
        }
    }

    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = Some(colour.into());
        self
    }

    /// The explicit planned range, if both ends are set.
    pub fn planned_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.due_date) {
            (Some(start), Some(due)) => Some((start, due)),
            _ => None,
        }
    }
}
