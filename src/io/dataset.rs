//! Loading caller-supplied resources and events from JSON.
//!
//! Dates are `YYYY-MM-DD` strings; a malformed date fails the whole load.

use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{parse_date, Event, Resource};

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    resources: Vec<RawResource>,
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResource {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    name: String,
    #[serde(default)]
    colour: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    resource_id: Uuid,
    #[serde(default)]
    name: String,
    start_date: String,
    end_date: String,
}

/// Resources and events ready to hand to a timeline.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub resources: Vec<Resource>,
    pub events: Vec<Event>,
}

fn optional_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    value.map(parse_date).transpose()
}

/// Parse a dataset from a JSON string.
pub fn parse_dataset(json: &str) -> Result<Dataset> {
    let raw: RawDataset = serde_json::from_str(json)?;

    let resources = raw
        .resources
        .into_iter()
        .map(|r| {
            Ok(Resource {
                id: r.id,
                name: r.name,
                colour: r.colour,
                start_date: optional_date(r.start_date.as_deref())?,
                due_date: optional_date(r.due_date.as_deref())?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let events = raw
        .events
        .into_iter()
        .map(|e| {
            let mut event = Event::parse(e.resource_id, e.name, &e.start_date, &e.end_date)?;
            event.id = e.id;
            Ok(event)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset { resources, events })
}

/// Load a dataset from a JSON file.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let json = std::fs::read_to_string(path)?;
    let dataset = parse_dataset(&json)?;
    log::info!(
        "loaded {} resources and {} events from {}",
        dataset.resources.len(),
        dataset.events.len(),
        path.display()
    );
    Ok(dataset)
}
