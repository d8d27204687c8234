pub mod config;
pub mod event;
pub mod resource;

pub use config::{TextDirection, TimelineConfig, WeekendRule};
pub use event::{parse_date, Event, EventId, DATE_FORMAT};
pub use resource::{Resource, ResourceId};
