//! Resource scheduling timeline with an endless horizontal scroll.
//!
//! The [`timeline`] module holds the UI-independent engine: the sliding
//! month window, overlap stacking, layout geometry, scroll compensation and
//! pointer mapping. [`ui`] and [`app`] draw it with egui.

pub mod app;
pub mod error;
pub mod io;
pub mod model;
pub mod settings;
pub mod timeline;
pub mod ui;

pub use error::{Result, TimelineError};
pub use model::{Event, EventId, Resource, ResourceId, TextDirection, TimelineConfig, WeekendRule};
pub use timeline::{Layout, Timeline};
