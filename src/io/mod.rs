pub mod dataset;

pub use dataset::{load_dataset, parse_dataset, Dataset};
