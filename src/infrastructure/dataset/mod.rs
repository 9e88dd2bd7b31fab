pub mod loader;

pub use loader::{DatasetFilter, DatasetLoader};
