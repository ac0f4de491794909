pub mod browser_view_model;
pub mod property;

pub use browser_view_model::{BrowserSnapshot, BrowserViewModel, Mode};
pub use property::{DebouncedProperty, Property, PropertySubscriber};
