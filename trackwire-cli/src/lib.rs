//! Settings and wiring for the `trackwire` operator binary.

mod settings;

pub use settings::{parse_property, Settings};
