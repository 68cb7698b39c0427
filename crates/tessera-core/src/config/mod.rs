pub mod map;
pub mod source;
pub mod value;

pub use map::ConfigMap;
pub use source::{ERROR_MARKER_KEY, PropertySource};
pub use value::ConfigValue;
