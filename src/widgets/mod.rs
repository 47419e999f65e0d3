pub mod base;
pub mod field;
pub mod inputs;
pub mod registry;
pub mod traits;
pub mod validators;

pub use field::FieldWidget;
pub use registry::{WidgetBuilder, WidgetRegistry, render};
