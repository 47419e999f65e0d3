pub mod defaults;
pub mod schema;
pub mod value;

pub use defaults::{default_for, defaults_for};
pub use schema::{FieldDescriptor, FieldType, FieldValidation};
pub use value::Value;
