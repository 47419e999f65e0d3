pub mod checkbox;
pub mod checkbox_group;
pub mod choice;
pub mod multiselect;
pub mod radio;
pub mod select;
pub mod slider;
pub mod text;
pub mod text_edit;
pub mod textarea;

pub use checkbox::CheckboxInput;
pub use checkbox_group::CheckboxGroupInput;
pub use multiselect::MultiSelectInput;
pub use radio::RadioInput;
pub use select::SelectInput;
pub use slider::RangeInput;
pub use text::{TextInput, TextKind, TextMode};
pub use textarea::TextAreaInput;
