use crate::core::schema::{FieldDescriptor, FieldType};
use crate::core::value::Value;
use crate::widgets::field::FieldWidget;
use crate::widgets::inputs::slider::{DEFAULT_MAX, DEFAULT_MIN};
use crate::widgets::inputs::{
    CheckboxGroupInput, CheckboxInput, MultiSelectInput, RadioInput, RangeInput, SelectInput,
    TextAreaInput, TextInput, TextKind, TextMode,
};
use crate::widgets::traits::InteractiveNode;
use crate::widgets::validators::validators_for;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Builds the input for one descriptor, seeded with its current value.
pub type WidgetBuilder = fn(&FieldDescriptor, &Value) -> Box<dyn InteractiveNode>;

/// Field type to input builder. Types without an entry render as text.
#[derive(Default)]
pub struct WidgetRegistry {
    builders: HashMap<FieldType, WidgetBuilder>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.install_defaults();
        registry
    }

    pub fn register(&mut self, kind: FieldType, builder: WidgetBuilder) {
        self.builders.insert(kind, builder);
    }

    pub fn contains(&self, kind: FieldType) -> bool {
        self.builders.contains_key(&kind)
    }

    pub fn build(&self, field: &FieldDescriptor, value: &Value) -> FieldWidget {
        let builder = self
            .builders
            .get(&field.kind)
            .copied()
            .unwrap_or(build_text as WidgetBuilder);
        FieldWidget::new(field, builder(field, value))
    }

    fn install_defaults(&mut self) {
        for kind in [
            FieldType::Text,
            FieldType::Email,
            FieldType::Number,
            FieldType::Password,
            FieldType::Url,
            FieldType::Time,
            FieldType::Date,
            FieldType::Color,
            FieldType::File,
        ] {
            self.register(kind, build_text);
        }
        self.register(FieldType::Textarea, build_textarea);
        self.register(FieldType::Select, build_select);
        self.register(FieldType::Multiselect, build_multiselect);
        self.register(FieldType::Checkbox, build_checkbox);
        self.register(FieldType::Checkboxgroup, build_checkbox_group);
        self.register(FieldType::Radio, build_radio);
        self.register(FieldType::Range, build_range);
    }
}

pub fn default_registry() -> &'static WidgetRegistry {
    static REGISTRY: OnceLock<WidgetRegistry> = OnceLock::new();
    REGISTRY.get_or_init(WidgetRegistry::new)
}

/// Turns a descriptor and its current value into an interactive widget.
pub fn render(field: &FieldDescriptor, value: &Value) -> FieldWidget {
    default_registry().build(field, value)
}

fn format_hint(kind: FieldType) -> Option<&'static str> {
    match kind {
        FieldType::Date => Some("YYYY-MM-DD"),
        FieldType::Time => Some("HH:MM"),
        FieldType::Color => Some("#rrggbb"),
        FieldType::File => Some("path/to/file"),
        _ => None,
    }
}

fn build_text(field: &FieldDescriptor, value: &Value) -> Box<dyn InteractiveNode> {
    let mut input = TextInput::new(&field.name, field.display_label())
        .with_validators(validators_for(field));
    match field.kind {
        FieldType::Password => input = input.with_mode(TextMode::Password),
        FieldType::Number => input = input.with_kind(TextKind::Number),
        _ => {}
    }
    let placeholder = field
        .placeholder
        .clone()
        .or_else(|| format_hint(field.kind).map(str::to_string));
    if let Some(placeholder) = placeholder {
        input = input.with_placeholder(placeholder);
    }
    Box::new(input.with_default(value.clone()))
}

fn build_textarea(field: &FieldDescriptor, value: &Value) -> Box<dyn InteractiveNode> {
    let mut input = TextAreaInput::new(&field.name, field.display_label())
        .with_validators(validators_for(field));
    if let Some(placeholder) = &field.placeholder {
        input = input.with_placeholder(placeholder.clone());
    }
    Box::new(input.with_default(value.clone()))
}

fn build_select(field: &FieldDescriptor, value: &Value) -> Box<dyn InteractiveNode> {
    Box::new(
        SelectInput::new(&field.name, field.display_label(), field.options.clone())
            .with_validators(validators_for(field))
            .with_default(value.clone()),
    )
}

fn build_multiselect(field: &FieldDescriptor, value: &Value) -> Box<dyn InteractiveNode> {
    Box::new(
        MultiSelectInput::new(&field.name, field.display_label(), field.options.clone())
            .with_validators(validators_for(field))
            .with_default(value.clone()),
    )
}

fn build_checkbox(field: &FieldDescriptor, value: &Value) -> Box<dyn InteractiveNode> {
    Box::new(
        CheckboxInput::new(&field.name, field.display_label())
            .with_validators(validators_for(field))
            .with_default(value.clone()),
    )
}

fn build_checkbox_group(field: &FieldDescriptor, value: &Value) -> Box<dyn InteractiveNode> {
    // Emptiness is checked by the group itself so it can report it immediately.
    let optional = FieldDescriptor {
        required: false,
        ..field.clone()
    };
    Box::new(
        CheckboxGroupInput::new(&field.name, field.display_label(), field.options.clone())
            .with_required(field.required, field.error_message())
            .with_validators(validators_for(&optional))
            .with_default(value.clone()),
    )
}

fn build_radio(field: &FieldDescriptor, value: &Value) -> Box<dyn InteractiveNode> {
    Box::new(
        RadioInput::new(&field.name, field.display_label(), field.options.clone())
            .with_validators(validators_for(field))
            .with_default(value.clone()),
    )
}

fn build_range(field: &FieldDescriptor, value: &Value) -> Box<dyn InteractiveNode> {
    let min = field.min().unwrap_or(DEFAULT_MIN);
    let max = field.max().unwrap_or(DEFAULT_MAX);
    Box::new(
        RangeInput::new(&field.name, field.display_label(), min, max)
            .with_validators(validators_for(field))
            .with_default(value.clone()),
    )
}
