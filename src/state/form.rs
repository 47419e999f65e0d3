use crate::core::defaults::defaults_for;
use crate::core::schema::{FieldDescriptor, validate_fields};
use crate::core::value::Value;
use crate::error::FormError;
use crate::state::store::ValueStore;
use crate::state::submission::{Submission, SubmissionLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Empty,
    Loaded,
    Submitting,
}

/// Where the current field list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSource {
    Generated,
    Template(u64),
}

/// A display group of fields sharing a `section` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// `None` for the implicit default group.
    pub title: Option<String>,
    /// Indexes into the controller's field list, in field order.
    pub fields: Vec<usize>,
}

/// Owns the loaded field list, the value map and the submission log.
pub struct FormController {
    phase: FormPhase,
    source: Option<FormSource>,
    fields: Vec<FieldDescriptor>,
    values: ValueStore,
    submissions: SubmissionLog,
}

impl FormController {
    pub fn new() -> Self {
        Self {
            phase: FormPhase::Empty,
            source: None,
            fields: Vec::new(),
            values: ValueStore::new(),
            submissions: SubmissionLog::new(),
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn source(&self) -> Option<FormSource> {
        self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.phase != FormPhase::Empty
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn submissions(&self) -> &[Submission] {
        self.submissions.entries()
    }

    pub fn load_generated(&mut self, fields: Vec<FieldDescriptor>) -> Result<(), FormError> {
        self.load(fields, FormSource::Generated)
    }

    pub fn load_template(&mut self, id: u64, fields: Vec<FieldDescriptor>) -> Result<(), FormError> {
        self.load(fields, FormSource::Template(id))
    }

    fn load(&mut self, fields: Vec<FieldDescriptor>, source: FormSource) -> Result<(), FormError> {
        validate_fields(&fields)?;
        self.values = defaults_for(&fields);
        self.fields = fields;
        self.source = Some(source);
        self.phase = FormPhase::Loaded;
        tracing::info!(fields = self.fields.len(), ?source, "form loaded");
        Ok(())
    }

    /// Replaces one entry. Unknown names and an empty form are ignored.
    pub fn set_value(&mut self, name: &str, value: Value) -> bool {
        if self.phase != FormPhase::Loaded {
            return false;
        }
        let replaced = self.values.replace(name, value);
        if !replaced {
            tracing::debug!(name, "ignoring value for unknown field");
        }
        replaced
    }

    /// Appends a snapshot of the current values, then resets to fresh defaults.
    pub fn submit(&mut self) -> Result<&Submission, FormError> {
        if self.phase != FormPhase::Loaded {
            return Err(FormError::NotLoaded);
        }
        self.phase = FormPhase::Submitting;
        let snapshot = std::mem::replace(&mut self.values, defaults_for(&self.fields));
        self.phase = FormPhase::Loaded;
        tracing::info!(
            submissions = self.submissions.len() + 1,
            "form submitted, values reset"
        );
        Ok(self.submissions.append(snapshot))
    }

    /// Groups fields by section in first-seen order.
    pub fn sections(&self) -> Vec<Section> {
        group_sections(&self.fields)
    }

    /// Field indexes in display (section) order.
    pub fn display_order(&self) -> Vec<usize> {
        self.sections()
            .into_iter()
            .flat_map(|section| section.fields)
            .collect()
    }
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

pub fn group_sections(fields: &[FieldDescriptor]) -> Vec<Section> {
    let mut sections = Vec::<Section>::new();
    for (index, field) in fields.iter().enumerate() {
        let title = field.section_title();
        match sections
            .iter_mut()
            .find(|section| section.title.as_deref() == title)
        {
            Some(section) => section.fields.push(index),
            None => sections.push(Section {
                title: title.map(str::to_string),
                fields: vec![index],
            }),
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::{FormController, FormPhase, FormSource};
    use crate::core::defaults::defaults_for;
    use crate::core::schema::{FieldDescriptor, FieldType};
    use crate::core::value::Value;
    use crate::error::FormError;

    fn contact_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("Full Name", "fullName", FieldType::Text).required(true),
            FieldDescriptor::new("Email", "email", FieldType::Email).required(true),
        ]
    }

    #[test]
    fn starts_empty() {
        let form = FormController::new();
        assert_eq!(form.phase(), FormPhase::Empty);
        assert!(form.fields().is_empty());
        assert!(form.values().is_empty());
    }

    #[test]
    fn contact_form_scenario() {
        let mut form = FormController::new();
        form.load_generated(contact_fields()).expect("load");

        assert_eq!(form.value("fullName"), Some(&Value::empty_text()));
        assert_eq!(form.value("email"), Some(&Value::empty_text()));

        assert!(form.set_value("fullName", Value::text("Ada")));
        let submission = form.submit().expect("submit").clone();

        assert_eq!(submission.values.get("fullName"), Some(&Value::text("Ada")));
        assert_eq!(submission.values.get("email"), Some(&Value::empty_text()));
        assert_eq!(form.submissions().len(), 1);
        assert_eq!(form.value("fullName"), Some(&Value::empty_text()));
        assert_eq!(form.value("email"), Some(&Value::empty_text()));
        assert_eq!(form.phase(), FormPhase::Loaded);
    }

    #[test]
    fn reset_matches_fresh_defaults() {
        let fields = vec![
            FieldDescriptor::new("Tags", "tags", FieldType::Checkboxgroup).with_options(["A", "B"]),
            FieldDescriptor::new("Agree", "agree", FieldType::Checkbox),
            FieldDescriptor::new("Level", "level", FieldType::Range),
            FieldDescriptor::new("City", "city", FieldType::Text).with_default("Lisbon"),
        ];
        let mut form = FormController::new();
        form.load_generated(fields.clone()).expect("load");
        form.set_value("tags", Value::List(vec!["A".into()]));
        form.set_value("agree", Value::Bool(true));
        form.set_value("level", Value::Number(40.0));
        form.set_value("city", Value::text("Porto"));
        form.submit().expect("submit");

        assert_eq!(form.values(), &defaults_for(&fields));
    }

    #[test]
    fn set_value_ignores_unknown_names() {
        let mut form = FormController::new();
        form.load_generated(contact_fields()).expect("load");
        assert!(!form.set_value("phone", Value::text("123")));
        assert!(form.value("phone").is_none());
        assert_eq!(form.values().len(), 2);
    }

    #[test]
    fn set_value_before_load_is_a_no_op() {
        let mut form = FormController::new();
        assert!(!form.set_value("fullName", Value::text("Ada")));
    }

    #[test]
    fn submit_requires_loaded_form() {
        let mut form = FormController::new();
        assert!(matches!(form.submit(), Err(FormError::NotLoaded)));
    }

    #[test]
    fn invalid_list_leaves_previous_form_intact() {
        let mut form = FormController::new();
        form.load_generated(contact_fields()).expect("load");
        form.set_value("fullName", Value::text("Ada"));

        let duplicate = vec![
            FieldDescriptor::new("A", "x", FieldType::Text),
            FieldDescriptor::new("B", "x", FieldType::Text),
        ];
        assert!(matches!(
            form.load_generated(duplicate),
            Err(FormError::Validation(_))
        ));
        assert_eq!(form.fields().len(), 2);
        assert_eq!(form.value("fullName"), Some(&Value::text("Ada")));
    }

    #[test]
    fn template_load_records_source_and_rederives_values() {
        let mut form = FormController::new();
        form.load_generated(contact_fields()).expect("load");
        form.set_value("email", Value::text("ada@example.com"));

        form.load_template(7, contact_fields()).expect("load template");
        assert_eq!(form.source(), Some(FormSource::Template(7)));
        assert_eq!(form.value("email"), Some(&Value::empty_text()));
    }

    #[test]
    fn sections_group_in_first_seen_order() {
        let fields = vec![
            FieldDescriptor::new("Name", "name", FieldType::Text).with_section("Personal"),
            FieldDescriptor::new("Notes", "notes", FieldType::Textarea),
            FieldDescriptor::new("Street", "street", FieldType::Text).with_section("Address"),
            FieldDescriptor::new("Age", "age", FieldType::Number).with_section("Personal"),
            FieldDescriptor::new("Extra", "extra", FieldType::Text).with_section("  "),
        ];
        let mut form = FormController::new();
        form.load_generated(fields).expect("load");

        let sections = form.sections();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title.as_deref(), Some("Personal"));
        assert_eq!(sections[0].fields, vec![0, 3]);
        assert_eq!(sections[1].title, None);
        assert_eq!(sections[1].fields, vec![1, 4]);
        assert_eq!(sections[2].title.as_deref(), Some("Address"));
        assert_eq!(sections[2].fields, vec![2]);
        assert_eq!(form.display_order(), vec![0, 3, 1, 4, 2]);
    }
}
