use crate::core::schema::{FieldDescriptor, validate_fields};
use crate::error::{StoreError, TemplateError};
use crate::templates::blob::BlobStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blob key holding the serialized template collection.
pub const TEMPLATE_COLLECTION: &str = "formTemplates";

pub type TemplateId = u64;

/// A named, versioned prompt → field-list snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub prompt: String,
    pub fields: Vec<FieldDescriptor>,
    pub version: u32,
    pub date_created: DateTime<Utc>,
}

impl Template {
    pub fn matches_prompt(&self, prompt: &str) -> bool {
        self.prompt.to_lowercase() == prompt.to_lowercase()
    }

    /// Prompt shortened for list display.
    pub fn short_prompt(&self, max_chars: usize) -> String {
        if self.prompt.chars().count() > max_chars {
            let head: String = self.prompt.chars().take(max_chars).collect();
            format!("{head}...")
        } else {
            self.prompt.clone()
        }
    }
}

pub struct TemplateStore<B: BlobStore> {
    blob: B,
    templates: Vec<Template>,
}

impl<B: BlobStore> TemplateStore<B> {
    /// Recovers the collection; absent or unreadable blobs yield an empty one.
    pub fn open(blob: B) -> Self {
        let templates = match read_collection(&blob) {
            Ok(templates) => templates,
            Err(err) => {
                tracing::warn!(error = %err, "template collection unreadable, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = templates.len(), "template collection loaded");
        Self { blob, templates }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: TemplateId) -> Option<&Template> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn blob(&self) -> &B {
        &self.blob
    }

    /// Saves `fields` under `prompt`, superseding a case-insensitive match.
    pub fn save(
        &mut self,
        prompt: &str,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Template, TemplateError> {
        if prompt.trim().is_empty() {
            return Err(TemplateError::EmptyPrompt);
        }
        if fields.is_empty() {
            return Err(TemplateError::NoFields);
        }
        validate_fields(&fields)?;

        let now = Utc::now();
        let mut updated = self.templates.clone();
        let saved = match updated
            .iter_mut()
            .find(|template| template.matches_prompt(prompt))
        {
            Some(existing) => {
                existing.prompt = prompt.to_string();
                existing.fields = fields;
                existing.date_created = now;
                existing.version += 1;
                existing.clone()
            }
            None => {
                let template = Template {
                    id: next_id(&updated, now),
                    prompt: prompt.to_string(),
                    fields,
                    version: 1,
                    date_created: now,
                };
                updated.push(template.clone());
                template
            }
        };

        self.commit(updated)?;
        tracing::info!(id = saved.id, version = saved.version, "template saved");
        Ok(saved)
    }

    /// Field list of a stored template, as an independent copy.
    pub fn load(&self, id: TemplateId) -> Result<Vec<FieldDescriptor>, TemplateError> {
        self.get(id)
            .map(|template| template.fields.clone())
            .ok_or(TemplateError::NotFound(id))
    }

    pub fn delete(&mut self, id: TemplateId) -> Result<(), TemplateError> {
        if self.get(id).is_none() {
            return Err(TemplateError::NotFound(id));
        }
        let updated: Vec<Template> = self
            .templates
            .iter()
            .filter(|template| template.id != id)
            .cloned()
            .collect();
        self.commit(updated)?;
        tracing::info!(id, "template deleted");
        Ok(())
    }

    /// Persists first; memory only changes once the write succeeded.
    fn commit(&mut self, updated: Vec<Template>) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(&updated).map_err(StoreError::Encode)?;
        self.blob.set(TEMPLATE_COLLECTION, &data)?;
        self.templates = updated;
        Ok(())
    }
}

fn read_collection<B: BlobStore>(blob: &B) -> Result<Vec<Template>, StoreError> {
    match blob.get(TEMPLATE_COLLECTION)? {
        Some(data) if !data.trim().is_empty() => {
            serde_json::from_str(&data).map_err(StoreError::Decode)
        }
        _ => Ok(Vec::new()),
    }
}

fn next_id(templates: &[Template], now: DateTime<Utc>) -> TemplateId {
    let candidate = now.timestamp_millis().max(0) as TemplateId;
    let highest = templates.iter().map(|template| template.id).max();
    match highest {
        Some(highest) if highest >= candidate => highest + 1,
        _ => candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::{TEMPLATE_COLLECTION, TemplateStore};
    use crate::core::schema::{FieldDescriptor, FieldType};
    use crate::error::{StoreError, TemplateError, ValidationError};
    use crate::templates::blob::{BlobStore, FileBlobStore, MemoryBlobStore};

    fn fields(name: &str) -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::new("Field", name, FieldType::Text).required(true)]
    }

    struct ReadOnlyBlob;

    impl BlobStore for ReadOnlyBlob {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _blob: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn new_prompt_starts_at_version_one() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        let saved = store.save("Contact form", fields("name")).expect("save");
        assert_eq!(saved.version, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn matching_prompt_keeps_id_and_bumps_version() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        let first = store.save("Contact form", fields("name")).expect("save");
        let second = store.save("CONTACT FORM", fields("email")).expect("resave");

        assert_eq!(second.id, first.id);
        assert_eq!(second.version, first.version + 1);
        assert_eq!(second.fields, fields("email"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn distinct_prompts_get_distinct_ids() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        let a = store.save("Contact form", fields("a")).expect("save a");
        let b = store.save("Survey", fields("b")).expect("save b");
        assert_ne!(a.id, b.id);
        assert_eq!(b.version, 1);
    }

    #[test]
    fn delete_removes_only_that_entry() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        let a = store.save("A", fields("a")).expect("save");
        let b = store.save("B", fields("b")).expect("save");
        let b2 = store.save("b", fields("b2")).expect("resave");
        let c = store.save("C", fields("c")).expect("save");

        store.delete(a.id).expect("delete");

        assert!(store.get(a.id).is_none());
        assert_eq!(store.get(b.id).map(|t| t.version), Some(b2.version));
        assert_eq!(store.get(c.id).map(|t| t.version), Some(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        assert!(matches!(store.delete(42), Err(TemplateError::NotFound(42))));
    }

    #[test]
    fn save_then_load_round_trips_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let original = vec![
            FieldDescriptor::new("Plan", "plan", FieldType::Select)
                .with_options(["Free", "Pro"])
                .with_help_text("Pick one")
                .with_section("Billing"),
            FieldDescriptor::new("Agree", "agree", FieldType::Checkbox).required(true),
        ];
        let id = {
            let mut store =
                TemplateStore::open(FileBlobStore::new(dir.path()).expect("blob store"));
            store.save("Signup", original.clone()).expect("save").id
        };

        let reopened = TemplateStore::open(FileBlobStore::new(dir.path()).expect("blob store"));
        assert_eq!(reopened.load(id).expect("load"), original);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        let saved = store.save("A", fields("a")).expect("save");
        let blob = store
            .blob()
            .get(TEMPLATE_COLLECTION)
            .expect("get")
            .expect("blob written");
        let json: serde_json::Value = serde_json::from_str(&blob).expect("json");
        assert_eq!(json[0]["id"], serde_json::json!(saved.id));
        assert_eq!(json[0]["version"], serde_json::json!(1));
        assert!(json[0]["dateCreated"].is_string());

        store.delete(saved.id).expect("delete");
        let blob = store.blob().get(TEMPLATE_COLLECTION).expect("get");
        assert_eq!(blob.as_deref().map(str::trim), Some("[]"));
    }

    #[test]
    fn absent_or_corrupt_blob_opens_empty() {
        assert!(TemplateStore::open(MemoryBlobStore::new()).is_empty());
        let corrupt = MemoryBlobStore::new().with_blob(TEMPLATE_COLLECTION, "{not json");
        assert!(TemplateStore::open(corrupt).is_empty());
    }

    #[test]
    fn reads_collection_written_by_browser_format() {
        let blob = MemoryBlobStore::new().with_blob(
            TEMPLATE_COLLECTION,
            r#"[{"id":1700000000000,"prompt":"Feedback","version":3,
                "dateCreated":"2024-01-02T03:04:05.000Z",
                "fields":[{"label":"Rating","name":"rating","type":"range","required":false}]}]"#,
        );
        let store = TemplateStore::open(blob);
        let template = store.get(1_700_000_000_000).expect("template");
        assert_eq!(template.version, 3);
        assert_eq!(template.fields[0].kind, FieldType::Range);
    }

    #[test]
    fn failed_write_leaves_collection_unchanged() {
        let mut store = TemplateStore::open(ReadOnlyBlob);
        let result = store.save("A", fields("a"));
        assert!(matches!(result, Err(TemplateError::Store(StoreError::Io(_)))));
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_blank_prompt_and_empty_fields() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        assert!(matches!(
            store.save("  ", fields("a")),
            Err(TemplateError::EmptyPrompt)
        ));
        assert!(matches!(
            store.save("A", Vec::new()),
            Err(TemplateError::NoFields)
        ));
    }

    #[test]
    fn field_lists_that_cannot_load_are_not_saved() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        let duplicated = vec![
            FieldDescriptor::new("X", "x", FieldType::Text),
            FieldDescriptor::new("X again", "x", FieldType::Text),
        ];
        assert!(matches!(
            store.save("dup", duplicated),
            Err(TemplateError::Validation(ValidationError::DuplicateName { .. }))
        ));

        let no_options = vec![FieldDescriptor::new("Pick", "pick", FieldType::Radio)];
        assert!(matches!(
            store.save("radio", no_options),
            Err(TemplateError::Validation(ValidationError::MissingOptions { .. }))
        ));
        assert!(store.is_empty());
        assert!(store.blob().get(TEMPLATE_COLLECTION).expect("get").is_none());
    }

    #[test]
    fn short_prompt_truncates_long_prompts() {
        let mut store = TemplateStore::open(MemoryBlobStore::new());
        let saved = store
            .save("a registration form for the annual conference", fields("a"))
            .expect("save");
        assert_eq!(saved.short_prompt(30), "a registration form for the an...");
        assert_eq!(saved.short_prompt(100), saved.prompt);
    }
}
