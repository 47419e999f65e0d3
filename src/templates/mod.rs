pub mod blob;
pub mod store;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use store::{TEMPLATE_COLLECTION, Template, TemplateId, TemplateStore};
