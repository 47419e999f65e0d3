pub mod form;
pub mod store;
pub mod submission;

pub use form::{FormController, FormPhase, FormSource, Section};
pub use store::ValueStore;
pub use submission::{Submission, SubmissionLog};
