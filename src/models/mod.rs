mod entry;
mod principal;
mod project;
mod summary;

pub use entry::{Entry, EntryDraft, EntryKind};
pub use principal::Principal;
pub use project::{Project, ProjectDraft};
pub use summary::Summary;

/// Field names as they appear on stored documents.
pub mod field {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const USER_ID: &str = "userId";
    pub const PROJECT_ID: &str = "projectId";
    pub const COST: &str = "cost";
    pub const AMOUNT: &str = "amount";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
}
