pub mod audit;
pub mod error;
pub mod models;
pub mod prompt;
pub mod reply;

pub use audit::{audit_atom, audit_atoms, AtomAnomaly, AtomAudit};
pub use error::ExtractionError;
pub use models::*;
pub use prompt::{build_user_message, PROMPT_VERSION, SYSTEM_PROMPT};
pub use reply::{parse_policies, preview, strip_code_fences};
