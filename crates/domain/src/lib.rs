//! `taskhub-domain`: the records the authorization core reasons about.
//!
//! Plain data plus local validation. Access decisions live in `taskhub-auth`;
//! persistence lives in `taskhub-infra`.

pub mod audit;
pub mod organization;
pub mod policy;
pub mod task;
pub mod user;

pub use audit::{AuditEntry, AuditEvent, AuditRecord, AUDIT_PAGE_SIZE};
pub use organization::Organization;
pub use policy::{AuditPolicy, SignupPolicy};
pub use task::{NewTask, Task, TaskCategory, TaskPatch, TaskStatus};
pub use user::{User, UserSummary};
