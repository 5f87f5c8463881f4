//! GitHub App that keeps pull request review labels in sync with approvals
//!
//! ```text
//! POST /webhook ──► signature ──► events::parse_event ──► EventDispatcher
//!                                                         │
//!          ┌──────────────────────────────┬───────────────┴──────────────┐
//!          ▼                              ▼                              ▼
//!   installation created          review / labeled               repository created
//!   BackgroundJobs ──► Bootstrapper   ReviewStateMachine          Bootstrapper
//!   (every org repository)        (recount approvals)            (one repository)
//! ```
//!
//! All GitHub access goes through [`gh_client::LabelStore`].

pub mod approvals;
pub mod background;
pub mod bootstrap;
pub mod dispatcher;
pub mod events;
pub mod labels;
pub mod logger;
pub mod policy;
pub mod review_state;
pub mod server;
pub mod signature;

#[cfg(test)]
mod test_support;

pub use approvals::count_approvals;
pub use background::BackgroundJobs;
pub use bootstrap::{BootstrapError, BootstrapSummary, Bootstrapper};
pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use events::{parse_event, EventError, WebhookEvent};
pub use labels::LabelTemplate;
pub use policy::{Batch, FailurePolicy};
pub use review_state::{ReviewStateMachine, Transition};
pub use server::{router, ServerState};
pub use signature::{verify_signature, SignatureError};
