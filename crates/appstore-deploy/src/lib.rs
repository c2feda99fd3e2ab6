//! Deployment orchestration for app store installs.
//!
//! [`DeploymentService`] drives installs and deletes across the state store
//! and one of two [`DeploymentEngine`]s, chosen per record by the
//! [`EngineSelector`].
//!
//! # Transaction boundaries
//!
//! - **Install** commits its bookkeeping rows before calling the engine, and
//!   advances the status to `SUCCESS` in a second unit of work. An engine
//!   failure leaves the installed app at `INIT`.
//! - **Delete** runs the soft-deletes and the engine call in one unit of
//!   work, so it is all-or-nothing.
//! - **Status updates** always run in their own short unit of work.
//!
//! Only engine calls observe cancellation through [`DeployContext`].

pub mod context;
mod delete;
pub mod engine;
pub mod environment;
pub mod error;
mod install;
pub mod registrar;
pub mod request;
pub mod service;
pub mod status;

pub use context::{CancelHandle, DeployContext};
pub use engine::{
    DeploymentEngine, EngineKind, EngineSelector, ManifestEngine, ReleaseLedgerEngine,
    SelectedEngine, select_kind,
};
pub use error::{DeployError, DeployResult, EngineError, EngineResult};
pub use request::{InstallAppRequest, InstalledAppRecord, InstalledAppSummary};
pub use service::DeploymentService;
pub use status::NOT_FOUND_STATUS;
