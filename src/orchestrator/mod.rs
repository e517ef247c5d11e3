//! # Update Orchestration
//!
//! The state machine that searches for, downloads and installs pending updates
//! in one category.
//!
//! ## Phases
//!
//! 1. **Resolving**: category name to provider id, exact match only
//! 2. **Searching**: pending items in that category, frozen into an [`UpdateBatch`]
//! 3. **AcceptingEulas**: every unaccepted license, unconditionally
//! 4. **CheckingReboot**: records `reboot_required` before anything else happens
//! 5. Check mode stops here with `changed = !batch.is_empty()`
//! 6. **Downloading**: one item per request, already-downloaded items skipped
//! 7. **Installing**: one item per request, after every download
//! 8. **RecheckingReboot**: overwrites `reboot_required`
//!
//! A pending reboot with a non-empty batch refuses steps 6 and 7. Any
//! non-success download or install result aborts the run; items installed
//! before the failure keep `installed = true`.

pub mod errors;
pub mod states;
pub mod types;
pub mod unit;
pub mod update_orchestrator;

pub use errors::{OrchestrationFailure, UpdateError};
pub use states::OrchestrationPhase;
pub use types::{FailureInfo, UpdateBatch, UpdateItem, UpdateRequest, UpdateStatus};
pub use unit::UpdateUnitOfWork;
pub use update_orchestrator::UpdateOrchestrator;
