//! Recurring-maintenance scheduling engine.
//!
//! - [`recurrence`]: pure next-due-date calculation.
//! - [`lifecycle`]: the [`ScheduleManager`], sole writer of schedules and completions.
//! - [`projection`]: read-only dashboard and calendar views.
//! - [`store`] / [`collaborators`]: the tenant-scoped record store and the
//!   external services the engine consults.

pub mod clock;
pub mod collaborators;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod projection;
pub mod recurrence;
pub mod store;

pub use clock::{Clock, FixedClock, ReferenceClock, SystemClock};
pub use collaborators::{InMemoryDirectory, TargetDirectory, TemplateCatalog, WorkOrderService};
pub use error::{ScheduleError, StoreError};
pub use lifecycle::{Collaborators, ScheduleManager};
pub use model::{
    Completion, CompletionInput, NewSchedule, Schedule, ScheduleTemplate, ScheduleUpdate, Target,
};
pub use projection::{CalendarItem, ScheduleProjections, ScheduleStats};
pub use recurrence::{
    compute_next_due_date, preview_occurrences, Frequency, RecurrenceSpec, MAX_PREVIEW_COUNT,
};
pub use store::{InMemoryScheduleStore, ScheduleFilter, ScheduleStore};
