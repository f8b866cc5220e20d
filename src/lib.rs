pub mod activity;
pub(crate) mod activity_validation;
pub mod calculations;
pub mod calendar;
pub mod conflict;
pub mod graph;
pub mod metadata;
pub mod persistence;
pub mod schedule;
pub mod service;
pub mod validation;

pub use activity::{Activity, ActivityKind};
pub use activity_validation::ActivityValidationError;
pub use calculations::{BackwardPass, CriticalPathAnalysis, ForwardPass};
pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use conflict::{ConflictKind, ConflictSeverity, ScheduleConflict};
pub use graph::{NetworkBuilder, NetworkError, NetworkNode, ScheduleNetwork};
pub use metadata::ScheduleMetadata;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteScheduleStore;
pub use persistence::{
    FileScheduleStore, InMemoryScheduleStore, PersistenceError, ScheduleStore,
};
pub use schedule::{ProjectSchedule, ScheduleDataError, ScheduleRecord};
pub use service::{
    ActivityProvider, CreateScheduleOptions, InMemoryActivityProvider, ProviderError,
    ScheduleError, ScheduleUpdate, SchedulingService,
};
pub use validation::detect_dependency_conflicts;
