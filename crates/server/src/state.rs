use std::sync::Arc;

use sqlx::PgPool;
use upkeep_core::Config;
use upkeep_schedule::{
    Collaborators, InMemoryDirectory, InMemoryScheduleStore, ReferenceClock, ScheduleManager,
    ScheduleProjections, ScheduleStore,
};

use crate::pg_store::{PgDirectory, PgScheduleStore};

pub struct AppState {
    pub config: Config,
    pub manager: ScheduleManager,
    pub projections: ScheduleProjections,
    /// `"postgres"` or `"memory"`, reported by `/health`.
    pub backend: &'static str,
}

impl AppState {
    /// Wire the engine over an arbitrary store and collaborator set.
    pub fn new(
        config: Config,
        store: Arc<dyn ScheduleStore>,
        collaborators: Collaborators,
        clock: ReferenceClock,
        backend: &'static str,
    ) -> Self {
        let projections = ScheduleProjections::new(
            store.clone(),
            collaborators.targets.clone(),
            clock.clone(),
        )
        .with_calendar_limit(config.schedule.calendar_max_items as usize);
        let manager = ScheduleManager::new(store, collaborators, clock);
        Self {
            config,
            manager,
            projections,
            backend,
        }
    }

    pub fn postgres(config: Config, pool: PgPool, clock: ReferenceClock) -> Self {
        let store = Arc::new(PgScheduleStore::new(pool.clone()));
        let directory = Arc::new(PgDirectory::new(pool));
        Self::new(
            config,
            store,
            Collaborators::from_directory(directory),
            clock,
            "postgres",
        )
    }

    /// Volatile state; every asset, location and work order is accepted.
    pub fn in_memory(config: Config, clock: ReferenceClock) -> Self {
        let store = Arc::new(InMemoryScheduleStore::new());
        let directory = Arc::new(InMemoryDirectory::open());
        Self::new(
            config,
            store,
            Collaborators::from_directory(directory),
            clock,
            "memory",
        )
    }
}
