//! Kit duty rotation engine.
//!
//! Tracks a team roster, schedules kit events, and decides whose turn it is:
//! fair round-robin rotation with late-arrival penalties, deferred turns, and
//! geofenced match-day check-in. The engine is storage-agnostic; the bundled
//! in-memory backend suits embedding and tests, and a persistent adapter only
//! has to implement the traits in [`storage::traits`].

pub mod domain;
pub mod storage;

use std::sync::Arc;

use shared::RotationConfig;

pub use domain::{
    AttendanceService, DomainError, DomainResult, DutyReminder, EventService, MemberService,
    Notifier, NotifyService, RotationService,
};
pub use storage::MemoryConnection;

/// All engine services wired over one shared in-memory store.
#[derive(Clone)]
pub struct Backend {
    pub member_service: MemberService,
    pub event_service: EventService,
    pub rotation_service: RotationService,
    pub attendance_service: AttendanceService,
    pub notify_service: NotifyService,
}

impl Backend {
    pub fn new(config: RotationConfig) -> Self {
        Self::with_connection(Arc::new(MemoryConnection::new()), config)
    }

    /// Wire the services over an existing connection, so an embedding caller
    /// can also hold direct repository handles.
    pub fn with_connection(connection: Arc<MemoryConnection>, config: RotationConfig) -> Self {
        Self {
            member_service: MemberService::new(connection.clone()),
            event_service: EventService::new(connection.clone()),
            rotation_service: RotationService::new(connection.clone(), config.clone()),
            attendance_service: AttendanceService::new(connection.clone(), config),
            notify_service: NotifyService::new(connection),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new(RotationConfig::default())
    }
}
