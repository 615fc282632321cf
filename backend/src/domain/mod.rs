//! # Domain Module
//!
//! Business logic for the kit rotation engine: roster and event
//! administration, the rotation rules themselves, geofenced attendance, and
//! reminders. Services talk to storage through the traits in
//! [`crate::storage::traits`] and return [`errors::DomainError`] on failure.

pub mod attendance_service;
pub mod commands;
pub mod errors;
pub mod event_service;
pub mod geo;
pub mod member_service;
pub mod models;
pub mod notify_service;
pub mod rotation;
pub mod rotation_service;

pub use attendance_service::AttendanceService;
pub use errors::{DomainError, DomainResult};
pub use event_service::EventService;
pub use member_service::MemberService;
pub use notify_service::{DutyReminder, Notifier, NotifyService};
pub use rotation_service::RotationService;
