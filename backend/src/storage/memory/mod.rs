//! # In-Memory Storage Module
//!
//! Reference storage implementation for the engine. The domain layer only
//! talks to the traits in [`crate::storage::traits`], so a persistent adapter
//! (SQL, files) can replace these repositories without touching the services.

pub mod attendance_repository;
pub mod connection;
pub mod event_repository;
pub mod member_repository;

pub use attendance_repository::AttendanceRepository;
pub use connection::MemoryConnection;
pub use event_repository::EventRepository;
pub use member_repository::MemberRepository;
