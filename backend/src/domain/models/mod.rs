//! Domain models for the kit rotation engine.

pub mod attendance;
pub mod event;
pub mod member;

pub use attendance::Arrival;
pub use event::KitEvent;
pub use member::Member;
