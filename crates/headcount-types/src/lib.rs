//! Shared type definitions for the Headcount event-registration system.
//!
//! This crate is the single source of truth for the types used across the
//! Headcount workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the web frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`status`] -- The event lifecycle status enumeration
//! - [`event`] -- Core entity structs (events, attendees, drafts, patches)
//!
//! Note that these types carry no enforcement logic of their own. The
//! capacity and uniqueness invariants on an event's attendee list are
//! upheld exclusively by the registry crate; everything here is a passive
//! record shape plus a few read-only convenience queries.

pub mod event;
pub mod ids;
pub mod status;

// Re-export all public types at crate root for convenience.
pub use event::{Attendee, AttendeeSignup, Event, EventDraft, EventPatch};
pub use ids::{AttendeeId, EventId, VendorId};
pub use status::{EventStatus, UnknownStatus};
