//! Core entity structs for events and attendees.
//!
//! An [`Event`] is a schedulable offering with finite capacity, owned by a
//! vendor. Attendee membership lives in `registered_attendees`, ordered by
//! registration time. These structs are plain records: the capacity and
//! uniqueness invariants are enforced by the registry crate, which is the
//! only writer of the attendee list.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::ids::{AttendeeId, EventId, VendorId};
use crate::status::EventStatus;

// ---------------------------------------------------------------------------
// Attendee
// ---------------------------------------------------------------------------

/// A party registered against an event.
///
/// The name and email fields are opaque contact details supplied by the
/// identity collaborator; the registry never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Attendee {
    /// Identifier of the registered party.
    pub id: AttendeeId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// When the registration was accepted.
    pub registered_at: DateTime<Utc>,
}

/// Contact details submitted with a registration request.
///
/// The registration engine turns an accepted signup into an [`Attendee`]
/// by stamping the registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AttendeeSignup {
    /// Identifier of the party requesting registration.
    pub attendee_id: AttendeeId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

impl AttendeeSignup {
    /// Convert the signup into an [`Attendee`] registered at `when`.
    pub fn into_attendee(self, when: DateTime<Utc>) -> Attendee {
        Attendee {
            id: self.attendee_id,
            name: self.name,
            email: self.email,
            registered_at: when,
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A schedulable offering with finite capacity, owned by a vendor.
///
/// Invariants (upheld by the registry, not by this struct):
/// - `registered_attendees.len() <= capacity`
/// - no [`AttendeeId`] appears twice in `registered_attendees`
/// - `registered_attendees` is ordered by registration time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Longer description shown to attendees.
    pub description: String,
    /// Calendar date of the event (no time component).
    pub date: NaiveDate,
    /// Where the event takes place.
    pub location: String,
    /// Maximum number of registrations permitted.
    pub capacity: u32,
    /// Ticket price. Never negative.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Owning vendor, if any. Weak reference: stored but never validated.
    pub vendor_id: Option<VendorId>,
    /// Registered attendees in registration order.
    pub registered_attendees: Vec<Attendee>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// When the event record was created.
    pub created_at: DateTime<Utc>,
    /// When the event record was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Number of accepted registrations, clamped into `u32` range.
    pub fn registration_count(&self) -> u32 {
        u32::try_from(self.registered_attendees.len()).unwrap_or(u32::MAX)
    }

    /// Remaining seats: `capacity - registration_count`, never negative.
    pub fn seats_left(&self) -> u32 {
        self.capacity.saturating_sub(self.registration_count())
    }

    /// Whether the event has reached its capacity.
    pub fn is_full(&self) -> bool {
        self.registration_count() >= self.capacity
    }

    /// Whether the given attendee already holds a registration.
    pub fn is_registered(&self, attendee_id: AttendeeId) -> bool {
        self.registered_attendees
            .iter()
            .any(|a| a.id == attendee_id)
    }
}

// ---------------------------------------------------------------------------
// EventDraft
// ---------------------------------------------------------------------------

/// Payload for creating a new event.
///
/// Carries every [`Event`] field except the identifier, the attendee list,
/// and the timestamps, all of which the registry allocates. Text fields
/// must be non-empty and the price must be non-negative; the registry
/// rejects drafts that fail [`EventDraft::check`] with `InvalidInput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Validate)]
#[ts(export, export_to = "bindings/")]
pub struct EventDraft {
    /// Event title. Must be non-empty.
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    /// Event description. Must be non-empty.
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    /// Calendar date of the event.
    pub date: NaiveDate,
    /// Event location. Must be non-empty.
    #[validate(length(min = 1, message = "location must not be empty"))]
    pub location: String,
    /// Maximum number of registrations permitted.
    pub capacity: u32,
    /// Ticket price. Must be non-negative.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Owning vendor, if any.
    pub vendor_id: Option<VendorId>,
    /// Initial lifecycle status.
    #[serde(default)]
    pub status: EventStatus,
}

impl EventDraft {
    /// Validate the draft, returning the first problem found.
    ///
    /// Combines the derived field validations with the non-negative price
    /// rule, which `validator` cannot express for [`Decimal`].
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the violated rule.
    pub fn check(&self) -> Result<(), String> {
        if let Err(errors) = self.validate() {
            return Err(errors.to_string());
        }
        if self.price.is_sign_negative() {
            return Err(format!("price must be non-negative, got {}", self.price));
        }
        Ok(())
    }

    /// Materialize the draft into a full [`Event`] record.
    ///
    /// The attendee list starts empty and both timestamps are set to `now`.
    pub fn into_event(self, id: EventId, now: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            location: self.location,
            capacity: self.capacity,
            price: self.price,
            vendor_id: self.vendor_id,
            registered_attendees: Vec::new(),
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// EventPatch
// ---------------------------------------------------------------------------

/// Partial update to an event's vendor-editable attributes.
///
/// `None` fields are left untouched. Populated fields obey the same rules
/// as on creation ([`EventPatch::check`]): text fields must be non-empty
/// and the price non-negative. The attendee list is deliberately absent:
/// membership changes only flow through the registration engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventPatch {
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New calendar date, if changing.
    pub date: Option<NaiveDate>,
    /// New location, if changing.
    pub location: Option<String>,
    /// New capacity, if changing. The registry rejects a shrink below the
    /// current registration count with `CapacityViolation`.
    pub capacity: Option<u32>,
    /// New price, if changing.
    #[ts(as = "Option<String>")]
    pub price: Option<Decimal>,
    /// New lifecycle status, if changing.
    pub status: Option<EventStatus>,
}

impl EventPatch {
    /// A patch that changes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether every field is `None`.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
            && self.price.is_none()
            && self.status.is_none()
    }

    /// Validate the populated fields, returning the first problem found.
    ///
    /// Mirrors [`EventDraft::check`]: a patch must not introduce a state
    /// the draft validation would have rejected at creation.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the violated rule.
    pub fn check(&self) -> Result<(), String> {
        if matches!(&self.title, Some(title) if title.is_empty()) {
            return Err("title must not be empty".to_owned());
        }
        if matches!(&self.description, Some(description) if description.is_empty()) {
            return Err("description must not be empty".to_owned());
        }
        if matches!(&self.location, Some(location) if location.is_empty()) {
            return Err("location must not be empty".to_owned());
        }
        if let Some(price) = self.price {
            if price.is_sign_negative() {
                return Err(format!("price must be non-negative, got {price}"));
            }
        }
        Ok(())
    }

    /// Apply the patch to `event`, overwriting only the `Some` fields.
    ///
    /// This performs blind assignment; [`EventPatch::check`] and the
    /// capacity-shrink check happen in the registry before this is called.
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            event.description.clone_from(description);
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(location) = &self.location {
            event.location.clone_from(location);
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
        if let Some(price) = self.price {
            event.price = price;
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> EventDraft {
        EventDraft {
            title: "Wine Tasting".to_owned(),
            description: "An evening of regional wines".to_owned(),
            date: NaiveDate::from_ymd_opt(2026, 10, 3).unwrap_or_default(),
            location: "Cellar Door, Old Town".to_owned(),
            capacity: 40,
            price: Decimal::new(2500, 2),
            vendor_id: Some(VendorId::new()),
            status: EventStatus::Upcoming,
        }
    }

    fn attendee(name: &str) -> Attendee {
        AttendeeSignup {
            attendee_id: AttendeeId::new(),
            name: name.to_owned(),
            email: format!("{name}@example.com"),
        }
        .into_attendee(Utc::now())
    }

    #[test]
    fn valid_draft_passes_check() {
        assert!(draft().check().is_ok());
    }

    #[test]
    fn empty_title_fails_check() {
        let mut d = draft();
        d.title = String::new();
        assert!(d.check().is_err());
    }

    #[test]
    fn negative_price_fails_check() {
        let mut d = draft();
        d.price = Decimal::new(-1, 2);
        assert!(d.check().is_err());
    }

    #[test]
    fn zero_price_is_allowed() {
        let mut d = draft();
        d.price = Decimal::ZERO;
        assert!(d.check().is_ok());
    }

    #[test]
    fn into_event_starts_with_no_attendees() {
        let now = Utc::now();
        let event = draft().into_event(EventId::new(), now);
        assert!(event.registered_attendees.is_empty());
        assert_eq!(event.created_at, now);
        assert_eq!(event.updated_at, now);
        assert_eq!(event.seats_left(), 40);
    }

    #[test]
    fn seats_left_saturates_at_zero() {
        let mut event = draft().into_event(EventId::new(), Utc::now());
        event.capacity = 1;
        event.registered_attendees.push(attendee("ada"));
        event.registered_attendees.push(attendee("grace"));
        // Over-full records (e.g. after an external capacity edit in the
        // store) still report zero seats rather than underflowing.
        assert_eq!(event.seats_left(), 0);
        assert!(event.is_full());
    }

    #[test]
    fn is_registered_matches_by_id() {
        let mut event = draft().into_event(EventId::new(), Utc::now());
        let ada = attendee("ada");
        let ada_id = ada.id;
        event.registered_attendees.push(ada);
        assert!(event.is_registered(ada_id));
        assert!(!event.is_registered(AttendeeId::new()));
    }

    #[test]
    fn patch_applies_only_some_fields() {
        let mut event = draft().into_event(EventId::new(), Utc::now());
        let patch = EventPatch {
            title: Some("Winter Wine Tasting".to_owned()),
            capacity: Some(60),
            ..EventPatch::default()
        };
        patch.apply(&mut event);
        assert_eq!(event.title, "Winter Wine Tasting");
        assert_eq!(event.capacity, 60);
        assert_eq!(event.location, "Cellar Door, Old Town");
    }

    #[test]
    fn patch_with_empty_text_field_fails_check() {
        let patch = EventPatch {
            title: Some(String::new()),
            ..EventPatch::default()
        };
        assert!(patch.check().is_err());

        let patch = EventPatch {
            location: Some(String::new()),
            ..EventPatch::default()
        };
        assert!(patch.check().is_err());
    }

    #[test]
    fn patch_with_negative_price_fails_check() {
        let patch = EventPatch {
            price: Some(Decimal::new(-500, 2)),
            ..EventPatch::default()
        };
        assert!(patch.check().is_err());
    }

    #[test]
    fn patch_with_valid_or_absent_fields_passes_check() {
        assert!(EventPatch::empty().check().is_ok());
        let patch = EventPatch {
            title: Some("Renamed".to_owned()),
            price: Some(Decimal::ZERO),
            ..EventPatch::default()
        };
        assert!(patch.check().is_ok());
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(EventPatch::empty().is_empty());
        let patch = EventPatch {
            status: Some(EventStatus::Cancelled),
            ..EventPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn event_roundtrip_serde() {
        let event = draft().into_event(EventId::new(), Utc::now());
        let json = serde_json::to_string(&event).ok();
        assert!(json.is_some());
        let restored: Result<Event, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(event));
    }
}
