//! Participant registry for the Kursportal site.
//!
//! SQLite-backed storage for course registrations, plus the CSV export the
//! course office downloads. The store is a thin repository over a single
//! connection; migrations are embedded and run on open.
//!
//! # Usage
//!
//! ```no_run
//! use kursportal_registry::{NewParticipant, ParticipantStore};
//!
//! let store = ParticipantStore::open("teilnehmer.db".as_ref())?;
//! let p = store.create(&NewParticipant {
//!     first_name: "Anna".into(),
//!     last_name: "Muster".into(),
//!     email: "anna@example.ch".into(),
//!     ..Default::default()
//! })?;
//! let csv = kursportal_registry::export::to_csv(&store.list()?)?;
//! # Ok::<(), kursportal_registry::RegistryError>(())
//! ```

pub mod error;
pub mod export;
pub mod store;

pub use error::{RegistryError, Result};
pub use store::{NewParticipant, Participant, ParticipantStore, RegistrationStats};
