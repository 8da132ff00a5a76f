//! Scrutineering records for gliding competitions: gliders, pilots,
//! organizations and weighings, the club class handicap coefficient, and a
//! portable archive of the whole dataset.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::Store`] and the handicap engine:
//! ```
//! use glidercheck::{
//!     config::HandicapConfig,
//!     core::store::Store,
//!     engine::handicap,
//!     model::{GliderCard, GliderType, Organization, Pilot},
//! };
//! use rust_decimal::Decimal;
//!
//! let mut store = Store::new();
//! let org = store.insert(Organization {
//!     name: "Aeroklub Brno".to_string(),
//!     code: "BRN".to_string(),
//!     ..Organization::default()
//! }).expect("insert organization");
//! let pilot = store.insert(Pilot {
//!     firstname: "Jan".to_string(),
//!     surname: "Novak".to_string(),
//!     ..Pilot::default()
//! }).expect("insert pilot");
//! let glider_type = store.insert(GliderType {
//!     name: "Std Cirrus".to_string(),
//!     club_class: true,
//!     coefficient: Some(Decimal::new(100, 2)),
//!     weight_referential: Some(320),
//!     ..GliderType::default()
//! }).expect("insert glider type");
//! let card = store.insert(GliderCard {
//!     registration: "OK-1234".to_string(),
//!     competition_number: "KA".to_string(),
//!     glider_type_id: glider_type,
//!     pilot_id: pilot,
//!     organization_id: org,
//!     glider_weight: Some(250),
//!     pilot_weight: Some(91),
//!     ..GliderCard::default()
//! }).expect("insert card");
//!
//! let card = store.get::<GliderCard>(card).expect("card");
//! let glider_type = store.glider_type_of(card).expect("type");
//! let coefficient = handicap::coefficient(card, glider_type, &HandicapConfig::default());
//! assert_eq!(coefficient, Some(Decimal::new(1015, 3)));
//! ```
//!
//! Persistent usage with a SQLite-backed session:
//! ```no_run
//! use glidercheck::{
//!     archive,
//!     config::Configuration,
//!     model::Organization,
//!     photos::PhotoStore,
//!     session::Session,
//! };
//!
//! let mut session = Session::open("glidercheck.db").expect("open database");
//! let config = Configuration::load("glidercheck.toml").expect("load configuration");
//! let photos = PhotoStore::open("photos").expect("open photo store");
//!
//! session.store_mut().insert(Organization {
//!     name: "Aeroklub Brno".to_string(),
//!     code: "BRN".to_string(),
//!     ..Organization::default()
//! }).expect("insert");
//! session.commit().expect("commit");
//!
//! archive::export(session.store(), &config, &photos, "backup.zip").expect("export");
//! ```
#![deny(missing_docs)]

/// Full-dataset archive export and import.
pub mod archive;
/// Bulk removal of selected data.
pub mod clean;
/// Column descriptors, values and text conversion.
pub mod column;
/// Handicap parameters and their file.
pub mod config;
/// Core in-memory store and index helpers.
pub mod core;
/// Handicap computation and compliance verdicts.
pub mod engine;
/// Crate-wide error type.
pub mod error;
/// Record types.
pub mod model;
/// Row mutation model.
pub mod op;
/// Persistence abstraction and SQLite implementation.
pub mod persist;
/// Content-addressed photo files.
pub mod photos;
/// Commit and rollback over the store and its sink.
pub mod session;
/// Shared primitive types and enums.
pub mod types;

pub use error::{Error, Result};
