//! Repository layer: entity-scoped database operations.
//!
//! Plain functions over a borrowed `Connection`; `store.rs` wraps them
//! behind the `RecordStore` trait used by the prediction pipeline.

mod caretaker;
mod doctor;
mod patient;
mod symptom;

pub use caretaker::*;
pub use doctor::*;
pub use patient::*;
pub use symptom::*;
