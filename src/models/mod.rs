pub mod caretaker;
pub mod doctor;
pub mod enums;
pub mod notification;
pub mod patient;
pub mod prediction;
pub mod symptom;

pub use caretaker::*;
pub use doctor::*;
pub use enums::*;
pub use notification::*;
pub use patient::*;
pub use prediction::*;
pub use symptom::*;
