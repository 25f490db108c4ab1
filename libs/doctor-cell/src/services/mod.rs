pub mod availability;
pub mod doctor;
pub mod validation;

pub use availability::{is_available_at, resolve};
pub use doctor::{DoctorService, UpsertOutcome};
pub use validation::{validate, validate_form};
