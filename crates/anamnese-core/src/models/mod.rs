//! Domain models for the anamnese intake.

mod fields;
mod intake;

pub use fields::*;
pub use intake::*;
