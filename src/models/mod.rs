//! Pure domain models that do not touch the repository layer.

pub mod calendar;

pub use calendar::{classify, HolidayTable};
