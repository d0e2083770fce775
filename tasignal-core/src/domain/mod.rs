//! Domain types for the signal engine.

pub mod bar;
pub mod instrument;

pub use bar::Bar;
pub use instrument::Instrument;
