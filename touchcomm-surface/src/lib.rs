//! Window-free interaction state for the participant surfaces: the button
//! grid, the keyboard-driven selection procedure and the VAS rating scale.
//! All coordinates are normalized to 0..1 of the window, with y growing
//! downward, so the same state drives any resolution and every property is
//! testable without a display.

pub mod buttons;
pub mod input;
pub mod layout;
pub mod vas;

pub use buttons::{ButtonPanel, ButtonRegion, Click, KeySelection, Selection};
pub use input::{Key, PointerEvent};
pub use layout::{button_layout, grid_positions};
pub use vas::{VasOutcome, VasScale};
