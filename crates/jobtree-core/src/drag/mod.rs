//! Drag gesture resolution.
//!
//! A [`DragSession`] is created by the caller for every gesture and threaded
//! through `before_start` → `move_to`* → `end`. It validates each hovered
//! [`DropZone`] and, on drop, turns the last valid one into
//! [`RelativeMove`](crate::moves::RelativeMove)s.

mod session;
mod zone;

pub use session::{DragOutcome, DragPhase, DragSession};
pub use zone::{Boundary, DropZone};
