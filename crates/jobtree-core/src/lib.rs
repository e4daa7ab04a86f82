pub mod capability;
pub mod compiler;
pub mod config;
pub mod dispatch;
pub mod drag;
pub mod error;
pub mod hierarchy;
pub mod keyboard;
pub mod moves;
pub mod position;
pub mod task;

// Re-export common error type
pub use error::{JobtreeError, Result};

pub use compiler::{AnchorFallback, CompiledBatch, CompiledInsert, RelativeMoveCompiler};
pub use dispatch::{DispatchOutcome, MutationDispatcher, PositionWriter};
pub use moves::{Anchor, PositionBatch, PositionUpdate, RelativeMove};
pub use position::PositionAllocator;
