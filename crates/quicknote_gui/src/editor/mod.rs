//! Editor state: the note buffer, debounce timers and the session that ties
//! highlighting to overlays.

pub mod buffer;
pub mod debounce;
mod session;

pub use buffer::{EditDelta, NoteBuffer};
pub use debounce::{Debouncer, TimerToken};
pub use session::{EditorSession, SessionEvents};
