//! Client-side session for Workshop Walrus.
//!
//! Interprets model replies into activity cards or narrative notes, talks to
//! the relay, and owns the submit/loading/result cycle of one session along
//! with its exports.

pub mod client;
pub mod error;
pub mod export;
pub mod interpreter;
pub mod session;

pub use client::{ChatBackend, RelayClient};
pub use error::SessionError;
pub use export::{Clipboard, SystemClipboard, CSV_FILE_NAME};
pub use interpreter::{interpret, interpret_completion};
pub use session::{SessionController, SessionPhase, SubmitOutcome};
