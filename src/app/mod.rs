mod actions;
mod event_handler;
mod pipeline;
mod state;

pub use actions::{remove_file, select_file, send_message, start_transcription};
pub use event_handler::handle_backend_event;
pub use state::{AppState, BackendEvent};
