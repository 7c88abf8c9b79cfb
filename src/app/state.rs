use std::collections::HashMap;

use gtk4::glib;
use gtk4::prelude::*;

use crate::config::Config;
use crate::session::Session;
use crate::ui::chat::{ChatWidgets, MessageRow};
use crate::ui::window::WindowWidgets;

/// Events sent from background tasks to the GTK main thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    UploadProgress(u64, u64),
    TranscriptionComplete(Option<String>),
    TranscriptionFailed(String),
    AnswerReady { entry: u64, answer: String },
    AnswerFailed { entry: u64, error: String },
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub session: Session,
    pub config: Config,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    /// Live reveal timers, keyed by chat entry id. An entry here means the
    /// answer is still typing itself out; removing the source cancels it.
    /// Reveals that finish on their own take their entry out themselves.
    pub reveal_sources: HashMap<u64, glib::SourceId>,
    /// Placeholder rows still waiting for their answer, keyed by entry id.
    pub pending_rows: HashMap<u64, MessageRow>,

    // UI handles
    pub window: Option<WindowWidgets>,
    pub chat: Option<ChatWidgets>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<BackendEvent>) -> Self {
        let config = Config::load();
        let tokio_rt = tokio::runtime::Runtime::new()
            .expect("Failed to create tokio runtime");

        Self {
            session: Session::new(),
            config,
            tokio_rt,
            backend_sender: sender,
            reveal_sources: HashMap::new(),
            pending_rows: HashMap::new(),
            window: None,
            chat: None,
        }
    }
}

/// Push the session's projections into widget sensitivity and the file row.
pub fn sync_controls(state: &std::rc::Rc<std::cell::RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref win) = s.window {
        win.transcribe_button.set_sensitive(s.session.can_transcribe());
        crate::ui::window::sync_file_row(win, s.session.file());
    }
    if let Some(ref chat) = s.chat {
        chat.send_button.set_sensitive(s.session.can_send());
    }
}
