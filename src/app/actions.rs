use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use gtk4::prelude::*;

use super::pipeline::{dispatch_chat, dispatch_transcription};
use super::state::{sync_controls, AppState};
use crate::session::SelectedFile;
use crate::ui::chat;
use crate::ui::window::{self, Status};

/// A file was chosen via the dialog or dropped onto the upload area.
/// Selecting over an old file keeps an open chat open; readiness resets
/// only on removal or on the next transcription attempt.
pub fn select_file(state: &Rc<RefCell<AppState>>, path: PathBuf) {
    log::info!("Selected file: {}", path.display());
    {
        let mut s = state.borrow_mut();
        s.session.select_file(SelectedFile::from_path(path));
        if let Some(ref win) = s.window {
            window::hide_status(win);
        }
    }
    sync_controls(state);
}

/// The ✕ on the file row: drop the selection, the transcript and the
/// whole chat history, and disable everything downstream.
pub fn remove_file(state: &Rc<RefCell<AppState>>) {
    log::info!("File removed");
    clear_chat_view(state);
    {
        let mut s = state.borrow_mut();
        s.session.remove_file();
        if let Some(ref win) = s.window {
            window::hide_status(win);
            window::set_transcript(win, None);
            win.progress_bar.set_visible(false);
        }
    }
    sync_controls(state);
}

/// The Transcribe button. Without a file this shows an inline error and
/// makes no network call; otherwise the chat is cleared and the upload is
/// dispatched. Firing again while one is in flight starts a second
/// independent request.
pub fn start_transcription(state: &Rc<RefCell<AppState>>) {
    let path = {
        let mut s = state.borrow_mut();
        match s.session.begin_transcription() {
            Some(path) => path,
            None => {
                if let Some(ref win) = s.window {
                    window::show_status(win, Status::Error, "Please select a file first");
                }
                return;
            }
        }
    };

    clear_chat_view(state);
    {
        let s = state.borrow();
        if let Some(ref win) = s.window {
            window::set_transcript(win, None);
            window::show_status(win, Status::Loading, "Transcribing... please wait");
            win.progress_bar.set_fraction(0.0);
            win.progress_bar.set_visible(true);
        }
    }
    sync_controls(state);
    dispatch_transcription(state, path);
}

/// Enter in the input field or the Send button. A blank message or a chat
/// that is not open is a silent no-op, exactly like the original page.
pub fn send_message(state: &Rc<RefCell<AppState>>) {
    let raw = match state.borrow().chat {
        Some(ref chat) => chat.input.text().to_string(),
        None => return,
    };

    let begun = state.borrow_mut().session.begin_send(&raw);
    let Some((entry_id, text)) = begun else {
        return;
    };
    log::info!("Sending chat message ({} chars)", text.len());

    let stamp = state
        .borrow()
        .session
        .entries()
        .last()
        .map(|e| e.timestamp.clone())
        .unwrap_or_default();

    let row = {
        let s = state.borrow();
        s.chat.as_ref().map(|chat| {
            chat::append_user_row(chat, &text, &stamp);
            chat.input.set_text("");
            chat::append_pending_row(chat, &stamp)
        })
    };
    if let Some(row) = row {
        state.borrow_mut().pending_rows.insert(entry_id, row);
    }

    sync_controls(state);
    dispatch_chat(state, entry_id, text);
}

/// Tear down the chat display: cancel every live reveal timer first so no
/// write can target a removed row, then drop the rows themselves.
fn clear_chat_view(state: &Rc<RefCell<AppState>>) {
    let mut s = state.borrow_mut();
    for (_, source) in s.reveal_sources.drain() {
        source.remove();
    }
    s.pending_rows.clear();
    if let Some(ref chat) = s.chat {
        chat::clear(chat);
    }
}
