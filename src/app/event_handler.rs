use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use super::state::{sync_controls, AppState, BackendEvent};
use crate::reveal::start_reveal;
use crate::ui::chat;
use crate::ui::window::{self, Status};

/// Handle a backend event. This is the response half of the state machine;
/// the request half lives in `actions`.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::UploadProgress(sent, total) => {
            if let Some(ref win) = state.borrow().window {
                win.progress_bar.set_visible(true);
                if total > 0 {
                    win.progress_bar.set_fraction(sent as f64 / total as f64);
                    let mb_sent = sent as f64 / 1_048_576.0;
                    let mb_total = total as f64 / 1_048_576.0;
                    win.progress_bar
                        .set_text(Some(&format!("Uploading: {mb_sent:.1} / {mb_total:.1} MB")));
                } else {
                    win.progress_bar.pulse();
                }
            }
        }
        BackendEvent::TranscriptionComplete(transcript) => {
            on_transcription_complete(state, transcript);
        }
        BackendEvent::TranscriptionFailed(error) => {
            log::error!("Transcription failed: {error}");
            {
                let mut s = state.borrow_mut();
                s.session.transcription_failed();
                if let Some(ref win) = s.window {
                    win.progress_bar.set_visible(false);
                    window::show_status(
                        win,
                        Status::Error,
                        "Failed to transcribe file. Please try again.",
                    );
                }
            }
            sync_controls(state);
        }
        BackendEvent::AnswerReady { entry, answer } => on_answer_ready(state, entry, answer),
        BackendEvent::AnswerFailed { entry, error } => {
            log::error!("Chat request failed: {error}");
            {
                let mut s = state.borrow_mut();
                s.session
                    .send_failed(entry, "Failed to get response. Please try again.");
                if let Some(row) = s.pending_rows.remove(&entry) {
                    chat::mark_row_failed(&row, "Failed to get response. Please try again.");
                }
            }
            sync_controls(state);
        }
    }
}

fn on_transcription_complete(state: &Rc<RefCell<AppState>>, transcript: Option<String>) {
    log::info!("Transcription complete");
    state.borrow_mut().session.transcription_succeeded(transcript);
    {
        let s = state.borrow();
        if let Some(ref win) = s.window {
            win.progress_bar.set_visible(false);
            window::set_transcript(win, s.session.transcript());
            window::show_status(
                win,
                Status::Success,
                "Transcription complete! You can now chat with the transcript.",
            );
        }
        if let Some(ref chat) = s.chat {
            chat.input.grab_focus();
        }
    }
    sync_controls(state);
}

/// The answer arrived: fill the session entry and start the typewriter
/// reveal into the placeholder row. A late answer whose row is gone (the
/// chat was cleared meanwhile) is dropped on the floor.
fn on_answer_ready(state: &Rc<RefCell<AppState>>, entry: u64, answer: String) {
    let row = {
        let mut s = state.borrow_mut();
        if !s.session.answer_received(entry, answer.clone()) {
            log::info!("Dropping answer for cleared chat entry {entry}");
            return;
        }
        s.pending_rows.remove(&entry)
    };
    let Some(row) = row else {
        return;
    };

    chat::begin_answer(&row);
    let interval = state.borrow().config.reveal_interval();

    let state_done = state.clone();
    let source = start_reveal(&row.body, &answer, interval, move || {
        // The source already ended on its own; only drop the stored id,
        // remove() on a finished source panics.
        {
            let mut s = state_done.borrow_mut();
            s.reveal_sources.remove(&entry);
            s.session.reveal_finished();
        }
        sync_controls(&state_done);
        if let Some(ref chat) = state_done.borrow().chat {
            chat.input.grab_focus();
        }
    });
    state.borrow_mut().reveal_sources.insert(entry, source);
}
