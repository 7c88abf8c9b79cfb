use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use super::state::{AppState, BackendEvent};

/// Dispatch the multipart upload on the tokio runtime. Deliberately no
/// in-flight guard: a second call races the first and whichever event
/// lands last wins the session state.
pub fn dispatch_transcription(state: &Rc<RefCell<AppState>>, path: PathBuf) {
    let s = state.borrow();
    let base_url = s.config.api_base_url.clone();
    let sender = s.backend_sender.clone();
    let progress_sender = sender.clone();

    s.tokio_rt.spawn(async move {
        let result = crate::transcriber::transcribe_file(&base_url, &path, move |sent, total| {
            let _ = progress_sender.try_send(BackendEvent::UploadProgress(sent, total));
        })
        .await;

        match result {
            Ok(response) => {
                let _ = sender
                    .send(BackendEvent::TranscriptionComplete(response.transcript))
                    .await;
            }
            Err(e) => {
                let _ = sender
                    .send(BackendEvent::TranscriptionFailed(e.to_string()))
                    .await;
            }
        }
    });
}

/// Dispatch one chat question on the tokio runtime. `entry` is the id of
/// the placeholder row the answer belongs to.
pub fn dispatch_chat(state: &Rc<RefCell<AppState>>, entry: u64, query: String) {
    let s = state.borrow();
    let base_url = s.config.api_base_url.clone();
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        match crate::assistant::send_query(&base_url, &query).await {
            Ok(answer) => {
                let _ = sender.send(BackendEvent::AnswerReady { entry, answer }).await;
            }
            Err(e) => {
                let _ = sender
                    .send(BackendEvent::AnswerFailed {
                        entry,
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    });
}
