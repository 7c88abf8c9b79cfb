use std::path::PathBuf;

use chrono::Local;

/// Lifecycle of one transcription session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No file selected.
    Idle,
    /// A file is selected but not successfully transcribed yet.
    FileSelected,
    /// Transcription request in flight.
    Transcribing,
    /// Transcript loaded, chat is open.
    Ready,
    /// A chat request is in flight or its answer is still revealing.
    Sending,
}

/// The file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    /// Build from a filesystem path. Size falls back to 0 when the file
    /// cannot be stat'ed; the upload itself will surface a real error.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "(unnamed)".to_string());
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self { path, name, size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// Body of a chat entry as it moves through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    /// Final text. User entries are born with this.
    Text(String),
    /// Placeholder while the answer request is in flight.
    Pending,
    /// The request failed; carries the display message.
    Failed(String),
}

/// One rendered chat message. Entries are transient: they live until the
/// file is removed or a new transcription starts, and only in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub id: u64,
    pub speaker: Speaker,
    pub body: EntryBody,
    pub timestamp: String,
}

/// Client-side state machine for the upload-then-chat flow. All mutation
/// goes through the named transitions below; views read the projections.
pub struct Session {
    phase: Phase,
    file: Option<SelectedFile>,
    transcript: Option<String>,
    entries: Vec<ChatEntry>,
    next_id: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            file: None,
            transcript: None,
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// The transcribe action is available whenever a file is selected,
    /// except while an upload of it is already in flight.
    pub fn can_transcribe(&self) -> bool {
        self.file.is_some() && self.phase != Phase::Transcribing
    }

    /// Chat send is available only once a transcription has succeeded and
    /// no send is currently outstanding.
    pub fn can_send(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Record a newly chosen file. Choosing a file does not reset an
    /// existing transcript: chat stays open until the next transcription
    /// attempt or removal. Choosing during an in-flight transcription
    /// re-arms the transcribe action; the old request keeps running.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
        if matches!(self.phase, Phase::Idle | Phase::Transcribing) {
            self.phase = Phase::FileSelected;
        }
    }

    /// Drop the selection and everything derived from it.
    pub fn remove_file(&mut self) {
        self.file = None;
        self.transcript = None;
        self.entries.clear();
        self.phase = Phase::Idle;
    }

    /// Start a transcription attempt. Returns the path to upload, or
    /// `None` when no file is selected. Clears the chat and the previous
    /// transcript. There is deliberately no in-flight guard: a second
    /// call starts a second independent request and whichever response
    /// lands last wins.
    pub fn begin_transcription(&mut self) -> Option<PathBuf> {
        let path = self.file.as_ref()?.path.clone();
        self.entries.clear();
        self.transcript = None;
        self.phase = Phase::Transcribing;
        Some(path)
    }

    /// A transcription response arrived. The transcript text is optional:
    /// a JSON body without one still opens the chat.
    pub fn transcription_succeeded(&mut self, transcript: Option<String>) {
        self.transcript = transcript.filter(|t| !t.trim().is_empty());
        self.phase = Phase::Ready;
    }

    pub fn transcription_failed(&mut self) {
        self.phase = if self.file.is_some() {
            Phase::FileSelected
        } else {
            Phase::Idle
        };
    }

    /// Validate and record an outgoing message. Returns the id of the
    /// assistant placeholder entry plus the trimmed text to post, or
    /// `None` (no entries, no network call) when the text is blank or
    /// chat is not open.
    pub fn begin_send(&mut self, raw: &str) -> Option<(u64, String)> {
        let text = raw.trim();
        if text.is_empty() || !self.can_send() {
            return None;
        }

        let stamp = Local::now().format("%H:%M").to_string();
        let user_id = self.alloc_id();
        self.entries.push(ChatEntry {
            id: user_id,
            speaker: Speaker::User,
            body: EntryBody::Text(text.to_string()),
            timestamp: stamp.clone(),
        });
        let assistant_id = self.alloc_id();
        self.entries.push(ChatEntry {
            id: assistant_id,
            speaker: Speaker::Assistant,
            body: EntryBody::Pending,
            timestamp: stamp,
        });

        self.phase = Phase::Sending;
        Some((assistant_id, text.to_string()))
    }

    /// Fill a pending entry with its answer. Returns false when the entry
    /// is gone (the chat was cleared while the request was in flight), in
    /// which case the answer is dropped. The phase stays `Sending` until
    /// `reveal_finished` runs.
    pub fn answer_received(&mut self, id: u64, answer: String) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.body = EntryBody::Text(answer);
                true
            }
            None => false,
        }
    }

    /// Mark a pending entry as failed and reopen chat for a retry.
    pub fn send_failed(&mut self, id: u64, message: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.body = EntryBody::Failed(message.to_string());
        }
        if self.phase == Phase::Sending {
            self.phase = Phase::Ready;
        }
    }

    /// The reveal animation for the latest answer finished; chat reopens.
    pub fn reveal_finished(&mut self) {
        if self.phase == Phase::Sending {
            self.phase = Phase::Ready;
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn talk_file() -> SelectedFile {
        SelectedFile {
            path: PathBuf::from("/tmp/talk.mp3"),
            name: "talk.mp3".to_string(),
            size: 1234,
        }
    }

    fn ready_session() -> Session {
        let mut session = Session::new();
        session.select_file(talk_file());
        session.begin_transcription().expect("file is selected");
        session.transcription_succeeded(Some("we talked about rust".into()));
        session
    }

    #[test]
    fn starts_idle_with_nothing_enabled() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.can_transcribe());
        assert!(!session.can_send());
        assert!(session.entries().is_empty());
    }

    #[test]
    fn select_then_remove_clears_chat_and_disables_everything() {
        let mut session = ready_session();
        session.begin_send("what was discussed?").unwrap();

        session.remove_file();

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.entries().is_empty());
        assert!(session.transcript().is_none());
        assert!(!session.can_transcribe());
        assert!(!session.can_send());
    }

    #[test]
    fn transcribe_enabled_iff_file_selected() {
        let mut session = Session::new();
        assert!(!session.can_transcribe());

        session.select_file(talk_file());
        assert!(session.can_transcribe());

        session.begin_transcription().unwrap();
        assert!(!session.can_transcribe());

        session.transcription_succeeded(None);
        assert!(session.can_transcribe());
    }

    #[test]
    fn send_gated_on_successful_transcription() {
        let mut session = Session::new();
        session.select_file(talk_file());
        assert!(!session.can_send());

        session.begin_transcription().unwrap();
        assert!(!session.can_send());

        session.transcription_failed();
        assert_eq!(session.phase(), Phase::FileSelected);
        assert!(!session.can_send());
        assert!(session.can_transcribe());

        session.begin_transcription().unwrap();
        session.transcription_succeeded(None);
        assert!(session.can_send());
    }

    #[test]
    fn chat_round_trip_appends_user_then_assistant() {
        let mut session = ready_session();

        let (id, text) = session.begin_send("Hello").unwrap();
        assert_eq!(text, "Hello");
        assert!(session.answer_received(id, "Hi there".to_string()));

        let shape: Vec<(Speaker, &EntryBody)> = session
            .entries()
            .iter()
            .map(|e| (e.speaker, &e.body))
            .collect();
        assert_eq!(
            shape,
            vec![
                (Speaker::User, &EntryBody::Text("Hello".to_string())),
                (Speaker::Assistant, &EntryBody::Text("Hi there".to_string())),
            ]
        );
    }

    #[test]
    fn whitespace_only_message_is_rejected() {
        let mut session = ready_session();
        assert_eq!(session.begin_send("   \n\t"), None);
        assert!(session.entries().is_empty());
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn message_is_rejected_before_transcription() {
        let mut session = Session::new();
        session.select_file(talk_file());
        assert_eq!(session.begin_send("Hello"), None);
        assert!(session.entries().is_empty());
    }

    #[test]
    fn send_held_until_reveal_completes() {
        let mut session = ready_session();
        let (id, _) = session.begin_send("Hello").unwrap();
        assert!(!session.can_send());

        session.answer_received(id, "Hi there".to_string());
        assert!(!session.can_send());

        session.reveal_finished();
        assert!(session.can_send());
    }

    #[test]
    fn send_failure_reenables_immediately() {
        let mut session = ready_session();
        let (id, _) = session.begin_send("Hello").unwrap();

        session.send_failed(id, "Failed to get response. Please try again.");
        assert!(session.can_send());

        let last = session.entries().last().unwrap();
        assert_eq!(
            last.body,
            EntryBody::Failed("Failed to get response. Please try again.".to_string())
        );
    }

    #[test]
    fn double_transcription_is_not_suppressed() {
        let mut session = Session::new();
        session.select_file(talk_file());

        let first = session.begin_transcription();
        let second = session.begin_transcription();
        assert!(first.is_some());
        assert!(second.is_some());
        assert_eq!(session.phase(), Phase::Transcribing);
    }

    #[test]
    fn file_swap_keeps_chat_open() {
        let mut session = ready_session();
        session.select_file(SelectedFile {
            path: PathBuf::from("/tmp/other.wav"),
            name: "other.wav".to_string(),
            size: 99,
        });

        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.can_send());
        assert_eq!(session.file().unwrap().name, "other.wav");
    }

    #[test]
    fn new_transcription_attempt_closes_chat_and_clears_entries() {
        let mut session = ready_session();
        session.begin_send("Hello").unwrap();

        session.begin_transcription().unwrap();
        assert!(session.entries().is_empty());
        assert!(session.transcript().is_none());
        assert!(!session.can_send());
    }

    #[test]
    fn late_answer_for_cleared_chat_is_dropped() {
        let mut session = ready_session();
        let (id, _) = session.begin_send("Hello").unwrap();

        session.begin_transcription().unwrap();
        assert!(!session.answer_received(id, "too late".to_string()));
        assert!(session.entries().is_empty());
    }

    #[test]
    fn entry_ids_are_monotonic() {
        let mut session = ready_session();
        let (first, _) = session.begin_send("one").unwrap();
        session.answer_received(first, "1".to_string());
        session.reveal_finished();
        let (second, _) = session.begin_send("two").unwrap();

        let ids: Vec<u64> = session.entries().iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids, sorted);
        assert!(second > first);
    }

    #[test]
    fn blank_transcript_text_is_treated_as_absent() {
        let mut session = Session::new();
        session.select_file(talk_file());
        session.begin_transcription().unwrap();
        session.transcription_succeeded(Some("   ".to_string()));
        assert!(session.transcript().is_none());
        assert!(session.can_send());
    }
}
