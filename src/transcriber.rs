use std::path::Path;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

/// Response body of `POST /transcribe/`. Any JSON object is accepted;
/// the transcript text is a bonus the stock server happens to include.
#[derive(Debug, Default, Deserialize)]
pub struct TranscribeResponse {
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Upload a file to the server for transcription, streaming it as the
/// multipart field `file`. `on_progress(bytes_sent, total_bytes)` fires
/// per uploaded chunk. No retry, no timeout, no cancellation: callers
/// that fire twice get two independent requests.
pub async fn transcribe_file<F>(
    base_url: &str,
    path: &Path,
    on_progress: F,
) -> Result<TranscribeResponse, Box<dyn std::error::Error + Send + Sync>>
where
    F: Fn(u64, u64) + Send + 'static,
{
    let file = tokio::fs::File::open(path).await?;
    let total = file.metadata().await?.len();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let mut sent: u64 = 0;
    let counted = ReaderStream::new(file).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            sent += bytes.len() as u64;
            on_progress(sent, total);
        }
        chunk
    });

    let part = Part::stream_with_length(reqwest::Body::wrap_stream(counted), total)
        .file_name(file_name)
        .mime_str("application/octet-stream")?;
    let form = Form::new().part("file", part);

    let url = format!("{}/transcribe/", base_url.trim_end_matches('/'));
    log::info!("Uploading {} ({total} bytes) to {url}", path.display());

    let client = reqwest::Client::new();
    let response = client.post(&url).multipart(form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Transcription request failed with status {status}: {body}").into());
    }

    let parsed: TranscribeResponse = response.json().await?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::Multipart;
    use axum::routing::post;
    use axum::{Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Bind a throwaway server and return its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn media_fixture(bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.mp3");
        std::fs::write(&path, bytes).unwrap();
        (dir, path)
    }

    /// Echoes what the server saw so the client side can assert on it.
    async fn echoing_transcribe(mut multipart: Multipart) -> Json<serde_json::Value> {
        let mut seen = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().unwrap_or_default().to_string();
            let len = field.bytes().await.unwrap().len();
            seen.push(format!("{name}={file_name}:{len}"));
        }
        Json(json!({ "transcript": seen.join(",") }))
    }

    #[tokio::test]
    async fn uploads_multipart_file_field_and_reports_progress() {
        let base = serve(Router::new().route("/transcribe/", post(echoing_transcribe))).await;
        let (_dir, path) = media_fixture(b"fake media bytes");

        let sent = Arc::new(AtomicU64::new(0));
        let total = Arc::new(AtomicU64::new(0));
        let sent_in = sent.clone();
        let total_in = total.clone();

        let response = transcribe_file(&base, &path, move |done, all| {
            sent_in.store(done, Ordering::SeqCst);
            total_in.store(all, Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert_eq!(response.transcript.as_deref(), Some("file=talk.mp3:16"));
        assert_eq!(sent.load(Ordering::SeqCst), 16);
        assert_eq!(total.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn accepts_json_body_without_transcript_field() {
        async fn bare(mut multipart: Multipart) -> Json<serde_json::Value> {
            while let Some(field) = multipart.next_field().await.unwrap() {
                field.bytes().await.unwrap();
            }
            Json(json!({ "status": "ok" }))
        }
        let base = serve(Router::new().route("/transcribe/", post(bare))).await;
        let (_dir, path) = media_fixture(b"abc");

        let response = transcribe_file(&base, &path, |_, _| {}).await.unwrap();
        assert_eq!(response.transcript, None);
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        async fn boom(mut multipart: Multipart) -> (axum::http::StatusCode, &'static str) {
            while let Some(field) = multipart.next_field().await.unwrap() {
                field.bytes().await.unwrap();
            }
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "whisper fell over")
        }
        let base = serve(Router::new().route("/transcribe/", post(boom))).await;
        let (_dir, path) = media_fixture(b"abc");

        let err = transcribe_file(&base, &path, |_, _| {}).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("500"), "unexpected error: {message}");
        assert!(message.contains("whisper fell over"), "unexpected error: {message}");
    }

    #[tokio::test]
    async fn overlapping_uploads_both_reach_the_server() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in = hits.clone();
        let app = Router::new().route(
            "/transcribe/",
            post(move |mut multipart: Multipart| {
                let hits = hits_in.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        field.bytes().await.unwrap();
                    }
                    Json(json!({ "transcript": "t" }))
                }
            }),
        );
        let base = serve(app).await;
        let (_dir, path) = media_fixture(b"abc");

        // There is intentionally no in-flight guard: both must land.
        let (first, second) = tokio::join!(
            transcribe_file(&base, &path, |_, _| {}),
            transcribe_file(&base, &path, |_, _| {}),
        );
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
