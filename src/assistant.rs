use serde::Deserialize;

/// Response body of `POST /chat/`. The stock server also returns the
/// question and the running history; only the answer is consumed.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    answer: Option<String>,
}

/// Ask one question about the current transcript. The body is form
/// encoded (`query=<message>`), the reply is JSON with an `answer`
/// string. A well-formed body without an `answer` field yields the empty
/// string rather than an error.
pub async fn send_query(
    base_url: &str,
    query: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let url = format!("{}/chat/", base_url.trim_end_matches('/'));

    let client = reqwest::Client::new();
    let response = client.post(&url).form(&[("query", query)]).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Chat request failed with status {status}: {body}").into());
    }

    let parsed: ChatResponse = response.json().await?;
    Ok(parsed.answer.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::post;
    use axum::{Form, Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(serde::Deserialize)]
    struct ChatForm {
        query: String,
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn posts_form_query_and_returns_answer() {
        async fn chat(Form(form): Form<ChatForm>) -> Json<serde_json::Value> {
            let answer = if form.query == "Hello" {
                "Hi there"
            } else {
                "unexpected query"
            };
            Json(json!({ "question": form.query, "answer": answer }))
        }
        let base = serve(Router::new().route("/chat/", post(chat))).await;

        // Trailing slash on the base URL must not double up in the path.
        let answer = send_query(&format!("{base}/"), "Hello").await.unwrap();
        assert_eq!(answer, "Hi there");
    }

    #[tokio::test]
    async fn missing_answer_field_degrades_to_empty_text() {
        async fn chat(Form(form): Form<ChatForm>) -> Json<serde_json::Value> {
            Json(json!({ "question": form.query, "history": [] }))
        }
        let base = serve(Router::new().route("/chat/", post(chat))).await;

        let answer = send_query(&base, "anything").await.unwrap();
        assert_eq!(answer, "");
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        async fn chat() -> (axum::http::StatusCode, &'static str) {
            (axum::http::StatusCode::BAD_GATEWAY, "model offline")
        }
        let base = serve(Router::new().route("/chat/", post(chat))).await;

        let err = send_query(&base, "Hello").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("502"), "unexpected error: {message}");
        assert!(message.contains("model offline"), "unexpected error: {message}");
    }
}
