mod common;

#[cfg(test)]
mod tests {
    use super::common::MockLlm;
    use actix_web::{http::StatusCode, ResponseError};
    use aidesk::llm::{
        models::{ChatResponse, Message},
        openrouter::request_body,
        LlmError,
    };
    use aidesk::proxy::{chat, ChatProxy, ChatRequest, ProxyError};
    use serde_json::json;

    fn hi() -> ChatRequest {
        ChatRequest {
            messages: vec![Message::new("user", "hi")],
            model: None,
        }
    }

    #[tokio::test]
    async fn returns_first_completion_text() {
        let llm = MockLlm::from_body(json!({
            "choices": [{ "message": { "content": "hello" } }]
        }));
        let proxy = ChatProxy::new(llm.clone());

        let reply = proxy.handle(hi()).await.unwrap();

        assert_eq!(reply.message, "hello");
        assert_eq!(reply.model, "test-model");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn forwards_transcript_with_fixed_parameters() {
        let llm = MockLlm::from_body(json!({ "choices": [{ "message": { "content": "ok" } }] }));
        let proxy = ChatProxy::new(llm.clone());

        let req = ChatRequest {
            messages: vec![
                Message::new("assistant", "Hello!"),
                Message::new("user", "Summarize Rust in one line"),
            ],
            model: Some("openai/gpt-4o".to_string()),
        };
        proxy.handle(req.clone()).await.unwrap();

        let seen = llm.seen.lock().unwrap();
        let (messages, options) = &seen[0];
        assert_eq!(messages, &req.messages);
        assert_eq!(options.model.as_deref(), Some("openai/gpt-4o"));
        assert_eq!(options.max_tokens, Some(chat::MAX_TOKENS));
        assert_eq!(options.temperature, Some(chat::TEMPERATURE));
        assert_eq!(options.top_p, Some(chat::TOP_P));
        assert_eq!(options.frequency_penalty, Some(chat::FREQUENCY_PENALTY));
        assert_eq!(options.presence_penalty, Some(chat::PRESENCE_PENALTY));

        let body = request_body("openai/gpt-4o", messages, options);
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["top_p"], 0.9);
        assert_eq!(body["frequency_penalty"], 0.1);
        assert_eq!(body["presence_penalty"], 0.1);
        assert_eq!(body["stream"], false);
        assert_eq!(
            serde_json::to_string(&body["temperature"]).unwrap(),
            "0.7"
        );
    }

    #[tokio::test]
    async fn repeated_requests_are_not_cached() {
        let llm = MockLlm::new(|n| {
            Ok(ChatResponse {
                content: format!("answer {}", n),
                model: "m".to_string(),
                usage: None,
            })
        });
        let proxy = ChatProxy::new(llm.clone());

        let first = proxy.handle(hi()).await.unwrap();
        let second = proxy.handle(hi()).await.unwrap();

        assert_eq!(llm.calls(), 2);
        assert_ne!(first.message, second.message);
    }

    #[tokio::test]
    async fn empty_transcript_is_rejected_without_a_call() {
        let llm = MockLlm::from_body(json!({}));
        let proxy = ChatProxy::new(llm.clone());

        let err = proxy
            .handle(ChatRequest { messages: vec![], model: None })
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_normalized() {
        let llm = MockLlm::new(|_| Err(LlmError::Api("OpenRouter API error: 502".to_string())));
        let proxy = ChatProxy::new(llm);

        let err = proxy.handle(hi()).await.unwrap_err();
        let body = err.body();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "OpenRouter API error: 502");
        assert!(body.details.is_some());
    }

    #[tokio::test]
    async fn malformed_provider_body_is_normalized() {
        let llm = MockLlm::from_body(json!({ "choices": [] }));
        let proxy = ChatProxy::new(llm);

        let err = proxy.handle(hi()).await.unwrap_err();
        assert!(matches!(err, ProxyError::Upstream { .. }));
    }

    #[tokio::test]
    async fn missing_credential_reports_not_configured() {
        let llm = MockLlm::new(|_| Err(LlmError::NotConfigured("OPENROUTER_API_KEY")));
        let proxy = ChatProxy::new(llm);

        let err = proxy.handle(hi()).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body().error, "OPENROUTER_API_KEY not configured");
    }
}
