use crate::llm::gemini::{
    build_request_body, classify_status, extract_text, normalize_model_name, parse_model_list,
    GeminiClient, DEFAULT_MODEL,
};
use crate::llm::{LlmError, SamplingParams, TextGenerator};
use serde_json::json;

#[test]
fn test_status_mapping() {
    assert!(matches!(classify_status(401, ""), LlmError::Auth(_)));
    assert!(matches!(classify_status(403, "{}"), LlmError::Auth(_)));
    assert!(matches!(classify_status(429, "slow down"), LlmError::Quota(_)));
    assert!(matches!(classify_status(503, "overloaded"), LlmError::Unavailable(_)));
    assert!(matches!(classify_status(404, "no such model"), LlmError::Other(_)));
}

#[test]
fn test_status_mapping_reads_error_message() {
    let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}}"#;
    match classify_status(400, body) {
        LlmError::Auth(message) => assert!(message.starts_with("API key not valid")),
        other => panic!("Expected Auth error, got: {:?}", other),
    }

    let body = r#"{"error": {"message": "The input token count exceeds the maximum"}}"#;
    assert!(matches!(classify_status(400, body), LlmError::InputTooLong(_)));
}

#[test]
fn test_retryable_kinds() {
    assert!(classify_status(429, "").is_retryable());
    assert!(classify_status(500, "").is_retryable());
    assert!(!classify_status(401, "").is_retryable());
    assert!(!LlmError::ContentPolicy("SAFETY".into()).is_retryable());
    assert!(!LlmError::InputTooLong("x".into()).is_retryable());
    assert!(LlmError::Timeout(60).is_retryable());
    assert!(LlmError::Connection("reset".into()).is_retryable());
}

#[test]
fn test_extract_text_joins_parts() {
    let response = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "{\"commands\": " }, { "text": "[\"ls\"]}" }] },
            "finishReason": "STOP"
        }]
    });

    assert_eq!(extract_text(&response).unwrap(), "{\"commands\": [\"ls\"]}");
}

#[test]
fn test_extract_text_prompt_block() {
    let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
    assert_eq!(
        extract_text(&response),
        Err(LlmError::ContentPolicy("SAFETY".to_string()))
    );
}

#[test]
fn test_extract_text_candidate_block() {
    let response = json!({ "candidates": [{ "finishReason": "PROHIBITED_CONTENT" }] });
    assert!(matches!(extract_text(&response), Err(LlmError::ContentPolicy(_))));
}

#[test]
fn test_extract_text_without_candidates_is_empty() {
    assert_eq!(extract_text(&json!({})).unwrap(), "");
}

#[test]
fn test_request_body_shape() {
    let body = build_request_body("system", "user", &SamplingParams::planning());

    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "system");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "user");
    assert_eq!(body["generationConfig"]["topK"], 40);
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
}

#[test]
fn test_model_list_filtering() {
    let response = json!({
        "models": [
            { "name": "models/gemini-2.5-flash", "supportedGenerationMethods": ["generateContent"] },
            { "name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"] },
            { "name": "models/gemini-embedding", "supportedGenerationMethods": ["embedContent"] },
            { "name": "models/gemini-2.5-pro" }
        ]
    });

    assert_eq!(
        parse_model_list(&response),
        vec!["gemini-2.5-flash".to_string(), "gemini-2.5-pro".to_string()]
    );
}

#[test]
fn test_normalize_model_name() {
    assert_eq!(normalize_model_name("models/gemini-2.5-pro"), "gemini-2.5-pro");
    assert_eq!(normalize_model_name(" gemini-2.0-flash "), "gemini-2.0-flash");
    assert_eq!(normalize_model_name(""), DEFAULT_MODEL);
}

#[test]
fn test_client_requires_key() {
    assert!(matches!(GeminiClient::new("  ", DEFAULT_MODEL), Err(LlmError::Auth(_))));

    let mut client = GeminiClient::new("key", "models/gemini-2.5-flash").unwrap();
    assert_eq!(client.model(), "gemini-2.5-flash");
    client.set_model("gemini-2.5-pro");
    assert_eq!(client.model(), "gemini-2.5-pro");
}
