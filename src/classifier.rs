//! 分類サービスとの通信
//!
//! リクエストをJSONでPOSTし、`results` を受け取る。リトライはしない。

use crate::error::{ClassifierError, Result};
use async_trait::async_trait;
use sheet_classifier_common::{ClassificationRequest, ClassificationResult, ServiceResponse};
use std::time::Duration;
use tracing::{debug, instrument};

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Vec<ClassificationResult>>;
}

pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    /// `timeout` がNoneならHTTPクライアントの既定値を使う
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClassifierError::Config(format!("HTTPクライアント初期化エラー: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn classify(&self, request: &ClassificationRequest) -> Result<Vec<ClassificationResult>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        debug!(status, bytes = body.len(), "レスポンス受信");
        parse_response(status, &body)
    }
}

/// レスポンスを解釈する
///
/// - 2xx以外: `error` があればそのメッセージ、なければステータスで `Service`
/// - 2xxで `error` のみ: サービス側の失敗として `Service`
/// - 2xxでJSONでない・`results` がない・確率が0〜1外: `MalformedResponse`
pub fn parse_response(status: u16, body: &[u8]) -> Result<Vec<ClassificationResult>> {
    let parsed = serde_json::from_slice::<ServiceResponse>(body);

    if !(200..300).contains(&status) {
        let message = parsed
            .ok()
            .and_then(|r| r.error)
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(ClassifierError::Service { status, message });
    }

    let parsed = parsed.map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;
    let results = match (parsed.results, parsed.error) {
        (Some(results), _) => results,
        (None, Some(message)) => return Err(ClassifierError::Service { status, message }),
        (None, None) => {
            return Err(ClassifierError::MalformedResponse(
                "missing field `results`".to_string(),
            ))
        }
    };

    if let Some(bad) = results
        .iter()
        .find(|r| !(0.0..=1.0).contains(&r.probability))
    {
        return Err(ClassifierError::MalformedResponse(format!(
            "probability out of range: {}",
            bad.probability
        )));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_classifier_common::CellValue;

    #[test]
    fn test_parse_success() {
        let body = br#"{"results":[{"item":"apple","category":"fruit","probability":0.91}]}"#;
        let results = parse_response(200, body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item, CellValue::from("apple"));
        assert_eq!(results[0].category, CellValue::from("fruit"));
        assert_eq!(results[0].probability, 0.91);
    }

    #[test]
    fn test_parse_empty_results() {
        assert!(parse_response(200, br#"{"results":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_service_error() {
        let err = parse_response(500, br#"{"error":"rate limited"}"#).unwrap_err();
        match &err {
            ClassifierError::Service { status, message } => {
                assert_eq!(*status, 500);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "Error: rate limited");
    }

    #[test]
    fn test_parse_non_json_error_status() {
        let err = parse_response(502, b"<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ClassifierError::Service { status: 502, .. }));
        assert_eq!(err.to_string(), "Error: HTTP 502");
    }

    #[test]
    fn test_parse_error_in_success_status() {
        let err = parse_response(200, br#"{"error":"quota exceeded"}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::Service { status: 200, .. }));
    }

    #[test]
    fn test_parse_malformed() {
        let bodies: [&[u8]; 5] = [
            b"not json",
            br#"{}"#,
            br#"{"results":[{"item":"apple"}]}"#,
            br#"{"results":"nope"}"#,
            br#"{"results":[{"item":"a","category":"b","probability":1.5}]}"#,
        ];
        for body in bodies {
            let err = parse_response(200, body).unwrap_err();
            assert!(
                matches!(err, ClassifierError::MalformedResponse(_)),
                "body {:?} -> {:?}",
                String::from_utf8_lossy(body),
                err
            );
        }
    }
}
