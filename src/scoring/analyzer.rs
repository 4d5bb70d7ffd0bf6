// External ML analyzer interface
//
// The engine never requires an analyzer: a session built without one scores
// heuristically. Implementations only need to turn text into an `MlAnalysis`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::types::{AnalysisContext, MlAnalysis};

/// Trait for external crisis analyzers
#[async_trait]
pub trait MlAnalyzer: Send + Sync {
    /// Analyze a piece of text
    async fn analyze(&self, text: &str, context: &AnalysisContext) -> Result<MlAnalysis>;

    /// Analyzer name for logs and metrics
    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cultural_context: Option<&'a str>,
}

/// JSON-over-HTTP analyzer
///
/// POSTs `{text, userId, languageCode, culturalContext}` to the endpoint and
/// expects an `MlAnalysis` body back.
#[derive(Clone)]
pub struct HttpMlAnalyzer {
    client: Client,
    endpoint: String,
}

impl HttpMlAnalyzer {
    /// Create a new analyzer with a request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

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
impl MlAnalyzer for HttpMlAnalyzer {
    async fn analyze(&self, text: &str, context: &AnalysisContext) -> Result<MlAnalysis> {
        let request = AnalyzeRequest {
            text,
            user_id: context.user_id.as_deref(),
            language_code: context.language_code.as_deref(),
            cultural_context: context.cultural_context.as_deref(),
        };

        tracing::debug!(endpoint = %self.endpoint, "Sending analysis request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.endpoint))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "ML analyzer request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        response
            .json::<MlAnalysis>()
            .await
            .context("Failed to parse ML analyzer response")
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_http_analyzer_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "text": "I feel hopeless",
                "languageCode": "en"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"hasCrisisIndicators":true,"mlConfidence":0.8,
                    "realTimeRisk":{"immediateRisk":72,"interventionUrgency":"high"}}"#,
            )
            .create_async()
            .await;

        let analyzer =
            HttpMlAnalyzer::new(format!("{}/analyze", server.url()), Duration::from_secs(5))
                .unwrap();
        let context = AnalysisContext::new().with_language("en");
        let analysis = analyzer.analyze("I feel hopeless", &context).await.unwrap();

        mock.assert_async().await;
        assert!(analysis.has_crisis_indicators);
        assert_eq!(analysis.real_time_risk.unwrap().immediate_risk, 72.0);
    }

    #[tokio::test]
    async fn test_http_analyzer_tolerates_unknown_urgency() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"realTimeRisk":{"immediateRisk":48,"interventionUrgency":"moderate"}}"#)
            .create_async()
            .await;

        let analyzer =
            HttpMlAnalyzer::new(format!("{}/analyze", server.url()), Duration::from_secs(5))
                .unwrap();
        let analysis = analyzer
            .analyze("text", &AnalysisContext::default())
            .await
            .unwrap();

        let risk = analysis.real_time_risk.unwrap();
        assert_eq!(risk.immediate_risk, 48.0);
        assert_eq!(
            risk.intervention_urgency,
            crate::scoring::InterventionUrgency::Unknown
        );
    }

    #[tokio::test]
    async fn test_http_analyzer_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let analyzer =
            HttpMlAnalyzer::new(format!("{}/analyze", server.url()), Duration::from_secs(5))
                .unwrap();
        let err = analyzer
            .analyze("text", &AnalysisContext::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_http_analyzer_bad_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let analyzer =
            HttpMlAnalyzer::new(format!("{}/analyze", server.url()), Duration::from_secs(5))
                .unwrap();
        let result = analyzer.analyze("text", &AnalysisContext::default()).await;
        assert!(result.is_err());
    }
}
