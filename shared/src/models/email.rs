//! Bulk marketing mail payloads

use serde::{Deserialize, Serialize};

/// `POST /api/v1/email/send`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmailRequest {
    pub recipients: Vec<String>,
    pub subject: String,
    /// Overrides the built-in marketing template
    #[serde(default)]
    pub html: Option<String>,
}

/// Outcome for one recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResult {
    pub email: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmailResponse {
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<EmailResult>,
}

impl BulkEmailResponse {
    pub fn from_results(results: Vec<EmailResult>) -> Self {
        let sent = results.iter().filter(|r| r.success).count();
        Self {
            sent,
            failed: results.len() - sent,
            results,
        }
    }
}

/// `GET /api/v1/email/template`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub subject: String,
    pub html: String,
}
