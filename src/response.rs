use crate::error::AnalysisError;
use crate::models::AnalysisResult;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn interpret(response: &RawResponse) -> Result<AnalysisResult, AnalysisError> {
    if !response.is_success() {
        return Err(AnalysisError::Server {
            status: response.status,
            detail: extract_detail(&response.body),
        });
    }

    let result: AnalysisResult = serde_json::from_str(&response.body)
        .map_err(|err| AnalysisError::Malformed(err.to_string()))?;
    result.validate().map_err(AnalysisError::Malformed)?;
    Ok(result)
}

/// Reads a string `detail` field from an error body, if there is one.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["detail"].as_str().map(String::from)
}
