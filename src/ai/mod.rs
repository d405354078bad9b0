//! Schedule drafting and risk analysis through a generative text service.

mod gemini;
mod prompts;
pub mod request;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Risk, Schedule};

pub use gemini::GeminiClient;
pub use request::{AiRequest, AiSession, Ticket};

pub const EXPECTED_RISKS: usize = 5;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("API_KEY is not configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("service returned an empty response")]
    EmptyResponse,
    #[error("response is not valid JSON for the requested shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can turn a prompt plus a response schema into JSON text.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<String, AiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTool {
    Schedule,
    Risk,
}

impl AiTool {
    pub fn title(&self) -> &'static str {
        match self {
            AiTool::Schedule => "AI Schedule Generator",
            AiTool::Risk => "AI Risk Analysis",
        }
    }

    /// The only error text users ever see for this tool.
    pub fn failure_message(&self) -> &'static str {
        match self {
            AiTool::Schedule => "Could not generate the schedule. Please try again.",
            AiTool::Risk => "Could not analyze the risks. Please try again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AiResult {
    Schedule(Schedule),
    Risks(Vec<Risk>),
}

/// One submission of the AI modal.
#[derive(Debug, Clone, PartialEq)]
pub enum AiQuery {
    Schedule {
        description: String,
        duration_days: u32,
        start_date: NaiveDate,
    },
    Risk {
        description: String,
    },
}

impl AiQuery {
    pub fn tool(&self) -> AiTool {
        match self {
            AiQuery::Schedule { .. } => AiTool::Schedule,
            AiQuery::Risk { .. } => AiTool::Risk,
        }
    }
}

pub fn parse_schedule(text: &str) -> Result<Schedule, AiError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(serde_json::from_str(text)?)
}

pub fn parse_risks(text: &str) -> Result<Vec<Risk>, AiError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    let risks: Vec<Risk> = serde_json::from_str(text)?;
    if risks.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    if risks.len() != EXPECTED_RISKS {
        tracing::warn!(count = risks.len(), "risk analysis returned an unexpected number of risks");
    }
    Ok(risks)
}

pub async fn request_schedule(
    generator: &dyn ContentGenerator,
    description: &str,
    duration_days: u32,
    start_date: NaiveDate,
) -> Result<Schedule, AiError> {
    let prompt = prompts::schedule_prompt(description, duration_days, start_date);
    let text = generator
        .generate_json(&prompt, &prompts::schedule_schema())
        .await?;
    parse_schedule(&text)
}

pub async fn request_risk_analysis(
    generator: &dyn ContentGenerator,
    description: &str,
) -> Result<Vec<Risk>, AiError> {
    let prompt = prompts::risk_prompt(description);
    let text = generator.generate_json(&prompt, &prompts::risk_schema()).await?;
    parse_risks(&text)
}

/// Run `query` and collapse any failure into the tool's fixed user message.
/// The underlying cause is logged.
pub async fn run(generator: &dyn ContentGenerator, query: &AiQuery) -> Result<AiResult, String> {
    let tool = query.tool();
    let outcome = match query {
        AiQuery::Schedule {
            description,
            duration_days,
            start_date,
        } => request_schedule(generator, description, *duration_days, *start_date)
            .await
            .map(AiResult::Schedule),
        AiQuery::Risk { description } => request_risk_analysis(generator, description)
            .await
            .map(AiResult::Risks),
    };

    match outcome {
        Ok(result) => {
            tracing::info!(?tool, "AI request succeeded");
            Ok(result)
        }
        Err(e) => {
            tracing::error!(?tool, error = %e, "AI request failed");
            Err(tool.failure_message().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Replays a canned response and records the prompts it saw.
    struct StubGenerator {
        response: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for StubGenerator {
        async fn generate_json(&self, prompt: &str, _schema: &Value) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(AiError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }

    const SCHEDULE_JSON: &str = r#"
        {"phases": [
            {"name": "Planning", "duration": "15 days", "tasks": ["Permits", "Survey"]},
            {"name": "Foundation", "duration": "30 days", "tasks": ["Excavation"]}
        ]}
    "#;

    fn risks_json(n: usize) -> String {
        let items: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"risk": "risk {}", "probability": "Medium", "mitigation": "plan {}"}}"#,
                    i, i
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[tokio::test]
    async fn schedule_is_parsed() {
        let stub = StubGenerator::ok(SCHEDULE_JSON);
        let schedule = request_schedule(&stub, "House", 90, start()).await.unwrap();
        assert_eq!(schedule.phases.len(), 2);
        assert_eq!(schedule.phases[0].tasks, vec!["Permits", "Survey"]);

        let prompts = stub.prompts.lock().unwrap();
        assert!(prompts[0].contains("90 days"));
        assert!(prompts[0].contains("2025-01-10"));
    }

    #[tokio::test]
    async fn risks_are_parsed_in_order() {
        let stub = StubGenerator::ok(&risks_json(5));
        let risks = request_risk_analysis(&stub, "Bridge").await.unwrap();
        assert_eq!(risks.len(), 5);
        assert_eq!(risks[0].risk, "risk 0");
        assert_eq!(risks[4].mitigation, "plan 4");
    }

    #[test]
    fn unexpected_risk_count_is_accepted() {
        assert_eq!(parse_risks(&risks_json(3)).unwrap().len(), 3);
    }

    #[test]
    fn empty_risk_list_is_a_failure() {
        assert!(matches!(parse_risks("[]"), Err(AiError::EmptyResponse)));
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(parse_schedule("Sure! Here is"), Err(AiError::Malformed(_))));
        assert!(matches!(parse_schedule("   "), Err(AiError::EmptyResponse)));
    }

    #[test]
    fn schema_violations_are_malformed() {
        // tasks must be strings
        let bad = r#"{"phases": [{"name": "A", "duration": "1", "tasks": [1, 2]}]}"#;
        assert!(matches!(parse_schedule(bad), Err(AiError::Malformed(_))));
        // risk list instead of schedule object
        assert!(parse_schedule(&risks_json(5)).is_err());
        // missing mitigation
        assert!(parse_risks(r#"[{"risk": "x", "probability": "Low"}]"#).is_err());
    }

    #[tokio::test]
    async fn run_maps_failures_to_fixed_messages() {
        let query = AiQuery::Schedule {
            description: "House".to_string(),
            duration_days: 30,
            start_date: start(),
        };
        let err = run(&StubGenerator::ok("not json"), &query).await.unwrap_err();
        assert_eq!(err, "Could not generate the schedule. Please try again.");

        let risk = AiQuery::Risk {
            description: "House".to_string(),
        };
        let err = run(&StubGenerator::failing(), &risk).await.unwrap_err();
        assert_eq!(err, "Could not analyze the risks. Please try again.");
    }

    #[tokio::test]
    async fn failed_request_keeps_session_off_prior_result() {
        let mut session = AiSession::new();
        let query = AiQuery::Schedule {
            description: "House".to_string(),
            duration_days: 30,
            start_date: start(),
        };

        let t1 = session.submit(query.tool()).unwrap();
        let ok = run(&StubGenerator::ok(SCHEDULE_JSON), &query).await;
        session.complete(t1, ok);
        assert!(matches!(session.state(), AiRequest::Succeeded(AiResult::Schedule(_))));

        let t2 = session.submit(query.tool()).unwrap();
        let failed = run(&StubGenerator::ok("{\"phases\": 3}"), &query).await;
        session.complete(t2, failed);
        assert_eq!(
            session.state(),
            &AiRequest::Failed(AiTool::Schedule.failure_message().to_string())
        );
    }
}
