use chrono::NaiveDate;
use serde_json::{json, Value};

pub fn schedule_prompt(description: &str, duration_days: u32, start_date: NaiveDate) -> String {
    format!(
        "You are a construction project management assistant. Create a detailed schedule \
         for the following project: \"{}\". The project must last {} days, starting on {}. \
         The schedule must include the main phases (e.g. Planning, Foundation, Structure, \
         Finishing, Handover) and specific tasks for each phase, with duration estimates \
         in days. Format the output as JSON.",
        description,
        duration_days,
        start_date.format("%Y-%m-%d"),
    )
}

pub fn risk_prompt(description: &str) -> String {
    format!(
        "You are a risk analysis specialist for construction projects. For the project \
         described as \"{}\", identify 5 potential risks. For each risk, provide a short \
         description, the probability of occurrence (Low, Medium, High) and a mitigation \
         strategy. Format the output as JSON.",
        description,
    )
}

/// `{phases: [{name, duration, tasks: [string]}]}`
pub fn schedule_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "phases": {
                "type": "ARRAY",
                "description": "List of project phases.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Phase name." },
                        "duration": {
                            "type": "STRING",
                            "description": "Estimated phase duration in days."
                        },
                        "tasks": {
                            "type": "ARRAY",
                            "description": "Tasks within the phase.",
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["name", "duration", "tasks"]
                }
            }
        },
        "required": ["phases"]
    })
}

/// `[{risk, probability, mitigation}]`
pub fn risk_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "risk": { "type": "STRING", "description": "Description of the risk." },
                "probability": {
                    "type": "STRING",
                    "description": "Probability of occurrence (Low, Medium, High)."
                },
                "mitigation": {
                    "type": "STRING",
                    "description": "Suggested mitigation strategy."
                }
            },
            "required": ["risk", "probability", "mitigation"]
        }
    })
}
