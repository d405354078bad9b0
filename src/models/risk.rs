use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub risk: String,
    /// Free text, normally Low / Medium / High
    pub probability: String,
    pub mitigation: String,
}
