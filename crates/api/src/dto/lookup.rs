use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct LookupParams {
    pub domain: String,
    /// Record type name; defaults to `A`.
    #[serde(rename = "type", default = "default_type")]
    pub record_type: String,
}

fn default_type() -> String {
    "A".to_string()
}

#[derive(Serialize, Debug, Clone)]
pub struct LookupResponse {
    pub domain: String,
    #[serde(rename = "type")]
    pub record_type: String,
    /// `"cache"` or the answering upstream; `None` when the lookup failed.
    pub server: Option<String>,
    /// Record data lines, `["NXDOMAIN"]`, or the error message.
    pub result: Vec<String>,
}
