use serde::{Deserialize, Serialize};

pub const RESULT_OK: &str = "ok";

/// Body of a successful `/action/...` response.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionEnvelope {
    pub result: String,
    #[serde(default)]
    pub cmds: Vec<String>,
}

impl ActionEnvelope {
    pub fn ok(cmds: Vec<String>) -> Self {
        Self {
            result: RESULT_OK.to_string(),
            cmds,
        }
    }

    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn is_ok(&self) -> bool {
        self.result == RESULT_OK
    }
}
