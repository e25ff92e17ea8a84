use serde::{Deserialize, Serialize};

/// Filial do cliente, como devolvida por `GET /api/branches/{client_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch code, e.g. "01"
    #[serde(rename = "codigo")]
    pub code: String,
    /// Trade name shown next to the code
    #[serde(rename = "fantasia")]
    pub trade_name: String,
}

impl Branch {
    pub fn new(code: impl Into<String>, trade_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            trade_name: trade_name.into(),
        }
    }

    /// "01 - Matriz"
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.code, self.trade_name)
    }
}
