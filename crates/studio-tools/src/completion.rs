use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ToolError;
use crate::registry::{Tool, ToolDefinition, ToolKind};
use crate::{iso_timestamp, TASK_COMPLETED};

/// `taskCompleted`: no side effect. Its invocation is what ends a sentinel-policy turn.
pub struct TaskCompletedTool {
    definition: ToolDefinition,
}

impl TaskCompletedTool {
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            TASK_COMPLETED,
            "Segnala che hai completato tutti i task richiesti dall'utente. Usalo SOLO quando hai \
             completato tutte le attività e fornito una risposta completa. Non usarlo se devi ancora \
             eseguire azioni o se la risposta è parziale.",
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "Breve riepilogo di ciò che è stato completato"
                }
            },
            "required": ["summary"]
        }));
        Self { definition }
    }
}

impl Default for TaskCompletedTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TaskCompletedTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn kind(&self) -> ToolKind {
        ToolKind::TaskCompleted
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let summary = input
            .get("summary")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .to_string();
        info!(summary = %summary, "Agent reported task completion");

        Ok(json!({
            "status": "completed",
            "message": "Task completato con successo",
            "summary": summary,
            "timestamp": iso_timestamp(),
        }))
    }
}
