use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use studio_llm::{ChatClient, ChatOptions, ChatRequest, Message, ResponseFormat};
use tracing::{debug, info, warn};

use crate::error::{required_str, ToolError};
use crate::registry::{Tool, ToolDefinition, ToolKind};
use crate::{iso_timestamp, TASK_PLANNING};

pub const DEFAULT_PLANNER_MODEL: &str = "openai/gpt-4.1-mini";

const PLANNER_PROMPT: &str = r#"Sei un esperto di task planning per agent AI. Il tuo compito è decomporre la richiesta dell'utente in task logici, sequenziali e ben strutturati.

ISTRUZIONI:
1. Analizza la richiesta e identifica tutti i task necessari per completarla
2. Organizza i task in ordine logico sequenziale
3. Indica le dipendenze tra task tramite i loro taskId
4. Specifica quali strumenti servono per ciascun task
5. Mantieni i task specifici, azionabili e chiari

ESEMPIO:
Richiesta: "Cerca notizie su AI, salva su Notion e invia una email"
- task_1: Cerca notizie recenti su AI (smartSearch)
- task_2: Salva le informazioni su Notion (notion), dipende da task_1
- task_3: Invia una email con il riepilogo (gmail), dipende da task_1 e task_2

Includi solo i task necessari per completare la richiesta."#;

/// One step of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTask {
    pub task_id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskPlan {
    #[serde(default)]
    pub tasks: Vec<PlannedTask>,
}

fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "taskId": {"type": "string", "description": "Identificativo univoco (es: task_1)"},
                        "title": {"type": "string", "description": "Titolo breve del task"},
                        "description": {"type": "string", "description": "Cosa fare nel dettaglio"},
                        "requiredTools": {"type": "array", "items": {"type": "string"}},
                        "dependencies": {"type": "array", "items": {"type": "string"}}
                    },
                    "required": ["taskId", "title", "description", "requiredTools", "dependencies"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["tasks"],
        "additionalProperties": false
    })
}

/// `taskPlanning`: breaks a complex request into ordered tasks with a dedicated model.
///
/// The plan is advisory. Nothing enforces its dependency order; the chat model
/// reads it and acts on it.
pub struct TaskPlanningTool {
    definition: ToolDefinition,
    client: Arc<dyn ChatClient>,
    model: String,
}

impl TaskPlanningTool {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        let definition = ToolDefinition::new(
            TASK_PLANNING,
            "Decompone una richiesta dell'utente in una lista logica di task usando un modello dedicato. \
             Usalo quando la richiesta è complessa e richiede più azioni o più strumenti. \
             Non usarlo per domande semplici o richieste che richiedono una sola azione.",
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "userRequest": {
                    "type": "string",
                    "description": "La richiesta completa dell'utente da decomporre in task"
                }
            },
            "required": ["userRequest"]
        }));

        Self {
            definition,
            client,
            model: DEFAULT_PLANNER_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub async fn plan(&self, user_request: &str) -> anyhow::Result<TaskPlan> {
        let messages = vec![
            Message::system(PLANNER_PROMPT),
            Message::human(format!("RICHIESTA DELL'UTENTE:\n\"{}\"", user_request)),
        ];
        let options = ChatOptions::new()
            .temperature(0.0)
            .response_format(ResponseFormat::json_schema("task_plan", plan_schema()));

        let response = self
            .client
            .chat(ChatRequest::new(&self.model, messages).with_options(options))
            .await
            .context("Planner request failed")?;

        response.parse_json().context("Planner returned an invalid plan")
    }
}

#[async_trait]
impl Tool for TaskPlanningTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn kind(&self) -> ToolKind {
        ToolKind::TaskPlanning
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let user_request = required_str(&input, "userRequest")?;

        match self.plan(user_request).await {
            Ok(plan) => {
                info!(tasks = plan.tasks.len(), "Work plan created");
                for task in &plan.tasks {
                    debug!(
                        task_id = %task.task_id,
                        title = %task.title,
                        tools = ?task.required_tools,
                        depends_on = ?task.dependencies,
                        "Planned task"
                    );
                }
                Ok(json!({
                    "status": "plan_created",
                    "message": "Piano di lavoro creato con successo",
                    "userRequest": user_request,
                    "tasksCount": plan.tasks.len(),
                    "tasks": plan.tasks,
                    "timestamp": iso_timestamp(),
                }))
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Task planning failed");
                Ok(json!({
                    "status": "error",
                    "message": "Errore nella creazione del piano di lavoro",
                    "userRequest": user_request,
                    "error": format!("{:#}", e),
                    "timestamp": iso_timestamp(),
                }))
            }
        }
    }
}
