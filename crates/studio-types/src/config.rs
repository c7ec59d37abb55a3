use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Hard ceiling on node executions per turn, independent of the stop policy
    pub max_iterations: usize,
    pub tool_timeout: Duration,
    /// Longest silence tolerated between two model stream chunks
    pub stream_idle_timeout: Duration,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tool_timeout: Duration::from_secs(30),
            stream_idle_timeout: Duration::from_secs(30),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::new("openai/gpt-oss-20b:free")
    }
}

/// When the loop stops asking the model for further steps.
///
/// The two policies are exclusive; each agent picks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopPolicy {
    /// Stop after this many model steps
    MaxSteps { steps: usize },
    /// Stop once the model has called the named tool
    ToolCalled { tool_name: String },
}

impl StopPolicy {
    pub fn max_steps(steps: usize) -> Self {
        StopPolicy::MaxSteps { steps }
    }

    pub fn tool_called(tool_name: impl Into<String>) -> Self {
        StopPolicy::ToolCalled {
            tool_name: tool_name.into(),
        }
    }
}

/// Agent definition: which tools it gets and when it stops
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    /// Built-in tool names exposed to this agent
    pub builtin_tools: Vec<String>,
    /// Whether the caller's connector tools are merged in
    pub connectors: bool,
    /// Whether the system prompt describes the plan/complete workflow
    pub planning_workflow: bool,
    pub stop_policy: StopPolicy,
}

impl AgentProfile {
    pub const STUDIO: &'static str = "studio";
    pub const DEFAULT: &'static str = "default";

    pub fn studio() -> Self {
        Self {
            id: Self::STUDIO.to_string(),
            name: "Studio".to_string(),
            builtin_tools: vec![
                "smartSearch".to_string(),
                "taskPlanning".to_string(),
                "taskCompleted".to_string(),
            ],
            connectors: true,
            planning_workflow: true,
            stop_policy: StopPolicy::tool_called("taskCompleted"),
        }
    }

    pub fn default_agent() -> Self {
        Self {
            id: Self::DEFAULT.to_string(),
            name: "Agente".to_string(),
            builtin_tools: vec!["smartSearch".to_string()],
            connectors: false,
            planning_workflow: false,
            stop_policy: StopPolicy::max_steps(5),
        }
    }

    /// Look up an agent by id. Unknown ids get the default agent.
    pub fn resolve(agent_id: Option<&str>) -> Self {
        match agent_id.unwrap_or(Self::STUDIO) {
            Self::STUDIO => Self::studio(),
            _ => Self::default_agent(),
        }
    }

    pub fn with_stop_policy(mut self, policy: StopPolicy) -> Self {
        self.stop_policy = policy;
        self
    }
}
