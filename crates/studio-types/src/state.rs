use crate::assembly::PartsAccumulator;
use crate::config::LLMConfig;
use studio_llm::{Content, Message, ToolCall};

/// Working state of one turn
#[derive(Debug, Clone)]
pub struct GraphState {
    pub thread_id: String,
    pub user_id: String,
    pub run_id: String,
    pub messages: Vec<Message>,
    pub llm_config: LLMConfig,
    /// Model steps completed so far
    pub steps: usize,
    /// Names of every tool called this turn, in call order
    pub called_tools: Vec<String>,
    pub parts: PartsAccumulator,
}

impl GraphState {
    pub fn new(
        thread_id: impl Into<String>,
        user_id: impl Into<String>,
        messages: Vec<Message>,
        llm_config: LLMConfig,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            user_id: user_id.into(),
            run_id: uuid::Uuid::new_v4().to_string(),
            messages,
            llm_config,
            steps: 0,
            called_tools: Vec::new(),
            parts: PartsAccumulator::new(),
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        !self.get_pending_tool_calls().is_empty()
    }

    pub fn get_pending_tool_calls(&self) -> Vec<ToolCall> {
        match self.last_message() {
            Some(Message::AI { tool_calls: Some(calls), .. }) => calls.clone(),
            _ => Vec::new(),
        }
    }

    pub fn add_tool_result(&mut self, tool_call_id: String, result: String) {
        self.messages.push(Message::Tool {
            tool_call_id,
            content: Content::text(result),
        });
    }

    pub fn tool_was_called(&self, tool_name: &str) -> bool {
        self.called_tools.iter().any(|t| t == tool_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_tool_calls() {
        let mut state = GraphState::new("t", "u", vec![Message::human("hi")], LLMConfig::default());
        assert!(!state.has_pending_tool_calls());

        state.add_message(Message::ai_with_tools(vec![ToolCall::new("c1", "smartSearch", "{}")]));
        assert_eq!(state.get_pending_tool_calls().len(), 1);

        state.add_tool_result("c1".to_string(), "{}".to_string());
        assert!(!state.has_pending_tool_calls());
    }
}
