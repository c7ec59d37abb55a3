use crate::node::NodeType;
use studio_types::{GraphState, StopPolicy};

/// Decides which node to execute next based on current state
pub trait Router: Send + Sync {
    fn next(&self, state: &GraphState, current: NodeType) -> NextNode;
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextNode {
    LLM,
    Tool,
    End,
}

/// React loop (LLM -> Tool -> LLM ...) that ends when the model stops calling
/// tools or when the agent's stop policy is met after a tool wave.
pub struct PolicyRouter {
    policy: StopPolicy,
}

impl PolicyRouter {
    pub fn new(policy: StopPolicy) -> Self {
        Self { policy }
    }

    fn should_stop(&self, state: &GraphState) -> bool {
        match &self.policy {
            StopPolicy::MaxSteps { steps } => state.steps >= *steps,
            StopPolicy::ToolCalled { tool_name } => state.tool_was_called(tool_name),
        }
    }
}

impl Router for PolicyRouter {
    fn next(&self, state: &GraphState, current: NodeType) -> NextNode {
        match current {
            NodeType::LLM => {
                if state.has_pending_tool_calls() {
                    NextNode::Tool
                } else {
                    NextNode::End
                }
            }
            NodeType::Tool => {
                if self.should_stop(state) {
                    NextNode::End
                } else {
                    NextNode::LLM
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_llm::{Message, ToolCall};
    use studio_types::LLMConfig;

    fn state_with_tool_call() -> GraphState {
        let mut state = GraphState::new("t", "u", vec![Message::human("hi")], LLMConfig::default());
        state.add_message(Message::ai_with_tools(vec![ToolCall::new("c1", "smartSearch", "{}")]));
        state
    }

    #[test]
    fn test_llm_routes_to_tools_when_requested() {
        let router = PolicyRouter::new(StopPolicy::max_steps(5));
        let state = state_with_tool_call();
        assert_eq!(router.next(&state, NodeType::LLM), NextNode::Tool);

        let plain = GraphState::new("t", "u", vec![Message::ai("done")], LLMConfig::default());
        assert_eq!(router.next(&plain, NodeType::LLM), NextNode::End);
    }

    #[test]
    fn test_max_steps_policy() {
        let router = PolicyRouter::new(StopPolicy::max_steps(2));
        let mut state = state_with_tool_call();
        state.steps = 1;
        assert_eq!(router.next(&state, NodeType::Tool), NextNode::LLM);
        state.steps = 2;
        assert_eq!(router.next(&state, NodeType::Tool), NextNode::End);
    }

    #[test]
    fn test_sentinel_policy_ignores_step_count() {
        let router = PolicyRouter::new(StopPolicy::tool_called("taskCompleted"));
        let mut state = state_with_tool_call();
        state.steps = 40;
        state.called_tools.push("smartSearch".to_string());
        assert_eq!(router.next(&state, NodeType::Tool), NextNode::LLM);

        state.called_tools.push("taskCompleted".to_string());
        assert_eq!(router.next(&state, NodeType::Tool), NextNode::End);
    }
}
