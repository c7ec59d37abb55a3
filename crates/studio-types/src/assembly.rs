use serde_json::Value;

use crate::part::{Part, StateTransitionError, ToolPart};

/// Builds the parts of one assistant message while a turn runs.
///
/// Final order is every tool part in the order the model requested them,
/// followed by the text of each step in step order. Consumers render the
/// result as-is.
#[derive(Debug, Clone, Default)]
pub struct PartsAccumulator {
    tools: Vec<ToolPart>,
    text_steps: Vec<String>,
}

impl PartsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text delta to the given step.
    pub fn push_text(&mut self, step: usize, delta: &str) {
        if self.text_steps.len() <= step {
            self.text_steps.resize(step + 1, String::new());
        }
        self.text_steps[step].push_str(delta);
    }

    /// Register a tool call whose input is still streaming. Repeated ids are ignored.
    pub fn start_tool(&mut self, tool_call_id: &str, tool_name: &str) {
        if self.find(tool_call_id).is_none() {
            self.tools.push(ToolPart::streaming(tool_call_id, tool_name));
        }
    }

    pub fn set_input(
        &mut self,
        tool_call_id: &str,
        tool_name: &str,
        input: Value,
    ) -> Result<(), StateTransitionError> {
        self.start_tool(tool_call_id, tool_name);
        self.tool_mut(tool_call_id)?.input_available(input)
    }

    pub fn complete(&mut self, tool_call_id: &str, output: Value) -> Result<(), StateTransitionError> {
        self.tool_mut(tool_call_id)?.complete(output)
    }

    pub fn fail(&mut self, tool_call_id: &str, error_text: &str) -> Result<(), StateTransitionError> {
        self.tool_mut(tool_call_id)?.fail(error_text)
    }

    pub fn tool(&self, tool_call_id: &str) -> Option<&ToolPart> {
        self.find(tool_call_id).map(|i| &self.tools[i])
    }

    pub fn tools(&self) -> &[ToolPart] {
        &self.tools
    }

    pub fn text(&self) -> String {
        self.text_steps.concat()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.text_steps.iter().all(String::is_empty)
    }

    /// Ordered parts: tools in call order, then non-empty step texts.
    pub fn to_parts(&self) -> Vec<Part> {
        self.tools
            .iter()
            .cloned()
            .map(Part::Tool)
            .chain(
                self.text_steps
                    .iter()
                    .filter(|t| !t.is_empty())
                    .map(|t| Part::text(t.clone())),
            )
            .collect()
    }

    fn find(&self, tool_call_id: &str) -> Option<usize> {
        self.tools.iter().position(|t| t.tool_call_id == tool_call_id)
    }

    fn tool_mut(&mut self, tool_call_id: &str) -> Result<&mut ToolPart, StateTransitionError> {
        match self.find(tool_call_id) {
            Some(i) => Ok(&mut self.tools[i]),
            None => Err(StateTransitionError {
                tool_call_id: tool_call_id.to_string(),
                from: "unknown",
                to: "output",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::ToolState;
    use serde_json::json;

    #[test]
    fn test_tools_before_text_in_call_order() {
        let mut acc = PartsAccumulator::new();
        acc.push_text(0, "Cerco ");
        acc.start_tool("b", "smartSearch");
        acc.start_tool("a", "taskPlanning");
        acc.set_input("b", "smartSearch", json!({"query": "x"})).unwrap();
        acc.set_input("a", "taskPlanning", json!({})).unwrap();
        // completion order differs from request order
        acc.complete("a", json!({"status": "plan_created"})).unwrap();
        acc.fail("b", "timeout").unwrap();
        acc.push_text(1, "Fatto.");

        let parts = acc.to_parts();
        let tags: Vec<String> = parts.iter().map(Part::type_tag).collect();
        assert_eq!(tags, vec!["tool-smartSearch", "tool-taskPlanning", "text", "text"]);
        assert_eq!(parts[0].as_tool().unwrap().state, ToolState::OutputError);
        assert_eq!(acc.text(), "Cerco Fatto.");
    }

    #[test]
    fn test_empty_steps_skipped() {
        let mut acc = PartsAccumulator::new();
        acc.push_text(2, "late");
        assert_eq!(acc.to_parts(), vec![Part::text("late")]);
    }

    #[test]
    fn test_duplicate_start_is_ignored() {
        let mut acc = PartsAccumulator::new();
        acc.start_tool("a", "smartSearch");
        acc.start_tool("a", "smartSearch");
        assert_eq!(acc.tools().len(), 1);
    }

    #[test]
    fn test_second_completion_rejected() {
        let mut acc = PartsAccumulator::new();
        acc.set_input("a", "taskCompleted", json!({"summary": "ok"})).unwrap();
        acc.complete("a", json!({"status": "completed"})).unwrap();
        assert!(acc.complete("a", json!({})).is_err());
        assert!(acc.complete("missing", json!({})).is_err());
    }
}
