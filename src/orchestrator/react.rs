//! Thought/Action/Observation loop driven by the model's own text output.

use std::time::Duration;

use crate::core::model::{LanguageModel, ModelError};
use crate::core::tool::invoke;
use crate::domain::ToolResult;
use crate::tools::registry::ToolRegistry;

use super::prompt;

const FINAL_ANSWER: &str = "Final Answer:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const OBSERVATION: &str = "Observation:";

pub const MISSING_ACTION: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
pub const MISSING_ACTION_INPUT: &str = "Invalid Format: Missing 'Action Input:' after 'Action:'";
pub const EMPTY_FINAL_ANSWER: &str = "Invalid Format: Missing text after 'Final Answer:'";
const FORCE_FINAL: &str = "\n\nI now need to return a final answer based on the previous steps:";

/// What one model turn asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Final(String),
    Action { tool: String, input: String },
    Invalid(&'static str),
}

/// Drop anything from the first observation the model wrote for itself.
fn cut_observation(output: &str) -> &str {
    if output.trim_start().starts_with(OBSERVATION) {
        return "";
    }
    match output.find(&format!("\n{OBSERVATION}")) {
        Some(i) => &output[..i],
        None => output,
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}

/// Parse one model turn. Returns the kept text (for the transcript) and the step.
pub fn parse_step(output: &str) -> (&str, Step) {
    let text = cut_observation(output).trim_end();
    let final_at = text.find(FINAL_ANSWER);
    let action_at = text.find(ACTION);

    if let Some(f) = final_at {
        if action_at.map_or(true, |a| f < a) {
            // A trailing action after the answer is not part of it.
            let end = action_at.unwrap_or(text.len());
            let answer = text[f + FINAL_ANSWER.len()..end].trim();
            if answer.is_empty() {
                return (text, Step::Invalid(EMPTY_FINAL_ANSWER));
            }
            return (text, Step::Final(answer.to_string()));
        }
    }

    let Some(a) = action_at else {
        return (text, Step::Invalid(MISSING_ACTION));
    };
    let after_action = &text[a + ACTION.len()..];
    let tool = first_line(after_action).to_string();
    let Some(i) = after_action.find(ACTION_INPUT) else {
        return (text, Step::Invalid(MISSING_ACTION_INPUT));
    };
    if tool.is_empty() {
        return (text, Step::Invalid(MISSING_ACTION));
    }
    let input = after_action[i + ACTION_INPUT.len()..]
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    (text, Step::Action { tool, input })
}

/// Run the loop. Returns the final answer and every tool call made on the way.
pub(crate) async fn run(
    model: &dyn LanguageModel,
    registry: &ToolRegistry,
    question: &str,
    max_iterations: usize,
    tool_timeout: Duration,
) -> Result<(String, Vec<ToolResult>), ModelError> {
    let mut transcript = prompt::react(question, &registry.list());
    let mut calls = Vec::new();

    for iteration in 0..max_iterations {
        let output = model.generate(&transcript).await?;
        let (kept, step) = parse_step(&output);
        transcript.push(' ');
        transcript.push_str(kept.trim());

        let observation = match step {
            Step::Final(answer) => {
                tracing::debug!(iteration, tools = calls.len(), "final answer reached");
                return Ok((answer, calls));
            }
            Step::Action { tool, input } => match registry.get(&tool) {
                Some(t) => {
                    tracing::info!(iteration, tool = t.name(), input = %input, "agent action");
                    let result = invoke(t.as_ref(), &input, tool_timeout).await;
                    let obs = result.observation();
                    calls.push(result);
                    obs
                }
                None => {
                    tracing::warn!(iteration, tool = %tool, "agent chose unknown tool");
                    format!(
                        "{tool} is not a valid tool, try one of [{}].",
                        registry.names().join(", ")
                    )
                }
            },
            Step::Invalid(msg) => {
                tracing::warn!(iteration, "unparseable agent output");
                msg.to_string()
            }
        };
        transcript.push_str(&format!("\n{OBSERVATION} {observation}\nThought:"));
    }

    tracing::info!(max_iterations, "iteration limit reached, forcing final answer");
    transcript.push_str(FORCE_FINAL);
    let output = model.generate(&transcript).await?;
    let answer = match parse_step(&output) {
        (_, Step::Final(answer)) => answer,
        (_, Step::Invalid(EMPTY_FINAL_ANSWER)) => String::new(),
        (kept, _) => kept.trim().to_string(),
    };
    if answer.is_empty() {
        return Err(ModelError::Malformed("empty final answer".into()));
    }
    Ok((answer, calls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::math::MathTool;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned outputs and records every prompt it sees.
    struct Scripted {
        outputs: Mutex<VecDeque<&'static str>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(outputs: &[&'static str]) -> Self {
            Self {
                outputs: Mutex::new(outputs.iter().copied().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| ModelError::Malformed("script exhausted".into()))
        }
    }

    fn math_only() -> ToolRegistry {
        ToolRegistry::with_tools([Arc::new(MathTool) as Arc<dyn crate::core::tool::Tool>])
    }

    #[test]
    fn parses_actions_and_strips_quotes() {
        let (_, step) = parse_step(" I should add.\nAction: BasicMath\nAction Input: \"2+2\"");
        assert_eq!(step, Step::Action { tool: "BasicMath".into(), input: "2+2".into() });
    }

    #[test]
    fn cuts_self_written_observations() {
        let out = " add\nAction: BasicMath\nAction Input: 2+2\nObservation: 5\nThought: done\nFinal Answer: 5";
        let (kept, step) = parse_step(out);
        assert!(!kept.contains("Observation"));
        assert_eq!(step, Step::Action { tool: "BasicMath".into(), input: "2+2".into() });
    }

    #[test]
    fn final_answer_before_action_wins() {
        let (_, step) = parse_step(" I know it.\nFinal Answer: Paris\nAction: Wikipedia");
        assert_eq!(step, Step::Final("Paris".into()));
    }

    #[test]
    fn trailing_action_is_cut_from_final_answer() {
        let (_, step) = parse_step(" done\nFinal Answer: Paris is the capital.\nAction: Wikipedia\nAction Input: Paris");
        assert_eq!(step, Step::Final("Paris is the capital.".into()));
    }

    #[test]
    fn empty_final_answer_is_invalid() {
        assert_eq!(parse_step(" ok\nFinal Answer:   ").1, Step::Invalid(EMPTY_FINAL_ANSWER));
        assert_eq!(
            parse_step("Final Answer:\nAction: Wikipedia").1,
            Step::Invalid(EMPTY_FINAL_ANSWER)
        );
    }

    #[test]
    fn missing_action_is_invalid() {
        assert_eq!(parse_step("just rambling").1, Step::Invalid(MISSING_ACTION));
        assert_eq!(
            parse_step("Action: Wikipedia\n").1,
            Step::Invalid(MISSING_ACTION_INPUT)
        );
    }

    #[tokio::test]
    async fn runs_tool_then_returns_final_answer() {
        let model = Scripted::new(&[
            " I need to add.\nAction: BasicMath\nAction Input: 2+2",
            " I now know the final answer\nFinal Answer: 2+2 is 4.",
        ]);
        let (answer, calls) = run(&model, &math_only(), "What is 2+2?", 3, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(answer, "2+2 is 4.");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload.as_deref(), Some("4"));
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[1].ends_with("Action Input: 2+2\nObservation: 4\nThought:"));
    }

    #[tokio::test]
    async fn unknown_tools_get_a_corrective_observation() {
        let model = Scripted::new(&[
            "Action: Google\nAction Input: cats",
            "Final Answer: no idea",
        ]);
        let (answer, calls) = run(&model, &math_only(), "cats?", 3, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(answer, "no idea");
        assert!(calls.is_empty());
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[1].contains("Observation: Google is not a valid tool, try one of [BasicMath]."));
    }

    #[tokio::test]
    async fn forces_a_final_generation_after_the_limit() {
        let model = Scripted::new(&["hmm", "still thinking", "The answer is 4."]);
        let (answer, _) = run(&model, &math_only(), "q", 2, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(answer, "The answer is 4.");
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[1].contains(MISSING_ACTION));
        assert!(prompts[2].ends_with(FORCE_FINAL));
    }

    #[tokio::test]
    async fn empty_final_answer_gets_a_corrective_observation() {
        let model = Scripted::new(&[" ok\nFinal Answer:  ", "Final Answer: 4"]);
        let (answer, _) = run(&model, &math_only(), "q", 3, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(answer, "4");
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[1].ends_with(&format!("Observation: {EMPTY_FINAL_ANSWER}\nThought:")));
    }

    #[tokio::test]
    async fn empty_forced_final_answer_is_malformed() {
        let model = Scripted::new(&["hmm", "Final Answer:"]);
        let err = run(&model, &math_only(), "q", 1, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let model = Scripted::new(&[]);
        let err = run(&model, &math_only(), "q", 3, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));
    }
}
