//! Prompt templates.

use crate::domain::ToolResult;
use crate::tools::registry::ToolMeta;

const ASSISTANT_PREAMBLE: &str = "You are a helpful research assistant. Answer the question \
clearly and concisely. When context from tools is provided, base your answer on it and \
include the source links it contains as references. If the context does not answer the \
question, say so and answer from what you already know.";

/// Prompt without tool context.
pub fn plain(question: &str) -> String {
    format!("{ASSISTANT_PREAMBLE}\n\nQuestion: {question}\nAnswer:")
}

/// Prompt with a `Context:` block built from successful tool payloads.
/// Falls back to [`plain`] when no result carries a payload.
pub fn augmented(question: &str, results: &[ToolResult]) -> String {
    let sections: Vec<String> = results
        .iter()
        .filter(|r| r.success)
        .filter_map(|r| {
            r.payload
                .as_deref()
                .map(|p| format!("[{}] (input: {})\n{}", r.tool, r.input, p.trim()))
        })
        .collect();
    if sections.is_empty() {
        return plain(question);
    }
    format!(
        "{ASSISTANT_PREAMBLE}\n\nContext:\n{}\n\nQuestion: {question}\nAnswer:",
        sections.join("\n\n")
    )
}

/// Opening prompt for the tool-using loop. The transcript is appended after the trailing `Thought:`.
pub fn react(question: &str, tools: &[ToolMeta]) -> String {
    let descriptions = tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    let names = match tools.len() {
        0 => String::from("(no tools available)"),
        1 => tools[0].name.to_string(),
        n => {
            let head: Vec<&str> = tools[..n - 1].iter().map(|t| t.name).collect();
            format!("{}, or {}", head.join(", "), tools[n - 1].name)
        }
    };
    format!(
        "You are a helpful research assistant that finds information using the available tools. \
Follow these guidelines strictly:

Available tools:

{descriptions}

Instructions:
. Use the exact tool name from the list above
. Keep queries simple and clear
. Use tools according to the type of information needed
. For research papers only use ArXiv and PubMed
. Summarize information from multiple sources when relevant
. Stop as soon as you have a clear answer with reference links

Use this exact format:

Question: the input question you must answer
Thought: analyze the question and decide which tool to use
Action: use EXACTLY one of these tools: {names}
Action Input: just the plain search query or math expression
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat if needed)
Thought: I now know the final answer
Final Answer: a complete answer based on the information gathered, followed by
References:
[1] link1
[2] link2

Begin!

Question: {question}
Thought:"
    )
}
