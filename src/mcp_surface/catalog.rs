//! Static tool catalog: name, description, and JSON-schema input for the
//! fixed set of tools this gateway exposes. No transport, no JSON-RPC
//! server — the tool-registration protocol itself is out of scope; only
//! the metadata a host would register is published here.

use serde::Serialize;
use serde_json::{json, Value};

/// One entry in the tool catalog, mirroring the teacher's
/// `McpToolDescriptor { name, description, input_schema }` shape but
/// statically authored rather than discovered from a running server.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

const TOOL_NAMES: &[(&str, &str)] = &[
    ("deep-reasoning", "Extended step-by-step reasoning over a prompt."),
    ("investigate", "Open-ended investigation of a codebase or topic."),
    ("research", "Research a question, collecting and summarizing findings."),
    ("list-ai-models", "List models available from the configured providers."),
    ("analyze-code", "Analyze a code snippet or file for structure and behavior."),
    ("review-code", "Review a diff or file for correctness and style issues."),
    ("debug-issue", "Diagnose a bug given a description and relevant context."),
    ("plan-feature", "Produce an implementation plan for a requested feature."),
    ("generate-docs", "Generate documentation for the given code."),
    ("challenge", "Critically challenge a claim or proposed approach."),
    ("consensus", "Poll multiple providers/models for independent opinions."),
    ("planner", "Break a goal down into an ordered list of steps."),
    ("precommit", "Review staged changes before a commit."),
    ("secaudit", "Audit code or configuration for security issues."),
    ("tracer", "Trace a call path or data flow through a codebase."),
];

/// The common `provider`/`model` optional fields every tool's schema
/// carries, per the specification's tool table.
fn common_properties() -> Value {
    json!({
        "provider": {
            "type": "string",
            "enum": ["openai", "gemini", "azure", "grok", "bailian"],
            "description": "Upstream provider to use; defaults to the first configured provider in priority order."
        },
        "model": {
            "type": "string",
            "description": "Model name override; defaults to the provider's configured default."
        },
        "prompt": {
            "type": "string",
            "description": "The input text for this tool."
        }
    })
}

fn schema_for(name: &str) -> Value {
    json!({
        "type": "object",
        "properties": common_properties(),
        "required": if name == "list-ai-models" { json!([]) } else { json!(["prompt"]) },
    })
}

/// The full static catalog, in the order named by the specification.
pub fn catalog() -> Vec<ToolDescriptor> {
    TOOL_NAMES
        .iter()
        .map(|(name, description)| ToolDescriptor {
            name,
            description,
            input_schema: schema_for(name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_exactly_fifteen_tools() {
        assert_eq!(catalog().len(), 15);
    }

    #[test]
    fn list_ai_models_requires_no_prompt() {
        let entry = catalog().into_iter().find(|t| t.name == "list-ai-models").unwrap();
        assert_eq!(entry.input_schema["required"], json!([]));
    }

    #[test]
    fn every_other_tool_requires_prompt() {
        for tool in catalog().into_iter().filter(|t| t.name != "list-ai-models") {
            assert_eq!(tool.input_schema["required"], json!(["prompt"]));
        }
    }
}
