//! Prompt registry (C8)
//!
//! Mirrors `registry::tool`'s shape but, per the data model in spec §3, a
//! `Prompt` carries no `implementation` — it is template data (`messages[]`
//! with `{{name}}` placeholders) and the registry itself performs verbatim
//! substitution at `prompts/get` time. Missing arguments leave the
//! placeholder untouched rather than erroring.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::integration::error::{McpError, McpResult};
use crate::protocol::types::{Content, GetPromptResult, Prompt, PromptMessage};

/// Per-call context handed to a prompt render. Unused today (prompt
/// rendering is pure substitution, no session-scoped state) but kept for
/// symmetry with `ToolContext`/`ResourceContext` and because a future
/// dynamic-prompt handler would need it.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub session_id: String,
}

/// Dynamic registry of prompt templates.
#[derive(Clone, Default)]
pub struct PromptRegistry {
    prompts: Arc<DashMap<String, Prompt>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self {
            prompts: Arc::new(DashMap::new()),
        }
    }

    pub fn add_prompt(&self, prompt: Prompt) -> bool {
        self.prompts.insert(prompt.name.clone(), prompt).is_some()
    }

    pub fn remove_prompt(&self, name: &str) -> bool {
        self.prompts.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// `prompts/list` strips `messages`, leaving only the advertised shape
    /// (`name`, `description`, `arguments`, `title`).
    pub fn list_prompts(&self) -> Vec<Prompt> {
        let mut prompts: Vec<Prompt> = self
            .prompts
            .iter()
            .map(|e| {
                let mut p = e.value().clone();
                p.messages.clear();
                p
            })
            .collect();
        prompts.sort_by(|a, b| a.name.cmp(&b.name));
        prompts
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prompts.contains_key(name)
    }

    /// Render `name`'s messages, substituting `{{arg}}` with `arguments[arg]`
    /// wherever it appears in text content. An unknown prompt name is a
    /// protocol-level `invalid-params` error (§4.2); a missing argument for a
    /// placeholder that IS present is not an error, the placeholder is left
    /// verbatim (§4.8).
    pub async fn get_prompt(
        &self,
        name: &str,
        _ctx: PromptContext,
        arguments: HashMap<String, String>,
    ) -> McpResult<GetPromptResult> {
        let prompt = self
            .prompts
            .get(name)
            .ok_or_else(|| McpError::prompt_not_found(name))?
            .clone();

        let messages = prompt
            .messages
            .into_iter()
            .map(|m| substitute_message(m, &arguments))
            .collect();

        Ok(GetPromptResult::new(prompt.description, messages))
    }
}

fn substitute_message(message: PromptMessage, arguments: &HashMap<String, String>) -> PromptMessage {
    let content = match message.content {
        Content::Text { text, uri, mime_type } => Content::Text {
            text: substitute_template(&text, arguments),
            uri,
            mime_type,
        },
        other => other,
    };
    PromptMessage {
        role: message.role,
        content,
    }
}

/// Replace every `{{name}}` in `template` whose `name` is a key in
/// `arguments`; placeholders with no matching argument are left untouched.
fn substitute_template(template: &str, arguments: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let var_name = after_open[..end].trim();
                match arguments.get(var_name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after_open[end + 2..];
            }
            None => {
                // Unterminated "{{": emit verbatim and stop scanning.
                out.push_str(&rest[start..]);
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::PromptArgument;

    fn greeting_prompt() -> Prompt {
        Prompt {
            name: "greeting".to_string(),
            title: Some("Greeting".to_string()),
            description: Some("Greets the named person".to_string()),
            arguments: vec![PromptArgument::required("name", Some("Who to greet"))],
            messages: vec![PromptMessage::user(Content::text(
                "Hello, {{name}}! Today is {{day}}.",
            ))],
        }
    }

    #[tokio::test]
    async fn add_and_render_prompt() {
        let registry = PromptRegistry::new();
        registry.add_prompt(greeting_prompt());

        let ctx = PromptContext {
            session_id: "s1".to_string(),
        };
        let mut args = HashMap::new();
        args.insert("name".to_string(), "Ada".to_string());

        let result = registry.get_prompt("greeting", ctx, args).await.unwrap();
        assert_eq!(
            result.messages[0].content.as_text(),
            Some("Hello, Ada! Today is {{day}}.")
        );
    }

    #[tokio::test]
    async fn unknown_prompt_is_protocol_error() {
        let registry = PromptRegistry::new();
        let ctx = PromptContext {
            session_id: "s1".to_string(),
        };
        let err = registry
            .get_prompt("missing", ctx, HashMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), -32602);
    }

    #[test]
    fn list_prompts_strips_messages() {
        let registry = PromptRegistry::new();
        registry.add_prompt(greeting_prompt());
        let listed = registry.list_prompts();
        assert!(listed[0].messages.is_empty());
        assert_eq!(listed[0].name, "greeting");
    }

    #[test]
    fn remove_prompt_triggers_list_changed_upstream() {
        let registry = PromptRegistry::new();
        registry.add_prompt(greeting_prompt());
        assert!(registry.remove_prompt("greeting"));
        assert!(registry.list_prompts().is_empty());
    }
}
