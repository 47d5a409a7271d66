//! Prompt text for the diagram assistant.
//!
//! The assistant itself lives outside this crate. This module only builds
//! the prompt strings sent to it and cleans up what comes back.

use crate::config::Language;

/// One request to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistRequest<'a> {
    /// Draft a new diagram from a description.
    Generate { description: &'a str },
    /// Repair a buffer the renderer rejected.
    Fix { code: &'a str, error: &'a str },
    /// Explain a node (or an edge, `"A -> B"`) within a buffer.
    Explain {
        code: &'a str,
        element: &'a str,
        is_edge: bool,
    },
}

impl AssistRequest<'_> {
    /// User prompt text.
    pub fn prompt(&self) -> String {
        match self {
            AssistRequest::Generate { description } => format!(
                "Generate a Mermaid.js diagram (v11 compatible) based on this: \"{description}\".\n\
                 Return ONLY the raw mermaid code. No markdown blocks, no explanations."
            ),
            AssistRequest::Fix { code, error } => format!(
                "Fix this Mermaid.js code error.\nError: {error}\nCode:\n{code}\n\
                 Return ONLY the fixed mermaid code."
            ),
            AssistRequest::Explain {
                code,
                element,
                is_edge: true,
            } => format!("Explain the relationship \"{element}\" in this code:\n{code}"),
            AssistRequest::Explain { code, element, .. } => {
                format!("Explain the role of node \"{element}\" in this code:\n{code}")
            }
        }
    }

    /// System instruction, for requests that answer in prose.
    pub fn system_instruction(&self, language: Language) -> Option<&'static str> {
        match self {
            AssistRequest::Explain { .. } => Some(match language {
                Language::Ko => {
                    "당신은 시스템 아키텍트입니다. 한국어로 간결하고 전문적인 설명을 제공하세요."
                }
                Language::En => {
                    "You are a system architect. Provide a concise and professional explanation in English."
                }
            }),
            _ => None,
        }
    }

    /// Whether the reply is diagram code (and should go through [`clean_code`]).
    pub fn expects_code(&self) -> bool {
        !matches!(self, AssistRequest::Explain { .. })
    }
}

/// Strip Markdown fences from a model reply, leaving raw diagram source.
pub fn clean_code(reply: &str) -> String {
    reply.replace("```mermaid", "").replace("```", "").trim().to_string()
}
