//! Prompt building
//!
//! Both answer styles ask for a short Hindi answer suitable for text-to-speech;
//! the knowledge-base style additionally pins the model to the supplied text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Builds the message list for one question
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    answer_language: String,
    max_sentences: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            answer_language: "Hindi".to_string(),
            max_sentences: 3,
        }
    }
}

impl PromptBuilder {
    pub fn new(answer_language: impl Into<String>) -> Self {
        Self {
            answer_language: answer_language.into(),
            ..Default::default()
        }
    }

    fn style_rules(&self) -> String {
        format!(
            "Always answer in {} language. Keep the answer concise (2-{} sentences maximum). \
             The answer will be read aloud on a phone call, so do not use lists, markdown or emoji.",
            self.answer_language, self.max_sentences
        )
    }

    /// Open-domain answer
    pub fn general(&self, question: &str) -> Vec<Message> {
        vec![
            Message::system(format!(
                "You are a helpful phone assistant. {} \
                 If you don't know the answer, just say you don't have that information in {}.",
                self.style_rules(),
                self.answer_language
            )),
            Message::user(format!("Question: {}", question.trim())),
        ]
    }

    /// Answer restricted to `knowledge`
    pub fn knowledge_base(&self, organization: &str, knowledge: &str, question: &str) -> Vec<Message> {
        vec![
            Message::system(format!(
                "You are a helpful phone assistant for {}. \
                 Use ONLY the following information to answer the user's question. \
                 If the answer isn't found in the provided information, politely say you don't have that information. \
                 {}\n\nKNOWLEDGE BASE INFORMATION:\n{}",
                organization,
                self.style_rules(),
                knowledge.trim()
            )),
            Message::user(format!("USER QUESTION: {}", question.trim())),
        ]
    }
}
