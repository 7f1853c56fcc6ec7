//! Persona registry: named system instructions

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Substitution point in a persona template
const QUESTION_MARKER: &str = "\n\nQuestion: {question}";

const DEFAULT_TEMPLATE: &str = "You are a helpful assistant. Please respond to the user queries.\n\nQuestion: {question}";
const PROFESSIONAL_TEMPLATE: &str = "You are a professional consultant with expertise in various fields. Please provide detailed, well-structured, and accurate information.\n\nQuestion: {question}";
const CREATIVE_TEMPLATE: &str = "You are a creative assistant with a flair for imaginative responses. Feel free to think outside the box while being helpful.\n\nQuestion: {question}";
const CONCISE_TEMPLATE: &str = "You are a concise assistant. Provide brief, clear answers without unnecessary details.\n\nQuestion: {question}";

/// Response style applied through the system prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Persona {
    #[default]
    Default,
    Professional,
    Creative,
    Concise,
}

impl Persona {
    /// All personas, in selector order
    pub const ALL: [Persona; 4] = [
        Persona::Default,
        Persona::Professional,
        Persona::Creative,
        Persona::Concise,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Persona::Default => "Default",
            Persona::Professional => "Professional",
            Persona::Creative => "Creative",
            Persona::Concise => "Concise",
        }
    }

    /// Full template, including the `{question}` substitution point
    pub fn template(&self) -> &'static str {
        match self {
            Persona::Default => DEFAULT_TEMPLATE,
            Persona::Professional => PROFESSIONAL_TEMPLATE,
            Persona::Creative => CREATIVE_TEMPLATE,
            Persona::Concise => CONCISE_TEMPLATE,
        }
    }

    /// The template's fixed prose, used as the system turn.
    ///
    /// The question travels in its own user turn, so nothing is substituted.
    pub fn instruction(&self) -> &'static str {
        let template = self.template();
        template
            .strip_suffix(QUESTION_MARKER)
            .unwrap_or(template)
    }

    /// Position in [`Persona::ALL`]
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Persona {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownPersona(wanted.to_string()))
    }
}
