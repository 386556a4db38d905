use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

pub const HISTORY_PLACEHOLDER: &str = "{history}";
pub const INPUT_PLACEHOLDER: &str = "{input}";

const DEFAULT_TEMPLATE: &str = "Assistant is a large language model trained by OpenAI.

Assistant is designed to be able to assist with a wide range of tasks, from answering simple questions to providing in-depth explanations and discussions on a wide range of topics. As a language model, Assistant is able to generate human-like text based on the input it receives, allowing it to engage in natural-sounding conversations and provide responses that are coherent and relevant to the topic at hand.

Assistant is constantly learning and improving, and its capabilities are constantly evolving. It is able to process and understand large amounts of text, and can use this knowledge to provide accurate and informative responses to a wide range of questions. Additionally, Assistant is able to generate its own text based on the input it receives, allowing it to engage in discussions and provide explanations and descriptions on a wide range of topics.

Overall, Assistant is a powerful tool that can help with a wide range of tasks and provide valuable insights and information on a wide range of topics. Whether you need help with a specific question or just want to have a conversation about a particular topic, Assistant is here to assist.

{history}
Human: {input}
Assistant:";

#[derive(Debug)]
pub enum PromptError {
    PlaceholderMissing(&'static str),
    IoError(std::io::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::PlaceholderMissing(p) =>
                write!(f, "Prompt template is missing the '{}' placeholder", p),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

/// Persona prompt with `{history}` and `{input}` slots.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self { template: DEFAULT_TEMPLATE.to_string() }
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, PromptError> {
        let prompt = Self { template: template.into() };
        prompt.validate()?;
        Ok(prompt)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PromptError> {
        let path = path.as_ref();
        let template = fs::read_to_string(path)?;
        let prompt = Self::new(template)?;
        info!("Loaded prompt template from {}", path.display());
        Ok(prompt)
    }

    fn validate(&self) -> Result<(), PromptError> {
        if !self.template.contains(HISTORY_PLACEHOLDER) {
            return Err(PromptError::PlaceholderMissing(HISTORY_PLACEHOLDER));
        }
        if !self.template.contains(INPUT_PLACEHOLDER) {
            return Err(PromptError::PlaceholderMissing(INPUT_PLACEHOLDER));
        }
        Ok(())
    }

    /// Fills both slots in a single pass so user text containing a placeholder
    /// is never expanded a second time.
    pub fn render(&self, history: &str, input: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + history.len() + input.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if tail.starts_with(HISTORY_PLACEHOLDER) {
                out.push_str(history);
                rest = &tail[HISTORY_PLACEHOLDER.len()..];
            } else if tail.starts_with(INPUT_PLACEHOLDER) {
                out.push_str(input);
                rest = &tail[INPUT_PLACEHOLDER.len()..];
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}
