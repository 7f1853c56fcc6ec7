//! /model command - choose a model

use super::CommandResult;
use parley_core::ModelId;

pub struct ModelCommand;

impl ModelCommand {
    /// Opens the selector with no args, otherwise switches to the matching model
    pub fn execute(args: &str) -> CommandResult {
        if args.is_empty() {
            return CommandResult::OpenModelSelector;
        }
        match find_model(args) {
            Some(model) => CommandResult::ChangeModel(model),
            None => CommandResult::Message(format!(
                "No model found matching '{}'\nUse /model to list available models",
                args
            )),
        }
    }

    /// Model list for line mode
    pub fn list_models_text(current: ModelId) -> String {
        let mut output = String::from("Available models:\n\n");
        for model in ModelId::ALL {
            let marker = if model == current { " *" } else { "" };
            output.push_str(&format!("  {:<22} {}{}\n", model.id(), model.description(), marker));
        }
        output.push_str("\nSwitch with: /model <id>");
        output
    }
}

/// Exact wire id first, then a substring of the id or display name
pub fn find_model(query: &str) -> Option<ModelId> {
    if let Some(model) = ModelId::parse(query) {
        return Some(model);
    }

    let query = query.trim().to_lowercase();
    ModelId::ALL.into_iter().find(|m| {
        m.id().to_lowercase().contains(&query) || m.name().to_lowercase().contains(&query)
    })
}
