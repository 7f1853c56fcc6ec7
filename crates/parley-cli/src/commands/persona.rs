//! /persona command - choose a response style

use super::CommandResult;
use parley_core::Persona;

pub struct PersonaCommand;

impl PersonaCommand {
    pub fn execute(args: &str) -> CommandResult {
        if args.is_empty() {
            return CommandResult::OpenPersonaSelector;
        }
        match args.parse::<Persona>() {
            Ok(persona) => CommandResult::ChangePersona(persona),
            Err(e) => CommandResult::Message(format!(
                "{}\nValid personas: {}",
                e,
                persona_names().join(", ")
            )),
        }
    }

    /// Persona list for line mode
    pub fn list_personas_text(current: Persona) -> String {
        let mut output = String::from("Personas:\n\n");
        for persona in Persona::ALL {
            let marker = if persona == current { " *" } else { "" };
            output.push_str(&format!(
                "  {:<14} {}{}\n",
                persona.name(),
                persona.instruction(),
                marker
            ));
        }
        output.push_str("\nSwitch with: /persona <name>");
        output
    }
}

fn persona_names() -> Vec<&'static str> {
    Persona::ALL.iter().map(|p| p.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute() {
        assert_eq!(
            PersonaCommand::execute("professional"),
            CommandResult::ChangePersona(Persona::Professional)
        );
        assert_eq!(PersonaCommand::execute(""), CommandResult::OpenPersonaSelector);
    }

    #[test]
    fn test_unknown_persona_lists_choices() {
        let CommandResult::Message(text) = PersonaCommand::execute("pirate") else {
            panic!("expected a message");
        };
        assert!(text.contains("Unknown persona: pirate"));
        assert!(text.contains("Default, Professional, Creative, Concise"));
    }

    #[test]
    fn test_list_marks_current() {
        let text = PersonaCommand::list_personas_text(Persona::Creative);
        assert!(text.lines().any(|l| l.contains("Creative") && l.ends_with(" *")));
        assert!(!text.contains("{question}"));
    }
}
