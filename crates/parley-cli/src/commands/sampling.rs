//! /temperature and /tokens commands

use super::CommandResult;
use parley_core::settings::{max_token_choices, temperature_choices};

pub struct TemperatureCommand;

impl TemperatureCommand {
    pub fn execute(args: &str) -> CommandResult {
        if args.is_empty() {
            return CommandResult::OpenTemperatureSelector;
        }
        // Range is checked when the change is applied
        match args.parse::<f32>() {
            Ok(value) if value.is_finite() => CommandResult::ChangeTemperature(value),
            _ => CommandResult::Message(format!(
                "Not a temperature: '{}'\nUse a number between 0.0 and 1.0",
                args
            )),
        }
    }

    /// Choices for line mode
    pub fn list_text(current: f32) -> String {
        let values: Vec<String> = temperature_choices()
            .into_iter()
            .map(|v| {
                if (v - current).abs() < f32::EPSILON {
                    format!("[{:.1}]", v)
                } else {
                    format!("{:.1}", v)
                }
            })
            .collect();
        format!(
            "Temperature: {:.1}\nChoices: {}\n\nSet with: /temperature <value>",
            current,
            values.join(" ")
        )
    }
}

pub struct TokensCommand;

impl TokensCommand {
    pub fn execute(args: &str) -> CommandResult {
        if args.is_empty() {
            return CommandResult::OpenTokensSelector;
        }
        match args.parse::<u32>() {
            Ok(value) => CommandResult::ChangeMaxTokens(value),
            Err(_) => CommandResult::Message(format!(
                "Not a token count: '{}'\nUse a whole number between 50 and 1000",
                args
            )),
        }
    }

    /// Choices for line mode
    pub fn list_text(current: u32) -> String {
        let choices = max_token_choices();
        let (first, last) = (choices.first().copied(), choices.last().copied());
        format!(
            "Max tokens: {}\nRange: {} to {} in steps of {}\n\nSet with: /tokens <n>",
            current,
            first.unwrap_or_default(),
            last.unwrap_or_default(),
            choices.get(1).zip(first).map_or(0, |(b, a)| b - a),
        )
    }
}
