//! Generation settings

use parley_ai::ModelId;

use crate::error::{Error, Result};
use crate::persona::Persona;

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const TEMPERATURE_STEP: f32 = 0.1;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const MIN_MAX_TOKENS: u32 = 50;
pub const MAX_MAX_TOKENS: u32 = 1000;
pub const MAX_TOKENS_STEP: u32 = 50;
pub const DEFAULT_MAX_TOKENS: u32 = 250;

/// Parameters read for every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    model: ModelId,
    temperature: f32,
    max_tokens: u32,
    persona: Persona,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            persona: Persona::default(),
        }
    }
}

impl GenerationSettings {
    /// Create settings, rejecting out-of-range values
    pub fn new(model: ModelId, temperature: f32, max_tokens: u32, persona: Persona) -> Result<Self> {
        let mut settings = Self {
            model,
            persona,
            ..Self::default()
        };
        settings.set_temperature(temperature)?;
        settings.set_max_tokens(max_tokens)?;
        Ok(settings)
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.persona = persona;
    }

    /// Set the temperature; must lie in `[0.0, 1.0]`
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(Error::InvalidSetting(format!(
                "temperature must be between {:.1} and {:.1}, got {}",
                MIN_TEMPERATURE, MAX_TEMPERATURE, temperature
            )));
        }
        self.temperature = temperature;
        Ok(())
    }

    /// Set the output token budget; must lie in `[50, 1000]`
    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<()> {
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&max_tokens) {
            return Err(Error::InvalidSetting(format!(
                "max tokens must be between {} and {}, got {}",
                MIN_MAX_TOKENS, MAX_MAX_TOKENS, max_tokens
            )));
        }
        self.max_tokens = max_tokens;
        Ok(())
    }
}

/// Temperature values offered by selectors
pub fn temperature_choices() -> Vec<f32> {
    let steps = ((MAX_TEMPERATURE - MIN_TEMPERATURE) / TEMPERATURE_STEP).round() as u32;
    (0..=steps)
        .map(|i| ((MIN_TEMPERATURE + i as f32 * TEMPERATURE_STEP) * 10.0).round() / 10.0)
        .collect()
}

/// Token budgets offered by selectors
pub fn max_token_choices() -> Vec<u32> {
    (MIN_MAX_TOKENS..=MAX_MAX_TOKENS)
        .step_by(MAX_TOKENS_STEP as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = GenerationSettings::default();
        assert_eq!(s.model(), ModelId::Gemma2_9b);
        assert_eq!(s.temperature(), 0.7);
        assert_eq!(s.max_tokens(), 250);
        assert_eq!(s.persona(), Persona::Default);
    }

    #[test]
    fn test_new_accepts_bounds() {
        assert!(GenerationSettings::new(ModelId::Qwen25_32b, 0.0, 50, Persona::Concise).is_ok());
        assert!(GenerationSettings::new(ModelId::Qwen25_32b, 1.0, 1000, Persona::Concise).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(
            GenerationSettings::new(ModelId::default(), 1.1, 250, Persona::Default),
            Err(Error::InvalidSetting(_))
        ));
        assert!(matches!(
            GenerationSettings::new(ModelId::default(), -0.1, 250, Persona::Default),
            Err(Error::InvalidSetting(_))
        ));
        assert!(matches!(
            GenerationSettings::new(ModelId::default(), 0.5, 49, Persona::Default),
            Err(Error::InvalidSetting(_))
        ));
        assert!(matches!(
            GenerationSettings::new(ModelId::default(), 0.5, 1001, Persona::Default),
            Err(Error::InvalidSetting(_))
        ));
        assert!(matches!(
            GenerationSettings::new(ModelId::default(), f32::NAN, 250, Persona::Default),
            Err(Error::InvalidSetting(_))
        ));
    }

    #[test]
    fn test_new_is_the_only_way_in() {
        // No serde derives: outside values reach a GenerationSettings through new()
        let err = GenerationSettings::new(ModelId::Gemma2_9b, 5.0, 0, Persona::Default).unwrap_err();
        assert!(err.to_string().contains("temperature"));

        let err = GenerationSettings::new(ModelId::Gemma2_9b, 0.5, 0, Persona::Default).unwrap_err();
        assert!(matches!(err, Error::InvalidSetting(_)));
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let mut s = GenerationSettings::default();
        assert!(s.set_max_tokens(5000).is_err());
        assert_eq!(s.max_tokens(), DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_choices() {
        let temps = temperature_choices();
        assert_eq!(temps.len(), 11);
        assert_eq!(temps[0], 0.0);
        assert_eq!(temps[7], 0.7);
        assert_eq!(temps[10], 1.0);

        let tokens = max_token_choices();
        assert_eq!(tokens.len(), 20);
        assert_eq!(tokens.first(), Some(&50));
        assert_eq!(tokens.last(), Some(&1000));
        assert!(tokens.contains(&DEFAULT_MAX_TOKENS));
    }
}
