//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every button identity wired exactly once
//! - No two buttons sharing a GPIO line
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::schema::BridgeConfig;
use crate::gpio::PinLine;
use crate::wire::ButtonId;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("button id {0} is not 1, 2 or 3")]
    UnknownButton(u8),

    #[error("button {0} is configured more than once")]
    DuplicateButton(u8),

    #[error("button {0} has no GPIO line")]
    MissingButton(u8),

    #[error("buttons {first} and {second} share GPIO line {line}")]
    SharedLine { line: PinLine, first: u8, second: u8 },

    #[error("remote.connect_timeout_secs must be greater than zero")]
    ZeroConnectTimeout,
}

/// Check a configuration, collecting every error found.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.remote.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    let mut seen_ids: HashSet<u8> = HashSet::new();
    let mut seen_lines: HashMap<PinLine, u8> = HashMap::new();

    for button in &config.buttons.0 {
        if ButtonId::try_from(button.id).is_err() {
            errors.push(ValidationError::UnknownButton(button.id));
            continue;
        }
        if !seen_ids.insert(button.id) {
            errors.push(ValidationError::DuplicateButton(button.id));
        }
        if let Some(first) = seen_lines.insert(button.line(), button.id) {
            errors.push(ValidationError::SharedLine {
                line: button.line(),
                first,
                second: button.id,
            });
        }
    }

    for id in ButtonId::ALL {
        if !seen_ids.contains(&id.as_byte()) {
            errors.push(ValidationError::MissingButton(id.as_byte()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ButtonConfig, ButtonsConfig};

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&BridgeConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = BridgeConfig::default();
        config.remote.connect_timeout_secs = 0;
        config.buttons = ButtonsConfig(vec![
            ButtonConfig { id: 1, controller: 0, pin: 0 },
            ButtonConfig { id: 1, controller: 0, pin: 1 },
            ButtonConfig { id: 7, controller: 0, pin: 2 },
            ButtonConfig { id: 2, controller: 0, pin: 0 },
        ]);

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroConnectTimeout));
        assert!(errors.contains(&ValidationError::DuplicateButton(1)));
        assert!(errors.contains(&ValidationError::UnknownButton(7)));
        assert!(errors.contains(&ValidationError::MissingButton(3)));
        assert!(errors.contains(&ValidationError::SharedLine {
            line: PinLine::new(0, 0),
            first: 1,
            second: 2,
        }));
    }
}
