use colored::Colorize;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::validator::Validation;
use inquire::{set_global_render_config, CustomUserError, Password, PasswordDisplayMode, Text};

use crate::error::Error;

/// Initialize the global render configuration for inquire prompts
pub fn init_render_config() {
    let mut style = RenderConfig::default_colored();
    style.prompt_prefix = Styled::new(">").with_fg(Color::LightGreen);
    set_global_render_config(style);
}

/// Prompt for the Jira username
pub fn prompt_username() -> Result<String, Error> {
    Text::new("Jira username:")
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            if input.trim().is_empty() {
                Ok(Validation::Invalid("Username can't be empty".into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .map(|u| u.trim().to_string())
        .map_err(map_inquire_error)
}

/// Prompt for the Jira password without echoing it
pub fn prompt_password() -> Result<String, Error> {
    Password::new("Jira password:")
        .with_display_mode(PasswordDisplayMode::Hidden)
        .without_confirmation()
        .prompt()
        .map_err(map_inquire_error)
}

/// `> label: value`
pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", ">".bright_green(), label, value.bright_cyan());
}

pub fn success(message: &str) {
    println!("{} {}", "+".bright_green(), message);
}

pub fn failure(message: &str) {
    println!("{} {}", "x".red(), message.bright_red());
}

/// Map inquire errors to our error type
fn map_inquire_error(err: InquireError) -> Error {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => Error::Cancelled,
        _ => Error::Prompt(err.to_string()),
    }
}
