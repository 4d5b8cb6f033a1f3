//! Terminal UI utilities.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::future::Future;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use tokio::time::Duration;

use rekurstore_core::Email;
use rekurstore_storefront::services::auth::{Notifier, VerificationNotice};

use crate::commands::CommandError;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print a section header
pub fn header(text: &str) {
    println!("\n{}", text.bold().underline());
}

/// Print a key-value pair
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a separator line
pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Print a block of text as-is
pub fn block(text: &str) {
    println!("{text}");
}

/// Create a spinner progress indicator
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run `fut` behind a spinner; Ctrl-C drops it and returns `Cancelled`.
pub async fn wait<F: Future>(message: &str, fut: F) -> Result<F::Output, CommandError> {
    let pb = spinner(message);
    let outcome = tokio::select! {
        output = fut => Ok(output),
        _ = tokio::signal::ctrl_c() => Err(CommandError::Cancelled),
    };
    pb.finish_and_clear();
    outcome
}

/// Prompt for user confirmation
pub fn confirm(prompt: &str, default: bool) -> Result<bool, dialoguer::Error> {
    use dialoguer::Confirm;
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
}

/// Prompt for text input
pub fn input(prompt: &str) -> Result<String, dialoguer::Error> {
    use dialoguer::Input;
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
}

/// Prompt for text input with default
pub fn input_with_default(prompt: &str, default: &str) -> Result<String, dialoguer::Error> {
    use dialoguer::Input;
    Input::<String>::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .allow_empty(true)
        .interact_text()
}

/// Prompt for a password without echo
pub fn password(prompt: &str) -> Result<SecretString, dialoguer::Error> {
    use dialoguer::Password;
    let value = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?;
    Ok(SecretString::from(value))
}

/// Pick one of `items`
pub fn select(prompt: &str, items: &[&str], default: usize) -> Result<usize, dialoguer::Error> {
    use dialoguer::Select;
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()
}

/// Display a QR code in the terminal
pub fn qr_code(data: &str) {
    use qrcode::QrCode;

    match QrCode::new(data) {
        Ok(code) => {
            let string = code
                .render::<char>()
                .quiet_zone(false)
                .module_dimensions(2, 1)
                .build();
            println!("\n{string}\n");
        }
        Err(e) => {
            tracing::warn!(error = %e, "QR code could not be rendered");
            key_value("QR", data);
        }
    }
}

/// Shows verification codes in the terminal, standing in for an email.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn deliver(&self, destination: &Email, notice: &VerificationNotice) {
        println!();
        separator();
        println!(
            "{} {}",
            "[SIMULASI EMAIL]".magenta().bold(),
            VerificationNotice::SUBJECT.bold()
        );
        key_value("Kepada", destination.as_str());
        println!();
        println!("{}", notice.body());
        separator();
        println!();
    }
}
