//! Account commands: register, login, logout, whoami.
//!
//! # Usage
//!
//! ```bash
//! rekur register -e you@example.com
//! rekur login -e you@example.com
//! rekur whoami
//! rekur logout
//! ```

use std::sync::Arc;

use secrecy::ExposeSecret;

use rekurstore_storefront::services::auth::{AuthError, AuthMachine, AuthPhase};
use rekurstore_storefront::store::FileStore;

use super::{CommandError, open_storefront};
use crate::ui::{self, TerminalNotifier};

/// Auth machine driven from the terminal.
pub type Machine = AuthMachine<Arc<FileStore>, TerminalNotifier>;

/// What to do after the code prompt.
enum Verification {
    SignedIn,
    Restart { email: Option<String> },
}

/// Register a new account.
///
/// # Errors
///
/// Returns `CommandError` if registration fails or is cancelled.
pub async fn register(email: Option<String>) -> Result<(), CommandError> {
    let mut app = open_storefront()?;
    if let Some(current) = app.current_user() {
        ui::info(&format!("Sudah login sebagai {current}"));
        return Ok(());
    }

    let machine = sign_up(app.auth_machine(TerminalNotifier), email).await?;
    app.finish_auth(machine);
    Ok(())
}

/// Sign in to an existing account.
///
/// # Errors
///
/// Returns `CommandError` if sign-in fails or is cancelled.
pub async fn login(email: Option<String>) -> Result<(), CommandError> {
    let mut app = open_storefront()?;
    if let Some(current) = app.current_user() {
        ui::info(&format!("Sudah login sebagai {current}"));
        return Ok(());
    }

    let mut machine = app.auth_machine(TerminalNotifier);
    machine.open_login()?;
    let machine = sign_in(machine, email).await?;
    app.finish_auth(machine);
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Returns `CommandError` if the session cannot be cleared.
pub fn logout() -> Result<(), CommandError> {
    let mut app = open_storefront()?;
    if app.current_user().is_none() {
        ui::info("Belum login.");
        return Ok(());
    }

    app.logout()?;
    ui::success("Berhasil keluar.");
    Ok(())
}

/// Show the signed-in account.
///
/// # Errors
///
/// Returns `CommandError` if the configuration is invalid.
pub fn whoami() -> Result<(), CommandError> {
    let app = open_storefront()?;
    match app.current_user() {
        Some(email) => {
            ui::header("Akun");
            ui::key_value("Email", email.as_str());
        }
        None => {
            ui::error("Belum login");
            ui::info("Jalankan 'rekur login' atau 'rekur register'");
        }
    }
    Ok(())
}

/// Drive a machine in `LoginForm` until it signs in.
///
/// Wrong credentials re-prompt; anything else ends the attempt.
///
/// # Errors
///
/// Returns `CommandError` on a non-recoverable failure or Ctrl-C.
pub async fn sign_in(
    mut machine: Machine,
    mut email: Option<String>,
) -> Result<Machine, CommandError> {
    loop {
        let address = match email.take() {
            Some(address) => address,
            None => ui::input("Email")?,
        };
        let password = ui::password("Kata sandi")?;

        let outcome = ui::wait(
            "Memeriksa akun...",
            machine.submit_login(&address, password.expose_secret()),
        )
        .await?;

        match outcome {
            Ok(signed_in) => {
                ui::success(&format!("Berhasil masuk sebagai {signed_in}"));
                return Ok(machine);
            }
            Err(e) => report(e)?,
        }
    }
}

/// Drive a machine from a form state through registration and verification.
///
/// # Errors
///
/// Returns `CommandError` on a non-recoverable failure or Ctrl-C.
pub async fn sign_up(mut machine: Machine, email: Option<String>) -> Result<Machine, CommandError> {
    machine.open_registration()?;
    let mut prefill = email;

    loop {
        let address = match prefill.take() {
            Some(address) => ui::input_with_default("Email", &address)?,
            None => ui::input("Email")?,
        };
        let password = ui::password("Kata sandi (minimal 6 karakter)")?;

        let outcome = ui::wait(
            "Mengirim kode verifikasi...",
            machine.submit_registration(&address, password.expose_secret()),
        )
        .await?;
        if let Err(e) = outcome {
            report(e)?;
            continue;
        }

        match verify(&mut machine).await? {
            Verification::SignedIn => return Ok(machine),
            Verification::Restart { email } => prefill = email,
        }
    }
}

async fn verify(machine: &mut Machine) -> Result<Verification, CommandError> {
    loop {
        let code = ui::input("Kode verifikasi (kosongkan untuk ganti email)")?;
        if code.trim().is_empty() {
            let pending = machine.back_to_registration()?;
            return Ok(Verification::Restart {
                email: Some(pending.into_inner()),
            });
        }

        match ui::wait("Memverifikasi...", machine.submit_code(&code)).await? {
            Ok(signed_in) => {
                ui::success(&format!("Akun {signed_in} berhasil dibuat dan sudah login"));
                return Ok(Verification::SignedIn);
            }
            Err(e) => {
                report(e)?;
                if machine.phase() != AuthPhase::Verifying {
                    return Ok(Verification::Restart { email: None });
                }
            }
        }
    }
}

/// Show a recoverable error inline; pass anything else up.
fn report(err: AuthError) -> Result<(), CommandError> {
    if err.is_recoverable() {
        ui::error(err.user_message());
        Ok(())
    } else {
        Err(err.into())
    }
}
