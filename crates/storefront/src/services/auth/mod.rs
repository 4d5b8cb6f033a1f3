//! Authentication service.
//!
//! Drives registration, login and code verification against the
//! [`CredentialStore`], as an explicit state machine:
//!
//! ```text
//! LoggedOut -> LoginForm <-> RegisterForm -> Verifying -> LoggedIn
//!                  \_________________________________________/
//! ```
//!
//! `LoggedIn` ends the flow: the caller takes the authenticated email and
//! drops the machine (or calls [`AuthMachine::logout`]).
//!
//! # Latency and cancellation
//!
//! Login checks, code delivery and verification wait a configurable delay
//! (see [`SimulatedLatency`]) before touching the store. These transitions
//! are `async fn(&mut self)`, so a second call into the same machine cannot
//! start while one is pending. Every store write happens after the delay, in
//! the final step of the transition; dropping the future (closing the modal)
//! therefore leaves both the store and the machine exactly as they were.

mod code;
mod error;

pub use code::{CODE_LENGTH, CodeChallenge, Notifier, OneTimeCode, VerificationNotice};
pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tokio::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use rekurstore_core::{Email, ValidationError};

use crate::models::{Session, UserRecord};
use crate::store::{CredentialStore, KeyValueStore};

/// Minimum password length at registration, in UTF-16 code units.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Delays that stand in for network round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    /// Before a verification code is delivered.
    pub code_delivery: Duration,
    /// Before login credentials are checked.
    pub login_check: Duration,
    /// Before a verified registration is committed.
    pub verification: Duration,
}

impl SimulatedLatency {
    /// The storefront's delays.
    pub const STOREFRONT: Self = Self {
        code_delivery: Duration::from_millis(1500),
        login_check: Duration::from_millis(1200),
        verification: Duration::from_millis(1000),
    };

    /// No delay at all.
    pub const NONE: Self = Self {
        code_delivery: Duration::ZERO,
        login_check: Duration::ZERO,
        verification: Duration::ZERO,
    };
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self::STOREFRONT
    }
}

/// Auth machine settings.
///
/// The defaults reproduce the storefront: simulated delays, codes that never
/// expire, and unlimited verification attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// Delays before store access.
    pub latency: SimulatedLatency,
    /// Reject codes older than this. `None` disables expiry.
    pub code_ttl: Option<Duration>,
    /// Discard the challenge after this many wrong codes. `None` allows unlimited retries.
    pub max_code_attempts: Option<u32>,
}

impl AuthConfig {
    /// Storefront defaults without any simulated delay.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            latency: SimulatedLatency::NONE,
            code_ttl: None,
            max_code_attempts: None,
        }
    }
}

/// Where an [`AuthMachine`] is, without the state's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthPhase {
    LoggedOut,
    LoginForm,
    RegisterForm,
    Verifying,
    LoggedIn,
}

impl std::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LoggedOut => "logged_out",
            Self::LoginForm => "login_form",
            Self::RegisterForm => "register_form",
            Self::Verifying => "verifying",
            Self::LoggedIn => "logged_in",
        };
        f.write_str(name)
    }
}

/// A registration waiting for its code.
#[derive(Debug)]
pub struct PendingRegistration {
    challenge: CodeChallenge,
    password: SecretString,
    failed_attempts: u32,
}

impl PendingRegistration {
    /// Email being registered.
    #[must_use]
    pub const fn email(&self) -> &Email {
        self.challenge.email()
    }

    /// The outstanding challenge.
    #[must_use]
    pub const fn challenge(&self) -> &CodeChallenge {
        &self.challenge
    }

    /// Wrong codes submitted so far.
    #[must_use]
    pub const fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }
}

/// Auth machine state. Each variant carries only what is valid in it.
#[derive(Debug)]
pub enum AuthState {
    LoggedOut,
    LoginForm,
    RegisterForm,
    Verifying(PendingRegistration),
    LoggedIn(Session),
}

impl AuthState {
    /// The state's tag.
    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        match self {
            Self::LoggedOut => AuthPhase::LoggedOut,
            Self::LoginForm => AuthPhase::LoginForm,
            Self::RegisterForm => AuthPhase::RegisterForm,
            Self::Verifying(_) => AuthPhase::Verifying,
            Self::LoggedIn(_) => AuthPhase::LoggedIn,
        }
    }
}

/// Registration, login and code verification for one auth modal.
///
/// One instance per attempt; create a fresh one when the modal reopens.
pub struct AuthMachine<S, N> {
    attempt_id: Uuid,
    credentials: CredentialStore<S>,
    notifier: N,
    config: AuthConfig,
    state: AuthState,
}

impl<S: KeyValueStore, N: Notifier> AuthMachine<S, N> {
    /// Create a machine in `LoggedOut`.
    #[must_use]
    pub fn new(credentials: CredentialStore<S>, notifier: N, config: AuthConfig) -> Self {
        let attempt_id = Uuid::new_v4();
        debug!(attempt = %attempt_id, "Auth attempt started");

        Self {
            attempt_id,
            credentials,
            notifier,
            config,
            state: AuthState::LoggedOut,
        }
    }

    /// Create a machine with the login form already open.
    #[must_use]
    pub fn for_login(credentials: CredentialStore<S>, notifier: N, config: AuthConfig) -> Self {
        let mut machine = Self::new(credentials, notifier, config);
        machine.state = AuthState::LoginForm;
        machine
    }

    /// Identifier used to correlate log events of this attempt.
    #[must_use]
    pub const fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    /// Current state's tag.
    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        self.state.phase()
    }

    /// The signed-in email, once `LoggedIn`.
    #[must_use]
    pub const fn authenticated_email(&self) -> Option<&Email> {
        match &self.state {
            AuthState::LoggedIn(session) => Some(&session.email),
            _ => None,
        }
    }

    // =========================================================================
    // Form navigation
    // =========================================================================

    /// Show the login form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidTransition` from `Verifying` or `LoggedIn`.
    pub fn open_login(&mut self) -> Result<(), AuthError> {
        self.expect_form("open login")?;
        self.state = AuthState::LoginForm;
        Ok(())
    }

    /// Show the registration form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidTransition` from `Verifying` or `LoggedIn`.
    pub fn open_registration(&mut self) -> Result<(), AuthError> {
        self.expect_form("open registration")?;
        self.state = AuthState::RegisterForm;
        Ok(())
    }

    /// Leave `Verifying` for the registration form, discarding the challenge.
    ///
    /// Returns the email that was being verified so the form can be prefilled.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidTransition` outside `Verifying`.
    pub fn back_to_registration(&mut self) -> Result<Email, AuthError> {
        let AuthState::Verifying(pending) = &self.state else {
            return Err(self.invalid("go back to registration"));
        };

        let email = pending.email().clone();
        self.state = AuthState::RegisterForm;
        debug!(attempt = %self.attempt_id, "Challenge discarded, back to registration");
        Ok(email)
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// On success the session slot is set and the machine is `LoggedIn`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is empty or the email is malformed.
    /// Returns `AuthError::CredentialsMismatch` if no account matches.
    /// Returns `AuthError::Storage` if the session cannot be written.
    /// Returns `AuthError::InvalidTransition` outside `LoginForm`.
    #[instrument(skip_all, fields(attempt = %self.attempt_id))]
    pub async fn submit_login(&mut self, email: &str, password: &str) -> Result<Email, AuthError> {
        self.expect_phase(AuthPhase::LoginForm, "submit login")?;
        let (email, password) = validate_credentials(email, password)?;

        simulate(self.config.latency.login_check).await;

        let matched = self
            .credentials
            .find_user(&email)
            .is_some_and(|user| user.password_matches(password));
        if !matched {
            info!("Login rejected");
            return Err(AuthError::CredentialsMismatch);
        }

        self.credentials.set_session(&email)?;
        self.state = AuthState::LoggedIn(Session::new(email.clone()));

        info!(email = %email, "Signed in");
        Ok(email)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Start registration: issue a code and deliver it through the notifier.
    ///
    /// Nothing is written to the store until the code is verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is empty, the email is malformed,
    /// or the password is shorter than [`MIN_PASSWORD_LENGTH`].
    /// Returns `AuthError::AlreadyRegistered` if the email has an account.
    /// Returns `AuthError::InvalidTransition` outside `RegisterForm`.
    #[instrument(skip_all, fields(attempt = %self.attempt_id))]
    pub async fn submit_registration(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        self.expect_phase(AuthPhase::RegisterForm, "submit registration")?;
        let (email, password) = validate_credentials(email, password)?;

        if password.encode_utf16().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            }
            .into());
        }

        if self.credentials.find_user(&email).is_some() {
            info!(email = %email, "Registration rejected, email taken");
            return Err(AuthError::AlreadyRegistered);
        }

        simulate(self.config.latency.code_delivery).await;

        let code = OneTimeCode::generate(&mut rand::rng());
        let notice = VerificationNotice::new(code.clone());
        let challenge = CodeChallenge::new(email.clone(), code);

        self.notifier.deliver(&email, &notice);
        self.state = AuthState::Verifying(PendingRegistration {
            challenge,
            password: SecretString::from(password.to_owned()),
            failed_attempts: 0,
        });

        info!(email = %email, "Verification code issued");
        Ok(())
    }

    /// Answer the outstanding challenge.
    ///
    /// On a match the account is created, the session is set and the machine
    /// is `LoggedIn`. A wrong code keeps the challenge valid for another try.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if `code` is empty.
    /// Returns `AuthError::CodeMismatch` if `code` is wrong.
    /// Returns `AuthError::CodeExpired` / `AuthError::TooManyAttempts` when the
    /// optional limits in [`AuthConfig`] are hit; the challenge is discarded.
    /// Returns `AuthError::Storage` if the account cannot be written.
    /// Returns `AuthError::InvalidTransition` outside `Verifying`.
    #[instrument(skip_all, fields(attempt = %self.attempt_id))]
    pub async fn submit_code(&mut self, code: &str) -> Result<Email, AuthError> {
        if self.phase() != AuthPhase::Verifying {
            return Err(self.invalid("submit code"));
        }
        let AuthState::Verifying(pending) = &mut self.state else {
            return Err(AuthError::CodeMismatch);
        };

        if code.is_empty() {
            return Err(ValidationError::missing("code").into());
        }

        if let Some(ttl) = self.config.code_ttl
            && pending.challenge.is_expired(ttl)
        {
            info!("Verification code expired");
            self.state = AuthState::RegisterForm;
            return Err(AuthError::CodeExpired);
        }

        if !pending.challenge.matches(code) {
            pending.failed_attempts += 1;
            info!(failed_attempts = pending.failed_attempts, "Verification code rejected");

            if let Some(max) = self.config.max_code_attempts
                && pending.failed_attempts >= max
            {
                self.state = AuthState::RegisterForm;
                return Err(AuthError::TooManyAttempts);
            }
            return Err(AuthError::CodeMismatch);
        }

        let email = pending.email().clone();
        let record = UserRecord::new(email.clone(), pending.password.expose_secret());

        simulate(self.config.latency.verification).await;

        self.credentials.register(record)?;
        self.state = AuthState::LoggedIn(Session::new(email.clone()));

        info!(email = %email, "Registration verified, signed in");
        Ok(email)
    }

    // =========================================================================
    // Logout / abandon
    // =========================================================================

    /// Sign out: clear the session slot and return to `LoggedOut`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session cannot be cleared.
    /// Returns `AuthError::InvalidTransition` outside `LoggedIn`.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.expect_phase(AuthPhase::LoggedIn, "logout")?;
        self.credentials.clear_session()?;
        self.state = AuthState::LoggedOut;

        info!(attempt = %self.attempt_id, "Signed out");
        Ok(())
    }

    /// Close the modal. Any outstanding challenge is dropped with the machine.
    pub fn cancel(self) {
        debug!(attempt = %self.attempt_id, phase = %self.phase(), "Auth attempt abandoned");
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    const fn invalid(&self, action: &'static str) -> AuthError {
        AuthError::InvalidTransition {
            action,
            phase: self.state.phase(),
        }
    }

    fn expect_phase(&self, phase: AuthPhase, action: &'static str) -> Result<(), AuthError> {
        if self.phase() == phase {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn expect_form(&self, action: &'static str) -> Result<(), AuthError> {
        match self.phase() {
            AuthPhase::LoggedOut | AuthPhase::LoginForm | AuthPhase::RegisterForm => Ok(()),
            AuthPhase::Verifying | AuthPhase::LoggedIn => Err(self.invalid(action)),
        }
    }
}

/// Check both fields are present and normalize the email.
fn validate_credentials<'a>(
    email: &str,
    password: &'a str,
) -> Result<(Email, &'a str), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::missing("email"));
    }
    if password.is_empty() {
        return Err(ValidationError::missing("password"));
    }

    Ok((Email::normalized(email)?, password))
}

/// Wait out a simulated round-trip.
async fn simulate(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    /// Notifier that remembers every code it was asked to show.
    #[derive(Clone, Default)]
    struct Inbox(Rc<RefCell<Vec<(Email, String)>>>);

    impl Inbox {
        fn last_code(&self) -> String {
            self.0.borrow().last().unwrap().1.clone()
        }

        fn count(&self) -> usize {
            self.0.borrow().len()
        }
    }

    impl Notifier for Inbox {
        fn deliver(&self, destination: &Email, notice: &VerificationNotice) {
            self.0
                .borrow_mut()
                .push((destination.clone(), notice.code().to_owned()));
        }
    }

    type Machine = AuthMachine<Arc<MemoryStore>, Inbox>;

    fn machine(config: AuthConfig) -> (Machine, CredentialStore<Arc<MemoryStore>>, Inbox) {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        let inbox = Inbox::default();
        let machine = AuthMachine::new(credentials.clone(), inbox.clone(), config);
        (machine, credentials, inbox)
    }

    fn email(s: &str) -> Email {
        Email::normalized(s).unwrap()
    }

    /// A 4-digit code different from `code`.
    fn wrong_code(code: &str) -> String {
        if code == "1000" { "1001".into() } else { "1000".into() }
    }

    async fn registered(
        config: AuthConfig,
        user: &str,
        password: &str,
    ) -> (Machine, CredentialStore<Arc<MemoryStore>>, Inbox) {
        let (mut machine, credentials, inbox) = machine(config);
        credentials
            .insert_user(UserRecord::new(email(user), password))
            .unwrap();
        machine.open_login().unwrap();
        (machine, credentials, inbox)
    }

    #[tokio::test]
    async fn test_register_verify_round_trip() {
        let (mut machine, credentials, inbox) = machine(AuthConfig::instant());
        machine.open_registration().unwrap();

        machine
            .submit_registration(" A@X.com ", "secret1")
            .await
            .unwrap();
        assert_eq!(machine.phase(), AuthPhase::Verifying);
        assert_eq!(inbox.count(), 1);
        assert!(credentials.list_users().is_empty());

        let signed_in = machine.submit_code(&inbox.last_code()).await.unwrap();
        assert_eq!(signed_in, email("a@x.com"));
        assert_eq!(machine.phase(), AuthPhase::LoggedIn);
        assert_eq!(machine.authenticated_email(), Some(&email("a@x.com")));

        let users = credentials.list_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users.first().unwrap().password, "secret1");
        assert_eq!(credentials.get_session().unwrap().email, email("a@x.com"));
    }

    #[tokio::test]
    async fn test_wrong_code_writes_nothing_and_allows_retry() {
        let (mut machine, credentials, inbox) = machine(AuthConfig::instant());
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();
        let code = inbox.last_code();

        for _ in 0..25 {
            let err = machine.submit_code(&wrong_code(&code)).await.unwrap_err();
            assert!(matches!(err, AuthError::CodeMismatch));
            assert_eq!(machine.phase(), AuthPhase::Verifying);
        }
        assert!(credentials.list_users().is_empty());
        assert!(credentials.get_session().is_none());

        machine.submit_code(&code).await.unwrap();
        assert_eq!(credentials.list_users().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_code_is_validation_error() {
        let (mut machine, _, _) = machine(AuthConfig::instant());
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();

        let err = machine.submit_code("").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(machine.phase(), AuthPhase::Verifying);
    }

    #[tokio::test]
    async fn test_code_must_match_exactly() {
        let (mut machine, _, inbox) = machine(AuthConfig::instant());
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();
        let code = inbox.last_code();

        for padded in [format!(" {code}"), format!("{code}\n"), "  ".to_owned()] {
            let err = machine.submit_code(&padded).await.unwrap_err();
            assert!(matches!(err, AuthError::CodeMismatch));
        }
        assert!(machine.submit_code(&code).await.is_ok());
    }

    #[tokio::test]
    async fn test_password_length_counts_utf16_units() {
        for (password, accepted) in [("🔑🔑🔑", true), ("ééééé", false), ("abcdef", true)] {
            let (mut machine, _, _) = machine(AuthConfig::instant());
            machine.open_registration().unwrap();
            let result = machine.submit_registration("a@x.com", password).await;
            assert_eq!(result.is_ok(), accepted, "password {password:?}");
        }
    }

    #[tokio::test]
    async fn test_registration_validation() {
        let (mut machine, _, inbox) = machine(AuthConfig::instant());
        machine.open_registration().unwrap();

        let err = machine.submit_registration("", "secret1").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::MissingField { field: "email" })
        ));

        let err = machine.submit_registration("a@x.com", "").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::MissingField { field: "password" })
        ));

        let err = machine
            .submit_registration("a@x.com", "12345")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::PasswordTooShort { min: 6 })
        ));

        let err = machine
            .submit_registration("not-an-email", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::InvalidEmail(_))
        ));

        assert_eq!(machine.phase(), AuthPhase::RegisterForm);
        assert_eq!(inbox.count(), 0);
    }

    #[tokio::test]
    async fn test_registration_rejects_existing_email_regardless_of_password() {
        for password in ["secret1", "different-password"] {
            let (mut machine, credentials, inbox) =
                registered(AuthConfig::instant(), "a@x.com", "secret1").await;
            machine.open_registration().unwrap();

            let err = machine
                .submit_registration("  A@X.COM", password)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::AlreadyRegistered));
            assert_eq!(machine.phase(), AuthPhase::RegisterForm);
            assert_eq!(inbox.count(), 0);
            assert_eq!(credentials.list_users().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let (mut machine, credentials, _) =
            registered(AuthConfig::instant(), "a@x.com", "secret1").await;

        let signed_in = machine.submit_login("A@x.com ", "secret1").await.unwrap();
        assert_eq!(signed_in, email("a@x.com"));
        assert_eq!(machine.phase(), AuthPhase::LoggedIn);
        assert_eq!(credentials.get_session().unwrap().email, email("a@x.com"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_leaves_store_unchanged() {
        let (mut machine, credentials, _) =
            registered(AuthConfig::instant(), "a@x.com", "secret1").await;
        let before = credentials.inner().keys().unwrap();

        for wrong in ["wrongpass", "Secret1", "secret1 ", "secret"] {
            let err = machine.submit_login("a@x.com", wrong).await.unwrap_err();
            assert!(matches!(err, AuthError::CredentialsMismatch));
            assert_eq!(machine.phase(), AuthPhase::LoginForm);
        }

        assert_eq!(credentials.inner().keys().unwrap(), before);
        assert!(credentials.get_session().is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (mut machine, _, _) = machine(AuthConfig::instant());
        machine.open_login().unwrap();

        let err = machine.submit_login("ghost@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::CredentialsMismatch));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let (mut machine, credentials, _) =
            registered(AuthConfig::instant(), "a@x.com", "secret1").await;
        machine.submit_login("a@x.com", "secret1").await.unwrap();

        machine.logout().unwrap();
        assert_eq!(machine.phase(), AuthPhase::LoggedOut);
        assert!(credentials.get_session().is_none());
        assert_eq!(credentials.list_users().len(), 1);
    }

    #[tokio::test]
    async fn test_transitions_outside_their_state_are_rejected() {
        let (mut machine, _, _) = machine(AuthConfig::instant());

        let err = machine.submit_login("a@x.com", "secret1").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidTransition {
                phase: AuthPhase::LoggedOut,
                ..
            }
        ));
        assert!(machine.submit_code("1234").await.is_err());
        assert!(machine.logout().is_err());
        assert!(machine.back_to_registration().is_err());

        machine.open_login().unwrap();
        assert!(machine.submit_registration("a@x.com", "secret1").await.is_err());
    }

    #[tokio::test]
    async fn test_forms_switch_freely() {
        let (mut machine, _, _) = machine(AuthConfig::instant());
        machine.open_login().unwrap();
        machine.open_registration().unwrap();
        machine.open_login().unwrap();
        machine.open_registration().unwrap();
        assert_eq!(machine.phase(), AuthPhase::RegisterForm);
    }

    #[tokio::test]
    async fn test_back_to_registration_discards_challenge() {
        let (mut machine, credentials, inbox) = machine(AuthConfig::instant());
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();
        let stale_code = inbox.last_code();

        assert!(machine.open_login().is_err());
        let pending_email = machine.back_to_registration().unwrap();
        assert_eq!(pending_email, email("a@x.com"));
        assert_eq!(machine.phase(), AuthPhase::RegisterForm);

        let err = machine.submit_code(&stale_code).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidTransition { .. }));
        assert!(credentials.list_users().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_registration_never_delivers_code() {
        let (mut machine, credentials, inbox) = machine(AuthConfig::default());
        machine.open_registration().unwrap();

        let pending = tokio::time::timeout(
            Duration::from_millis(500),
            machine.submit_registration("a@x.com", "secret1"),
        )
        .await;
        assert!(pending.is_err(), "delivery should still be pending");

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(inbox.count(), 0);
        assert_eq!(machine.phase(), AuthPhase::RegisterForm);
        assert!(credentials.inner().keys().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_verification_writes_nothing() {
        let (mut machine, credentials, inbox) = machine(AuthConfig::default());
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();

        let pending = tokio::time::timeout(
            Duration::from_millis(100),
            machine.submit_code(&inbox.last_code()),
        )
        .await;
        assert!(pending.is_err());

        assert_eq!(machine.phase(), AuthPhase::Verifying);
        assert!(credentials.list_users().is_empty());
        assert!(credentials.get_session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_delays() {
        let (mut machine, _, inbox) = machine(AuthConfig::default());
        machine.open_registration().unwrap();

        let started = tokio::time::Instant::now();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();
        assert!(started.elapsed() >= SimulatedLatency::STOREFRONT.code_delivery);

        let started = tokio::time::Instant::now();
        machine.submit_code(&inbox.last_code()).await.unwrap();
        assert!(started.elapsed() >= SimulatedLatency::STOREFRONT.verification);
    }

    #[tokio::test(start_paused = true)]
    async fn test_codes_never_expire_by_default() {
        let (mut machine, _, inbox) = machine(AuthConfig::instant());
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(60 * 60 * 24)).await;
        machine.submit_code(&inbox.last_code()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_optional_code_ttl() {
        let config = AuthConfig {
            code_ttl: Some(Duration::from_secs(300)),
            ..AuthConfig::instant()
        };
        let (mut machine, credentials, inbox) = machine(config);
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;
        let err = machine.submit_code(&inbox.last_code()).await.unwrap_err();
        assert!(matches!(err, AuthError::CodeExpired));
        assert_eq!(machine.phase(), AuthPhase::RegisterForm);
        assert!(credentials.list_users().is_empty());
    }

    #[tokio::test]
    async fn test_optional_attempt_limit() {
        let config = AuthConfig {
            max_code_attempts: Some(3),
            ..AuthConfig::instant()
        };
        let (mut machine, _, inbox) = machine(config);
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();
        let wrong = wrong_code(&inbox.last_code());

        for _ in 0..2 {
            let err = machine.submit_code(&wrong).await.unwrap_err();
            assert!(matches!(err, AuthError::CodeMismatch));
        }
        let err = machine.submit_code(&wrong).await.unwrap_err();
        assert!(matches!(err, AuthError::TooManyAttempts));
        assert_eq!(machine.phase(), AuthPhase::RegisterForm);
    }

    #[tokio::test]
    async fn test_new_registration_issues_fresh_challenge() {
        let (mut machine, _, inbox) = machine(AuthConfig::instant());
        machine.open_registration().unwrap();
        machine
            .submit_registration("a@x.com", "secret1")
            .await
            .unwrap();
        machine.back_to_registration().unwrap();
        machine
            .submit_registration("b@x.com", "secret2")
            .await
            .unwrap();

        assert_eq!(inbox.count(), 2);
        let AuthState::Verifying(pending) = machine.state() else {
            panic!("expected Verifying");
        };
        assert_eq!(pending.email(), &email("b@x.com"));
        assert_eq!(pending.failed_attempts(), 0);
    }
}
