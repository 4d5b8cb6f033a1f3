//! One-time verification codes and their out-of-band delivery.

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::time::{Duration, Instant};

use rekurstore_core::Email;

/// Number of digits in a verification code.
pub const CODE_LENGTH: usize = 4;

/// A 4-digit numeric verification code.
///
/// Implements `Debug` manually so the code never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Draw a code uniformly from `1000..=9999`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(1000..=9999_u16).to_string())
    }

    /// The code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `candidate` is exactly this code.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        candidate == self.0
    }
}

impl std::fmt::Debug for OneTimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OneTimeCode([REDACTED])")
    }
}

/// The outstanding code for one registration attempt.
///
/// Held in memory only; never written to the store.
#[derive(Debug, Clone)]
pub struct CodeChallenge {
    email: Email,
    code: OneTimeCode,
    issued_at: DateTime<Utc>,
    issued: Instant,
}

impl CodeChallenge {
    /// Issue a challenge for `email`.
    #[must_use]
    pub fn new(email: Email, code: OneTimeCode) -> Self {
        Self {
            email,
            code,
            issued_at: Utc::now(),
            issued: Instant::now(),
        }
    }

    /// Email the code was sent to.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Wall-clock issue time.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Whether `candidate` answers this challenge.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.code.matches(candidate)
    }

    /// Whether at least `ttl` has passed since issue (monotonic clock).
    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.issued.elapsed() >= ttl
    }
}

/// The message shown to the user when a code is issued.
///
/// `Debug` redacts the body, which carries the code.
#[derive(Clone)]
pub struct VerificationNotice {
    code: OneTimeCode,
    body: String,
}

impl VerificationNotice {
    /// Subject line for email-like channels.
    pub const SUBJECT: &'static str = "Kode Verifikasi RekurStore";

    /// Build the notice for `code`.
    #[must_use]
    pub fn new(code: OneTimeCode) -> Self {
        let body = format!(
            "Terima kasih telah mendaftar di RekurStore.\n\n\
             Kode Verifikasi Anda: {}\n\n\
             Kode ini diperlukan untuk memverifikasi alamat email Anda dan \
             mengaktifkan akun agar dapat digunakan untuk bertransaksi.",
            code.as_str()
        );
        Self { code, body }
    }

    /// The code digits.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Full message text, including the code.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl std::fmt::Debug for VerificationNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationNotice")
            .field("code", &self.code)
            .field("body", &"[REDACTED]")
            .finish()
    }
}

/// Out-of-band channel that shows a verification code to the user.
///
/// `deliver` is called exactly once per issued code, synchronously, before
/// the auth machine enters `Verifying`. The terminal front end prints the
/// notice; a production deployment would send email or SMS instead.
pub trait Notifier {
    /// Show `notice` to the owner of `destination`.
    fn deliver(&self, destination: &Email, notice: &VerificationNotice);
}

impl<F> Notifier for F
where
    F: Fn(&Email, &VerificationNotice),
{
    fn deliver(&self, destination: &Email, notice: &VerificationNotice) {
        self(destination, notice);
    }
}
