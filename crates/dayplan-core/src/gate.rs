//! The access gate. Decides whether a request may mutate preferences.
//!
//! Reads are public. Writes require admin status, which a request can prove
//! in one of several ways (an unlocked session, a password header, an HTTP
//! Basic password). Each way is a [`CredentialSource`]; the gate consults its
//! sources in registration order and stops at the first one that grants.
//!
//! The gate owns no mutable state. The server-wide [`Secret`] is fixed at
//! construction and the per-session [`AdminSession`] is passed in by the
//! caller on every `login`/`logout`.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::{Error, Result};

// ─── Secret ──────────────────────────────────────────────────────────────────

/// The shared admin password, loaded once at startup.
#[derive(Clone)]
pub enum Secret {
  /// Plaintext; compared byte-for-byte in constant time.
  Plain(String),
  /// An argon2 PHC string, e.g. `$argon2id$v=19$…`.
  Argon2(String),
}

impl Secret {
  pub fn plain(password: impl Into<String>) -> Self { Self::Plain(password.into()) }

  /// Wrap a PHC string, rejecting it up front if it does not parse.
  pub fn argon2(phc: impl Into<String>) -> Result<Self> {
    let phc = phc.into();
    PasswordHash::new(&phc)
      .map_err(|e| Error::ServerMisconfigured(format!("invalid admin password hash: {e}")))?;
    Ok(Self::Argon2(phc))
  }

  pub fn is_empty(&self) -> bool {
    match self {
      Self::Plain(p) | Self::Argon2(p) => p.is_empty(),
    }
  }

  /// Exact match only: no trimming, no case folding.
  pub fn matches(&self, candidate: &str) -> bool {
    match self {
      Self::Plain(expected) => bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())),
      Self::Argon2(phc) => PasswordHash::new(phc)
        .and_then(|hash| Argon2::default().verify_password(candidate.as_bytes(), &hash))
        .is_ok(),
    }
  }
}

impl fmt::Debug for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Plain(_) => f.write_str("Secret::Plain(..)"),
      Self::Argon2(_) => f.write_str("Secret::Argon2(..)"),
    }
  }
}

// ─── Session state ───────────────────────────────────────────────────────────

/// Per-session admin state. Every new session starts [`Locked`](Self::Locked).
///
/// ```text
/// locked   --login ok-->     unlocked
/// unlocked --logout-->       locked
/// unlocked --login failed--> unlocked
/// ```
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AdminSession {
  #[default]
  Locked,
  Unlocked,
}

impl AdminSession {
  pub fn is_admin(self) -> bool { matches!(self, Self::Unlocked) }
}

/// Implemented by request contexts that carry a session.
pub trait HasAdminSession {
  fn admin_session(&self) -> AdminSession;
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Something a request presented that might prove admin status.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
  /// The session was already unlocked.
  AdminSession,
  /// A password to compare against the server secret.
  Password(String),
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::AdminSession => f.write_str("AdminSession"),
      Self::Password(_) => f.write_str("Password(..)"),
    }
  }
}

/// One strategy for pulling a credential out of a request of type `R`.
pub trait CredentialSource<R: ?Sized>: Send + Sync {
  fn extract(&self, request: &R) -> Option<Credential>;
}

impl<R, F> CredentialSource<R> for F
where
  R: ?Sized,
  F: Fn(&R) -> Option<Credential> + Send + Sync,
{
  fn extract(&self, request: &R) -> Option<Credential> { self(request) }
}

/// Yields [`Credential::AdminSession`] when the request's session is unlocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFlag;

impl<R: HasAdminSession + ?Sized> CredentialSource<R> for SessionFlag {
  fn extract(&self, request: &R) -> Option<Credential> {
    request
      .admin_session()
      .is_admin()
      .then_some(Credential::AdminSession)
  }
}

// ─── Gate ────────────────────────────────────────────────────────────────────

pub struct AccessGate<R: ?Sized> {
  secret:  Option<Secret>,
  sources: Vec<Box<dyn CredentialSource<R>>>,
}

impl<R: ?Sized> AccessGate<R> {
  /// A gate with no credential sources. An empty secret counts as unset.
  pub fn new(secret: Option<Secret>) -> Self {
    Self {
      secret:  secret.filter(|s| !s.is_empty()),
      sources: Vec::new(),
    }
  }

  /// Append a source; sources are consulted in the order they were added.
  pub fn with_source(mut self, source: impl CredentialSource<R> + 'static) -> Self {
    self.sources.push(Box::new(source));
    self
  }

  pub fn is_configured(&self) -> bool { self.secret.is_some() }

  /// Whether `request` is treated as admin.
  pub fn authorize(&self, request: &R) -> bool {
    self
      .sources
      .iter()
      .filter_map(|source| source.extract(request))
      .any(|credential| self.grants(&credential))
  }

  /// The first password any source finds in `request`, for use as a login
  /// fallback when the body carries none.
  pub fn presented_password(&self, request: &R) -> Option<String> {
    self
      .sources
      .iter()
      .filter_map(|source| source.extract(request))
      .find_map(|credential| match credential {
        Credential::Password(p) => Some(p),
        Credential::AdminSession => None,
      })
  }

  fn grants(&self, credential: &Credential) -> bool {
    match credential {
      Credential::AdminSession => true,
      Credential::Password(p) => self.secret.as_ref().is_some_and(|s| s.matches(p)),
    }
  }

  /// Unlock `session` if `password` matches the secret.
  ///
  /// Returns `Ok(false)` on a wrong or missing password and leaves the session
  /// as it was. Fails with [`Error::ServerMisconfigured`] when no secret is
  /// configured.
  pub fn login(&self, session: &mut AdminSession, password: Option<&str>) -> Result<bool> {
    let secret = self
      .secret
      .as_ref()
      .ok_or_else(|| Error::ServerMisconfigured("admin password not set".to_owned()))?;

    match password {
      Some(p) if !p.is_empty() && secret.matches(p) => {
        *session = AdminSession::Unlocked;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  pub fn logout(&self, session: &mut AdminSession) { *session = AdminSession::Locked; }
}

impl<R: ?Sized> fmt::Debug for AccessGate<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AccessGate")
      .field("secret", &self.secret)
      .field("sources", &self.sources.len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Req {
    session: AdminSession,
    header:  Option<&'static str>,
    basic:   Option<&'static str>,
  }

  impl HasAdminSession for Req {
    fn admin_session(&self) -> AdminSession { self.session }
  }

  fn req(session: AdminSession, header: Option<&'static str>, basic: Option<&'static str>) -> Req {
    Req { session, header, basic }
  }

  fn gate(secret: Option<Secret>) -> AccessGate<Req> {
    AccessGate::new(secret)
      .with_source(SessionFlag)
      .with_source(|r: &Req| r.header.map(|p| Credential::Password(p.to_owned())))
      .with_source(|r: &Req| r.basic.map(|p| Credential::Password(p.to_owned())))
  }

  fn swordfish() -> AccessGate<Req> { gate(Some(Secret::plain("swordfish"))) }

  // ── authorize ─────────────────────────────────────────────────────────────

  #[test]
  fn unlocked_session_grants_without_password() {
    let g = swordfish();
    assert!(g.authorize(&req(AdminSession::Unlocked, None, None)));
  }

  #[test]
  fn locked_session_without_credentials_is_denied() {
    let g = swordfish();
    assert!(!g.authorize(&req(AdminSession::Locked, None, None)));
  }

  #[test]
  fn header_password_must_match_exactly() {
    let g = swordfish();
    assert!(g.authorize(&req(AdminSession::Locked, Some("swordfish"), None)));
    for near in ["swordfish ", " swordfish", "Swordfish", "SWORDFISH", "swordfis", ""] {
      assert!(
        !g.authorize(&req(AdminSession::Locked, Some(near), None)),
        "{near:?} should not authorize"
      );
    }
  }

  #[test]
  fn basic_password_is_consulted_after_a_wrong_header() {
    let g = swordfish();
    assert!(g.authorize(&req(AdminSession::Locked, Some("wrong"), Some("swordfish"))));
    assert!(!g.authorize(&req(AdminSession::Locked, Some("wrong"), Some("also wrong"))));
  }

  #[test]
  fn passwords_never_grant_without_a_secret() {
    let g = gate(None);
    assert!(!g.authorize(&req(AdminSession::Locked, Some(""), Some(""))));
    // A session unlocked earlier still counts.
    assert!(g.authorize(&req(AdminSession::Unlocked, None, None)));
  }

  #[test]
  fn empty_secret_counts_as_unset() {
    let g = gate(Some(Secret::plain("")));
    assert!(!g.is_configured());
    assert!(!g.authorize(&req(AdminSession::Locked, Some(""), None)));
  }

  #[test]
  fn first_grant_short_circuits() {
    use std::sync::{
      Arc,
      atomic::{AtomicUsize, Ordering},
    };

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let g: AccessGate<Req> = AccessGate::new(Some(Secret::plain("swordfish")))
      .with_source(SessionFlag)
      .with_source(move |_: &Req| {
        counter.fetch_add(1, Ordering::SeqCst);
        None
      });

    assert!(g.authorize(&req(AdminSession::Unlocked, None, None)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(!g.authorize(&req(AdminSession::Locked, None, None)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn presented_password_skips_session_credentials() {
    let g = swordfish();
    let r = req(AdminSession::Unlocked, None, Some("from-basic"));
    assert_eq!(g.presented_password(&r).as_deref(), Some("from-basic"));
    assert_eq!(g.presented_password(&req(AdminSession::Locked, None, None)), None);
  }

  // ── login / logout ────────────────────────────────────────────────────────

  #[test]
  fn login_then_logout() {
    let g = swordfish();
    let mut s = AdminSession::default();
    assert_eq!(s, AdminSession::Locked);

    assert!(g.login(&mut s, Some("swordfish")).unwrap());
    assert!(s.is_admin());

    g.logout(&mut s);
    assert!(!s.is_admin());
  }

  #[test]
  fn failed_login_leaves_state_untouched() {
    let g = swordfish();

    let mut locked = AdminSession::Locked;
    assert!(!g.login(&mut locked, Some("nope")).unwrap());
    assert_eq!(locked, AdminSession::Locked);

    let mut unlocked = AdminSession::Unlocked;
    assert!(!g.login(&mut unlocked, Some("nope")).unwrap());
    assert_eq!(unlocked, AdminSession::Unlocked);

    assert!(!g.login(&mut locked, None).unwrap());
    assert!(!g.login(&mut locked, Some("")).unwrap());
  }

  #[test]
  fn login_without_secret_is_misconfiguration() {
    let g = gate(None);
    let mut s = AdminSession::Locked;
    assert!(matches!(
      g.login(&mut s, Some("swordfish")),
      Err(Error::ServerMisconfigured(_))
    ));
    assert_eq!(s, AdminSession::Locked);
  }

  #[test]
  fn logout_is_unconditional() {
    let g = gate(None);
    let mut s = AdminSession::Locked;
    g.logout(&mut s);
    assert_eq!(s, AdminSession::Locked);
  }

  // ── secrets ───────────────────────────────────────────────────────────────

  #[test]
  fn argon2_secret() {
    use argon2::{PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;

    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
      .hash_password(b"swordfish", &salt)
      .unwrap()
      .to_string();

    let secret = Secret::argon2(phc).unwrap();
    assert!(secret.matches("swordfish"));
    assert!(!secret.matches("swordfish "));
    assert!(!secret.matches(""));
  }

  #[test]
  fn malformed_hash_is_rejected() {
    assert!(matches!(
      Secret::argon2("not-a-phc-string"),
      Err(Error::ServerMisconfigured(_))
    ));
  }

  #[test]
  fn debug_output_is_redacted() {
    let s = Secret::plain("swordfish");
    assert!(!format!("{s:?}").contains("swordfish"));
    let c = Credential::Password("swordfish".into());
    assert!(!format!("{c:?}").contains("swordfish"));
  }
}
