//! [`AuthService`]: login, registration and the current identity.

use swoply_core::{
  account::{Account, AccountPatch, NewAccount},
  form::RegistrationForm,
  session::SessionPointer,
  store::MarketStore,
};
use tracing::{debug, info, warn};

use crate::{AuthError, CredentialHasher, Result, Verification};

/// Profile fields an account holder may change themselves.
///
/// For the optional fields, `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
  pub name:   Option<String>,
  pub phone:  Option<Option<String>>,
  pub avatar: Option<Option<String>>,
}

impl From<ProfileUpdate> for AccountPatch {
  fn from(u: ProfileUpdate) -> Self {
    AccountPatch {
      name: u.name,
      phone: u.phone,
      avatar: u.avatar,
      ..Default::default()
    }
  }
}

/// The session context of one front end.
///
/// Holds the logged-in account, if any, and mirrors it into the store's
/// session pointer so a later [`AuthService::restore`] picks it up again.
pub struct AuthService<S> {
  store:   S,
  hasher:  CredentialHasher,
  current: Option<Account>,
}

impl<S: MarketStore> AuthService<S> {
  /// Build a service and resume the persisted session, if its account still
  /// exists.
  pub async fn restore(store: S, hasher: CredentialHasher) -> Result<Self> {
    let current = match store.load_session().await.map_err(AuthError::store)? {
      Some(pointer) => {
        let account = store
          .get_account(pointer.account_id)
          .await
          .map_err(AuthError::store)?;
        if account.is_none() {
          debug!(account_id = %pointer.account_id, "session points at a missing account");
        }
        account
      }
      None => None,
    };

    Ok(Self { store, hasher, current })
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn current(&self) -> Option<&Account> { self.current.as_ref() }

  pub fn is_authenticated(&self) -> bool { self.current.is_some() }

  /// The current account, or [`AuthError::NotAuthenticated`].
  pub fn require_current(&self) -> Result<&Account> {
    self.current.as_ref().ok_or(AuthError::NotAuthenticated)
  }

  /// Log in with an email and credential.
  ///
  /// An unknown email and a wrong credential are reported as different
  /// errors.
  pub async fn login(&mut self, email: &str, credential: &str) -> Result<Account> {
    let email = email.trim();
    let account = self
      .store
      .get_account_by_email(email)
      .await
      .map_err(AuthError::store)?
      .ok_or_else(|| {
        warn!("login failed: unknown email");
        AuthError::AccountNotFound
      })?;

    let account = match self.hasher.verify(credential, &account.credential_hash)? {
      Verification::Match => account,
      Verification::LegacyMatch => self.upgrade_credential(account, credential).await?,
      Verification::Mismatch => {
        warn!(account_id = %account.account_id, "login failed: wrong credential");
        return Err(AuthError::WrongCredential);
      }
    };

    self.start_session(account).await
  }

  /// Create an account from the sign-up form and log it in straight away.
  /// The new account starts unverified.
  pub async fn register(&mut self, form: &RegistrationForm) -> Result<Account> {
    form.validate()?;
    let email = form.email.trim().to_owned();

    if self
      .store
      .get_account_by_email(&email)
      .await
      .map_err(AuthError::store)?
      .is_some()
    {
      return Err(AuthError::EmailTaken);
    }

    let input = NewAccount {
      email,
      phone: form.phone(),
      credential_hash: self.hasher.hash(&form.password)?,
      name: form.name.trim().to_owned(),
      verified: false,
      avatar: None,
    };

    // The store re-checks the email atomically; a concurrent registration may
    // have claimed it since the lookup above.
    let account = self
      .store
      .create_account(input)
      .await
      .map_err(AuthError::store)?
      .ok_or(AuthError::EmailTaken)?;

    info!(account_id = %account.account_id, "account registered");
    self.start_session(account).await
  }

  /// Forget the current identity and the persisted session pointer.
  pub async fn logout(&mut self) -> Result<()> {
    self.store.clear_session().await.map_err(AuthError::store)?;
    if let Some(account) = self.current.take() {
      info!(account_id = %account.account_id, "logged out");
    }
    Ok(())
  }

  /// Merge `update` into the current account and refresh the in-memory copy.
  pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<Account> {
    let account_id = self.require_current()?.account_id;

    let updated = self
      .store
      .update_account(account_id, update.into())
      .await
      .map_err(AuthError::store)?
      .ok_or(AuthError::AccountNotFound)?;

    debug!(%account_id, "profile updated");
    self.current = Some(updated.clone());
    Ok(updated)
  }

  async fn start_session(&mut self, account: Account) -> Result<Account> {
    self
      .store
      .save_session(SessionPointer::now(account.account_id))
      .await
      .map_err(AuthError::store)?;
    info!(account_id = %account.account_id, "session started");
    self.current = Some(account.clone());
    Ok(account)
  }

  /// Replace a legacy checksum with an Argon2id digest.
  async fn upgrade_credential(&self, account: Account, credential: &str) -> Result<Account> {
    let patch = AccountPatch {
      credential_hash: Some(self.hasher.hash(credential)?),
      ..Default::default()
    };
    let upgraded = self
      .store
      .update_account(account.account_id, patch)
      .await
      .map_err(AuthError::store)?
      .ok_or(AuthError::AccountNotFound)?;
    info!(account_id = %upgraded.account_id, "legacy credential upgraded");
    Ok(upgraded)
  }
}
