//! `AuthService` tests against an in-memory SQLite store.

use swoply_core::{
  account::NewAccount,
  form::{RegistrationForm, ValidationError},
  session::SessionPointer,
  store::MarketStore,
};
use swoply_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{AuthError, AuthService, CredentialHasher, ProfileUpdate, credential::legacy_checksum};

fn hasher() -> CredentialHasher {
  CredentialHasher::with_costs(8, 1, 1).expect("cheap argon2 params")
}

async fn service() -> AuthService<SqliteStore> {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  AuthService::restore(store, hasher()).await.unwrap()
}

fn form(email: &str, password: &str) -> RegistrationForm {
  RegistrationForm {
    email:    email.into(),
    password: password.into(),
    name:     "Михаил Р.".into(),
    phone:    Some("+7 911 000 00 00".into()),
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_creates_unverified_account_and_session() {
  let mut auth = service().await;

  let account = auth
    .register(&form("misha@example.com", "secret123"))
    .await
    .unwrap();

  assert!(!account.verified);
  assert_eq!(account.phone.as_deref(), Some("+7 911 000 00 00"));
  assert!(account.credential_hash.starts_with("$argon2id$"));
  assert_eq!(auth.current().map(|a| a.account_id), Some(account.account_id));

  let pointer = auth.store().load_session().await.unwrap().unwrap();
  assert_eq!(pointer.account_id, account.account_id);
}

#[tokio::test]
async fn register_then_login_yields_same_account() {
  let mut auth = service().await;
  let registered = auth
    .register(&form("misha@example.com", "secret123"))
    .await
    .unwrap();
  auth.logout().await.unwrap();

  let logged_in = auth.login("misha@example.com", "secret123").await.unwrap();
  assert_eq!(logged_in.account_id, registered.account_id);
  assert!(auth.is_authenticated());
}

#[tokio::test]
async fn register_with_taken_email_fails() {
  let mut auth = service().await;
  auth
    .register(&form("misha@example.com", "secret123"))
    .await
    .unwrap();

  let err = auth
    .register(&form("misha@example.com", "another1"))
    .await
    .unwrap_err();
  assert!(matches!(err, AuthError::EmailTaken));
  assert_eq!(auth.store().list_accounts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn register_rejects_short_password_before_store() {
  let mut auth = service().await;
  let err = auth
    .register(&form("misha@example.com", "12345"))
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    AuthError::Validation(ValidationError::CredentialTooShort { .. })
  ));
  assert!(auth.store().list_accounts().await.unwrap().is_empty());
  assert!(!auth.is_authenticated());
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_email_and_wrong_password_are_distinct() {
  let mut auth = service().await;
  auth
    .register(&form("misha@example.com", "secret123"))
    .await
    .unwrap();
  auth.logout().await.unwrap();

  let err = auth.login("nobody@example.com", "secret123").await.unwrap_err();
  assert!(matches!(err, AuthError::AccountNotFound));

  let err = auth.login("misha@example.com", "wrong-pass").await.unwrap_err();
  assert!(matches!(err, AuthError::WrongCredential));

  assert!(!auth.is_authenticated());
  assert!(auth.store().load_session().await.unwrap().is_none());
}

#[tokio::test]
async fn legacy_checksum_logs_in_and_is_upgraded() {
  let mut auth = service().await;
  let legacy = auth
    .store()
    .create_account(NewAccount {
      email:           "anna@example.com".into(),
      phone:           None,
      credential_hash: legacy_checksum("secret1"),
      name:            "Анна К.".into(),
      verified:        true,
      avatar:          None,
    })
    .await
    .unwrap()
    .unwrap();

  let account = auth.login("anna@example.com", "secret1").await.unwrap();
  assert_eq!(account.account_id, legacy.account_id);
  assert!(account.credential_hash.starts_with("$argon2id$"));

  let stored = auth
    .store()
    .get_account(legacy.account_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.credential_hash, account.credential_hash);

  auth.logout().await.unwrap();
  assert!(auth.login("anna@example.com", "secret1").await.is_ok());
  assert!(matches!(
    auth.login("anna@example.com", "secret2").await,
    Err(AuthError::WrongCredential)
  ));
}

// ─── Session restore ─────────────────────────────────────────────────────────

#[tokio::test]
async fn restore_resumes_persisted_session() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let mut first = AuthService::restore(store.clone(), hasher()).await.unwrap();
  let account = first
    .register(&form("misha@example.com", "secret123"))
    .await
    .unwrap();

  let second = AuthService::restore(store, hasher()).await.unwrap();
  assert_eq!(second.current().map(|a| a.account_id), Some(account.account_id));
}

#[tokio::test]
async fn restore_ignores_pointer_to_missing_account() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .save_session(SessionPointer::now(Uuid::new_v4()))
    .await
    .unwrap();

  let auth = AuthService::restore(store, hasher()).await.unwrap();
  assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn logout_clears_identity_and_pointer() {
  let mut auth = service().await;
  auth
    .register(&form("misha@example.com", "secret123"))
    .await
    .unwrap();

  auth.logout().await.unwrap();
  assert!(auth.current().is_none());
  assert!(auth.store().load_session().await.unwrap().is_none());

  // Idempotent.
  auth.logout().await.unwrap();
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_profile_requires_login() {
  let mut auth = service().await;
  let err = auth
    .update_profile(ProfileUpdate { name: Some("x".into()), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(err, AuthError::NotAuthenticated));
}

#[tokio::test]
async fn update_profile_refreshes_current_identity() {
  let mut auth = service().await;
  let account = auth
    .register(&form("misha@example.com", "secret123"))
    .await
    .unwrap();

  let updated = auth
    .update_profile(ProfileUpdate {
      name:   Some("Михаил".into()),
      phone:  Some(None),
      avatar: Some(Some("/img/avatar.jpg".into())),
    })
    .await
    .unwrap();

  assert_eq!(updated.name, "Михаил");
  assert_eq!(updated.phone, None);
  assert_eq!(updated.avatar.as_deref(), Some("/img/avatar.jpg"));
  assert_eq!(updated.credential_hash, account.credential_hash);
  assert_eq!(auth.current(), Some(&updated));

  let stored = auth
    .store()
    .get_account(account.account_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored, updated);
}
