//! User registry kept in the session key-value store.
//!
//! Covers self-registration, sign-in/sign-out, and the admin users screen.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use boutique_core::{DomainError, Entity, UserId};

use crate::store::{KeyValueStore, StoreError, load_json, save_json};

const USERS_KEY: &str = "users";
const CURRENT_USER_KEY: &str = "current_user";
const DIGEST_CONTEXT: &str = "boutique 2024 user password digest";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("email not registered")]
    EmailNotRegistered,

    #[error("wrong password")]
    WrongPassword,

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Role of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    /// Assigned on self-registration.
    #[default]
    Customer,
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Administrator => f.write_str("administrator"),
            Role::Customer => f.write_str("customer"),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    /// Stored trimmed and lower-cased.
    pub email: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub role: Role,
    password_digest: String,
}

impl User {
    pub fn full_name(&self) -> String {
        [
            self.first_name.as_str(),
            self.paternal_surname.as_str(),
            self.maternal_surname.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }

    fn set_password(&mut self, password: &str) {
        self.password_digest = digest(self.id, password);
    }

    fn verify_password(&self, password: &str) -> bool {
        self.password_digest == digest(self.id, password)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn digest(id: UserId, password: &str) -> String {
    let mut hasher = blake3::Hasher::new_derive_key(DIGEST_CONTEXT);
    hasher.update(id.as_uuid().as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Profile fields shared by registration and the admin form.
struct Profile {
    first_name: String,
    paternal_surname: String,
    maternal_surname: String,
    email: String,
    birth_date: NaiveDate,
    address: String,
}

fn validate_profile(
    first_name: &str,
    paternal_surname: &str,
    maternal_surname: &str,
    email: &str,
    birth_date: &str,
    address: &str,
) -> Result<Profile, DomainError> {
    for (field, value) in [
        ("first_name", first_name),
        ("paternal_surname", paternal_surname),
        ("email", email),
        ("birth_date", birth_date),
    ] {
        if value.trim().is_empty() {
            return Err(DomainError::validation(format!("{field} is required")));
        }
    }

    let email = normalize_email(email);
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(DomainError::validation(format!("invalid email: {email}")));
    }

    let birth_date = NaiveDate::parse_from_str(birth_date.trim(), DATE_FORMAT)
        .map_err(|e| DomainError::validation(format!("invalid birth_date: {e}")))?;

    Ok(Profile {
        first_name: first_name.trim().to_string(),
        paternal_surname: paternal_surname.trim().to_string(),
        maternal_surname: maternal_surname.trim().to_string(),
        email,
        birth_date,
        address: address.trim().to_string(),
    })
}

/// Self-registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub first_name: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub email: String,
    /// `YYYY-MM-DD`, as produced by a date input.
    pub birth_date: String,
    pub address: String,
    pub password: String,
    pub confirm_password: String,
}

/// Admin users form. A blank password keeps the current one on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserForm {
    pub first_name: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub email: String,
    pub birth_date: String,
    pub address: String,
    pub role: Role,
    pub password: String,
}

impl UserForm {
    fn profile(&self) -> Result<Profile, DomainError> {
        validate_profile(
            &self.first_name,
            &self.paternal_surname,
            &self.maternal_surname,
            &self.email,
            &self.birth_date,
            &self.address,
        )
    }
}

/// Users persisted under the `users` key; the signed-in user's id under
/// `current_user`.
#[derive(Debug)]
pub struct UserRegistry<S> {
    store: S,
}

impl<S: KeyValueStore> UserRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn list(&self) -> Result<Vec<User>, AuthError> {
        Ok(load_json::<Vec<User>, _>(&self.store, USERS_KEY)?.unwrap_or_default())
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let email = normalize_email(email);
        Ok(self.list()?.into_iter().find(|u| u.email == email))
    }

    pub fn register(&mut self, registration: &Registration) -> Result<User, AuthError> {
        let profile = validate_profile(
            &registration.first_name,
            &registration.paternal_surname,
            &registration.maternal_surname,
            &registration.email,
            &registration.birth_date,
            &registration.address,
        )?;
        if registration.password.is_empty() {
            return Err(DomainError::validation("password is required").into());
        }
        if registration.password != registration.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let user = self.insert(profile, Role::Customer, &registration.password)?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and remember the user as signed in.
    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.find_by_email(email)? else {
            tracing::info!("login rejected: email not registered");
            return Err(AuthError::EmailNotRegistered);
        };
        if !user.verify_password(password) {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::WrongPassword);
        }

        save_json(&mut self.store, CURRENT_USER_KEY, &user.id)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user signed in");
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.store.remove(CURRENT_USER_KEY)?;
        Ok(())
    }

    /// The signed-in user, if any (and if still registered).
    pub fn current_user(&self) -> Result<Option<User>, AuthError> {
        let Some(id) = load_json::<UserId, _>(&self.store, CURRENT_USER_KEY)? else {
            return Ok(None);
        };
        Ok(self.list()?.into_iter().find(|u| u.id == id))
    }

    /// Admin: add a user with an explicit role.
    pub fn create(&mut self, form: &UserForm) -> Result<User, AuthError> {
        let profile = form.profile()?;
        if form.password.is_empty() {
            return Err(DomainError::validation("password is required").into());
        }
        self.insert(profile, form.role, &form.password)
    }

    /// Admin: edit a user's profile and role.
    pub fn update(&mut self, id: UserId, form: &UserForm) -> Result<User, AuthError> {
        let profile = form.profile()?;
        let mut users = self.list()?;

        if users.iter().any(|u| u.id != id && u.email == profile.email) {
            return Err(AuthError::EmailTaken(profile.email));
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found("user", id))?;

        user.first_name = profile.first_name;
        user.paternal_surname = profile.paternal_surname;
        user.maternal_surname = profile.maternal_surname;
        user.email = profile.email;
        user.birth_date = profile.birth_date;
        user.address = profile.address;
        user.role = form.role;
        if !form.password.is_empty() {
            user.set_password(&form.password);
        }
        let updated = user.clone();

        save_json(&mut self.store, USERS_KEY, &users)?;
        Ok(updated)
    }

    /// Admin: delete a user. Returns whether one was removed.
    pub fn delete(&mut self, id: UserId) -> Result<bool, AuthError> {
        let mut users = self.list()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }
        save_json(&mut self.store, USERS_KEY, &users)?;
        Ok(true)
    }

    fn insert(&mut self, profile: Profile, role: Role, password: &str) -> Result<User, AuthError> {
        let mut users = self.list()?;
        if users.iter().any(|u| u.email == profile.email) {
            return Err(AuthError::EmailTaken(profile.email));
        }

        let mut user = User {
            id: UserId::new(),
            first_name: profile.first_name,
            paternal_surname: profile.paternal_surname,
            maternal_surname: profile.maternal_surname,
            email: profile.email,
            birth_date: profile.birth_date,
            address: profile.address,
            role,
            password_digest: String::new(),
        };
        user.set_password(password);

        users.push(user.clone());
        save_json(&mut self.store, USERS_KEY, &users)?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registration(email: &str) -> Registration {
        Registration {
            first_name: "Gabriela".into(),
            paternal_surname: "García".into(),
            maternal_surname: "López".into(),
            email: email.into(),
            birth_date: "2002-10-06".into(),
            address: "Achachicala, La Paz".into(),
            password: "123456".into(),
            confirm_password: "123456".into(),
        }
    }

    fn admin_form(email: &str, role: Role) -> UserForm {
        UserForm {
            first_name: "Vlad".into(),
            paternal_surname: "Draculea".into(),
            maternal_surname: String::new(),
            email: email.into(),
            birth_date: "1990-12-30".into(),
            address: "Sighișoara".into(),
            role,
            password: "1234567".into(),
        }
    }

    #[test]
    fn register_then_login() {
        let mut registry = UserRegistry::new(MemoryStore::new());
        let user = registry.register(&registration("Gabi@Example.com ")).unwrap();
        assert_eq!(user.email, "gabi@example.com");
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.full_name(), "Gabriela García López");

        assert!(registry.current_user().unwrap().is_none());
        let signed_in = registry.login("GABI@example.com", "123456").unwrap();
        assert_eq!(signed_in.id, user.id);
        assert_eq!(registry.current_user().unwrap().unwrap().id, user.id);

        registry.logout().unwrap();
        assert!(registry.current_user().unwrap().is_none());
    }

    #[test]
    fn register_rejects_mismatched_passwords() {
        let mut registry = UserRegistry::new(MemoryStore::new());
        let mut reg = registration("gabi@example.com");
        reg.confirm_password = "654321".into();
        assert!(matches!(registry.register(&reg), Err(AuthError::PasswordMismatch)));
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let mut registry = UserRegistry::new(MemoryStore::new());
        registry.register(&registration("gabi@example.com")).unwrap();
        let err = registry.register(&registration("GABI@example.com")).unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken(ref e) if e == "gabi@example.com"));
    }

    #[test]
    fn register_validates_fields() {
        let mut registry = UserRegistry::new(MemoryStore::new());

        let mut reg = registration("gabi@example.com");
        reg.first_name = " ".into();
        assert!(matches!(registry.register(&reg), Err(AuthError::Invalid(_))));

        let reg = registration("not-an-email");
        assert!(matches!(registry.register(&reg), Err(AuthError::Invalid(_))));

        let mut reg = registration("gabi@example.com");
        reg.birth_date = "06-10-2002".into();
        assert!(matches!(registry.register(&reg), Err(AuthError::Invalid(_))));
    }

    #[test]
    fn login_distinguishes_unknown_email_and_wrong_password() {
        let mut registry = UserRegistry::new(MemoryStore::new());
        registry.register(&registration("gabi@example.com")).unwrap();

        assert!(matches!(
            registry.login("nobody@example.com", "123456"),
            Err(AuthError::EmailNotRegistered)
        ));
        assert!(matches!(
            registry.login("gabi@example.com", "wrong"),
            Err(AuthError::WrongPassword)
        ));
        assert!(registry.current_user().unwrap().is_none());
    }

    #[test]
    fn passwords_are_not_stored_in_clear() {
        let mut registry = UserRegistry::new(MemoryStore::new());
        registry.register(&registration("gabi@example.com")).unwrap();
        let raw = registry.store().get(USERS_KEY).unwrap().unwrap();
        assert!(!raw.contains("123456"));
    }

    #[test]
    fn admin_create_update_delete() {
        let mut registry = UserRegistry::new(MemoryStore::new());
        let admin = registry
            .create(&admin_form("vlad@example.com", Role::Administrator))
            .unwrap();
        assert!(admin.is_admin());

        let mut form = admin_form("vlad@example.com", Role::Customer);
        form.password = String::new();
        form.address = "Târgoviște".into();
        let updated = registry.update(admin.id, &form).unwrap();
        assert_eq!(updated.role, Role::Customer);
        assert_eq!(updated.address, "Târgoviște");
        // Blank password on update keeps the old one.
        registry.login("vlad@example.com", "1234567").unwrap();

        assert!(registry.delete(admin.id).unwrap());
        assert!(!registry.delete(admin.id).unwrap());
        assert!(registry.current_user().unwrap().is_none());
    }

    #[test]
    fn admin_update_rejects_taken_email_and_missing_user() {
        let mut registry = UserRegistry::new(MemoryStore::new());
        registry.register(&registration("gabi@example.com")).unwrap();
        let other = registry
            .create(&admin_form("vlad@example.com", Role::Administrator))
            .unwrap();

        let err = registry
            .update(other.id, &admin_form("gabi@example.com", Role::Administrator))
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken(_)));

        let err = registry
            .update(UserId::new(), &admin_form("x@example.com", Role::Customer))
            .unwrap_err();
        assert!(matches!(err, AuthError::Invalid(DomainError::NotFound { entity: "user", .. })));
    }
}
