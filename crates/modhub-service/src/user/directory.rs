//! In-memory user directory.

use std::collections::HashSet;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use modhub_core::error::AppError;
use modhub_core::types::UserId;
use modhub_entity::user::{User, UserRole};

/// Minimum username length.
const MIN_USERNAME_LEN: usize = 3;
/// Maximum username length.
const MAX_USERNAME_LEN: usize = 32;
/// Maximum display name length.
const MAX_DISPLAY_NAME_LEN: usize = 64;

/// Registry of all users, indexed by ID and by lowercase username.
///
/// Every mutation of a single user goes through [`UserDirectory::update`],
/// which holds that user's entry guard for the duration of the closure.
#[derive(Debug, Default)]
pub struct UserDirectory {
    /// User ID → user.
    users: DashMap<UserId, User>,
    /// Lowercase username → user ID.
    by_username: DashMap<String, UserId>,
}

impl UserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new user. Usernames are unique case-insensitively.
    pub fn register(
        &self,
        username: &str,
        display_name: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        let username = username.trim();
        let display_name = display_name.trim();
        validate_username(username)?;
        if display_name.is_empty() || display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(AppError::validation(format!(
                "Display name must be 1 to {MAX_DISPLAY_NAME_LEN} characters"
            )));
        }

        match self.by_username.entry(username.to_lowercase()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Username '{username}' is already taken"
            ))),
            Entry::Vacant(slot) => {
                let user = User::new(username, display_name, role);
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                info!(user_id = %user.id, username = %user.username, role = %role, "User registered");
                Ok(user)
            }
        }
    }

    /// Gets a user by ID.
    pub fn get(&self, user_id: &UserId) -> Result<User, AppError> {
        self.users
            .get(user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Finds a user by username (case-insensitive).
    pub fn find_by_username(&self, username: &str) -> Option<User> {
        let id = *self.by_username.get(&username.trim().to_lowercase())?;
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    /// Applies `f` to the user while holding its entry guard and returns the
    /// closure's result together with the updated user.
    ///
    /// If `f` fails the user is left exactly as `f` left it, so closures must
    /// check before they mutate.
    pub fn update<R>(
        &self,
        user_id: &UserId,
        f: impl FnOnce(&mut User) -> Result<R, AppError>,
    ) -> Result<(R, User), AppError> {
        let mut entry = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        let result = f(entry.value_mut())?;
        Ok((result, entry.value().clone()))
    }

    /// All users, oldest first.
    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by_key(|u| u.created_at);
        users
    }

    /// IDs of every banned user.
    pub fn banned_ids(&self) -> HashSet<UserId> {
        self.users
            .iter()
            .filter(|e| e.value().is_banned)
            .map(|e| *e.key())
            .collect()
    }

    /// IDs of every admin or super-admin that is not banned.
    pub fn active_admin_ids(&self) -> HashSet<UserId> {
        self.users
            .iter()
            .filter(|e| e.value().is_admin() && !e.value().is_banned)
            .map(|e| *e.key())
            .collect()
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user is registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "Username must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(AppError::validation(
            "Username may only contain letters, digits, '_', '-' and '.'",
        ));
    }
    Ok(())
}
