use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::IdentityStore;

/// Process-local identity store.
///
/// Users are keyed by username, so the uniqueness check and the insert
/// happen under one write lock. When a snapshot path is set, an insert is
/// written to that file before the user becomes visible; a failed write
/// leaves the store untouched. `save` rewrites the file from the current
/// state and `open` reloads it.
pub struct InMemoryIdentityStore {
    users: RwLock<HashMap<String, User>>,
    snapshot_path: Option<PathBuf>,
    save_lock: Mutex<()>,
}

/// On-disk shape of a user inside the snapshot file
#[derive(Debug, Serialize, Deserialize)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = UserError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(record.id),
            username: Username::new(record.username)?,
            email: EmailAddress::new(record.email)?,
            password_hash: record.password_hash,
            created_at: record.created_at,
        })
    }
}

impl InMemoryIdentityStore {
    /// Create an empty store that keeps nothing across restarts.
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            snapshot_path: None,
            save_lock: Mutex::new(()),
        }
    }

    /// Open a store backed by a snapshot file, loading it if it exists.
    ///
    /// # Errors
    /// * `StoreUnavailable` - The snapshot exists but cannot be read or parsed
    pub async fn open(snapshot_path: impl Into<PathBuf>) -> Result<Self, UserError> {
        let snapshot_path = snapshot_path.into();
        let users = load_snapshot(&snapshot_path).await?;

        tracing::info!(
            path = %snapshot_path.display(),
            users = users.len(),
            "Identity snapshot loaded"
        );

        Ok(Self {
            users: RwLock::new(users),
            snapshot_path: Some(snapshot_path),
            save_lock: Mutex::new(()),
        })
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn load_snapshot(path: &Path) -> Result<HashMap<String, User>, UserError> {
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => {
            return Err(UserError::StoreUnavailable(format!(
                "Failed to read snapshot {}: {}",
                path.display(),
                e
            )))
        }
    };

    let records: Vec<UserRecord> = serde_json::from_slice(&contents).map_err(|e| {
        UserError::StoreUnavailable(format!("Corrupt snapshot {}: {}", path.display(), e))
    })?;

    records
        .into_iter()
        .map(|record| {
            let user = User::try_from(record)?;
            Ok((user.username.as_str().to_string(), user))
        })
        .collect()
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn get_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(username.as_str()).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.contains_key(user.username.as_str()) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }

        let user = user.into_user(UserId::new(), Utc::now());

        if let Some(path) = &self.snapshot_path {
            let mut records: Vec<UserRecord> = users.values().map(UserRecord::from).collect();
            records.push(UserRecord::from(&user));
            write_snapshot(path, records).await?;
        }

        users.insert(user.username.as_str().to_string(), user.clone());

        Ok(user)
    }

    async fn save(&self) -> Result<(), UserError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        // Readers may share the map, but only one save writes at a time;
        // inserts hold the write lock and so never overlap a save.
        let users = self.users.read().await;
        let _guard = self.save_lock.lock().await;

        write_snapshot(path, users.values().map(UserRecord::from).collect()).await
    }
}

async fn write_snapshot(path: &Path, mut records: Vec<UserRecord>) -> Result<(), UserError> {
    records.sort_by_key(|record| record.created_at);
    let contents = serde_json::to_vec_pretty(&records)
        .map_err(|e| UserError::StoreUnavailable(format!("Failed to encode snapshot: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            UserError::StoreUnavailable(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    // Write beside the target and rename so readers never see a partial file
    let staging = path.with_extension("tmp");
    tokio::fs::write(&staging, contents).await.map_err(|e| {
        UserError::StoreUnavailable(format!("Failed to write {}: {}", staging.display(), e))
    })?;
    tokio::fs::rename(&staging, path).await.map_err(|e| {
        UserError::StoreUnavailable(format!("Failed to replace {}: {}", path.display(), e))
    })?;

    tracing::debug!(path = %path.display(), users = records.len(), "Identity snapshot written");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use auth::Authenticator;

    use super::*;
    use crate::domain::user::models::RegisterUserCommand;
    use crate::domain::user::ports::UserServicePort;
    use crate::domain::user::service::UserService;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-64-bytes-long-for-hs512";

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
        }
    }

    fn snapshot_path() -> PathBuf {
        std::env::temp_dir().join(format!("identity-snapshot-{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_insert_assigns_identity() {
        let store = InMemoryIdentityStore::new();

        let first = store.insert(new_user("alice")).await.unwrap();
        let second = store.insert(new_user("bob")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(
            store
                .find_by_username(&Username::new("alice".to_string()).unwrap())
                .await
                .unwrap(),
            Some(first)
        );
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_username() {
        let store = InMemoryIdentityStore::new();

        store.insert(new_user("alice")).await.unwrap();
        let result = store.insert(new_user("alice")).await;

        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_admit_one_user() {
        let store = Arc::new(InMemoryIdentityStore::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(new_user("alice")).await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(UserError::UsernameAlreadyExists(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_all_is_ordered_by_creation() {
        let store = InMemoryIdentityStore::new();

        for name in ["carol", "alice", "bob"] {
            store.insert(new_user(name)).await.unwrap();
        }

        let users = store.get_all().await.unwrap();
        assert!(users
            .windows(2)
            .all(|pair| pair[0].created_at <= pair[1].created_at));
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn test_save_without_snapshot_is_noop() {
        let store = InMemoryIdentityStore::new();
        store.insert(new_user("alice")).await.unwrap();

        assert!(store.save().await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let path = snapshot_path();

        let store = InMemoryIdentityStore::open(&path).await.unwrap();
        let alice = store.insert(new_user("alice")).await.unwrap();
        store.save().await.unwrap();

        let reopened = InMemoryIdentityStore::open(&path).await.unwrap();
        let users = reopened.get_all().await.unwrap();
        assert_eq!(users, vec![alice]);

        // Uniqueness still holds against reloaded users
        assert!(matches!(
            reopened.insert(new_user("alice")).await,
            Err(UserError::UsernameAlreadyExists(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_insert_is_written_before_it_is_visible() {
        let path = snapshot_path();

        let store = InMemoryIdentityStore::open(&path).await.unwrap();
        let alice = store.insert(new_user("alice")).await.unwrap();

        let reopened = InMemoryIdentityStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_all().await.unwrap(), vec![alice]);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_save_restores_removed_snapshot() {
        let path = snapshot_path();

        let store = InMemoryIdentityStore::open(&path).await.unwrap();
        let alice = store.insert(new_user("alice")).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        store.save().await.unwrap();

        let reopened = InMemoryIdentityStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_all().await.unwrap(), vec![alice]);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_user_behind() {
        let dir = std::env::temp_dir().join(format!("identity-store-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("users.json");
        let store = Arc::new(InMemoryIdentityStore::open(&path).await.unwrap());
        let service = UserService::new(Arc::clone(&store), Arc::new(Authenticator::new(SECRET)));

        let register = || {
            RegisterUserCommand::new(
                Username::new("alice".to_string()).unwrap(),
                EmailAddress::new("alice@example.com".to_string()).unwrap(),
                "p@ss".to_string(),
            )
        };

        // A plain file where the snapshot directory should be makes every write fail
        std::fs::remove_dir(&dir).unwrap();
        std::fs::write(&dir, b"").unwrap();

        let result = service.register(register()).await;
        assert!(matches!(result, Err(UserError::StoreUnavailable(_))));
        assert!(store.get_all().await.unwrap().is_empty());
        assert!(store
            .find_by_username(&Username::new("alice".to_string()).unwrap())
            .await
            .unwrap()
            .is_none());

        // Once the directory is back, retrying the same registration succeeds
        std::fs::remove_file(&dir).unwrap();
        std::fs::create_dir_all(&dir).unwrap();

        let alice = service.register(register()).await.expect("Retry failed");

        let reopened = InMemoryIdentityStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_all().await.unwrap(), vec![alice]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let path = snapshot_path();
        std::fs::write(&path, b"{ not json").unwrap();

        let result = InMemoryIdentityStore::open(&path).await;
        assert!(matches!(result, Err(UserError::StoreUnavailable(_))));

        let _ = std::fs::remove_file(&path);
    }
}
