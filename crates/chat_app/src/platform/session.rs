use std::fs;
use std::path::Path;

use chat_core::Permission;
use chat_engine::AtomicFileWriter;
use chat_logging::{chat_error, chat_info, chat_warn};
use serde::{Deserialize, Serialize};

/// What survives a restart: the view being shown and the notification answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub show_chat: String,
    pub permission: Permission,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
enum PersistedPermission {
    #[default]
    Undecided,
    Granted,
    Denied,
}

impl From<Permission> for PersistedPermission {
    fn from(permission: Permission) -> Self {
        match permission {
            Permission::Undecided => Self::Undecided,
            Permission::Granted => Self::Granted,
            Permission::Denied => Self::Denied,
        }
    }
}

impl From<PersistedPermission> for Permission {
    fn from(permission: PersistedPermission) -> Self {
        match permission {
            PersistedPermission::Undecided => Self::Undecided,
            PersistedPermission::Granted => Self::Granted,
            PersistedPermission::Denied => Self::Denied,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct PersistedSession {
    show_chat: String,
    permission: PersistedPermission,
}

pub(crate) fn load_session(path: &Path) -> Option<SessionSnapshot> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            chat_warn!("Failed to read session from {:?}: {}", path, err);
            return None;
        }
    };

    let session: PersistedSession = match ron::from_str(&content) {
        Ok(session) => session,
        Err(err) => {
            chat_warn!("Failed to parse session from {:?}: {}", path, err);
            return None;
        }
    };

    chat_info!("Loaded session from {:?}", path);
    Some(SessionSnapshot {
        show_chat: session.show_chat,
        permission: session.permission.into(),
    })
}

pub(crate) fn save_session(path: &Path, snapshot: &SessionSnapshot) {
    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        chat_error!("Session path {:?} has no file name", path);
        return;
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let session = PersistedSession {
        show_chat: snapshot.show_chat.clone(),
        permission: snapshot.permission.into(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&session, pretty) {
        Ok(text) => text,
        Err(err) => {
            chat_error!("Failed to serialize session: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(dir);
    if let Err(err) = writer.write(filename, content.as_bytes()) {
        chat_error!("Failed to write session to {:?}: {}", path, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_restores_view_and_permission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.ron");
        let snapshot = SessionSnapshot {
            show_chat: "upper_bound=17".to_string(),
            permission: Permission::Granted,
        };

        save_session(&path, &snapshot);

        assert_eq!(load_session(&path), Some(snapshot));
    }

    #[test]
    fn missing_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_session(&dir.path().join("none.ron")), None);
    }

    #[test]
    fn garbage_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.ron");
        fs::write(&path, "not ron at all {").unwrap();
        assert_eq!(load_session(&path), None);
    }

    #[test]
    fn older_file_without_permission_defaults_to_undecided() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.ron");
        fs::write(&path, r#"(show_chat: "2024_3")"#).unwrap();
        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.show_chat, "2024_3");
        assert_eq!(loaded.permission, Permission::Undecided);
    }
}
