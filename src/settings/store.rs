use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::SettingsState;
use crate::error::{LlmWireError, Result};

/// 设置存储
///
/// 将 [`SettingsState`] 以 JSON 形式持久化到磁盘，内存中通过读写锁共享。
/// 文件不存在时从默认值启动，首次保存时创建。
pub struct SettingsStore {
    path: PathBuf,
    state: RwLock<SettingsState>,
}

impl SettingsStore {
    /// 打开指定路径的设置文件
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            Self::read_state(&path)?
        } else {
            SettingsState::default()
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// 以给定状态创建存储，不读盘
    pub fn with_state(path: impl Into<PathBuf>, state: SettingsState) -> Self {
        Self {
            path: path.into(),
            state: RwLock::new(state),
        }
    }

    fn read_state(path: &Path) -> Result<SettingsState> {
        let raw = fs::read_to_string(path).map_err(|e| {
            LlmWireError::Settings(format!("failed to read `{}`: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            LlmWireError::Settings(format!("failed to parse `{}`: {}", path.display(), e))
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前状态的副本
    pub fn snapshot(&self) -> SettingsState {
        self.state.read().clone()
    }

    /// 修改状态并立即落盘
    pub fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut SettingsState),
    {
        {
            let mut guard = self.state.write();
            mutate(&mut guard);
        }
        self.save()
    }

    /// 将当前状态写入磁盘
    pub fn save(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&*self.state.read())
            .map_err(|e| LlmWireError::Settings(format!("failed to serialize settings: {}", e)))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    LlmWireError::Settings(format!(
                        "failed to create `{}`: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        fs::write(&self.path, serialized).map_err(|e| {
            LlmWireError::Settings(format!("failed to write `{}`: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_starts_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        let state = store.snapshot();
        assert_eq!(state.openai.base_host, "https://api.openai.com");
        assert_eq!(state.advanced.proxy_port, 0);
    }

    #[test]
    fn update_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::open(&path).unwrap();
        store
            .update(|state| {
                state.advanced.proxy_host = "proxy.internal".to_string();
                state.advanced.proxy_port = 3128;
            })
            .unwrap();

        let reopened = SettingsStore::open(&path).unwrap();
        let state = reopened.snapshot();
        assert_eq!(state.advanced.proxy_host, "proxy.internal");
        assert_eq!(state.advanced.proxy_port, 3128);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let err = SettingsStore::open(&path).err().expect("malformed file should fail to open");
        assert!(err.to_string().contains("failed to parse"));
    }
}
