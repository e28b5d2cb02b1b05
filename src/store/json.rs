use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use super::Store;

/// File-backed store: `<dir>/<name>.json`, one pretty-printed JSON value per collection.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, String> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
        Ok(JsonFileStore {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    fn read_unlocked(&self, name: &str) -> Option<Value> {
        let path = self.path_for(name);
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Corrupt collection file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_unlocked(&self, name: &str, value: &Value) -> Result<(), String> {
        let path = self.path_for(name);
        let tmp = self.dir.join(format!("{}.json.tmp", name));
        let body = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
        fs::write(&tmp, body).map_err(|e| format!("{}: {}", tmp.display(), e))?;
        fs::rename(&tmp, &path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }

    fn read(&self, name: &str) -> Option<Value> {
        self.read_unlocked(name)
    }

    fn write(&self, name: &str, value: &Value) -> Result<(), String> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write_unlocked(name, value)
    }

    fn update(
        &self,
        name: &str,
        f: &mut dyn FnMut(Option<Value>) -> Result<Value, String>,
    ) -> Result<(), String> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let next = f(self.read_unlocked(name))?;
        self.write_unlocked(name, &next)
    }
}
