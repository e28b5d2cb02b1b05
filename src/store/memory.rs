use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::Store;

/// In-process store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn exists(&self, name: &str) -> bool {
        let map = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        map.contains_key(name)
    }

    fn read(&self, name: &str) -> Option<Value> {
        let map = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        map.get(name).cloned()
    }

    fn write(&self, name: &str, value: &Value) -> Result<(), String> {
        let mut map = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn update(
        &self,
        name: &str,
        f: &mut dyn FnMut(Option<Value>) -> Result<Value, String>,
    ) -> Result<(), String> {
        let mut map = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let next = f(map.get(name).cloned())?;
        map.insert(name.to_string(), next);
        Ok(())
    }
}
