//! Persisted storage for the last connected address

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::DashboardError;

const ADDRESS_FILE: &str = "connected_address.txt";

/// Key-value storage holding one key: the last connected address
pub trait AddressStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, DashboardError>;
    fn save(&self, address: &str) -> Result<(), DashboardError>;
    fn clear(&self) -> Result<(), DashboardError>;
}

#[derive(Clone)]
pub struct FileAddressStore {
    base_path: PathBuf,
}

impl FileAddressStore {
    /// Store under the default data directory ("./data")
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("./data"),
        }
    }

    /// Store under a custom directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn path(&self) -> PathBuf {
        self.base_path.join(ADDRESS_FILE)
    }
}

impl Default for FileAddressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressStore for FileAddressStore {
    fn load(&self) -> Result<Option<String>, DashboardError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let address = contents.trim();
        if address.is_empty() {
            Ok(None)
        } else {
            Ok(Some(address.to_string()))
        }
    }

    fn save(&self, address: &str) -> Result<(), DashboardError> {
        fs::create_dir_all(&self.base_path)?;
        fs::write(self.path(), address)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), DashboardError> {
        let path = self.path();
        if path.exists() {
            log::debug!("Removing persisted address at {:?}", path);
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store; nothing survives the process
#[derive(Default)]
pub struct MemoryAddressStore {
    address: Mutex<Option<String>>,
}

impl MemoryAddressStore {
    pub fn with_address(address: &str) -> Self {
        Self {
            address: Mutex::new(Some(address.to_string())),
        }
    }
}

impl AddressStore for MemoryAddressStore {
    fn load(&self) -> Result<Option<String>, DashboardError> {
        let guard = self
            .address
            .lock()
            .map_err(|_| DashboardError::Storage("address lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, address: &str) -> Result<(), DashboardError> {
        let mut guard = self
            .address
            .lock()
            .map_err(|_| DashboardError::Storage("address lock poisoned".to_string()))?;
        *guard = Some(address.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), DashboardError> {
        let mut guard = self
            .address
            .lock()
            .map_err(|_| DashboardError::Storage("address lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
