// registry.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{Mutex, RwLock};

use crate::database::{database_path, normalize_name, QuoteDatabase};
use crate::error::QuoteError;
use crate::util::QDB_EXTENSION;

// Registry Structures --------------------------------------------------------

/// Owning map from database name to database.
///
/// The map lock is only held to look up or insert entries; each database has
/// its own mutex, held across append and save.
pub struct Registry {
    data_dir: PathBuf,
    databases: RwLock<BTreeMap<String, Arc<Mutex<QuoteDatabase>>>>,
}

// Registry Implementation ----------------------------------------------------

impl Registry {
    /// Loads every `<name>.qdb` file found in `data_dir`, keyed by the lowercased stem.
    ///
    /// A mixed-case file is renamed to `<lowercase>.qdb` so saves land on the file it was
    /// read from. If both spellings exist the lowercase file wins.
    pub fn load(data_dir: PathBuf) -> Result<Self, QuoteError> {
        let mut files = Vec::new();
        let entries = fs::read_dir(&data_dir).map_err(QuoteError::io(&data_dir))?;
        for entry in entries {
            let path = entry.map_err(QuoteError::io(&data_dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(QDB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let stem = stem.to_string();
                files.push((path, stem));
            }
        }
        // lowercase stems first
        files.sort_by_key(|(_, stem)| *stem != stem.to_lowercase());

        let mut databases = BTreeMap::new();
        for (path, stem) in files {
            let name = match normalize_name(&stem) {
                Ok(name) => name,
                Err(_) => {
                    warn!("Skipping {}: not a valid database name", path.display());
                    continue;
                }
            };
            if databases.contains_key(&name) {
                warn!("Skipping {}: database {} is already loaded", path.display(), name);
                continue;
            }
            let db = QuoteDatabase::load_file(&path, &name)?;
            if name != stem {
                let target = database_path(&data_dir, &name);
                match fs::rename(&path, &target) {
                    Ok(()) => info!("Renamed {} to {}", path.display(), target.display()),
                    Err(e) => warn!("Failed to rename {}: {}", path.display(), e),
                }
            }
            info!("Loaded database {} ({} quotes)", name, db.size());
            databases.insert(name, Arc::new(Mutex::new(db)));
        }
        info!("Loaded {} databases from {}", databases.len(), data_dir.display());
        Ok(Self {
            data_dir,
            databases: RwLock::new(databases),
        })
    }

    /// Registered names in sorted order.
    pub async fn names(&self) -> Vec<String> {
        self.databases.read().await.keys().cloned().collect()
    }

    pub async fn get(&self, name: &str) -> Option<Arc<Mutex<QuoteDatabase>>> {
        self.databases.read().await.get(name).cloned()
    }

    async fn require(&self, name: &str) -> Result<Arc<Mutex<QuoteDatabase>>, QuoteError> {
        self.get(name)
            .await
            .ok_or_else(|| QuoteError::DatabaseNotFound(name.to_string()))
    }

    /// Registers an empty database. Returns `Ok(false)` if `name` already exists;
    /// the existing database is left as is.
    pub async fn create(&self, name: &str) -> Result<bool, QuoteError> {
        let name = normalize_name(name)?;
        let mut databases = self.databases.write().await;
        if databases.contains_key(&name) {
            debug!("Database {} already exists", name);
            return Ok(false);
        }
        let db = QuoteDatabase::create(&name);
        info!("Created database {}", name);
        databases.insert(name, Arc::new(Mutex::new(db)));
        Ok(true)
    }

    pub async fn random_quote(&self, name: &str) -> Result<String, QuoteError> {
        let db = self.require(name).await?;
        let db = db.lock().await;
        db.random_quote().map(String::from)
    }

    /// Appends `quote` to database `name` and persists it.
    pub async fn add_quote(&self, name: &str, quote: &str) -> Result<bool, QuoteError> {
        let db = self.require(name).await?;
        let mut db = db.lock().await;
        let added = db.add_quote(&self.data_dir, quote)?;
        if added {
            info!("Added quote #{} to {}", db.size(), name);
        } else {
            debug!("Duplicate quote ignored for {}", name);
        }
        Ok(added)
    }

    /// Saves every database, logging failures. Returns how many saves failed.
    pub async fn save_all(&self) -> usize {
        let databases = self.databases.read().await;
        let mut failures = 0;
        for (name, db) in databases.iter() {
            let db = db.lock().await;
            match db.save(&self.data_dir) {
                Ok(()) => debug!("Saved {} ({} quotes)", name, db.size()),
                Err(e) => {
                    error!("Failed to save database {}: {}", name, e);
                    failures += 1;
                }
            }
        }
        failures
    }
}
