//! Store snapshot persistence with file locking.
//!
//! The snapshot holds settings, the current countdown and the progress
//! ledger. The engine never touches disk; callers save after each mutation.

use crate::{Error, Result, Settings, StoreSnapshot};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Exclusive claim on a store for the lifetime of the value.
///
/// Held on a `.lock` sidecar next to the state file, since the state file
/// itself is replaced by rename on every save. Released on drop, or by the
/// OS when the holding process dies.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    /// Sidecar lock path for a state file
    pub fn path_for(state_path: &Path) -> PathBuf {
        state_path.with_extension("lock")
    }

    /// Take the lock without waiting; fails with [`Error::Locked`] if held
    pub fn acquire(state_path: &Path) -> Result<Self> {
        let path = Self::path_for(state_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            tracing::debug!("State lock {:?} is held elsewhere", path);
            return Err(Error::Locked(state_path.to_path_buf()));
        }

        tracing::debug!("Acquired state lock {:?}", path);
        Ok(Self { file, path })
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release state lock {:?}: {}", self.path, e);
        }
    }
}

impl StoreSnapshot {
    /// Load the snapshot from a file with shared locking
    ///
    /// Returns default state if file doesn't exist.
    /// If file is corrupted, logs a warning and returns default state.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_or(path, Settings::default())
    }

    /// Like [`StoreSnapshot::load`], seeding a fresh store with `seed`
    pub fn load_or(path: &Path, seed: Settings) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No state file found, using default state");
            return Ok(Self::with_settings(seed));
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::with_settings(seed));
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::with_settings(seed));
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::with_settings(seed));
        }

        file.unlock()?;

        match serde_json::from_str::<StoreSnapshot>(&contents) {
            Ok(state) => {
                tracing::debug!("Loaded store from {:?}", path);
                Ok(state.repaired())
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::with_settings(seed))
            }
        }
    }

    /// Save the snapshot to a file with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("state path {:?} has no parent", path)))?;
        let temp = NamedTempFile::new_in(parent)?;

        // Serialize concurrent writers on the temp file
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved store to {:?}", path);
        Ok(())
    }

    /// Load state, modify it, and save it back
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<()>,
    {
        let mut state = Self::load(path)?;
        f(&mut state)?;
        state.save(path)?;
        Ok(state)
    }

    /// Restore the timer invariants a hand-edited file may have broken
    fn repaired(mut self) -> Self {
        let session = &mut self.current_session;
        if session.is_active && session.start_time.is_none() {
            tracing::warn!("Active session without a start time, marking idle");
            session.is_active = false;
        }
        if session.time_remaining > session.initial_duration {
            session.initial_duration = session.time_remaining;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SessionRecord, SessionType};
    use chrono::NaiveDate;

    fn sample_state() -> StoreSnapshot {
        let mut state = StoreSnapshot::with_settings(Settings {
            work_duration: 1500,
            rest_duration: 300,
        });
        state.current_session.time_remaining = 1200;
        state.daily_progress.record_session(
            SessionRecord {
                duration: 300,
                timestamp: 1_710_000_000_000,
                session_type: SessionType::Work,
            },
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        );
        state
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        let state = sample_state();
        state.save(&state_path).unwrap();

        let loaded = StoreSnapshot::load(&state_path).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.daily_progress.session_count(), 1);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("nonexistent.json");

        let state = StoreSnapshot::load(&state_path).unwrap();
        assert_eq!(state, StoreSnapshot::default());
    }

    #[test]
    fn test_load_nonexistent_uses_seed_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("nonexistent.json");
        let seed = Settings {
            work_duration: 1500,
            rest_duration: 300,
        };

        let state = StoreSnapshot::load_or(&state_path, seed).unwrap();
        assert_eq!(state.settings, seed);
        assert_eq!(state.current_session.time_remaining, 1500);
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        StoreSnapshot::default().save(&state_path).unwrap();

        StoreSnapshot::update(&state_path, |state| {
            state.settings.rest_duration = 900;
            Ok(())
        })
        .unwrap();

        let loaded = StoreSnapshot::load(&state_path).unwrap();
        assert_eq!(loaded.settings.rest_duration, 900);
    }

    #[test]
    fn test_corrupted_state_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("corrupted.json");

        std::fs::write(&state_path, "{ invalid json }").unwrap();

        let state = StoreSnapshot::load(&state_path).unwrap();
        assert_eq!(state, StoreSnapshot::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        std::fs::write(
            &state_path,
            r#"{"settings":{"work_duration":1200,"rest_duration":120}}"#,
        )
        .unwrap();

        let state = StoreSnapshot::load(&state_path).unwrap();
        assert_eq!(state.settings.work_duration, 1200);
        assert!(state.daily_progress.is_empty());
        assert_eq!(state.current_session.mode, SessionType::Work);
    }

    #[test]
    fn test_active_without_start_time_is_repaired() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        let mut state = StoreSnapshot::default();
        state.current_session.is_active = true;
        state.current_session.start_time = None;
        state.save(&state_path).unwrap();

        let loaded = StoreSnapshot::load(&state_path).unwrap();
        assert!(!loaded.current_session.is_active);
    }

    #[test]
    fn test_state_lock_is_exclusive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        let held = StateLock::acquire(&state_path).unwrap();
        assert!(StateLock::path_for(&state_path).exists());

        let second = StateLock::acquire(&state_path);
        assert!(matches!(second, Err(Error::Locked(_))));

        drop(held);
        assert!(StateLock::acquire(&state_path).is_ok());
    }

    #[test]
    fn test_state_lock_does_not_block_reads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");
        sample_state().save(&state_path).unwrap();

        let _held = StateLock::acquire(&state_path).unwrap();
        let loaded = StoreSnapshot::load(&state_path).unwrap();
        assert_eq!(loaded, sample_state());
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        StoreSnapshot::default().save(&state_path).unwrap();

        // Only the state file remains, no stray temp files
        assert!(state_path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "state.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only state.json, found extras: {:?}",
            extras
        );
    }
}
