use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::medication::{Medication, MedicationForm, MedicationProvider};
use crate::tracker::DoseStatusTracker;

const DATA_FILE_NAME: &str = ".mediminder.json";

/// Who the app is being used for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum UserRole {
    #[serde(rename = "self")]
    #[value(name = "self")]
    Personal,
    #[serde(rename = "caregiver")]
    Caregiver,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Personal => write!(f, "self"),
            UserRole::Caregiver => write!(f, "caregiver"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StoreData {
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub dose_statuses: DoseStatusTracker,
}

/// Returns the default path of the data file.
///
/// Uses the `dirs` crate to locate the home directory across platforms.
/// Falls back to `./.mediminder.json` if no home directory is found.
pub fn default_data_file() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(DATA_FILE_NAME)
}

/// The local JSON document holding the role flag, added medications and
/// dose acknowledgements.
#[derive(Debug)]
pub struct MedicationStore {
    path: PathBuf,
    data: StoreData,
}

impl MedicationStore {
    /// Loads the store from `path`.
    ///
    /// A missing file is an empty store. If the file cannot be parsed, a copy
    /// is kept at `<path>.corrupted` and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            debug!("no data file at {}, starting empty", path.display());
            return Ok(MedicationStore {
                path,
                data: StoreData::default(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;

        let data = match serde_json::from_str::<StoreData>(&contents) {
            Ok(data) => data,
            Err(e) => {
                warn!("data file {} is corrupted: {}", path.display(), e);
                let backup_path = path.with_extension("json.corrupted");
                match fs::copy(&path, &backup_path) {
                    Ok(_) => warn!("backup written to {}", backup_path.display()),
                    Err(backup_err) => warn!("failed to create backup: {}", backup_err),
                }
                StoreData::default()
            }
        };

        Ok(MedicationStore { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    /// Saves the store atomically (temp file, then rename). On Unix the file
    /// is restricted to the owner (0600).
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.data)?;
        let temp_path = self.path.with_extension("json.tmp");

        fs::write(&temp_path, &json).map_err(|source| StoreError::Write {
            path: temp_path.clone(),
            source,
        })?;

        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Write {
                path: self.path.clone(),
                source,
            });
        }

        #[cfg(unix)]
        {
            if let Ok(metadata) = fs::metadata(&self.path) {
                let mut perms = metadata.permissions();
                perms.set_mode(0o600);
                if let Err(e) = fs::set_permissions(&self.path, perms) {
                    warn!("failed to set permissions on {}: {}", self.path.display(), e);
                }
            }
        }

        debug!("saved {}", self.path.display());
        Ok(())
    }

    pub fn role(&self) -> Option<UserRole> {
        self.data.role
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.data.role = Some(role);
    }

    /// Validates `form` and appends the medication under the next free id.
    /// Nothing is stored if validation fails.
    pub fn add_medication(&mut self, form: &MedicationForm) -> Result<&Medication, StoreError> {
        let id = self.next_id();
        let medication = form.submit(id)?;
        info!("added medication {} ({})", medication.name, medication.id);
        self.data.medications.push(medication);
        Ok(&self.data.medications[self.data.medications.len() - 1])
    }

    /// One past the highest numeric id, or the lowest unused number once
    /// that would overflow.
    fn next_id(&self) -> String {
        let used: BTreeSet<u64> = self
            .data
            .medications
            .iter()
            .filter_map(|m| m.id.parse::<u64>().ok())
            .collect();
        let highest = used.last().copied().unwrap_or(0);
        let next = highest
            .checked_add(1)
            .or_else(|| (1..u64::MAX).find(|n| !used.contains(n)))
            .unwrap_or(u64::MAX);
        next.to_string()
    }

    pub fn tracker(&self) -> &DoseStatusTracker {
        &self.data.dose_statuses
    }

    pub fn tracker_mut(&mut self) -> &mut DoseStatusTracker {
        &mut self.data.dose_statuses
    }
}

impl MedicationProvider for MedicationStore {
    fn list_medications(&self) -> Vec<Medication> {
        self.data.medications.clone()
    }
}
