//! Persisted table layout record and its migration.
//!
//! The record is stored as JSON under a per-user key. Records written before
//! per-user keys existed live under [`LEGACY_STORAGE_KEY`] and are moved to
//! the user key the first time that user loads the table.

use std::collections::{BTreeMap, BTreeSet};

use api_types::formatting::Alignment;
use serde::{Deserialize, Serialize};

use super::{Column, ColumnSetting, LayoutState, clamp_width};
use crate::{error::StorageError, storage::KeyValueStorage};

pub const LEGACY_STORAGE_KEY: &str = "tbcparcer_table_settings";
pub const LAYOUT_VERSION: &str = "2.0";

/// Storage key for a user, or the legacy key when no user is known.
pub fn storage_key(user_key: Option<&str>) -> String {
    match user_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(user) => format!("{LEGACY_STORAGE_KEY}:{user}"),
        None => LEGACY_STORAGE_KEY.to_string(),
    }
}

/// Wire shape of the stored record. Every field is optional so records from
/// older revisions still parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLayout {
    #[serde(default)]
    pub column_widths: BTreeMap<String, f64>,
    #[serde(default)]
    pub column_order: Vec<String>,
    #[serde(default)]
    pub manually_resized_columns: Vec<String>,
    #[serde(default)]
    pub column_settings: BTreeMap<String, PersistedColumnSetting>,
    #[serde(default)]
    pub cell_colors: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedColumnSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

impl PersistedLayout {
    pub fn from_state(state: &LayoutState) -> Self {
        Self {
            column_widths: state
                .column_widths
                .iter()
                .map(|(column, width)| (column.key().to_string(), f64::from(*width)))
                .collect(),
            column_order: state
                .column_order
                .iter()
                .map(|column| column.key().to_string())
                .collect(),
            manually_resized_columns: state
                .manually_resized
                .iter()
                .map(|column| column.key().to_string())
                .collect(),
            column_settings: state
                .column_settings
                .iter()
                .map(|(column, setting)| {
                    (
                        column.key().to_string(),
                        PersistedColumnSetting {
                            alignment: Some(setting.alignment.as_str().to_string()),
                        },
                    )
                })
                .collect(),
            cell_colors: state
                .cell_colors
                .iter()
                .map(|(key, color)| (key.clone(), Some(color.clone())))
                .collect(),
            version: Some(LAYOUT_VERSION.to_string()),
        }
    }

    /// Fills gaps with defaults and drops anything that is not a known column.
    pub fn normalize(self) -> LayoutState {
        let mut order = Vec::with_capacity(Column::ALL.len());
        for column in self.column_order.iter().filter_map(|key| Column::from_key(key)) {
            if !order.contains(&column) {
                order.push(column);
            }
        }
        for column in Column::ALL {
            if !order.contains(&column) {
                order.push(column);
            }
        }

        let column_widths = Column::ALL
            .into_iter()
            .map(|column| {
                let width = self
                    .column_widths
                    .get(column.key())
                    .map(|width| clamp_width(*width))
                    .unwrap_or_else(|| column.default_width());
                (column, width)
            })
            .collect();

        let manually_resized: BTreeSet<Column> = self
            .manually_resized_columns
            .iter()
            .filter_map(|key| Column::from_key(key))
            .collect();

        let column_settings = self
            .column_settings
            .iter()
            .filter_map(|(key, setting)| {
                let column = Column::from_key(key)?;
                let alignment = parse_alignment(setting.alignment.as_deref()?)?;
                Some((column, ColumnSetting { alignment }))
            })
            .collect();

        let cell_colors = self
            .cell_colors
            .into_iter()
            .filter_map(|(key, color)| {
                color
                    .filter(|c| !c.trim().is_empty() && c != "transparent")
                    .map(|c| (key, c))
            })
            .collect();

        LayoutState {
            column_order: order,
            column_widths,
            manually_resized,
            column_settings,
            cell_colors,
        }
    }
}

fn parse_alignment(raw: &str) -> Option<Alignment> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "left" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" => Some(Alignment::Right),
        _ => None,
    }
}

/// Loads the layout of a user. Never fails: unreadable or malformed records
/// are logged and treated as absent.
pub fn load_persisted_state(
    storage: &impl KeyValueStorage,
    user_key: Option<&str>,
) -> Option<LayoutState> {
    let key = storage_key(user_key);
    match read_record(storage, &key) {
        Ok(Some(record)) => return Some(record.normalize()),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(%key, %err, "failed to load table settings");
            return None;
        }
    }

    if key == LEGACY_STORAGE_KEY {
        return None;
    }

    match migrate_legacy(storage, &key) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(%key, %err, "failed to migrate legacy table settings");
            None
        }
    }
}

/// Writes the full state under the user key.
pub fn save_state(
    storage: &impl KeyValueStorage,
    user_key: Option<&str>,
    state: &LayoutState,
) -> Result<(), StorageError> {
    let payload = serde_json::to_string(&PersistedLayout::from_state(state))?;
    storage.set(&storage_key(user_key), &payload)
}

fn read_record(
    storage: &impl KeyValueStorage,
    key: &str,
) -> Result<Option<PersistedLayout>, StorageError> {
    match storage.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Copies the legacy record to `key`; the legacy record is removed only once
/// the copy reads back identical.
fn migrate_legacy(
    storage: &impl KeyValueStorage,
    key: &str,
) -> Result<Option<LayoutState>, StorageError> {
    let Some(mut legacy) = read_record(storage, LEGACY_STORAGE_KEY)? else {
        return Ok(None);
    };

    legacy.version = Some(LAYOUT_VERSION.to_string());
    let payload = serde_json::to_string(&legacy)?;
    storage.set(key, &payload)?;

    if storage.get(key)?.as_deref() == Some(payload.as_str()) {
        storage.remove(LEGACY_STORAGE_KEY)?;
        tracing::info!(%key, "legacy table settings migrated");
    } else {
        tracing::warn!(%key, "migrated table settings did not read back, keeping legacy record");
    }

    Ok(Some(legacy.normalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const LEGACY_RECORD: &str = r##"{
        "columnWidths": {"amount": 200, "day_name": 60, "ghost": 90},
        "columnOrder": ["amount", "receipt_number", "ghost", "amount"],
        "columnSettings": {"amount": {"alignment": "right"}, "currency": {}},
        "cellColors": {"7-amount": "#ffebee", "8-amount": null},
        "version": "1.0"
    }"##;

    #[test]
    fn storage_keys() {
        assert_eq!(storage_key(Some("777001")), "tbcparcer_table_settings:777001");
        assert_eq!(storage_key(Some("  ")), LEGACY_STORAGE_KEY);
        assert_eq!(storage_key(None), LEGACY_STORAGE_KEY);
    }

    #[test]
    fn empty_storage_has_no_state() {
        let storage = MemoryStorage::new();
        assert_eq!(load_persisted_state(&storage, Some("1")), None);
    }

    #[test]
    fn legacy_record_is_migrated_once() {
        let storage = MemoryStorage::new();
        storage.set(LEGACY_STORAGE_KEY, LEGACY_RECORD).unwrap();

        let state = load_persisted_state(&storage, Some("1")).unwrap();
        assert_eq!(storage.get(LEGACY_STORAGE_KEY).unwrap(), None);
        assert!(storage.get("tbcparcer_table_settings:1").unwrap().is_some());

        assert_eq!(state.column_order[0], Column::Amount);
        assert_eq!(state.column_order[1], Column::ReceiptNumber);
        assert_eq!(state.column_order.len(), Column::ALL.len());
        assert_eq!(state.column_widths[&Column::Amount], 200);
        assert_eq!(state.column_widths[&Column::DayName], 72);
        assert_eq!(state.column_widths[&Column::Balance], 120);
        assert!(state.manually_resized.is_empty());
        assert_eq!(
            state.column_settings.get(&Column::Amount),
            Some(&ColumnSetting {
                alignment: Alignment::Right
            })
        );
        assert!(!state.column_settings.contains_key(&Column::Currency));
        assert_eq!(state.cell_colors.len(), 1);

        // A second user finds nothing left to migrate.
        assert_eq!(load_persisted_state(&storage, Some("2")), None);
        assert_eq!(load_persisted_state(&storage, Some("1")), Some(state));
    }

    #[test]
    fn malformed_record_degrades_to_none() {
        let storage = MemoryStorage::new();
        storage.set("tbcparcer_table_settings:1", "{not json").unwrap();
        assert_eq!(load_persisted_state(&storage, Some("1")), None);
    }

    #[test]
    fn saved_state_loads_back() {
        let storage = MemoryStorage::new();
        let mut state = PersistedLayout::default().normalize();
        state.column_order.swap(0, 3);
        state.column_widths.insert(Column::Amount, 250);
        state.manually_resized.insert(Column::Amount);
        state.column_settings.insert(
            Column::Currency,
            ColumnSetting {
                alignment: Alignment::Center,
            },
        );
        state.cell_colors.insert("5-currency".to_string(), "#e3f2fd".to_string());

        save_state(&storage, Some("9"), &state).unwrap();
        assert_eq!(load_persisted_state(&storage, Some("9")), Some(state));

        let raw = storage.get("tbcparcer_table_settings:9").unwrap().unwrap();
        assert!(raw.contains("\"version\":\"2.0\""));
        assert!(raw.contains("\"manuallyResizedColumns\":[\"amount\"]"));
    }
}
