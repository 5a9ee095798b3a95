//! Transaction table layout: column order, widths, alignment and cell colors.
//!
//! [`TableLayout`] owns the state and writes the whole record to storage
//! after every mutation. Alignment changes are also handed to an
//! [`AlignmentSink`] for best-effort remote sync; the local state stays
//! authoritative either way.

use std::collections::{BTreeMap, BTreeSet};

use api_types::formatting::{Alignment, ColumnFormatting};

use crate::{
    Transaction,
    remote::{AlignmentSink, NoopSink},
    storage::KeyValueStorage,
};

mod column;
pub mod edit;
mod format;
mod measure;
mod persist;

pub use column::{Column, MAX_WIDTH, MIN_WIDTH, clamp_width};
pub use format::{format_cell, format_number, mask_card};
pub use measure::{AUTO_FIT_PADDING, Font, TextMeasurer, compute_auto_widths};
pub use persist::{
    LAYOUT_VERSION, LEGACY_STORAGE_KEY, PersistedLayout, load_persisted_state, save_state,
    storage_key,
};

/// Cell background colors offered by the picker, in cycling order.
pub const CELL_PALETTE: [&str; 24] = [
    "#ffebee", "#e8f5e8", "#e3f2fd", "#fff3e0", "#f3e5f5", "#ffffff", "#ffcdd2", "#c8e6c9",
    "#bbdefb", "#ffcc80", "#ce93d8", "#f5f5f5", "#ef9a9a", "#a5d6a7", "#90caf9", "#ffb74d",
    "#ba68c8", "#eeeeee", "#e57373", "#81c784", "#64b5f6", "#ff9800", "#ab47bc", "#e0e0e0",
];

/// Next palette entry after `current`; wraps to "no color" after the last.
pub fn next_cell_color(current: Option<&str>) -> Option<String> {
    let next = match current.and_then(|c| CELL_PALETTE.iter().position(|p| *p == c)) {
        Some(idx) => idx + 1,
        None if current.is_some() => return None,
        None => 0,
    };
    CELL_PALETTE.get(next).map(|c| c.to_string())
}

pub fn cell_color_key(row_id: i64, column: Column) -> String {
    format!("{row_id}-{}", column.key())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSetting {
    pub alignment: Alignment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    pub column_order: Vec<Column>,
    pub column_widths: BTreeMap<Column, u32>,
    pub manually_resized: BTreeSet<Column>,
    pub column_settings: BTreeMap<Column, ColumnSetting>,
    pub cell_colors: BTreeMap<String, String>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            column_order: Column::ALL.to_vec(),
            column_widths: Column::ALL
                .into_iter()
                .map(|column| (column, column.default_width()))
                .collect(),
            manually_resized: BTreeSet::new(),
            column_settings: BTreeMap::new(),
            cell_colors: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResizeGesture {
    column: Column,
    start_width: u32,
}

pub struct TableLayout<S> {
    storage: S,
    user_key: Option<String>,
    state: LayoutState,
    sink: Box<dyn AlignmentSink>,
    resize: Option<ResizeGesture>,
}

impl<S: KeyValueStorage> TableLayout<S> {
    /// Loads the persisted layout of `user_key`, or the defaults.
    pub fn load(storage: S, user_key: Option<&str>) -> Self {
        let state = load_persisted_state(&storage, user_key).unwrap_or_default();
        Self {
            storage,
            user_key: user_key.map(str::to_string),
            state,
            sink: Box::new(NoopSink),
            resize: None,
        }
    }

    pub fn with_sink(mut self, sink: impl AlignmentSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn order(&self) -> &[Column] {
        &self.state.column_order
    }

    pub fn width(&self, column: Column) -> u32 {
        self.state
            .column_widths
            .get(&column)
            .copied()
            .unwrap_or_else(|| column.default_width())
    }

    pub fn alignment(&self, column: Column) -> Alignment {
        self.state
            .column_settings
            .get(&column)
            .map(|setting| setting.alignment)
            .unwrap_or_default()
    }

    pub fn cell_color(&self, row_id: i64, column: Column) -> Option<&str> {
        self.state
            .cell_colors
            .get(&cell_color_key(row_id, column))
            .map(String::as_str)
    }

    pub fn is_manual(&self, column: Column) -> bool {
        self.state.manually_resized.contains(&column)
    }

    pub fn begin_resize(&mut self, column: Column) {
        self.resize = Some(ResizeGesture {
            column,
            start_width: self.width(column),
        });
    }

    /// `delta` is relative to the width at [`begin_resize`](Self::begin_resize).
    pub fn update_resize(&mut self, delta: i64) {
        let Some(gesture) = self.resize else {
            return;
        };
        let width = clamp_width(f64::from(gesture.start_width) + delta as f64);
        self.state.manually_resized.insert(gesture.column);
        self.state.column_widths.insert(gesture.column, width);
        self.persist();
    }

    pub fn end_resize(&mut self) {
        if self.resize.take().is_some() {
            self.persist();
        }
    }

    pub fn resize_column(&mut self, column: Column, delta: i64) {
        self.begin_resize(column);
        self.update_resize(delta);
        self.end_resize();
    }

    /// Removes `dragged` and reinserts it at the index `target` had before
    /// the removal.
    pub fn reorder_column(&mut self, dragged: Column, target: Column) {
        if dragged == target {
            return;
        }
        let order = &mut self.state.column_order;
        let (Some(from), Some(to)) = (
            order.iter().position(|c| *c == dragged),
            order.iter().position(|c| *c == target),
        ) else {
            return;
        };
        order.remove(from);
        order.insert(to, dragged);
        self.persist();
    }

    /// Drags `column` onto its neighbour; negative `step` moves left.
    pub fn move_column(&mut self, column: Column, step: isize) {
        let Some(idx) = self.state.column_order.iter().position(|c| *c == column) else {
            return;
        };
        let Some(target) = idx
            .checked_add_signed(step)
            .and_then(|to| self.state.column_order.get(to))
            .copied()
        else {
            return;
        };
        self.reorder_column(column, target);
    }

    /// Local change first, then remote sync. `None` drops the setting.
    pub fn set_column_alignment(&mut self, column: Column, alignment: Option<Alignment>) {
        match alignment {
            Some(alignment) => {
                self.state
                    .column_settings
                    .insert(column, ColumnSetting { alignment });
            }
            None => {
                self.state.column_settings.remove(&column);
            }
        }
        self.persist();
        self.sink.alignment_changed(column, alignment);
    }

    /// Applies alignment records fetched from the backend.
    pub fn merge_remote_alignments(&mut self, remote: &BTreeMap<String, ColumnFormatting>) {
        let mut changed = false;
        for (key, formatting) in remote {
            let (Some(column), Some(alignment)) = (Column::from_key(key), formatting.alignment)
            else {
                continue;
            };
            let setting = ColumnSetting { alignment };
            if self.state.column_settings.get(&column) != Some(&setting) {
                self.state.column_settings.insert(column, setting);
                changed = true;
            }
        }
        if changed {
            self.persist();
        }
    }

    pub fn set_cell_color(&mut self, row_id: i64, column: Column, color: Option<String>) {
        let key = cell_color_key(row_id, column);
        match color.filter(|c| !c.trim().is_empty()) {
            Some(color) => {
                self.state.cell_colors.insert(key, color);
            }
            None => {
                self.state.cell_colors.remove(&key);
            }
        }
        self.persist();
    }

    /// Recomputes widths of every column not resized by hand.
    pub fn apply_auto_widths(
        &mut self,
        transactions: &[Transaction],
        measurer: &impl TextMeasurer,
        font: &Font,
    ) {
        self.auto_fit(transactions, false, measurer, font);
    }

    /// Forgets manual widths and recomputes every column.
    pub fn auto_fit_all(
        &mut self,
        transactions: &[Transaction],
        measurer: &impl TextMeasurer,
        font: &Font,
    ) {
        self.state.manually_resized.clear();
        self.auto_fit(transactions, true, measurer, font);
        self.persist();
    }

    /// Back to built-in defaults; clears backend alignment of every column
    /// that had one.
    pub fn reset_to_defaults(&mut self) {
        let aligned: Vec<Column> = self.state.column_settings.keys().copied().collect();
        self.state = LayoutState::default();
        self.resize = None;
        self.persist();
        for column in aligned {
            self.sink.alignment_changed(column, None);
        }
    }

    fn auto_fit(
        &mut self,
        transactions: &[Transaction],
        include_manual: bool,
        measurer: &impl TextMeasurer,
        font: &Font,
    ) {
        let Some(widths) = compute_auto_widths(
            transactions,
            &self.state.column_order,
            &self.state.manually_resized,
            include_manual,
            measurer,
            font,
        ) else {
            return;
        };
        if widths
            .iter()
            .all(|(column, width)| self.state.column_widths.get(column) == Some(width))
        {
            return;
        }
        self.state.column_widths.extend(widths);
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = save_state(&self.storage, self.user_key.as_deref(), &self.state) {
            tracing::warn!(%err, "failed to save table settings");
        }
    }
}
