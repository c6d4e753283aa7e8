//! Per-widget display preferences.
//!
//! Every placed widget instance has its own color theme and background
//! transparency. Values are stored as plain integers keyed by
//! `<key>_<widget id>` in a flat JSON object.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const KEY_COLOR_THEME: &str = "color_theme";
pub const KEY_BG_TRANS: &str = "bg_transparency";

/// Widget color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorTheme {
    Transparent,
    #[default]
    System,
    Dark,
    Light,
}

impl ColorTheme {
    pub fn value(self) -> i32 {
        match self {
            Self::Transparent => 0,
            Self::System => 1,
            Self::Dark => 2,
            Self::Light => 3,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Transparent),
            1 => Some(Self::System),
            2 => Some(Self::Dark),
            3 => Some(Self::Light),
            _ => None,
        }
    }

    /// Summary text shown in the configuration screen
    pub fn label(self) -> &'static str {
        match self {
            Self::Transparent => "Transparent",
            Self::System => "Follow system",
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

/// Widget background transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BgTransparency {
    #[default]
    Semi,
    Full,
    Solid,
}

impl BgTransparency {
    pub fn value(self) -> i32 {
        match self {
            Self::Semi => 1,
            Self::Full => 2,
            Self::Solid => 3,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Semi),
            2 => Some(Self::Full),
            3 => Some(Self::Solid),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Semi => "Semi-transparent",
            Self::Full => "Fully transparent",
            Self::Solid => "Solid",
        }
    }
}

fn pref_key(key: &str, widget_id: i32) -> String {
    format!("{}_{}", key, widget_id)
}

/// File-backed preference store for all widget instances
#[derive(Debug)]
pub struct WidgetPrefs {
    path: PathBuf,
    values: BTreeMap<String, i32>,
    dirty: bool,
}

impl WidgetPrefs {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read widget prefs {}", path.display()))?;
            serde_json::from_str(&json).context("Failed to parse widget prefs")?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    /// Write all values back to disk
    pub fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create prefs directory")?;
        }

        let json = serde_json::to_string_pretty(&self.values)
            .context("Failed to serialize widget prefs")?;

        fs::write(&self.path, json).context("Failed to write widget prefs")?;

        tracing::debug!("Saved {} widget prefs to {:?}", self.values.len(), self.path);
        self.dirty = false;
        Ok(())
    }

    /// Whether anything changed since the last load or save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn color_theme(&self, widget_id: i32) -> ColorTheme {
        match self.values.get(&pref_key(KEY_COLOR_THEME, widget_id)) {
            None => ColorTheme::default(),
            Some(&raw) => ColorTheme::from_value(raw).unwrap_or_else(|| {
                tracing::warn!("Unknown color theme {} for widget {}", raw, widget_id);
                ColorTheme::default()
            }),
        }
    }

    pub fn set_color_theme(&mut self, widget_id: i32, theme: ColorTheme) {
        self.values
            .insert(pref_key(KEY_COLOR_THEME, widget_id), theme.value());
        self.dirty = true;
    }

    pub fn bg_transparency(&self, widget_id: i32) -> BgTransparency {
        match self.values.get(&pref_key(KEY_BG_TRANS, widget_id)) {
            None => BgTransparency::default(),
            Some(&raw) => BgTransparency::from_value(raw).unwrap_or_else(|| {
                tracing::warn!("Unknown background transparency {} for widget {}", raw, widget_id);
                BgTransparency::default()
            }),
        }
    }

    pub fn set_bg_transparency(&mut self, widget_id: i32, value: BgTransparency) {
        self.values
            .insert(pref_key(KEY_BG_TRANS, widget_id), value.value());
        self.dirty = true;
    }

    /// Forget everything stored for a removed widget
    pub fn clear(&mut self, widget_id: i32) {
        self.values.remove(&pref_key(KEY_COLOR_THEME, widget_id));
        self.values.remove(&pref_key(KEY_BG_TRANS, widget_id));
        self.dirty = true;
    }

    /// Move a widget's settings to a new id (the host restored it under a new id).
    /// Missing values are written out as defaults.
    pub fn remap(&mut self, old_id: i32, new_id: i32) {
        let theme = self.color_theme(old_id);
        let bg = self.bg_transparency(old_id);
        self.clear(old_id);
        self.set_color_theme(new_id, theme);
        self.set_bg_transparency(new_id, bg);
    }
}
