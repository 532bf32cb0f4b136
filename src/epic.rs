use crate::constants::{COLOR_EPIC_FALLBACK, DEFAULT_EPIC_NAME, EPIC_PALETTE};
use crate::geometry::{GridSpec, PixelRect};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub type EpicId = u64;

/// A work item occupying `width` sprints by `resource_count` resource rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: EpicId,
    #[serde(default = "default_name")]
    pub name: String,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub resource_count: u32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub starred: bool,
}

/// Optional field updates applied by [`crate::epic_store::EpicStore::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpicPatch {
    pub name: Option<String>,
    pub left: Option<i32>,
    pub top: Option<i32>,
    pub width: Option<u32>,
    pub resource_count: Option<u32>,
    pub starred: Option<bool>,
}

impl EpicPatch {
    pub fn position(left: i32, top: i32) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            ..Default::default()
        }
    }

    pub fn size(width: u32, resource_count: u32) -> Self {
        Self {
            width: Some(width),
            resource_count: Some(resource_count),
            ..Default::default()
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn starred(starred: bool) -> Self {
        Self {
            starred: Some(starred),
            ..Default::default()
        }
    }

    /// True when applying the patch may move or grow the epic.
    pub fn touches_geometry(&self) -> bool {
        self.left.is_some()
            || self.top.is_some()
            || self.width.is_some()
            || self.resource_count.is_some()
    }
}

impl Epic {
    pub fn new(id: EpicId, left: i32, top: i32, color: impl Into<String>) -> Self {
        Self {
            id,
            name: DEFAULT_EPIC_NAME.to_string(),
            left,
            top,
            width: 1,
            resource_count: 1,
            color: color.into(),
            starred: false,
        }
    }

    pub fn area(&self) -> u32 {
        self.width.saturating_mul(self.resource_count)
    }

    pub fn pixel_rect(&self, grid: &GridSpec) -> PixelRect {
        let (w, h) = grid.span_px(self.width, self.resource_count);
        PixelRect::new(self.left, self.top, w, h)
    }

    /// Copy of `self` with the patch applied; the name falls back to the default when blank.
    pub fn patched(&self, patch: &EpicPatch) -> Epic {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = normalize_name(name);
        }
        if let Some(left) = patch.left {
            next.left = left;
        }
        if let Some(top) = patch.top {
            next.top = top;
        }
        if let Some(width) = patch.width {
            next.width = width;
        }
        if let Some(resource_count) = patch.resource_count {
            next.resource_count = resource_count;
        }
        if let Some(starred) = patch.starred {
            next.starred = starred;
        }
        next
    }

    pub fn fill_color(&self) -> egui::Color32 {
        parse_hex_color(&self.color).unwrap_or(COLOR_EPIC_FALLBACK)
    }
}

pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_EPIC_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn default_name() -> String {
    DEFAULT_EPIC_NAME.to_string()
}

/// Palette entry for the `index`-th epic.
pub fn palette_color(index: usize) -> &'static str {
    EPIC_PALETTE[index % EPIC_PALETTE.len()]
}

/// Milliseconds since the Unix epoch, bumped past `last` so ids stay unique.
///
/// `None` once `last` is `EpicId::MAX` and nothing larger is left.
pub fn next_epic_id(last: Option<EpicId>) -> Option<EpicId> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as EpicId)
        .unwrap_or(0);
    match last {
        Some(last) if now <= last => last.checked_add(1),
        _ => Some(now),
    }
}

/// Parses `#rrggbb` (case-insensitive).
pub fn parse_hex_color(hex: &str) -> Option<egui::Color32> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(egui::Color32::from_rgb(
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?,
    ))
}
