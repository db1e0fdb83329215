//! Breakpoint-responsive display layouts.
//!
//! The stored (wide) coordinates are authoritative. For narrower viewports
//! the transformer derives a display-only layout in reading order:
//!
//! | Breakpoint | Columns | Placement of the `i`-th record in `(y, x)` order |
//! |------------|---------|--------------------------------------------------|
//! | `Wide`     | 4       | stored rectangle                                 |
//! | `Medium`   | 2       | `x = i % 2`, `y = i / 2`, medium size            |
//! | `Narrow`   | 1       | `x = 0`, `y = i`, full width, narrow height      |
//!
//! `y` is a row ordinal, not a packed offset. A medium or narrow height above
//! 1 overlaps the following rows, and a medium width of 2 at an even index
//! (`x = 0`) overlaps the record placed at `x = 1` on the same row. Size
//! tables that want a clean stack use 1×1 spans there.
//!
//! A record whose kind has no size entry for the breakpoint keeps its stored
//! rectangle. Results are memoized in a bounded insertion-order cache.

use crate::id::WidgetId;
use crate::model::{Breakpoint, GridConfig, GridRect, PlacementRecord};
use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// ─── Size table ───────────────────────────────────────────────────────────

/// Cell span of a widget at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSize {
    pub width: u16,
    pub height: u16,
}

impl WidgetSize {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Per-breakpoint sizes for one widget kind. Missing entries mean "keep
/// the stored rectangle" at that breakpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakpointSizes {
    pub wide: Option<WidgetSize>,
    pub medium: Option<WidgetSize>,
    pub narrow: Option<WidgetSize>,
}

impl BreakpointSizes {
    pub fn get(&self, bp: Breakpoint) -> Option<WidgetSize> {
        match bp {
            Breakpoint::Wide => self.wide,
            Breakpoint::Medium => self.medium,
            Breakpoint::Narrow => self.narrow,
        }
    }
}

/// Widget kind → per-breakpoint sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeTable {
    kinds: HashMap<String, BreakpointSizes>,
}

impl SizeTable {
    /// Sizes for the widget kinds every dashboard ships with.
    pub fn builtin() -> Self {
        let entries = [
            ("calendar", (2, 2), (1, 1), (1, 1)),
            ("issues", (2, 2), (1, 1), (1, 1)),
            ("pull-requests", (2, 1), (1, 1), (1, 1)),
            ("stocks", (2, 1), (1, 1), (1, 1)),
            ("clock", (1, 1), (1, 1), (1, 1)),
            ("notes", (1, 1), (1, 1), (1, 1)),
            ("weather", (1, 1), (1, 1), (1, 1)),
        ];
        let mut table = Self::default();
        for (kind, wide, medium, narrow) in entries {
            table.insert(
                kind,
                BreakpointSizes {
                    wide: Some(WidgetSize::new(wide.0, wide.1)),
                    medium: Some(WidgetSize::new(medium.0, medium.1)),
                    narrow: Some(WidgetSize::new(narrow.0, narrow.1)),
                },
            );
        }
        table
    }

    /// Parse a table from JSON of the form
    /// `{"clock": {"wide": {"width": 1, "height": 1}, ...}, ...}`.
    ///
    /// # Errors
    /// Returns a message if the JSON is malformed or a size has a zero span.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let table: SizeTable =
            serde_json::from_str(json).map_err(|e| format!("invalid size table: {e}"))?;
        for (kind, sizes) in &table.kinds {
            for bp in Breakpoint::ALL {
                if let Some(size) = sizes.get(bp)
                    && (size.width == 0 || size.height == 0)
                {
                    return Err(format!("size table: `{kind}` has a zero span at {bp}"));
                }
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, kind: impl Into<String>, sizes: BreakpointSizes) {
        self.kinds.insert(kind.into(), sizes);
    }

    pub fn get(&self, kind: &str, bp: Breakpoint) -> Option<WidgetSize> {
        self.kinds.get(kind).and_then(|s| s.get(bp))
    }
}

// ─── Layout ───────────────────────────────────────────────────────────────

/// One record's rectangle in a display layout. The id is carried through
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub id: WidgetId,
    pub rect: GridRect,
}

/// Compute the display layout for `bp`, uncached.
#[must_use]
pub fn layout_for(
    records: &[PlacementRecord],
    bp: Breakpoint,
    sizes: &SizeTable,
) -> Vec<DisplayItem> {
    let mut ordered: Vec<&PlacementRecord> = records.iter().collect();
    ordered.sort_by_key(|r| (r.y, r.x));

    let columns = bp.columns();
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let rect = match (bp, sizes.get(&record.kind, bp)) {
                (_, None) | (Breakpoint::Wide, Some(_)) => record.rect(),
                (Breakpoint::Medium, Some(size)) => {
                    let x = saturating_u16(i % 2);
                    let width = size.width.clamp(1, columns - x);
                    GridRect::new(x, saturating_u16(i / 2), width, size.height)
                }
                (Breakpoint::Narrow, Some(size)) => {
                    GridRect::new(0, saturating_u16(i), columns, size.height)
                }
            };
            DisplayItem {
                id: record.id,
                rect,
            }
        })
        .collect()
}

/// Row ordinals past `u16::MAX` pile up on the last row.
fn saturating_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ─── Cache ────────────────────────────────────────────────────────────────

/// Cache key: breakpoint plus a signature over every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    pub breakpoint: Breakpoint,
    pub signature: u64,
}

impl LayoutKey {
    /// Hash `(id, kind, x, y, width, height, updated_at, config)` of every
    /// record, in list order.
    pub fn new(records: &[PlacementRecord], breakpoint: Breakpoint) -> Self {
        let mut hasher = FxHasher::default();
        records.len().hash(&mut hasher);
        for r in records {
            r.id.as_str().hash(&mut hasher);
            r.kind.hash(&mut hasher);
            (r.x, r.y, r.width, r.height).hash(&mut hasher);
            r.updated_at.hash(&mut hasher);
            config_hash(&r.config).hash(&mut hasher);
        }
        Self {
            breakpoint,
            signature: hasher.finish(),
        }
    }
}

fn config_hash(config: &serde_json::Value) -> u64 {
    let mut hasher = FxHasher::default();
    config.to_string().hash(&mut hasher);
    hasher.finish()
}

/// Hit/miss counters for a [`LayoutCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Bounded memo of display layouts.
///
/// Eviction is strict insertion order (FIFO): once full, inserting a new
/// layout drops the oldest *inserted* one. Hits do not refresh an entry.
#[derive(Debug)]
pub struct LayoutCache {
    entries: FxHashMap<LayoutKey, Arc<[DisplayItem]>>,
    order: VecDeque<LayoutKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached layout for `key`, or compute and remember it.
    pub fn get_or_compute<F>(&mut self, key: LayoutKey, compute: F) -> Arc<[DisplayItem]>
    where
        F: FnOnce() -> Vec<DisplayItem>,
    {
        if let Some(layout) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(layout);
        }

        self.misses += 1;
        let layout: Arc<[DisplayItem]> = compute().into();
        if self.capacity == 0 {
            return layout;
        }
        if self.entries.len() >= self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            log::debug!("layout cache full, evicting {:?}", oldest.breakpoint);
            self.entries.remove(&oldest);
        }
        self.entries.insert(key, Arc::clone(&layout));
        self.order.push_back(key);
        layout
    }

    pub fn contains(&self, key: &LayoutKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Transformer ──────────────────────────────────────────────────────────

/// Memoizing front end over [`layout_for`].
#[derive(Debug)]
pub struct ResponsiveTransformer {
    sizes: SizeTable,
    cache: LayoutCache,
}

impl ResponsiveTransformer {
    pub fn new(sizes: SizeTable, config: &GridConfig) -> Self {
        Self {
            sizes,
            cache: LayoutCache::new(config.cache_capacity),
        }
    }

    /// Display layout of `records` at `bp`. Unchanged inputs return the
    /// same shared allocation.
    pub fn transform(&mut self, records: &[PlacementRecord], bp: Breakpoint) -> Arc<[DisplayItem]> {
        let key = LayoutKey::new(records, bp);
        let sizes = &self.sizes;
        self.cache.get_or_compute(key, || {
            log::debug!("computing {bp} layout for {} records", records.len());
            layout_for(records, bp, sizes)
        })
    }

    pub fn sizes(&self) -> &SizeTable {
        &self.sizes
    }

    /// Swap the size table. Every cached layout depended on the old one.
    pub fn set_sizes(&mut self, sizes: SizeTable) {
        self.sizes = sizes;
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
