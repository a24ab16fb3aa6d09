//! Ranking and rendering of the final channel list
//!
//! `filter → categorize → group by name → sort by speed → take N`, all over
//! owned collections after every network task has joined.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::{ScanError, SpeedResult, StreamEntry};

/// Coarse grouping of channels in the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// National CCTV channels
    Cctv,
    /// Provincial satellite channels (`卫视`)
    Satellite,
    Other,
}

impl Category {
    /// Output order of the listing
    pub const ORDER: [Self; 3] = [Self::Cctv, Self::Satellite, Self::Other];

    /// First match wins: CCTV, then 卫视, then everything else.
    pub fn of(name: &str) -> Self {
        if name.contains("CCTV") {
            Self::Cctv
        } else if name.contains("卫视") {
            Self::Satellite
        } else {
            Self::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cctv => "CCTV",
            Self::Satellite => "卫视",
            Self::Other => "其他",
        }
    }
}

/// Knobs for [`aggregate`]
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    /// Results strictly below this many KB/s are dropped
    pub floor_kbps: f64,
    /// Fastest URLs kept per channel name
    pub max_per_name: usize,
    /// Collapse repeated URLs under one name, keeping the fastest
    pub dedupe_urls: bool,
    /// Write headers for categories with no channels
    pub emit_empty_categories: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            floor_kbps: 500.0,
            max_per_name: 8,
            dedupe_urls: false,
            emit_empty_categories: true,
        }
    }
}

/// One category block of the listing
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub category: Category,
    pub entries: Vec<StreamEntry>,
}

/// Final ranked listing, always holding every category in [`Category::ORDER`]
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub sections: Vec<Section>,
    /// Results dropped by the speed floor
    pub below_floor: usize,
    emit_empty_categories: bool,
}

impl Listing {
    pub fn section(&self, category: Category) -> Option<&Section> {
        self.sections.iter().find(|s| s.category == category)
    }

    /// Number of `name,url` lines
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `{label}频道,#genre#` header, `name,url` lines, blank separator
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if section.entries.is_empty() && !self.emit_empty_categories {
                continue;
            }
            out.push_str(section.category.label());
            out.push_str("频道,#genre#\n");
            for entry in &section.entries {
                out.push_str(&entry.name);
                out.push(',');
                out.push_str(&entry.url);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// Overwrite `path` with the rendered listing.
    pub fn write_to(&self, path: &Path) -> Result<(), ScanError> {
        let wrap = |source: std::io::Error| ScanError::Output {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        fs::write(path, self.render()).map_err(wrap)
    }
}

/// Reduce every speed-test result into the final listing.
pub fn aggregate(results: Vec<SpeedResult>, options: &AggregateOptions) -> Listing {
    let total = results.len();
    let kept: Vec<SpeedResult> = results
        .into_iter()
        .filter(|r| r.kbps >= options.floor_kbps)
        .collect();
    let below_floor = total - kept.len();

    let sections = Category::ORDER
        .iter()
        .map(|&category| {
            let members = kept.iter().filter(|r| Category::of(&r.entry.name) == category);
            Section {
                category,
                entries: rank_by_name(members, options),
            }
        })
        .collect();

    Listing {
        sections,
        below_floor,
        emit_empty_categories: options.emit_empty_categories,
    }
}

/// Group by exact name (first-seen order), fastest first, capped per name.
fn rank_by_name<'a>(
    results: impl Iterator<Item = &'a SpeedResult>,
    options: &AggregateOptions,
) -> Vec<StreamEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&SpeedResult>> = Vec::new();

    for result in results {
        let slot = *index.entry(result.entry.name.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(result);
    }

    groups
        .into_iter()
        .flat_map(|mut group| {
            // Stable: equal speeds keep arrival order
            group.sort_by(|a, b| b.kbps.total_cmp(&a.kbps));
            if options.dedupe_urls {
                let mut seen = HashSet::new();
                group.retain(|r| seen.insert(r.entry.url.as_str()));
            }
            group
                .into_iter()
                .take(options.max_per_name)
                .map(|r| r.entry.clone())
        })
        .collect()
}
