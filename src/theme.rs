use once_cell::sync::Lazy;

use crate::color::{Rgb, hex_or_fallback};

/// Name of the theme returned for any unknown name.
pub const DEFAULT_THEME: &str = "default";

/// A named bundle of series palette, chrome colours and typography.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    /// Series colours, cycled by selection index. Never empty.
    pub colors: Vec<Rgb>,
    pub background: Rgb,
    pub grid: Rgb,
    pub title: Rgb,
    pub axis: Rgb,
    pub font_family: &'static str,
    pub font_size: f32,
}

impl Theme {
    /// Colour of the `index`-th selected series; wraps around the palette.
    pub fn series_color(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }
}

struct ThemeDef {
    name: &'static str,
    colors: [&'static str; 6],
    background: &'static str,
    grid: &'static str,
    title: &'static str,
    axis: &'static str,
}

const FONT_FAMILY: &str = "Inter, sans-serif";
const FONT_SIZE: f32 = 12.0;

const THEME_DEFS: [ThemeDef; 3] = [
    ThemeDef {
        name: "default",
        colors: ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"],
        background: "#ffffff",
        grid: "#e0e0e0",
        title: "#333333",
        axis: "#666666",
    },
    ThemeDef {
        name: "dark",
        colors: ["#61dafb", "#fb8c00", "#4caf50", "#e53935", "#ba68c8", "#8d6e63"],
        background: "#282c34",
        grid: "#444444",
        title: "#ffffff",
        axis: "#aaaaaa",
    },
    ThemeDef {
        name: "pastel",
        colors: ["#8dd3c7", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69"],
        background: "#f8f9fa",
        grid: "#e9ecef",
        title: "#495057",
        axis: "#6c757d",
    },
];

static CATALOG: Lazy<Vec<Theme>> = Lazy::new(|| {
    THEME_DEFS
        .iter()
        .map(|def| Theme {
            name: def.name,
            colors: def.colors.iter().map(|c| hex_or_fallback(c)).collect(),
            background: hex_or_fallback(def.background),
            grid: hex_or_fallback(def.grid),
            title: hex_or_fallback(def.title),
            axis: hex_or_fallback(def.axis),
            font_family: FONT_FAMILY,
            font_size: FONT_SIZE,
        })
        .collect()
});

// ---------------------------------------------------------------------------
// ThemeCatalog
// ---------------------------------------------------------------------------

/// Read-only, process-wide name → theme lookup.
pub struct ThemeCatalog;

impl ThemeCatalog {
    /// Exact-name lookup; unknown names resolve to the default theme.
    pub fn get(name: &str) -> &'static Theme {
        Self::find(name).unwrap_or_else(Self::default_theme)
    }

    /// Exact-name lookup without the fallback.
    pub fn find(name: &str) -> Option<&'static Theme> {
        CATALOG.iter().find(|t| t.name == name)
    }

    pub fn contains(name: &str) -> bool {
        Self::find(name).is_some()
    }

    pub fn default_theme() -> &'static Theme {
        &CATALOG[0]
    }

    /// Theme names in catalog order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        CATALOG.iter().map(|t| t.name)
    }
}
