use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;

/// One parent/child edge of the BOM, normalized by the ingestion layer.
///
/// An item may appear as child under multiple parents and as parent of
/// multiple children; there is one row per edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomRow {
    pub parent_item: ItemId,
    pub item: ItemId,
    pub quantity_per_parent: Decimal,
    pub template: String,
    pub make_or_buy: String,
    pub line_type: String,
    pub product_name: String,
    pub level: i64,
}

/// Procurement classification derived from a row's free-text fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Buy,
    Make,
    Phantom,
    Unknown,
}

impl Classification {
    /// A buy or make node terminates its branch and contributes to a total.
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Buy | Self::Make)
    }
}

/// A `BomRow` annotated with its derived classification and length flag.
///
/// Both annotations are pure functions of the row's own fields, computed
/// once at table construction and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRow {
    pub row: BomRow,
    pub classification: Classification,
    pub length_item: bool,
}

impl ClassifiedRow {
    pub fn classify(row: BomRow) -> Self {
        let classification = classify_fields(&row.make_or_buy, &row.line_type);
        let length_item = is_length_item(&row.template);
        Self { row, classification, length_item }
    }
}

/// Classification rule, case-insensitive substring match on trimmed fields:
/// "purch" wins outright, "production" is make unless either field also
/// says "phantom", anything else is unknown (a valid terminal state, not an
/// error).
pub fn classify_fields(make_or_buy: &str, line_type: &str) -> Classification {
    let make_or_buy = make_or_buy.trim().to_lowercase();
    let line_type = line_type.trim().to_lowercase();

    if make_or_buy.contains("purch") {
        Classification::Buy
    } else if make_or_buy.contains("production") {
        if make_or_buy.contains("phantom") || line_type.contains("phantom") {
            Classification::Phantom
        } else {
            Classification::Make
        }
    } else {
        Classification::Unknown
    }
}

/// Length-ordered items carry a millimetre marker in their template field
/// and are aggregated apart from the piece-count totals.
pub fn is_length_item(template: &str) -> bool {
    template.to_lowercase().contains("mm")
}
