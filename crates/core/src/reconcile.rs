use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::PartsRequirement;
use crate::domain::item::ItemId;

/// Default quantity tolerance: differences at or below this are a match.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One line of the externally sourced target quantity list, already
/// aggregated per `(item, name)` by the ingestion layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRow {
    pub item: ItemId,
    pub product_name: String,
    pub total_quantity: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    Match,
    QuantityDiffers,
    NameDiffers,
    OnlyInBom,
    OnlyInTarget,
}

impl std::fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Match => "match",
            Self::QuantityDiffers => "quantity_differs",
            Self::NameDiffers => "name_differs",
            Self::OnlyInBom => "only_in_bom",
            Self::OnlyInTarget => "only_in_target",
        };
        f.write_str(label)
    }
}

/// Outer-join row of the comparison report. Either side may be absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub item: ItemId,
    pub bom_name: Option<String>,
    pub bom_quantity: Option<Decimal>,
    pub target_name: Option<String>,
    pub target_quantity: Option<Decimal>,
    pub status: ComparisonStatus,
}

#[derive(Clone, Debug, Default)]
struct SideEntry {
    name: String,
    quantity: Decimal,
}

/// Full outer join of the computed bestellijst against the target list,
/// keyed on item, sorted by item ascending.
///
/// Status precedence per row: absent on one side wins, then quantity
/// (difference beyond `tolerance`), then trimmed name inequality, else a
/// match. Each side is represented by its first-seen name; the bestellijst
/// repeats an item's full total on every name row, so the first row carries
/// the item's quantity.
pub fn reconcile(
    parts: &[PartsRequirement],
    targets: &[TargetRow],
    tolerance: Decimal,
) -> Vec<ComparisonRow> {
    let mut bom_side: BTreeMap<ItemId, SideEntry> = BTreeMap::new();
    for part in parts {
        bom_side.entry(part.item.clone()).or_insert_with(|| SideEntry {
            name: part.product_name.clone(),
            quantity: part.total_quantity,
        });
    }

    let mut target_side: BTreeMap<ItemId, SideEntry> = BTreeMap::new();
    for target in targets {
        let entry = target_side.entry(target.item.clone()).or_insert_with(|| SideEntry {
            name: target.product_name.clone(),
            quantity: Decimal::ZERO,
        });
        entry.quantity += target.total_quantity;
    }

    let mut items: Vec<ItemId> = bom_side.keys().cloned().collect();
    for item in target_side.keys() {
        if !bom_side.contains_key(item) {
            items.push(item.clone());
        }
    }
    items.sort();

    items
        .into_iter()
        .map(|item| {
            let bom = bom_side.get(&item);
            let target = target_side.get(&item);
            let status = classify_pair(bom, target, tolerance);
            ComparisonRow {
                item,
                bom_name: bom.map(|entry| entry.name.clone()),
                bom_quantity: bom.map(|entry| entry.quantity),
                target_name: target.map(|entry| entry.name.clone()),
                target_quantity: target.map(|entry| entry.quantity),
                status,
            }
        })
        .collect()
}

fn classify_pair(
    bom: Option<&SideEntry>,
    target: Option<&SideEntry>,
    tolerance: Decimal,
) -> ComparisonStatus {
    match (bom, target) {
        (None, _) => ComparisonStatus::OnlyInTarget,
        (_, None) => ComparisonStatus::OnlyInBom,
        (Some(bom), Some(target)) => {
            if (bom.quantity - target.quantity).abs() > tolerance {
                ComparisonStatus::QuantityDiffers
            } else if bom.name.trim() != target.name.trim() {
                ComparisonStatus::NameDiffers
            } else {
                ComparisonStatus::Match
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{reconcile, ComparisonStatus, TargetRow, DEFAULT_TOLERANCE};
    use crate::aggregate::PartsRequirement;
    use crate::domain::item::ItemId;

    fn part(item: &str, name: &str, qty: i64) -> PartsRequirement {
        PartsRequirement {
            item: ItemId::from(item),
            product_name: name.to_string(),
            total_quantity: Decimal::from(qty),
        }
    }

    fn target(item: &str, name: &str, qty: i64) -> TargetRow {
        TargetRow {
            item: ItemId::from(item),
            product_name: name.to_string(),
            total_quantity: Decimal::from(qty),
        }
    }

    #[test]
    fn default_tolerance_is_a_hundredth() {
        assert_eq!(DEFAULT_TOLERANCE, Decimal::new(1, 2));
    }

    #[test]
    fn matching_rows_within_tolerance() {
        let report = reconcile(
            &[part("A", "Axle", 10)],
            &[TargetRow { total_quantity: Decimal::new(1000, 2), ..target("A", "Axle", 0) }],
            DEFAULT_TOLERANCE,
        );

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].status, ComparisonStatus::Match);
    }

    #[test]
    fn quantity_difference_beyond_tolerance_wins_over_name() {
        let report = reconcile(
            &[part("A", "Axle", 10)],
            &[target("A", "Different name", 12)],
            DEFAULT_TOLERANCE,
        );

        assert_eq!(report[0].status, ComparisonStatus::QuantityDiffers);
    }

    #[test]
    fn name_difference_ignores_surrounding_whitespace() {
        let report =
            reconcile(&[part("A", "Axle ", 10)], &[target("A", " Axle", 10)], DEFAULT_TOLERANCE);
        assert_eq!(report[0].status, ComparisonStatus::Match);

        let report =
            reconcile(&[part("A", "Axle", 10)], &[target("A", "Shaft", 10)], DEFAULT_TOLERANCE);
        assert_eq!(report[0].status, ComparisonStatus::NameDiffers);
    }

    #[test]
    fn one_sided_items_are_reported_sorted_by_item() {
        let report = reconcile(
            &[part("B", "Bolt", 4)],
            &[target("A", "Axle", 2)],
            DEFAULT_TOLERANCE,
        );

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].item, ItemId::from("A"));
        assert_eq!(report[0].status, ComparisonStatus::OnlyInTarget);
        assert!(report[0].bom_quantity.is_none());
        assert_eq!(report[1].item, ItemId::from("B"));
        assert_eq!(report[1].status, ComparisonStatus::OnlyInBom);
    }

    #[test]
    fn target_quantities_for_one_item_are_summed() {
        let report = reconcile(
            &[part("A", "Axle", 10)],
            &[target("A", "Axle", 6), target("A", "Axle", 4)],
            DEFAULT_TOLERANCE,
        );

        assert_eq!(report[0].target_quantity, Some(Decimal::from(10)));
        assert_eq!(report[0].status, ComparisonStatus::Match);
    }
}
