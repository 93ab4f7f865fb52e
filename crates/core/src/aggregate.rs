use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;
use crate::explode::{BomTable, Explosion};

/// One line of the bestellijst: a leaf item, a recorded product name, and
/// the accumulated quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartsRequirement {
    pub item: ItemId,
    pub product_name: String,
    pub total_quantity: Decimal,
}

/// Length-ordered counterpart of [`PartsRequirement`], additionally carrying
/// the template that flagged the item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRequirement {
    pub item: ItemId,
    pub product_name: String,
    pub total_quantity: Decimal,
    pub template: String,
}

/// Join the explosion's leaf totals with the product names the source rows
/// recorded for each item.
///
/// Names pass through unreconciled: an item recorded under two distinct
/// names yields one row per `(item, name)` pair, each showing the item's
/// full total. Output is sorted by item identifier ascending, names in
/// first-seen order within an item.
pub fn build_parts_list(explosion: &Explosion, table: &BomTable) -> Vec<PartsRequirement> {
    let names = names_by_item(table);
    explosion
        .leaf_totals
        .iter()
        .flat_map(|(item, total)| {
            names_for(&names, item).into_iter().map(|name| PartsRequirement {
                item: item.clone(),
                product_name: name,
                total_quantity: *total,
            })
        })
        .collect()
}

/// Same join for length-flagged leaf items, kept in their own table.
pub fn build_length_list(explosion: &Explosion, table: &BomTable) -> Vec<LengthRequirement> {
    let names = names_by_item(table);
    let templates = templates_by_item(table);
    explosion
        .length_totals
        .iter()
        .flat_map(|(item, total)| {
            let template = templates.get(item).cloned().unwrap_or_default();
            names_for(&names, item).into_iter().map(move |name| LengthRequirement {
                item: item.clone(),
                product_name: name,
                total_quantity: *total,
                template: template.clone(),
            })
        })
        .collect()
}

/// Distinct product names per item, in the order the source table first
/// recorded them.
fn names_by_item(table: &BomTable) -> HashMap<ItemId, Vec<String>> {
    let mut names: HashMap<ItemId, Vec<String>> = HashMap::new();
    for classified in table.rows() {
        let row = &classified.row;
        let recorded = names.entry(row.item.clone()).or_default();
        if !recorded.contains(&row.product_name) {
            recorded.push(row.product_name.clone());
        }
    }
    names
}

/// First-seen template per item.
fn templates_by_item(table: &BomTable) -> HashMap<ItemId, String> {
    let mut templates: HashMap<ItemId, String> = HashMap::new();
    for classified in table.rows() {
        let row = &classified.row;
        templates.entry(row.item.clone()).or_insert_with(|| row.template.clone());
    }
    templates
}

fn names_for(names: &HashMap<ItemId, Vec<String>>, item: &ItemId) -> Vec<String> {
    match names.get(item) {
        Some(recorded) if !recorded.is_empty() => recorded.clone(),
        _ => vec![String::new()],
    }
}
