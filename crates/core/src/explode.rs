use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;
use crate::domain::path::{DerivationPath, PathStep, TraceEntry};
use crate::domain::row::{BomRow, Classification, ClassifiedRow};
use crate::errors::DomainError;

/// Classified BOM rows with a parent-to-rows index.
///
/// Rows keep their source order; traversal iterates children in the order
/// the source table recorded them, which fixes the accumulation order.
#[derive(Clone, Debug)]
pub struct BomTable {
    rows: Vec<ClassifiedRow>,
    children: HashMap<ItemId, Vec<usize>>,
}

impl BomTable {
    pub fn from_rows(rows: Vec<BomRow>) -> Self {
        let rows: Vec<ClassifiedRow> = rows.into_iter().map(ClassifiedRow::classify).collect();
        let mut children: HashMap<ItemId, Vec<usize>> = HashMap::new();
        for (index, classified) in rows.iter().enumerate() {
            children.entry(classified.row.parent_item.clone()).or_default().push(index);
        }
        Self { rows, children }
    }

    pub fn rows(&self) -> &[ClassifiedRow] {
        &self.rows
    }

    fn children_of(&self, parent: &ItemId) -> &[usize] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The unique item recorded at `level == 0`.
    ///
    /// Several rows may restate the same root item; several *distinct* items
    /// at level 0 make the input ambiguous and are rejected rather than
    /// silently resolved by encounter order.
    pub fn root_item(&self) -> Result<ItemId, DomainError> {
        let mut candidates: Vec<ItemId> = Vec::new();
        for classified in &self.rows {
            let row = &classified.row;
            if row.level == 0 && !candidates.contains(&row.item) {
                candidates.push(row.item.clone());
            }
        }
        match candidates.len() {
            0 => Err(DomainError::MissingRoot),
            1 => Ok(candidates.swap_remove(0)),
            _ => Err(DomainError::AmbiguousRoot { candidates }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplodeOptions {
    /// Bound on phantom nesting depth. The path-key guard already stops
    /// literal repeats, but a genuinely cyclic BOM grows a fresh path on
    /// every lap; this limit turns that into a structured error.
    pub max_depth: usize,
}

impl Default for ExplodeOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Everything one explosion produces: piece-count totals per leaf item,
/// length totals per length-flagged leaf item, and the full derivation
/// record behind both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explosion {
    pub leaf_totals: BTreeMap<ItemId, Decimal>,
    pub length_totals: BTreeMap<ItemId, Decimal>,
    pub trace_log: BTreeMap<ItemId, Vec<TraceEntry>>,
    pub length_log: BTreeMap<ItemId, Vec<TraceEntry>>,
}

/// Expand `root` down to its buy/make leaves, multiplying per-parent
/// quantities along each path.
///
/// Phantom assemblies relay their accumulated multiplier to their children;
/// buy/make rows terminate their branch and contribute to a total; unknown
/// rows are dropped. Each distinct root-to-child path is visited at most
/// once. All accumulation state lives in an engine value owned by this one
/// call, so independent explosions can run in parallel without coordination.
pub fn explode(
    table: &BomTable,
    root: &ItemId,
    options: &ExplodeOptions,
) -> Result<Explosion, DomainError> {
    let mut engine = ExplosionEngine {
        table,
        max_depth: options.max_depth,
        seen_paths: HashSet::new(),
        out: Explosion::default(),
    };
    engine.visit(root, Decimal::ONE, &DerivationPath::root(), 0)?;
    Ok(engine.out)
}

struct ExplosionEngine<'a> {
    table: &'a BomTable,
    max_depth: usize,
    seen_paths: HashSet<DerivationPath>,
    out: Explosion,
}

impl ExplosionEngine<'_> {
    fn visit(
        &mut self,
        item: &ItemId,
        multiplier: Decimal,
        path: &DerivationPath,
        depth: usize,
    ) -> Result<(), DomainError> {
        if depth >= self.max_depth {
            return Err(DomainError::DepthLimitExceeded {
                item: item.clone(),
                limit: self.max_depth,
            });
        }

        let table = self.table;
        for &index in table.children_of(item) {
            let classified = &table.rows[index];
            let row = &classified.row;
            let qty = row.quantity_per_parent;
            let total_quantity = multiplier * qty;

            // The current item's hop carries the quantity of the edge below
            // it; the terminal hop repeats that quantity and is rendered
            // without it.
            let hop_path = path.extended(PathStep::new(item.clone(), qty));
            let child_path = hop_path.extended(PathStep::new(row.item.clone(), qty));

            // Full-path key: the same item reached via a different route is
            // still expanded, only a literally repeated path+edge is skipped.
            if !self.seen_paths.insert(child_path.clone()) {
                continue;
            }

            let classification = classified.classification;
            if classification.is_leaf() {
                let entry = TraceEntry { total_quantity, path: child_path };
                self.out.trace_log.entry(row.item.clone()).or_default().push(entry.clone());
                if classified.length_item {
                    self.out.length_log.entry(row.item.clone()).or_default().push(entry);
                    *self
                        .out
                        .length_totals
                        .entry(row.item.clone())
                        .or_insert(Decimal::ZERO) += total_quantity;
                } else {
                    *self
                        .out
                        .leaf_totals
                        .entry(row.item.clone())
                        .or_insert(Decimal::ZERO) += total_quantity;
                }
            } else if classification == Classification::Phantom {
                self.visit(&row.item, total_quantity, &hop_path, depth + 1)?;
            }
            // unknown rows relay nothing and record nothing
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{explode, BomTable, ExplodeOptions};
    use crate::domain::item::ItemId;
    use crate::domain::row::BomRow;
    use crate::errors::DomainError;

    fn row(parent: &str, child: &str, qty: i64, make_or_buy: &str, level: i64) -> BomRow {
        BomRow {
            parent_item: ItemId::from(parent),
            item: ItemId::from(child),
            quantity_per_parent: Decimal::from(qty),
            template: String::new(),
            make_or_buy: make_or_buy.to_string(),
            line_type: String::new(),
            product_name: format!("{child} name"),
            level,
        }
    }

    fn length_row(parent: &str, child: &str, qty: i64) -> BomRow {
        BomRow { template: "profile 40mm".to_string(), ..row(parent, child, qty, "Purchased", 1) }
    }

    fn run(rows: Vec<BomRow>) -> super::Explosion {
        let table = BomTable::from_rows(rows);
        let root = table.root_item().expect("root");
        explode(&table, &root, &ExplodeOptions::default()).expect("explode")
    }

    #[test]
    fn multiplier_propagates_along_a_phantom_chain() {
        let result = run(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 2, "Production - Phantom", 1),
            row("A", "B", 3, "Production - Phantom", 2),
            row("B", "C", 5, "Purchased", 3),
        ]);

        assert_eq!(result.leaf_totals[&ItemId::from("C")], Decimal::from(30));
    }

    #[test]
    fn independent_branches_sum_their_contributions() {
        let result = run(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 2, "Production - Phantom", 1),
            row("ROOT", "B", 1, "Production - Phantom", 1),
            row("A", "LEAF", 5, "Purchased", 2),
            row("B", "LEAF", 4, "Purchased", 2),
        ]);

        // branch A contributes 2*5, branch B contributes 1*4
        assert_eq!(result.leaf_totals[&ItemId::from("LEAF")], Decimal::from(14));
        assert_eq!(result.trace_log[&ItemId::from("LEAF")].len(), 2);
    }

    #[test]
    fn buy_nodes_terminate_their_branch() {
        let result = run(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 2, "Purchased", 1),
            // A has children in the table, but a buy node is never expanded
            row("A", "UNDER", 9, "Purchased", 2),
        ]);

        assert_eq!(result.leaf_totals[&ItemId::from("A")], Decimal::from(2));
        assert!(!result.leaf_totals.contains_key(&ItemId::from("UNDER")));
    }

    #[test]
    fn unknown_rows_contribute_nothing_anywhere() {
        let result = run(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 2, "Subcontract", 1),
            row("ROOT", "B", 3, "Purchased", 1),
        ]);

        assert!(!result.leaf_totals.contains_key(&ItemId::from("A")));
        assert!(!result.trace_log.contains_key(&ItemId::from("A")));
        assert_eq!(result.leaf_totals[&ItemId::from("B")], Decimal::from(3));
    }

    #[test]
    fn length_items_are_kept_out_of_the_main_totals() {
        let result = run(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            length_row("ROOT", "RAIL", 4),
            row("ROOT", "BOLT", 8, "Purchased", 1),
        ]);

        assert!(!result.leaf_totals.contains_key(&ItemId::from("RAIL")));
        assert_eq!(result.length_totals[&ItemId::from("RAIL")], Decimal::from(4));
        // the trace still records the length item's derivation
        assert_eq!(result.trace_log[&ItemId::from("RAIL")].len(), 1);
        assert_eq!(result.leaf_totals[&ItemId::from("BOLT")], Decimal::from(8));
    }

    #[test]
    fn each_occurrence_is_judged_by_its_own_template() {
        // same item purchased once as a length row and once as a piece row
        let result = run(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 1, "Production - Phantom", 1),
            row("ROOT", "B", 1, "Production - Phantom", 1),
            length_row("A", "BAR", 2),
            row("B", "BAR", 3, "Purchased", 2),
        ]);

        assert_eq!(result.length_totals[&ItemId::from("BAR")], Decimal::from(2));
        assert_eq!(result.leaf_totals[&ItemId::from("BAR")], Decimal::from(3));
    }

    #[test]
    fn duplicate_edges_are_counted_once() {
        let mut rows = vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 2, "Purchased", 1),
        ];
        rows.push(rows[1].clone());
        let result = run(rows);

        assert_eq!(result.leaf_totals[&ItemId::from("A")], Decimal::from(2));
        assert_eq!(result.trace_log[&ItemId::from("A")].len(), 1);
    }

    #[test]
    fn same_item_via_a_different_path_is_still_expanded() {
        let result = run(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 1, "Production - Phantom", 1),
            row("ROOT", "B", 2, "Production - Phantom", 1),
            row("A", "SUB", 1, "Production - Phantom", 2),
            row("B", "SUB", 1, "Production - Phantom", 2),
            row("SUB", "LEAF", 3, "Purchased", 3),
        ]);

        // 1*1*3 via A plus 2*1*3 via B
        assert_eq!(result.leaf_totals[&ItemId::from("LEAF")], Decimal::from(9));
    }

    #[test]
    fn cyclic_phantom_structures_hit_the_depth_limit() {
        let table = BomTable::from_rows(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 1, "Production - Phantom", 1),
            row("A", "ROOT", 1, "Production - Phantom", 2),
        ]);
        let root = table.root_item().expect("root");

        let error = explode(&table, &root, &ExplodeOptions { max_depth: 8 })
            .expect_err("cycle should exhaust the depth budget");
        assert!(matches!(error, DomainError::DepthLimitExceeded { limit: 8, .. }));
    }

    #[test]
    fn root_without_children_yields_empty_totals() {
        let table = BomTable::from_rows(vec![row("TOP", "ROOT", 1, "Production", 0)]);
        let result =
            explode(&table, &ItemId::from("ROOT"), &ExplodeOptions::default()).expect("explode");

        assert!(result.leaf_totals.is_empty());
        assert!(result.length_totals.is_empty());
        assert!(result.trace_log.is_empty());
    }

    #[test]
    fn explosion_is_a_pure_function_of_its_input() {
        let rows = vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("ROOT", "A", 2, "Production - Phantom", 1),
            row("A", "B", 3, "Purchased", 2),
            length_row("A", "RAIL", 7),
        ];
        let first = run(rows.clone());
        let second = run(rows);

        assert_eq!(first, second);
    }

    #[test]
    fn missing_root_is_rejected_before_traversal() {
        let table = BomTable::from_rows(vec![row("ROOT", "A", 2, "Purchased", 1)]);
        assert_eq!(table.root_item(), Err(DomainError::MissingRoot));
    }

    #[test]
    fn distinct_level_zero_items_are_ambiguous() {
        let table = BomTable::from_rows(vec![
            row("TOP", "ROOT-A", 1, "Production", 0),
            row("TOP", "ROOT-B", 1, "Production", 0),
        ]);
        assert!(matches!(table.root_item(), Err(DomainError::AmbiguousRoot { .. })));
    }

    #[test]
    fn repeated_rows_for_one_root_item_are_accepted() {
        let table = BomTable::from_rows(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            row("TOP", "ROOT", 1, "Production", 0),
        ]);
        assert_eq!(table.root_item(), Ok(ItemId::from("ROOT")));
    }

    #[test]
    fn fractional_quantities_accumulate_exactly() {
        let result = run(vec![
            row("TOP", "ROOT", 1, "Production", 0),
            BomRow {
                quantity_per_parent: Decimal::new(25, 1), // 2.5
                ..row("ROOT", "A", 0, "Production - Phantom", 1)
            },
            BomRow {
                quantity_per_parent: Decimal::new(4, 1), // 0.4
                ..row("A", "LEAF", 0, "Purchased", 2)
            },
        ]);

        assert_eq!(result.leaf_totals[&ItemId::from("LEAF")], Decimal::ONE);
    }
}
