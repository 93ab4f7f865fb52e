use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;

/// One hop of a derivation path: an item together with the per-parent
/// quantity of the edge that reached it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathStep {
    pub item: ItemId,
    pub qty: Decimal,
}

impl PathStep {
    pub fn new(item: ItemId, qty: Decimal) -> Self {
        Self { item, qty }
    }
}

/// Ordered root-to-node sequence of `(item, qty)` hops, inclusive of the
/// node itself. Used for trace display and as the traversal cycle-guard key;
/// never as an aggregation key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationPath(pub Vec<PathStep>);

impl DerivationPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// New path value with one extra hop; the receiver is left untouched so
    /// sibling branches never observe each other's extensions.
    pub fn extended(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display form: `ROOT (x2) -> SUB (x3) -> LEAF`. The last hop is shown
    /// without its multiplier since that quantity is already captured as the
    /// entry's terminal total.
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.0.len());
        for (index, step) in self.0.iter().enumerate() {
            if index + 1 == self.0.len() {
                parts.push(step.item.to_string());
            } else {
                parts.push(format!("{} (x{})", step.item, step.qty));
            }
        }
        parts.join(" -> ")
    }
}

/// One recorded arrival at a leaf item: the multiplier in effect at that
/// point plus the full path that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub total_quantity: Decimal,
    pub path: DerivationPath,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{DerivationPath, PathStep};
    use crate::domain::item::ItemId;

    #[test]
    fn extended_leaves_the_original_path_untouched() {
        let base = DerivationPath::root()
            .extended(PathStep::new(ItemId::from("ROOT"), Decimal::ONE));
        let longer = base.extended(PathStep::new(ItemId::from("SUB"), Decimal::TWO));

        assert_eq!(base.len(), 1);
        assert_eq!(longer.len(), 2);
    }

    #[test]
    fn render_omits_the_terminal_multiplier() {
        let path = DerivationPath::root()
            .extended(PathStep::new(ItemId::from("ROOT"), Decimal::ONE))
            .extended(PathStep::new(ItemId::from("SUB"), Decimal::TWO))
            .extended(PathStep::new(ItemId::from("LEAF"), Decimal::from(5)));

        assert_eq!(path.render(), "ROOT (x1) -> SUB (x2) -> LEAF");
    }

    #[test]
    fn render_of_single_hop_is_just_the_item() {
        let path =
            DerivationPath::root().extended(PathStep::new(ItemId::from("LEAF"), Decimal::TEN));
        assert_eq!(path.render(), "LEAF");
    }
}
