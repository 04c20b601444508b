use rust_decimal::Decimal;

use super::Entry;

/// Totals for the active project, recomputed from the loaded registries on
/// every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub items_total: Decimal,
    pub items_count: usize,
    pub costs_total: Decimal,
    pub costs_count: usize,
}

impl Summary {
    pub fn of(items: &[Entry], costs: &[Entry]) -> Self {
        Self {
            items_total: items.iter().map(|e| e.magnitude).sum(),
            items_count: items.len(),
            costs_total: costs.iter().map(|e| e.magnitude).sum(),
            costs_count: costs.len(),
        }
    }

    pub fn total(&self) -> Decimal {
        self.items_total + self.costs_total
    }
}
