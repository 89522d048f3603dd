//! Pure FIFO consumption planning.
//!
//! The plan walks open layers in `(created_at, sequence)` order and takes
//! `min(remaining, still_needed)` from each until the request is covered.
//! Whatever is left over is the shortfall.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use tally_shared::types::{QUANTITY_SCALE, round_unit_cost};

use super::error::InventoryError;
use super::types::{CostLayer, CostSlice, NegativeInventoryPolicy};

/// FIFO order: creation time, then insertion sequence.
pub fn fifo_order(a: &CostLayer, b: &CostLayer) -> Ordering {
    (a.created_at, a.sequence).cmp(&(b.created_at, b.sequence))
}

/// Rejects quantities that are not positive or carry more than
/// [`QUANTITY_SCALE`] decimal places.
///
/// # Errors
///
/// Returns `InvalidQuantity` for a rejected quantity.
pub fn check_quantity(quantity: Decimal) -> Result<(), InventoryError> {
    if quantity <= Decimal::ZERO || quantity.normalize().scale() > QUANTITY_SCALE {
        return Err(InventoryError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Slices to take for one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionPlan {
    /// Quantity asked for.
    pub requested: Decimal,
    /// Quantity in open layers.
    pub available: Decimal,
    /// Slices, oldest layer first; a shortfall slice (if any) comes last.
    pub slices: Vec<CostSlice>,
    /// Quantity the open layers could not cover.
    pub shortfall: Decimal,
}

impl ConsumptionPlan {
    /// Sum of slice costs.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.slices.iter().map(CostSlice::cost).sum()
    }

    /// Quantity covered by the slices.
    #[must_use]
    pub fn covered(&self) -> Decimal {
        self.slices.iter().map(|s| s.quantity).sum()
    }

    /// `total_cost / covered`, rounded to the unit cost scale.
    #[must_use]
    pub fn average_unit_cost(&self) -> Decimal {
        let covered = self.covered();
        if covered.is_zero() {
            return Decimal::ZERO;
        }
        round_unit_cost(self.total_cost() / covered)
    }

    /// Covers the shortfall with a slice not backed by any layer.
    pub fn cover_shortfall(&mut self, unit_cost: Decimal) {
        if self.shortfall > Decimal::ZERO {
            self.slices.push(CostSlice {
                layer_id: None,
                quantity: self.shortfall,
                unit_cost,
            });
        }
    }
}

/// Plans the consumption of `quantity` from `layers`.
///
/// Layers are re-sorted into FIFO order; exhausted layers are skipped.
///
/// # Errors
///
/// Returns `InvalidQuantity` if [`check_quantity`] rejects `quantity`.
pub fn plan_consumption(
    layers: &[CostLayer],
    quantity: Decimal,
) -> Result<ConsumptionPlan, InventoryError> {
    check_quantity(quantity)?;

    let mut open: Vec<&CostLayer> = layers
        .iter()
        .filter(|l| l.quantity_remaining > Decimal::ZERO)
        .collect();
    open.sort_by(|a, b| fifo_order(a, b));

    let available = open.iter().map(|l| l.quantity_remaining).sum();
    let mut needed = quantity;
    let mut slices = Vec::new();

    for layer in open {
        if needed.is_zero() {
            break;
        }
        let take = layer.quantity_remaining.min(needed);
        slices.push(CostSlice {
            layer_id: Some(layer.id),
            quantity: take,
            unit_cost: layer.unit_cost,
        });
        needed -= take;
    }

    Ok(ConsumptionPlan {
        requested: quantity,
        available,
        slices,
        shortfall: needed,
    })
}

/// Unit cost for a shortfall under `policy`, or `None` if it is refused.
///
/// `LastKnownCost` falls back to zero when the item never had a layer.
#[must_use]
pub fn shortfall_unit_cost(
    policy: NegativeInventoryPolicy,
    last_known: Option<Decimal>,
) -> Option<Decimal> {
    match policy {
        NegativeInventoryPolicy::Disallow => None,
        NegativeInventoryPolicy::LastKnownCost => Some(last_known.unwrap_or(Decimal::ZERO)),
        NegativeInventoryPolicy::ZeroCost => Some(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::types::{MovementType, NewCostLayer};
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use tally_shared::types::{CostLayerId, ItemId, OrganizationId, WarehouseId};

    fn layer(sequence: i64, minutes: i64, quantity: Decimal, unit_cost: Decimal) -> CostLayer {
        NewCostLayer {
            id: CostLayerId::new(),
            organization_id: OrganizationId::new(),
            item_id: ItemId::new(),
            warehouse_id: WarehouseId::new(),
            quantity,
            unit_cost,
            movement_type: MovementType::Purchase,
            reference_id: None,
            created_at: Utc::now() + Duration::minutes(minutes),
        }
        .into_layer(sequence)
    }

    #[test]
    fn test_consumes_oldest_first() {
        let l1 = layer(1, 0, dec!(10), dec!(2));
        let l2 = layer(2, 1, dec!(10), dec!(3));

        let plan = plan_consumption(&[l2.clone(), l1.clone()], dec!(15)).unwrap();

        assert_eq!(plan.slices.len(), 2);
        assert_eq!(plan.slices[0].layer_id, Some(l1.id));
        assert_eq!(plan.slices[0].quantity, dec!(10));
        assert_eq!(plan.slices[1].layer_id, Some(l2.id));
        assert_eq!(plan.slices[1].quantity, dec!(5));
        assert_eq!(plan.total_cost(), dec!(35));
        assert_eq!(plan.average_unit_cost(), dec!(2.333333));
        assert_eq!(plan.shortfall, Decimal::ZERO);
    }

    #[test]
    fn test_sequence_breaks_timestamp_ties() {
        let mut l1 = layer(1, 0, dec!(5), dec!(1));
        let mut l2 = layer(2, 0, dec!(5), dec!(9));
        l2.created_at = l1.created_at;
        l1.sequence = 10;
        l2.sequence = 3;

        let plan = plan_consumption(&[l1.clone(), l2.clone()], dec!(5)).unwrap();
        assert_eq!(plan.slices, vec![CostSlice {
            layer_id: Some(l2.id),
            quantity: dec!(5),
            unit_cost: dec!(9),
        }]);
    }

    #[test]
    fn test_skips_exhausted_layers() {
        let mut empty = layer(1, 0, dec!(10), dec!(100));
        empty.quantity_remaining = Decimal::ZERO;
        let open = layer(2, 1, dec!(10), dec!(3));

        let plan = plan_consumption(&[empty, open.clone()], dec!(4)).unwrap();
        assert_eq!(plan.available, dec!(10));
        assert_eq!(plan.slices.len(), 1);
        assert_eq!(plan.slices[0].layer_id, Some(open.id));
        assert_eq!(plan.total_cost(), dec!(12));
    }

    #[test]
    fn test_reports_shortfall() {
        let plan = plan_consumption(
            &[layer(1, 0, dec!(10), dec!(2)), layer(2, 1, dec!(10), dec!(3))],
            dec!(25),
        )
        .unwrap();
        assert_eq!(plan.available, dec!(20));
        assert_eq!(plan.shortfall, dec!(5));
        assert_eq!(plan.covered(), dec!(20));
    }

    #[test]
    fn test_cover_shortfall_appends_unbacked_slice() {
        let mut plan = plan_consumption(&[layer(1, 0, dec!(2), dec!(4))], dec!(3)).unwrap();
        plan.cover_shortfall(dec!(4));
        assert_eq!(plan.slices.len(), 2);
        assert_eq!(plan.slices[1].layer_id, None);
        assert_eq!(plan.slices[1].quantity, dec!(1));
        assert_eq!(plan.total_cost(), dec!(12));
        assert_eq!(plan.average_unit_cost(), dec!(4));
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        assert!(matches!(
            plan_consumption(&[], Decimal::ZERO),
            Err(InventoryError::InvalidQuantity(_))
        ));
        assert!(matches!(
            plan_consumption(&[], dec!(-1)),
            Err(InventoryError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_quantity_scale_limit() {
        assert!(check_quantity(dec!(1.000001)).is_ok());
        assert!(check_quantity(dec!(2.5000000)).is_ok());
        assert!(matches!(
            check_quantity(dec!(1.0000004)),
            Err(InventoryError::InvalidQuantity(_))
        ));
        assert!(matches!(
            plan_consumption(&[], dec!(0.0000004)),
            Err(InventoryError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_shortfall_unit_cost() {
        type P = NegativeInventoryPolicy;
        assert_eq!(shortfall_unit_cost(P::Disallow, Some(dec!(3))), None);
        assert_eq!(shortfall_unit_cost(P::LastKnownCost, Some(dec!(3))), Some(dec!(3)));
        assert_eq!(shortfall_unit_cost(P::LastKnownCost, None), Some(Decimal::ZERO));
        assert_eq!(shortfall_unit_cost(P::ZeroCost, Some(dec!(3))), Some(Decimal::ZERO));
    }
}
