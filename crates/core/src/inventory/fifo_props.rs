//! Property-based tests for FIFO consumption planning.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{CostLayerId, ItemId, OrganizationId, WarehouseId};

use super::fifo::{fifo_order, plan_consumption};
use super::types::{CostLayer, MovementType, NewCostLayer};

/// Strategy to generate a positive quantity with up to two decimals.
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Strategy to generate a non-negative unit cost.
fn unit_cost() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate 0-8 layers with colliding timestamps.
fn layers() -> impl Strategy<Value = Vec<CostLayer>> {
    prop::collection::vec((quantity(), unit_cost(), 0i64..4), 0..8).prop_map(|specs| {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        specs
            .into_iter()
            .zip(1i64..)
            .map(|((qty, cost, minute), sequence)| {
                NewCostLayer {
                    id: CostLayerId::new(),
                    organization_id: OrganizationId::new(),
                    item_id: ItemId::new(),
                    warehouse_id: WarehouseId::new(),
                    quantity: qty,
                    unit_cost: cost,
                    movement_type: MovementType::Purchase,
                    reference_id: None,
                    created_at: base + Duration::minutes(minute),
                }
                .into_layer(sequence)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Covered quantity plus shortfall always equals the request.
    #[test]
    fn prop_quantity_is_conserved(layers in layers(), requested in quantity()) {
        let plan = plan_consumption(&layers, requested).unwrap();
        prop_assert_eq!(plan.covered() + plan.shortfall, requested);
        prop_assert!(plan.shortfall >= Decimal::ZERO);
        if plan.available >= requested {
            prop_assert_eq!(plan.shortfall, Decimal::ZERO);
        }
    }

    /// No slice takes more than its layer holds, and every slice is positive.
    #[test]
    fn prop_slices_stay_within_layers(layers in layers(), requested in quantity()) {
        let plan = plan_consumption(&layers, requested).unwrap();
        for slice in &plan.slices {
            let layer = layers.iter().find(|l| Some(l.id) == slice.layer_id).unwrap();
            prop_assert!(slice.quantity > Decimal::ZERO);
            prop_assert!(slice.quantity <= layer.quantity_remaining);
            prop_assert_eq!(slice.unit_cost, layer.unit_cost);
        }
    }

    /// Slices follow FIFO order and only the last one may be partial.
    #[test]
    fn prop_oldest_layers_consumed_first(layers in layers(), requested in quantity()) {
        let plan = plan_consumption(&layers, requested).unwrap();
        let consumed: Vec<&CostLayer> = plan
            .slices
            .iter()
            .map(|s| layers.iter().find(|l| Some(l.id) == s.layer_id).unwrap())
            .collect();

        for pair in consumed.windows(2) {
            prop_assert!(fifo_order(pair[0], pair[1]).is_lt());
        }
        for (slice, layer) in plan.slices.iter().zip(&consumed).rev().skip(1) {
            prop_assert_eq!(slice.quantity, layer.quantity_remaining);
        }

        // Any layer left untouched is not older than the last consumed one.
        if let Some(last) = consumed.last() {
            for layer in &layers {
                if !consumed.iter().any(|c| c.id == layer.id) {
                    prop_assert!(fifo_order(last, layer).is_lt());
                }
            }
        }
    }

    /// Total cost never exceeds the value on hand when fully covered.
    #[test]
    fn prop_cost_bounded_by_stock_value(layers in layers(), requested in quantity()) {
        let plan = plan_consumption(&layers, requested).unwrap();
        let on_hand: Decimal = layers.iter().map(CostLayer::remaining_value).sum();
        prop_assert!(plan.total_cost() <= on_hand);
        prop_assert!(plan.total_cost() >= Decimal::ZERO);
    }
}
