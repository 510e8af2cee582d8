use serde::Serialize;

use crate::config::PreparednessConfig;
use crate::households::repo::InventoryTotals;

/// Who consumes from the household's stock: registered members plus the
/// declared unregistered occupants.
#[derive(Debug, Clone, Copy)]
pub struct Occupancy {
    pub registered_members: i64,
    pub extra_adults: i32,
    pub extra_children: i32,
    pub extra_pets: i32,
}

/// Derived food/water self-sufficiency estimate, in days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreparednessStatus {
    pub days_of_food: f64,
    pub days_of_water: f64,
}

/// Adult-equivalent consumer count. Children and pets consume less than
/// adults; the weights come from configuration.
fn effective_members(occupancy: &Occupancy, cfg: &PreparednessConfig) -> f64 {
    occupancy.registered_members as f64
        + occupancy.extra_adults as f64
        + occupancy.extra_children as f64 * cfg.child_weight
        + occupancy.extra_pets as f64 * cfg.pet_weight
}

/// Zero effective members yields `{0, 0}` rather than a division error.
pub fn compute_status(
    totals: &InventoryTotals,
    occupancy: &Occupancy,
    cfg: &PreparednessConfig,
) -> PreparednessStatus {
    let members = effective_members(occupancy, cfg);
    if members <= 0.0 {
        return PreparednessStatus {
            days_of_food: 0.0,
            days_of_water: 0.0,
        };
    }
    PreparednessStatus {
        days_of_food: totals.food_kcal / (cfg.kcal_per_adult_day * members),
        days_of_water: totals.water_litres / (cfg.water_litres_per_adult_day * members),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PreparednessConfig {
        PreparednessConfig {
            kcal_per_adult_day: 2000.0,
            water_litres_per_adult_day: 3.0,
            child_weight: 0.6,
            pet_weight: 0.2,
        }
    }

    fn occupancy(members: i64) -> Occupancy {
        Occupancy {
            registered_members: members,
            extra_adults: 0,
            extra_children: 0,
            extra_pets: 0,
        }
    }

    #[test]
    fn zero_members_returns_zero_days() {
        let totals = InventoryTotals {
            food_kcal: 10_000.0,
            water_litres: 30.0,
        };
        let status = compute_status(&totals, &occupancy(0), &cfg());
        assert_eq!(status.days_of_food, 0.0);
        assert_eq!(status.days_of_water, 0.0);
    }

    #[test]
    fn single_adult_consumes_the_daily_requirement() {
        let totals = InventoryTotals {
            food_kcal: 6000.0,
            water_litres: 9.0,
        };
        let status = compute_status(&totals, &occupancy(1), &cfg());
        assert_eq!(status.days_of_food, 3.0);
        assert_eq!(status.days_of_water, 3.0);
    }

    #[test]
    fn more_members_means_fewer_days() {
        let totals = InventoryTotals {
            food_kcal: 12_000.0,
            water_litres: 18.0,
        };
        let status = compute_status(&totals, &occupancy(2), &cfg());
        assert_eq!(status.days_of_food, 3.0);
        assert_eq!(status.days_of_water, 3.0);
    }

    #[test]
    fn children_and_pets_are_weighted() {
        // 1 adult + 1 child (0.6) + 2 pets (0.2 each) = 2.0 adult-equivalents
        let occ = Occupancy {
            registered_members: 1,
            extra_adults: 0,
            extra_children: 1,
            extra_pets: 2,
        };
        let totals = InventoryTotals {
            food_kcal: 8000.0,
            water_litres: 12.0,
        };
        let status = compute_status(&totals, &occ, &cfg());
        assert_eq!(status.days_of_food, 2.0);
        assert_eq!(status.days_of_water, 2.0);
    }

    #[test]
    fn empty_inventory_with_members_is_zero_days() {
        let status = compute_status(&InventoryTotals::default(), &occupancy(3), &cfg());
        assert_eq!(status.days_of_food, 0.0);
        assert_eq!(status.days_of_water, 0.0);
    }
}
