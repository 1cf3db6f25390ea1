//! Coin clusters and fuel cans
//!
//! Two independent streams keyed by world x. Coins arrive in clusters at
//! seeded random spacing well ahead of the vehicle; fuel cans only appear
//! when the tank runs low and no can is already waiting up the road.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::terrain::TerrainProfile;
use crate::tuning::{CoinTuning, FuelCanTuning};

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    FuelCan,
}

/// A coin or fuel can placed above the ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub pos: Vec2,
    pub collected: bool,
}

impl Collectible {
    /// True if `center` lies within `reach` of this item
    #[inline]
    pub fn within_reach(&self, center: Vec2, reach: f32) -> bool {
        self.pos.distance_squared(center) <= reach * reach
    }
}

/// Ids picked up during one collection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pickups {
    pub coins: Vec<u32>,
    pub fuel_cans: Vec<u32>,
}

/// Mark every uncollected item within reach of `center` as collected
///
/// Already-collected items are skipped, so repeated passes never report
/// the same item twice.
pub fn collect_within(items: &mut [Collectible], center: Vec2, reach: f32) -> Vec<u32> {
    items
        .iter_mut()
        .filter(|item| !item.collected && item.within_reach(center, reach))
        .map(|item| {
            item.collected = true;
            item.id
        })
        .collect()
}

/// Owns every live collectible and the seeded spacing stream
pub struct CollectibleSpawner {
    coins: Vec<Collectible>,
    fuel_cans: Vec<Collectible>,
    /// Start of the next coin cluster
    next_coin_x: f32,
    rng: Pcg32,
    next_id: u32,
}

impl CollectibleSpawner {
    pub fn new(seed: u64, start_x: f32) -> Self {
        Self {
            coins: Vec::new(),
            fuel_cans: Vec::new(),
            next_coin_x: start_x,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place `count` coins `gap` apart starting at `start_x`
    pub fn spawn_cluster(
        &mut self,
        start_x: f32,
        count: u32,
        profile: &TerrainProfile,
        tuning: &CoinTuning,
    ) {
        for i in 0..count {
            let x = start_x + i as f32 * tuning.gap;
            let id = self.next_entity_id();
            self.coins.push(Collectible {
                id,
                kind: CollectibleKind::Coin,
                pos: Vec2::new(x, profile.height(x) - tuning.vertical_offset),
                collected: false,
            });
        }
    }

    /// Spawn the next cluster once the vehicle is within `lookahead_margin`
    /// of it
    ///
    /// Returns the number of coins spawned (zero if the threshold was not
    /// crossed).
    pub fn spawn_coins(
        &mut self,
        vehicle_x: f32,
        profile: &TerrainProfile,
        tuning: &CoinTuning,
    ) -> u32 {
        if vehicle_x <= self.next_coin_x - tuning.lookahead_margin {
            return 0;
        }

        self.next_coin_x += self
            .rng
            .random_range(tuning.spacing_min..=tuning.spacing_max);
        let count = self
            .rng
            .random_range(tuning.cluster_min..=tuning.cluster_max);
        self.spawn_cluster(self.next_coin_x, count, profile, tuning);

        log::debug!("Spawned {} coins at x={:.0}", count, self.next_coin_x);
        count
    }

    /// Distance to the nearest uncollected fuel can ahead of the vehicle
    pub fn nearest_fuel_ahead(&self, vehicle_x: f32) -> Option<f32> {
        self.fuel_cans
            .iter()
            .filter(|can| !can.collected && can.pos.x > vehicle_x)
            .map(|can| can.pos.x - vehicle_x)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Drop a fuel can ahead when the tank is low and none is close
    ///
    /// Returns the new can's id.
    pub fn spawn_fuel(
        &mut self,
        vehicle_x: f32,
        fuel: f32,
        low_threshold: f32,
        profile: &TerrainProfile,
        tuning: &FuelCanTuning,
    ) -> Option<u32> {
        if fuel >= low_threshold {
            return None;
        }
        if self
            .nearest_fuel_ahead(vehicle_x)
            .is_some_and(|distance| distance <= tuning.min_gas_distance)
        {
            return None;
        }

        let x = vehicle_x + tuning.smart_spawn_distance;
        let id = self.next_entity_id();
        self.fuel_cans.push(Collectible {
            id,
            kind: CollectibleKind::FuelCan,
            pos: Vec2::new(x, profile.height(x) - tuning.vertical_offset),
            collected: false,
        });
        log::debug!("Spawned fuel can {} at x={:.0} (fuel {:.1})", id, x, fuel);
        Some(id)
    }

    /// Collect everything the vehicle body overlaps
    ///
    /// Reach is the item radius plus `reach_fraction` of the vehicle width.
    pub fn collect(
        &mut self,
        center: Vec2,
        vehicle_width: f32,
        reach_fraction: f32,
        coins: &CoinTuning,
        fuel_cans: &FuelCanTuning,
    ) -> Pickups {
        let body_reach = vehicle_width * reach_fraction;
        Pickups {
            coins: collect_within(&mut self.coins, center, coins.item_radius + body_reach),
            fuel_cans: collect_within(
                &mut self.fuel_cans,
                center,
                fuel_cans.item_radius + body_reach,
            ),
        }
    }

    /// Remove items more than `buffer_behind` behind the vehicle
    pub fn prune(&mut self, vehicle_x: f32, buffer_behind: f32) -> usize {
        let threshold = vehicle_x - buffer_behind;
        let before = self.coins.len() + self.fuel_cans.len();
        self.coins.retain(|c| c.pos.x >= threshold);
        self.fuel_cans.retain(|c| c.pos.x >= threshold);
        before - self.coins.len() - self.fuel_cans.len()
    }

    pub fn coins(&self) -> &[Collectible] {
        &self.coins
    }

    pub fn fuel_cans(&self) -> &[Collectible] {
        &self.fuel_cans
    }

    pub fn next_coin_x(&self) -> f32 {
        self.next_coin_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VEHICLE_WIDTH: f32 = 120.0;
    const REACH_FRACTION: f32 = 0.5;

    #[test]
    fn test_coins_wait_for_lookahead() {
        let profile = TerrainProfile::default();
        let tuning = CoinTuning::default();
        let mut spawner = CollectibleSpawner::new(7, 200.0);

        // Vehicle far behind the first cluster: nothing yet
        assert_eq!(spawner.spawn_coins(200.0 - 4000.0, &profile, &tuning), 0);
        assert!(spawner.coins().is_empty());

        let count = spawner.spawn_coins(200.0, &profile, &tuning);
        assert!((2..=6).contains(&count));
        let advanced = spawner.next_coin_x() - 200.0;
        assert!((600.0..=1400.0).contains(&advanced), "advanced {advanced}");
    }

    #[test]
    fn test_cluster_layout() {
        let profile = TerrainProfile::default();
        let tuning = CoinTuning::default();
        let mut spawner = CollectibleSpawner::new(42, 0.0);
        spawner.spawn_cluster(800.0, 4, &profile, &tuning);

        let coins = spawner.coins();
        assert_eq!(coins.len(), 4);
        for (i, coin) in coins.iter().enumerate() {
            let x = 800.0 + i as f32 * 45.0;
            assert_eq!(coin.pos.x, x);
            assert_eq!(coin.pos.y, profile.height(x) - 60.0);
            assert!(!coin.collected);
            assert_eq!(coin.kind, CollectibleKind::Coin);
        }
        let ids: Vec<u32> = coins.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_same_seed_same_coins() {
        let profile = TerrainProfile::default();
        let tuning = CoinTuning::default();
        let mut a = CollectibleSpawner::new(99, 200.0);
        let mut b = CollectibleSpawner::new(99, 200.0);

        for step in 0..200 {
            let x = 200.0 + step as f32 * 40.0;
            a.spawn_coins(x, &profile, &tuning);
            b.spawn_coins(x, &profile, &tuning);
        }
        assert!(!a.coins().is_empty());
        assert_eq!(a.coins(), b.coins());
    }

    #[test]
    fn test_cluster_sizes_stay_in_range() {
        let profile = TerrainProfile::default();
        let tuning = CoinTuning::default();
        let mut spawner = CollectibleSpawner::new(3, 0.0);
        for step in 0..500 {
            let count = spawner.spawn_coins(step as f32 * 100.0, &profile, &tuning);
            assert!(count == 0 || (2..=6).contains(&count));
        }
    }

    #[test]
    fn test_driving_over_cluster_collects_each_coin_once() {
        let profile = TerrainProfile::default();
        let coins = CoinTuning::default();
        let cans = FuelCanTuning::default();
        let mut spawner = CollectibleSpawner::new(1, 0.0);
        spawner.spawn_cluster(800.0, 3, &profile, &coins);

        let mut score = 0;
        let mut x = 800.0;
        while x <= 900.0 {
            let center = Vec2::new(x, profile.height(x));
            let pickups = spawner.collect(center, VEHICLE_WIDTH, REACH_FRACTION, &coins, &cans);
            score += pickups.coins.len();
            x += 5.0;
        }

        assert_eq!(score, 3);
        assert!(spawner.coins().iter().all(|c| c.collected));
    }

    #[test]
    fn test_collected_items_never_count_twice() {
        let mut items = vec![Collectible {
            id: 5,
            kind: CollectibleKind::Coin,
            pos: Vec2::new(10.0, 10.0),
            collected: false,
        }];

        assert_eq!(collect_within(&mut items, Vec2::new(10.0, 10.0), 5.0), vec![5]);
        for _ in 0..10 {
            assert!(collect_within(&mut items, Vec2::new(10.0, 10.0), 5.0).is_empty());
        }
        assert!(items[0].collected);
    }

    #[test]
    fn test_out_of_reach_is_not_collected() {
        let mut items = vec![Collectible {
            id: 1,
            kind: CollectibleKind::FuelCan,
            pos: Vec2::new(0.0, 0.0),
            collected: false,
        }];
        assert!(collect_within(&mut items, Vec2::new(30.0, 40.0), 49.9).is_empty());
        assert_eq!(collect_within(&mut items, Vec2::new(30.0, 40.0), 50.0), vec![1]);
    }

    #[test]
    fn test_smart_fuel_spawn() {
        let profile = TerrainProfile::default();
        let tuning = FuelCanTuning::default();
        let mut spawner = CollectibleSpawner::new(1, 0.0);

        // Plenty of fuel: no can
        assert_eq!(spawner.spawn_fuel(500.0, 80.0, 35.0, &profile, &tuning), None);

        // Low fuel: one can at smart_spawn_distance ahead
        let id = spawner
            .spawn_fuel(500.0, 20.0, 35.0, &profile, &tuning)
            .expect("can spawned");
        let can = spawner.fuel_cans()[0];
        assert_eq!(can.id, id);
        assert_eq!(can.pos.x, 1700.0);
        assert_eq!(can.pos.y, profile.height(1700.0) - 60.0);

        // The waiting can suppresses another spawn
        assert_eq!(spawner.spawn_fuel(600.0, 19.0, 35.0, &profile, &tuning), None);
        assert_eq!(spawner.nearest_fuel_ahead(600.0), Some(1100.0));

        // Once the vehicle is past it, a new one appears
        assert!(spawner.spawn_fuel(1800.0, 15.0, 35.0, &profile, &tuning).is_some());
        assert_eq!(spawner.fuel_cans().len(), 2);
    }

    #[test]
    fn test_collected_can_does_not_block_spawn() {
        let profile = TerrainProfile::default();
        let coins = CoinTuning::default();
        let tuning = FuelCanTuning::default();
        let mut spawner = CollectibleSpawner::new(1, 0.0);
        spawner.spawn_fuel(0.0, 10.0, 35.0, &profile, &tuning);

        let can = spawner.fuel_cans()[0];
        let pickups = spawner.collect(can.pos, VEHICLE_WIDTH, REACH_FRACTION, &coins, &tuning);
        assert_eq!(pickups.fuel_cans, vec![can.id]);
        assert!(pickups.coins.is_empty());

        assert!(spawner.spawn_fuel(0.0, 10.0, 35.0, &profile, &tuning).is_some());
    }

    #[test]
    fn test_prune_drops_items_behind() {
        let profile = TerrainProfile::default();
        let coins = CoinTuning::default();
        let cans = FuelCanTuning::default();
        let mut spawner = CollectibleSpawner::new(1, 0.0);
        spawner.spawn_cluster(100.0, 3, &profile, &coins);
        spawner.spawn_fuel(0.0, 10.0, 35.0, &profile, &cans);

        // Threshold 1000 - 600 = 400: coins (100..190) go, can at 1200 stays
        assert_eq!(spawner.prune(1000.0, 600.0), 3);
        assert!(spawner.coins().is_empty());
        assert_eq!(spawner.fuel_cans().len(), 1);
    }
}
