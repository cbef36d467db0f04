//! Entity factories and the spawn spacing rule
//!
//! Factories only build candidates. `World::try_spawn_*` commits them when
//! they keep the minimum gap to every live obstacle, item and fan.

use rand::Rng;

use super::collision::{Rect, spawn_gap_violated};
use super::state::{Cloud, Fan, Item, ItemKind, Obstacle, World};
use crate::consts::*;
use crate::theme::ThemeId;
use crate::tuning::Tuning;

/// Uniform sample in `[min, max)`; collapses to `min` on an empty range
pub fn rand_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        min
    } else {
        rng.random_range(min..max)
    }
}

/// Build a ground obstacle for the current speed and jump history
pub fn make_obstacle<R: Rng + ?Sized>(
    rng: &mut R,
    tuning: &Tuning,
    theme: ThemeId,
    speed: f32,
    recent_jump_height: f32,
) -> Obstacle {
    let kinds = theme.definition().obstacle_kinds;
    let kind = kinds[rng.random_range(0..kinds.len())];

    let scale = tuning.obstacle_scale(speed);
    let jump_bias = if tuning.jump_bias_height > 0.0 {
        1.0 + (recent_jump_height / tuning.jump_bias_height).clamp(0.0, 1.0) * tuning.jump_bias_max
    } else {
        1.0
    };

    let ((w_min, w_max), (h_min, h_max)) = kind.size_range();
    let w = (rand_range(rng, w_min, w_max) * scale).round();
    let h = (rand_range(rng, h_min, h_max) * scale * jump_bias).round();

    Obstacle {
        rect: Rect::new(WORLD_W + SPAWN_MARGIN, GROUND_Y - h, w, h),
        kind,
        hit: false,
    }
}

/// Build a collectible floating in the jumpable band above ground
pub fn make_item<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning) -> Item {
    let kind = ItemKind::ALL[rng.random_range(0..ItemKind::ALL.len())];
    let value = match kind {
        ItemKind::Coin => tuning.coin_value,
        ItemKind::Piglet => tuning.piglet_value,
        ItemKind::Bleon => 0.0,
    };
    let lift = rand_range(rng, 20.0, 110.0);
    Item {
        rect: Rect::new(
            WORLD_W + SPAWN_MARGIN,
            GROUND_Y - ITEM_SIZE - lift,
            ITEM_SIZE,
            ITEM_SIZE,
        ),
        kind,
        value,
    }
}

/// Build a fan platform sitting on the ground
pub fn make_fan() -> Fan {
    Fan {
        rect: Rect::new(WORLD_W + SPAWN_MARGIN, GROUND_Y - FAN_H, FAN_W, FAN_H),
        active: true,
    }
}

/// Build a cloud; `seed` scatters it over the whole sky for the initial population
pub fn make_cloud<R: Rng + ?Sized>(rng: &mut R, seed: bool) -> Cloud {
    let w = rand_range(rng, 60.0, 130.0);
    let h = rand_range(rng, 18.0, 34.0);
    let y = rand_range(rng, 24.0, (WORLD_H * 0.38).round());
    let x = if seed {
        rand_range(rng, 0.0, WORLD_W)
    } else {
        WORLD_W + rand_range(rng, 40.0, 180.0)
    };
    let speed = rand_range(rng, 14.0, 36.0);
    Cloud {
        rect: Rect::new(x, y, w, h),
        speed,
    }
}

/// Whether `candidate` keeps the spawn gap to every live obstacle, item and fan
pub fn is_clear(candidate: &Rect, world: &World) -> bool {
    let (gx, gy) = (world.tuning.spawn_gap_x, world.tuning.spawn_gap_y);
    let blocked = world
        .obstacles
        .iter()
        .map(|o| &o.rect)
        .chain(world.items.iter().map(|i| &i.rect))
        .chain(world.fans.iter().map(|f| &f.rect))
        .any(|r| spawn_gap_violated(candidate, r, gx, gy));
    !blocked
}

impl World {
    /// Obstacle cadence: interval, spacing from the newest obstacle, cooldown gate
    pub(crate) fn try_spawn_obstacle(&mut self, dt: f32) {
        self.spawn_timer += dt;
        if self.obstacle_cooldown > 0.0 || self.spawn_timer < self.spawn_every {
            return;
        }
        let min_gap = self.tuning.obstacle_gap(self.speed);
        let far_enough = self
            .obstacles
            .last()
            .is_none_or(|last| WORLD_W - last.rect.x > min_gap);
        if !far_enough {
            return;
        }

        let obstacle = make_obstacle(
            &mut self.rng,
            &self.tuning,
            self.theme,
            self.speed,
            self.recent_jump_height,
        );
        // Rejected candidates retry next tick with a fresh roll
        if is_clear(&obstacle.rect, self) {
            self.spawn_timer = 0.0;
            self.obstacles.push(obstacle);
        }
    }

    pub(crate) fn try_spawn_item(&mut self, dt: f32) {
        self.item_timer += dt;
        if self.item_timer < self.tuning.item_every {
            return;
        }
        self.item_timer = 0.0;
        if self.rng.random::<f32>() >= self.tuning.item_chance {
            return;
        }
        let item = make_item(&mut self.rng, &self.tuning);
        if is_clear(&item.rect, self) {
            self.items.push(item);
        }
    }

    pub(crate) fn try_spawn_fan(&mut self, dt: f32) {
        self.fan_timer += dt;
        if self.fan_timer < self.tuning.fan_every {
            return;
        }
        self.fan_timer = 0.0;
        if self.rng.random::<f32>() >= self.tuning.fan_chance {
            return;
        }
        let fan = make_fan();
        if is_clear(&fan.rect, self) {
            self.fans.push(fan);
        }
    }

    pub(crate) fn try_spawn_cloud(&mut self, dt: f32) {
        if self.clouds.len() < self.tuning.cloud_cap
            && self.rng.random::<f32>() < dt * self.tuning.cloud_rate
        {
            let cloud = make_cloud(&mut self.rng, false);
            self.clouds.push(cloud);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_obstacle_sits_on_ground() {
        let mut rng = Pcg32::seed_from_u64(3);
        let tuning = Tuning::default();
        for theme in ThemeId::ALL {
            for _ in 0..50 {
                let o = make_obstacle(&mut rng, &tuning, theme, 330.0, 0.0);
                assert_eq!(o.rect.bottom(), GROUND_Y);
                assert_eq!(o.rect.x, WORLD_W + SPAWN_MARGIN);
                assert!(theme.definition().obstacle_kinds.contains(&o.kind));
                assert!(!o.hit);
                assert!(o.rect.h >= 30.0 && o.rect.h <= 66.0);
            }
        }
    }

    #[test]
    fn test_obstacles_grow_with_speed_and_jumps() {
        let tuning = Tuning::default();
        let mut slow = Pcg32::seed_from_u64(11);
        let mut fast = Pcg32::seed_from_u64(11);
        let mut high = Pcg32::seed_from_u64(11);
        let a = make_obstacle(&mut slow, &tuning, ThemeId::Farm, 330.0, 0.0);
        let b = make_obstacle(&mut fast, &tuning, ThemeId::Farm, 2000.0, 0.0);
        let c = make_obstacle(&mut high, &tuning, ThemeId::Farm, 330.0, 500.0);
        assert_eq!(a.kind, b.kind);
        assert!(b.rect.h > a.rect.h);
        assert!(b.rect.w > a.rect.w);
        assert!(c.rect.h >= a.rect.h);
        assert_eq!(c.rect.w, a.rect.w);
    }

    #[test]
    fn test_item_values() {
        let mut rng = Pcg32::seed_from_u64(5);
        let tuning = Tuning::default();
        for _ in 0..100 {
            let item = make_item(&mut rng, &tuning);
            match item.kind {
                ItemKind::Coin => assert_eq!(item.value, tuning.coin_value),
                ItemKind::Piglet => assert_eq!(item.value, tuning.piglet_value),
                ItemKind::Bleon => assert_eq!(item.value, 0.0),
            }
            assert!(item.rect.bottom() <= GROUND_Y - 20.0);
            assert!(item.rect.bottom() >= GROUND_Y - 110.0);
        }
    }

    #[test]
    fn test_fan_is_on_ground_and_active() {
        let fan = make_fan();
        assert!(fan.active);
        assert_eq!(fan.rect.bottom(), GROUND_Y);
    }

    #[test]
    fn test_seeded_clouds_scatter() {
        let mut rng = Pcg32::seed_from_u64(9);
        let seeded = make_cloud(&mut rng, true);
        assert!(seeded.rect.x < WORLD_W);
        let fresh = make_cloud(&mut rng, false);
        assert!(fresh.rect.x >= WORLD_W + 40.0);
    }

    #[test]
    fn test_is_clear_checks_all_collections() {
        let mut world = World::new(1, Tuning::default());
        let candidate = Rect::new(WORLD_W + SPAWN_MARGIN, GROUND_Y - 40.0, 30.0, 40.0);
        assert!(is_clear(&candidate, &world));

        let mut fan = make_fan();
        fan.rect.x = WORLD_W - 40.0;
        world.fans.push(fan);
        assert!(!is_clear(&candidate, &world));

        world.fans.clear();
        world.items.push(Item {
            rect: Rect::new(WORLD_W - 20.0, GROUND_Y - 60.0, ITEM_SIZE, ITEM_SIZE),
            kind: ItemKind::Coin,
            value: 5.0,
        });
        assert!(!is_clear(&candidate, &world));

        world.items.clear();
        world.obstacles.push(Obstacle {
            rect: Rect::new(WORLD_W - 40.0, GROUND_Y - 30.0, 30.0, 30.0),
            kind: crate::theme::ObstacleKind::Fence,
            hit: false,
        });
        assert!(!is_clear(&candidate, &world));

        // Far enough behind on the x axis
        world.obstacles[0].rect.x = WORLD_W - 200.0;
        assert!(is_clear(&candidate, &world));
    }

    #[test]
    fn test_cooldown_blocks_obstacles() {
        let mut world = World::new(1, Tuning::default());
        world.reset(1);
        world.obstacle_cooldown = 1.0;
        world.try_spawn_obstacle(5.0);
        assert!(world.obstacles.is_empty());
        world.obstacle_cooldown = 0.0;
        world.try_spawn_obstacle(0.0);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.spawn_timer, 0.0);
    }

    #[test]
    fn test_rejected_spawn_keeps_timer() {
        let mut world = World::new(1, Tuning::default());
        world.reset(1);
        let mut fan = make_fan();
        fan.rect.x = WORLD_W - 10.0;
        world.fans.push(fan);
        world.try_spawn_obstacle(2.0);
        assert!(world.obstacles.is_empty());
        assert!(world.spawn_timer >= world.spawn_every);
    }
}
