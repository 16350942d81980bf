//! Local fleet for running the client without a server.

use std::f32::consts::TAU;

use superstellar_engine::coords::Vec2;

use crate::entity::{ClientId, Projectile, Spaceship};
use crate::state::GameState;

const FLEET_SIZE: u32 = 8;
const PLAYER: ClientId = 1;
const FIRE_INTERVAL: f32 = 0.6;
const PROJECTILE_SPEED: f32 = 600.0;
const PROJECTILE_TTL: f32 = 1.5;
const SHOT_COST: u32 = 10;
const ENERGY_PER_SECOND: f32 = 40.0;

/// Drives ships and projectiles the way the message layer would.
#[derive(Debug, Clone, Default)]
pub struct Demo {
    fire_timer: f32,
    energy_carry: f32,
    next_projectile: u32,
}

impl Demo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the player ship near the origin and a ring of drifting ships around it.
    pub fn seed(&mut self, state: &mut GameState) {
        state.upsert_spaceship(
            Spaceship::new(PLAYER, Vec2::new(0.0, 0.0))
                .with_velocity(Vec2::new(120.0, 40.0))
                .with_facing(40f32.atan2(120.0))
                .with_thrust(true),
        );

        for i in 1..FLEET_SIZE {
            let angle = TAU * i as f32 / (FLEET_SIZE - 1) as f32;
            let heading = angle + TAU / 4.0;
            let radius = 300.0 + 60.0 * i as f32;
            let speed = 40.0 + 15.0 * i as f32;
            state.upsert_spaceship(
                Spaceship::new(PLAYER + i, Vec2::from_angle(angle) * radius)
                    .with_velocity(Vec2::from_angle(heading) * speed)
                    .with_facing(heading)
                    .with_thrust(i % 2 == 0),
            );
        }

        state.set_client_id(PLAYER);
        log::info!("demo fleet of {FLEET_SIZE} ships seeded");
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, state: &mut GameState, dt: f32) {
        for ship in state.spaceships_mut() {
            ship.advance(dt);
        }
        for projectile in state.projectiles_mut() {
            projectile.advance(dt);
        }
        state.remove_expired_projectiles();

        self.energy_carry += ENERGY_PER_SECOND * dt;
        let regen = self.energy_carry.floor();
        self.energy_carry -= regen;
        for ship in state.spaceships_mut() {
            ship.energy = (ship.energy + regen as u32).min(ship.max_energy);
        }

        self.fire_timer += dt;
        if self.fire_timer < FIRE_INTERVAL {
            return;
        }
        self.fire_timer -= FIRE_INTERVAL;

        let mut shots = Vec::new();
        for ship in state.spaceships_mut() {
            if ship.energy < SHOT_COST {
                continue;
            }
            ship.energy -= SHOT_COST;

            let dir = Vec2::from_angle(ship.facing);
            self.next_projectile = self.next_projectile.wrapping_add(1);
            shots.push(
                Projectile::new(
                    self.next_projectile,
                    ship.position + dir * 30.0,
                    ship.velocity + dir * PROJECTILE_SPEED,
                    PROJECTILE_TTL,
                )
                .with_owner(ship.id),
            );
        }
        for shot in shots {
            state.add_projectile(shot);
        }
    }
}
