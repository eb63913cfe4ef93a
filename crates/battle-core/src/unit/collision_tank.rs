//! Ramming tank.
//!
//! The collision tank has no gun. It damages enemies by driving into them:
//! when its fire countdown has run out and its position lies inside an enemy
//! unit, it deals `ram_damage_per_speed · |v|` to that unit and takes
//! `ram_recoil_per_speed · |v|` itself, where `v` is its speed at the start
//! of the tick.
//!
//! A contact episode against one opposing player pulses at most once. An
//! episode opened at zero speed deals nothing and still counts. The
//! per-player flag in `already_hit` is cleared every tick in which the tank
//! no longer touches any of that player's units, before new hits are tested,
//! so separating and re-entering can hit again.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{UnitBehavior, UnitContext};
use crate::config::{CollisionTankConfig, GameConfig};
use crate::entity::{Body, PlayerId};
use crate::event::EventSink;
use crate::geometry;
use crate::player::{InputData, Keys};
use crate::render::{meshes, RenderContext, TextureId};
use crate::world_view::WorldView;

/// Private state of a collision tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionTank {
    config: CollisionTankConfig,
    /// Signed speed along the body's forward axis.
    speed: f32,
    turret_rotation: f32,
    friction_acceleration: f32,
    /// Ticks left before a new ram pulse may start.
    fire_count_down: u32,
    pulse_ticks: u32,
    already_hit: BTreeMap<PlayerId, bool>,
}

impl CollisionTank {
    /// Creates a stationary tank with a ready ram.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let tank = config.collision_tank;
        Self {
            config: tank,
            speed: 0.0,
            turret_rotation: 0.0,
            friction_acceleration: tank.friction,
            fire_count_down: 0,
            pulse_ticks: config.ticks_for(tank.pulse_interval),
            already_hit: BTreeMap::new(),
        }
    }

    /// Signed forward speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Overrides the forward speed, for scenario setup.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Turret rotation in radians.
    #[must_use]
    pub const fn turret_rotation(&self) -> f32 {
        self.turret_rotation
    }

    /// Friction deceleration chosen on the last update.
    #[must_use]
    pub const fn friction_acceleration(&self) -> f32 {
        self.friction_acceleration
    }

    /// Ticks left before a new ram pulse may start.
    #[must_use]
    pub const fn fire_count_down(&self) -> u32 {
        self.fire_count_down
    }

    /// Contact flag for `player`, if that player has been seen.
    #[must_use]
    pub fn already_hit(&self, player: PlayerId) -> Option<bool> {
        self.already_hit.get(&player).copied()
    }

    fn drive(
        &mut self,
        ctx: &UnitContext<'_>,
        view: &WorldView<'_>,
        input: &InputData,
        events: &mut EventSink,
    ) {
        let dt = view.seconds_per_tick();
        let scale = self.speed_scale();
        let cfg = self.config;

        if input.is_down(Keys::FORWARD) {
            if self.speed < cfg.speed_cap {
                self.speed += dt * cfg.acceleration;
            } else {
                self.speed += dt * cfg.power / self.speed;
            }
        }
        if input.is_down(Keys::BACKWARD) {
            if self.speed > -cfg.speed_cap {
                self.speed -= dt * cfg.acceleration;
            } else {
                self.speed += dt * cfg.power / self.speed;
            }
        }

        let body = ctx.body;
        let offset = geometry::heading(body.rotation) * (self.speed * scale * dt);
        let target = body.position + offset;
        if view.is_blocked_by_obstacles(target) {
            self.speed /= cfg.obstacle_damping;
        } else {
            events.push_move_unit(ctx.id, target);
        }

        let mut turn = 0.0;
        if input.is_down(Keys::TURN_LEFT) {
            turn += 1.0;
        }
        if input.is_down(Keys::TURN_RIGHT) {
            turn -= 1.0;
        }
        let rotation = body.rotation + turn * dt * cfg.rotate_angular_speed * scale;
        events.push_rotate_unit(ctx.id, rotation);

        self.friction_acceleration = if input.is_down(Keys::BRAKE) {
            cfg.brake_friction
        } else {
            cfg.friction
        };
        self.apply_friction(dt);
    }

    fn apply_friction(&mut self, dt: f32) {
        let decay = dt * self.friction_acceleration;
        self.speed = if self.speed < 0.0 {
            (self.speed + decay).min(0.0)
        } else {
            (self.speed - decay).max(0.0)
        };
    }

    fn aim_turret(&mut self, body: &Body, input: &InputData) {
        self.turret_rotation =
            geometry::aim_angle(body.position, input.mouse_cursor_position, body.rotation);
    }

    /// Clears contact flags for players none of whose units still overlap
    /// this tank, and forgets players with no units left.
    fn clear_separated_contacts(&mut self, position: Vec2, view: &WorldView<'_>) {
        self.already_hit.retain(|&player, hit| {
            let mut units = view.units_of_player(player).peekable();
            if units.peek().is_none() {
                return false;
            }
            *hit = *hit && units.any(|unit| unit.is_hit(position));
            true
        });
    }

    fn ram(
        &mut self,
        ctx: &UnitContext<'_>,
        view: &WorldView<'_>,
        impact_speed: f32,
        events: &mut EventSink,
    ) {
        if self.fire_count_down > 0 {
            self.fire_count_down -= 1;
            return;
        }

        let damage = self.config.ram_damage_per_speed * impact_speed.abs();
        let recoil = self.config.ram_recoil_per_speed * impact_speed.abs();

        let position = ctx.body.position;
        let mut pulsed = false;
        for (other_id, other) in view.get_units() {
            if other_id == ctx.id || other.player_id() == ctx.player_id {
                continue;
            }
            if !other.is_hit(position) {
                continue;
            }
            let hit = self.already_hit.entry(other.player_id()).or_insert(false);
            if *hit {
                continue;
            }
            // A stationary contact still opens the episode, it just deals nothing.
            if damage > 0.0 {
                trace!(unit = %ctx.id, target = %other_id, damage, recoil, "ram pulse");
                events.push_deal_damage(other_id, ctx.id, damage);
                events.push_deal_damage(ctx.id, other_id, recoil);
            }
            *hit = true;
            pulsed = true;
        }

        if pulsed {
            self.fire_count_down = self.pulse_ticks;
        }
    }
}

impl UnitBehavior for CollisionTank {
    fn update(&mut self, ctx: &UnitContext<'_>, view: &WorldView<'_>, events: &mut EventSink) {
        let impact_speed = self.speed;

        if let Some(player) = view.get_player(ctx.player_id) {
            let input = *player.input_data();
            self.drive(ctx, view, &input, events);
            self.aim_turret(ctx.body, &input);
        }

        self.clear_separated_contacts(ctx.body.position, view);
        self.ram(ctx, view, impact_speed, events);
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        let body = ctx.model("tank.body", meshes::tank_body);
        let turret = ctx.model("tank.turret", meshes::tank_turret);

        ctx.set_transformation(ctx.position, ctx.rotation, Vec2::ONE);
        ctx.set_texture(TextureId::PURE_WHITE);
        ctx.set_color(ctx.color);
        ctx.draw_model(body);
        ctx.set_rotation(self.turret_rotation);
        ctx.draw_model(turret);
    }

    fn is_hit(&self, body: &Body, point: Vec2) -> bool {
        body.world_to_local(point).length() < self.config.hit_radius
    }

    fn unit_name(&self) -> &'static str {
        "Collision Tank"
    }

    fn author(&self) -> &'static str {
        "Ljy and ZKX"
    }

    fn max_health(&self) -> f32 {
        self.config.max_health
    }
}
