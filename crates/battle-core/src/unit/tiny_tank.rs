use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{UnitBehavior, UnitContext};
use crate::bullet::BulletTag;
use crate::config::{GameConfig, TinyTankConfig};
use crate::entity::Body;
use crate::event::EventSink;
use crate::geometry;
use crate::player::Keys;
use crate::render::{meshes, RenderContext, TextureId};
use crate::world_view::WorldView;

/// Basic cannon tank.
///
/// Drives at a fixed speed while a drive key is held and fires a
/// [`CannonBall`](crate::bullet::CannonBall) along the turret axis on the
/// fire button, at most once per `fire_interval`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TinyTank {
    config: TinyTankConfig,
    turret_rotation: f32,
    fire_count_down: u32,
    fire_ticks: u32,
}

impl TinyTank {
    /// Creates a tank ready to fire.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            config: config.tiny_tank,
            turret_rotation: 0.0,
            fire_count_down: 0,
            fire_ticks: config.ticks_for(config.tiny_tank.fire_interval),
        }
    }

    /// Turret rotation in radians.
    #[must_use]
    pub const fn turret_rotation(&self) -> f32 {
        self.turret_rotation
    }

    /// Ticks left before the next shot.
    #[must_use]
    pub const fn fire_count_down(&self) -> u32 {
        self.fire_count_down
    }
}

impl UnitBehavior for TinyTank {
    fn update(&mut self, ctx: &UnitContext<'_>, view: &WorldView<'_>, events: &mut EventSink) {
        // The cooldown runs even while the owner is disconnected.
        let ready = self.fire_count_down == 0;
        if !ready {
            self.fire_count_down -= 1;
        }

        let Some(player) = view.get_player(ctx.player_id) else {
            return;
        };
        let input = player.input_data();
        let body = ctx.body;
        let dt = view.seconds_per_tick();
        let scale = self.speed_scale();

        let mut step = 0.0;
        if input.is_down(Keys::FORWARD) {
            step += 1.0;
        }
        if input.is_down(Keys::BACKWARD) {
            step -= 1.0;
        }
        let target =
            body.local_to_world(Vec2::new(0.0, step * self.config.move_speed * scale * dt));
        if !view.is_blocked_by_obstacles(target) {
            events.push_move_unit(ctx.id, target);
        }

        let mut turn = 0.0;
        if input.is_down(Keys::TURN_LEFT) {
            turn += 1.0;
        }
        if input.is_down(Keys::TURN_RIGHT) {
            turn -= 1.0;
        }
        let rotation = body.rotation + turn * dt * self.config.rotate_angular_speed * scale;
        events.push_rotate_unit(ctx.id, rotation);

        self.turret_rotation =
            geometry::aim_angle(body.position, input.mouse_cursor_position, body.rotation);

        if ready && input.is_down(Keys::FIRE) {
            let direction = geometry::heading(self.turret_rotation);
            events.push_generate_bullet(
                BulletTag::CannonBall,
                ctx.id,
                ctx.player_id,
                body.position + direction * self.config.muzzle_offset,
                self.turret_rotation,
                self.damage_scale(),
                direction * self.config.bullet_speed,
            );
            self.fire_count_down = self.fire_ticks;
        }
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
        let p = body.world_to_local(point);
        p.x > -0.8 && p.x < 0.8 && p.y > -1.0 && p.y < 1.0 && p.x + p.y < 1.6 && p.y - p.x < 1.6
    }

    fn unit_name(&self) -> &'static str {
        "Tiny Tank"
    }

    fn author(&self) -> &'static str {
        "LR"
    }

    fn max_health(&self) -> f32 {
        self.config.max_health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{PlayerId, UnitId};
    use crate::event::{Event, EventOrigin};
    use crate::tests::helpers::World;
    use crate::unit::UnitTag;

    fn update(world: &mut World, id: UnitId) -> Vec<Event> {
        let snapshot = world.clone();
        let view = snapshot.view();
        let mut sink = EventSink::new(EventOrigin::Unit(id), 0);
        world.arena.unit_mut(id).unwrap().update(&view, 0, &mut sink);
        sink.into_events().into_iter().map(|q| q.event).collect()
    }

    fn fire_count_down(world: &World, id: UnitId) -> u32 {
        world
            .arena
            .unit(id)
            .and_then(|u| u.inner().as_tiny_tank())
            .map(TinyTank::fire_count_down)
            .unwrap()
    }

    #[test]
    fn drives_forward_at_fixed_speed() {
        let mut world = World::new();
        let player = world.add_player();
        let id = world.spawn(UnitTag::TinyTank, player, Vec2::ZERO, 0.0);
        world.press(player, Keys::FORWARD);

        let events = update(&mut world, id);
        match events[0] {
            Event::MoveUnit { position, .. } => {
                assert!((position - Vec2::new(0.0, 3.0 / 60.0)).length() < 1e-5);
            }
            ref other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn blocked_move_is_dropped() {
        let mut world = World::new();
        let player = world.add_player();
        let id = world.spawn(UnitTag::TinyTank, player, Vec2::new(0.0, 9.99), 0.0);
        world.press(player, Keys::FORWARD);

        let events = update(&mut world, id);
        assert!(!events.iter().any(|e| matches!(e, Event::MoveUnit { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::RotateUnit { .. })));
    }

    #[test]
    fn fires_along_turret_with_cooldown() {
        let mut world = World::new();
        let player = world.add_player();
        let id = world.spawn(UnitTag::TinyTank, player, Vec2::ZERO, 0.0);
        world.press(player, Keys::FIRE);
        world.aim(player, Vec2::new(5.0, 0.0));

        let events = update(&mut world, id);
        let shot = events
            .iter()
            .find_map(|e| match *e {
                Event::GenerateBullet {
                    kind,
                    unit,
                    player: owner,
                    position,
                    velocity,
                    damage_scale,
                    ..
                } => Some((kind, unit, owner, position, velocity, damage_scale)),
                _ => None,
            })
            .unwrap();

        assert_eq!(shot.0, BulletTag::CannonBall);
        assert_eq!(shot.1, id);
        assert_eq!(shot.2, player);
        assert!((shot.3 - Vec2::new(1.2, 0.0)).length() < 1e-5);
        assert!((shot.4 - Vec2::new(20.0, 0.0)).length() < 1e-4);
        assert_eq!(shot.5, 1.0);
        assert_eq!(fire_count_down(&world, id), 60);

        let again = update(&mut world, id);
        assert!(!again
            .iter()
            .any(|e| matches!(e, Event::GenerateBullet { .. })));
        assert_eq!(fire_count_down(&world, id), 59);
    }

    #[test]
    fn no_player_no_events() {
        let mut world = World::new();
        let id = world.spawn(UnitTag::TinyTank, PlayerId::new(5), Vec2::ZERO, 0.0);
        assert!(update(&mut world, id).is_empty());
    }

    #[test]
    fn cooldown_runs_without_player() {
        let mut world = World::new();
        let player = world.add_player();
        let id = world.spawn(UnitTag::TinyTank, player, Vec2::ZERO, 0.0);
        world.press(player, Keys::FIRE);
        update(&mut world, id);
        assert_eq!(fire_count_down(&world, id), 60);

        let owner = world.players.remove(&player).unwrap();
        for _ in 0..10 {
            assert!(update(&mut world, id).is_empty());
        }
        assert_eq!(fire_count_down(&world, id), 50);

        world.players.insert(player, owner);
        for _ in 0..50 {
            let events = update(&mut world, id);
            assert!(!events
                .iter()
                .any(|e| matches!(e, Event::GenerateBullet { .. })));
        }
        assert_eq!(fire_count_down(&world, id), 0);
        let events = update(&mut world, id);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::GenerateBullet { .. })));
    }

    #[test]
    fn hull_hit_test() {
        let tank = TinyTank::new(&GameConfig::default());
        let body = Body::new(Vec2::ZERO, 0.0, 100.0);
        assert!(tank.is_hit(&body, Vec2::new(0.0, 0.9)));
        assert!(tank.is_hit(&body, Vec2::new(-0.7, -0.9)));
        assert!(!tank.is_hit(&body, Vec2::new(0.75, 0.95)));
        assert!(!tank.is_hit(&body, Vec2::new(0.9, 0.0)));
        assert_eq!(tank.unit_name(), "Tiny Tank");
    }
}
