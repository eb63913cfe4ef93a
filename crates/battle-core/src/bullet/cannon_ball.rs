use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{BulletBehavior, BulletContext};
use crate::config::CannonBallConfig;
use crate::event::EventSink;
use crate::render::{meshes, RenderContext, TextureId};
use crate::world_view::WorldView;

const DRAW_SCALE: Vec2 = Vec2::splat(0.1);

/// Shell that flies in a straight line.
///
/// Each tick it computes its next position. Hitting terrain removes it.
/// Entering a unit owned by another player damages that unit (the first one
/// in id order) and removes the shell. Otherwise it moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannonBall {
    damage: f32,
}

impl CannonBall {
    /// Creates a shell with the configured base damage.
    #[must_use]
    pub fn new(config: &CannonBallConfig) -> Self {
        Self {
            damage: config.damage,
        }
    }

    /// Base damage before the shooter's scale.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }
}

impl BulletBehavior for CannonBall {
    fn update(&mut self, ctx: &BulletContext<'_>, view: &WorldView<'_>, events: &mut EventSink) {
        let body = ctx.body;
        let next = body.position + body.velocity * view.seconds_per_tick();

        if view.is_blocked_by_obstacles(next) {
            events.push_remove_bullet(ctx.id);
            return;
        }

        let victim = view
            .get_units()
            .find(|(_, unit)| unit.player_id() != body.player && unit.is_hit(next));
        if let Some((target, _)) = victim {
            let amount = self.damage * body.damage_scale;
            trace!(bullet = %ctx.id, %target, amount, "cannon ball hit");
            events.push_deal_damage(target, body.shooter, amount);
            events.push_remove_bullet(ctx.id);
            return;
        }

        events.push_move_bullet(ctx.id, next);
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        let quad = ctx.model("bullet.quad", meshes::bullet_quad);
        ctx.set_transformation(ctx.position, ctx.rotation, DRAW_SCALE);
        ctx.set_texture(TextureId::CIRCLE);
        ctx.set_color(ctx.color);
        ctx.draw_model(quad);
    }

    fn bullet_name(&self) -> &'static str {
        "Cannon Ball"
    }
}
