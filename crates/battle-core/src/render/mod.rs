//! Rendering seam between the simulation and a graphics backend.
//!
//! The core never talks to a GPU. Units and bullets describe themselves
//! through a [`RenderContext`], which forwards to an external [`Renderer`]
//! and caches model handles in a [`ModelRegistry`] owned by the render host.
//! Each model key is registered with the backend exactly once, however many
//! instances draw it and however many frames are rendered.
//!
//! [`DrawRecorder`] is a [`Renderer`] that records calls instead of drawing,
//! for headless runs and tests.
//!
//! # Example
//!
//! ```
//! use battle_core::render::{meshes, DrawCommand, DrawRecorder, ModelRegistry, RenderContext};
//! use glam::{Vec2, Vec4};
//!
//! let mut recorder = DrawRecorder::new();
//! let mut models = ModelRegistry::new();
//!
//! for _ in 0..3 {
//!     let mut ctx = RenderContext::new(&mut recorder, &mut models, Vec2::ZERO, 0.0, Vec4::ONE);
//!     let body = ctx.model("tank.body", meshes::tank_body);
//!     ctx.draw_model(body);
//! }
//!
//! assert_eq!(recorder.registered_models(), 1);
//! assert_eq!(recorder.count(|c| matches!(c, DrawCommand::DrawModel(_))), 3);
//! ```

pub mod meshes;

use std::collections::BTreeMap;
use std::fmt;

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

// =============================================================================
// Handles & Geometry
// =============================================================================

/// Backend-assigned handle of a registered model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelHandle(u32);

impl ModelHandle {
    /// Creates a handle from a raw backend index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw backend index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Built-in texture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(u32);

impl TextureId {
    /// Plain white; the model's vertex colours show through.
    pub const PURE_WHITE: Self = Self(0);
    /// Soft-edged disc used for round projectiles.
    pub const CIRCLE: Self = Self(1);

    /// Creates a texture id from a raw backend slot.
    #[must_use]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Returns the raw backend slot.
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.0
    }
}

/// A single model vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectVertex {
    /// Position in the model's local frame.
    pub position: Vec2,
    /// Texture coordinate.
    pub tex_coord: Vec2,
    /// Vertex colour, multiplied with the draw colour.
    pub color: Vec4,
}

impl ObjectVertex {
    /// Creates a vertex.
    #[must_use]
    pub const fn new(position: Vec2, tex_coord: Vec2, color: Vec4) -> Self {
        Self {
            position,
            tex_coord,
            color,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex buffer.
    pub vertices: Vec<ObjectVertex>,
    /// Triangle indices into `vertices`.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Drawing backend.
///
/// Transformation state is sticky: it applies to every following
/// [`draw_model`](Renderer::draw_model) until changed.
pub trait Renderer {
    /// Uploads a mesh and returns its handle.
    fn register_model(&mut self, mesh: &Mesh) -> ModelHandle;

    /// Sets the model transform.
    fn set_transformation(&mut self, position: Vec2, rotation: f32, scale: Vec2);

    /// Replaces only the rotation of the current transform.
    fn set_rotation(&mut self, rotation: f32);

    /// Selects the texture for following draws.
    fn set_texture(&mut self, texture: TextureId);

    /// Sets the tint colour for following draws.
    fn set_color(&mut self, color: Vec4);

    /// Draws a registered model with the current state.
    fn draw_model(&mut self, model: ModelHandle);
}

// =============================================================================
// Model Registry
// =============================================================================

/// Cache of model handles keyed by a static name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    handles: BTreeMap<&'static str, ModelHandle>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `key`, building and registering the mesh on
    /// first use.
    pub fn get_or_register<F>(
        &mut self,
        renderer: &mut dyn Renderer,
        key: &'static str,
        build: F,
    ) -> ModelHandle
    where
        F: FnOnce() -> Mesh,
    {
        *self
            .handles
            .entry(key)
            .or_insert_with(|| renderer.register_model(&build()))
    }

    /// Returns the handle for `key` if it was registered.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ModelHandle> {
        self.handles.get(key).copied()
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

// =============================================================================
// Render Context
// =============================================================================

/// Everything an entity needs to draw itself for one frame.
pub struct RenderContext<'a> {
    renderer: &'a mut dyn Renderer,
    models: &'a mut ModelRegistry,
    /// World position of the entity being drawn.
    pub position: Vec2,
    /// Rotation of the entity being drawn.
    pub rotation: f32,
    /// Owner's tint colour.
    pub color: Vec4,
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("models", &self.models)
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl<'a> RenderContext<'a> {
    /// Creates a context for one entity.
    pub fn new(
        renderer: &'a mut dyn Renderer,
        models: &'a mut ModelRegistry,
        position: Vec2,
        rotation: f32,
        color: Vec4,
    ) -> Self {
        Self {
            renderer,
            models,
            position,
            rotation,
            color,
        }
    }

    /// Looks up or registers the model stored under `key`.
    pub fn model<F>(&mut self, key: &'static str, build: F) -> ModelHandle
    where
        F: FnOnce() -> Mesh,
    {
        self.models.get_or_register(&mut *self.renderer, key, build)
    }

    /// See [`Renderer::set_transformation`].
    pub fn set_transformation(&mut self, position: Vec2, rotation: f32, scale: Vec2) {
        self.renderer.set_transformation(position, rotation, scale);
    }

    /// See [`Renderer::set_rotation`].
    pub fn set_rotation(&mut self, rotation: f32) {
        self.renderer.set_rotation(rotation);
    }

    /// See [`Renderer::set_texture`].
    pub fn set_texture(&mut self, texture: TextureId) {
        self.renderer.set_texture(texture);
    }

    /// See [`Renderer::set_color`].
    pub fn set_color(&mut self, color: Vec4) {
        self.renderer.set_color(color);
    }

    /// See [`Renderer::draw_model`].
    pub fn draw_model(&mut self, model: ModelHandle) {
        self.renderer.draw_model(model);
    }
}

// =============================================================================
// Draw Recorder
// =============================================================================

/// A recorded [`Renderer`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// A mesh was registered and assigned `handle`.
    RegisterModel {
        /// Handle returned to the caller.
        handle: ModelHandle,
        /// Vertex count of the mesh.
        vertices: usize,
        /// Index count of the mesh.
        indices: usize,
    },
    /// Transform set.
    SetTransformation {
        /// Position.
        position: Vec2,
        /// Rotation.
        rotation: f32,
        /// Scale.
        scale: Vec2,
    },
    /// Rotation replaced.
    SetRotation(f32),
    /// Texture selected.
    SetTexture(TextureId),
    /// Tint set.
    SetColor(Vec4),
    /// Model drawn.
    DrawModel(ModelHandle),
}

/// Headless [`Renderer`] that records every call.
#[derive(Debug, Clone, Default)]
pub struct DrawRecorder {
    meshes: Vec<Mesh>,
    commands: Vec<DrawCommand>,
}

impl DrawRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls in order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count<P>(&self, predicate: P) -> usize
    where
        P: Fn(&DrawCommand) -> bool,
    {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    /// Number of meshes registered so far.
    #[must_use]
    pub fn registered_models(&self) -> usize {
        self.meshes.len()
    }

    /// Returns the mesh behind `handle`.
    #[must_use]
    pub fn mesh(&self, handle: ModelHandle) -> Option<&Mesh> {
        self.meshes.get(handle.index() as usize)
    }

    /// Forgets recorded calls but keeps registered meshes.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for DrawRecorder {
    fn register_model(&mut self, mesh: &Mesh) -> ModelHandle {
        #[allow(clippy::cast_possible_truncation)]
        let handle = ModelHandle::new(self.meshes.len() as u32);
        self.meshes.push(mesh.clone());
        self.commands.push(DrawCommand::RegisterModel {
            handle,
            vertices: mesh.vertices.len(),
            indices: mesh.indices.len(),
        });
        handle
    }

    fn set_transformation(&mut self, position: Vec2, rotation: f32, scale: Vec2) {
        self.commands.push(DrawCommand::SetTransformation {
            position,
            rotation,
            scale,
        });
    }

    fn set_rotation(&mut self, rotation: f32) {
        self.commands.push(DrawCommand::SetRotation(rotation));
    }

    fn set_texture(&mut self, texture: TextureId) {
        self.commands.push(DrawCommand::SetTexture(texture));
    }

    fn set_color(&mut self, color: Vec4) {
        self.commands.push(DrawCommand::SetColor(color));
    }

    fn draw_model(&mut self, model: ModelHandle) {
        self.commands.push(DrawCommand::DrawModel(model));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod registry_tests {
        use super::*;

        #[test]
        fn registers_each_key_once() {
            let mut recorder = DrawRecorder::new();
            let mut models = ModelRegistry::new();
            let mut builds = 0;

            let first = models.get_or_register(&mut recorder, "a", || {
                builds += 1;
                meshes::bullet_quad()
            });
            let second = models.get_or_register(&mut recorder, "a", || {
                builds += 1;
                meshes::bullet_quad()
            });

            assert_eq!(first, second);
            assert_eq!(builds, 1);
            assert_eq!(recorder.registered_models(), 1);
            assert_eq!(models.len(), 1);
        }

        #[test]
        fn distinct_keys_get_distinct_handles() {
            let mut recorder = DrawRecorder::new();
            let mut models = ModelRegistry::new();

            let body = models.get_or_register(&mut recorder, "body", meshes::tank_body);
            let turret = models.get_or_register(&mut recorder, "turret", meshes::tank_turret);

            assert_ne!(body, turret);
            assert_eq!(models.get("body"), Some(body));
            assert_eq!(models.get("missing"), None);
            assert_eq!(recorder.mesh(turret), Some(&meshes::tank_turret()));
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn forwards_state_calls() {
            let mut recorder = DrawRecorder::new();
            let mut models = ModelRegistry::new();
            {
                let mut ctx = RenderContext::new(
                    &mut recorder,
                    &mut models,
                    Vec2::new(1.0, 2.0),
                    0.5,
                    Vec4::ONE,
                );
                ctx.set_transformation(ctx.position, ctx.rotation, Vec2::ONE);
                ctx.set_texture(TextureId::PURE_WHITE);
                ctx.set_color(ctx.color);
                ctx.set_rotation(1.5);
            }

            assert_eq!(
                recorder.commands(),
                &[
                    DrawCommand::SetTransformation {
                        position: Vec2::new(1.0, 2.0),
                        rotation: 0.5,
                        scale: Vec2::ONE,
                    },
                    DrawCommand::SetTexture(TextureId::PURE_WHITE),
                    DrawCommand::SetColor(Vec4::ONE),
                    DrawCommand::SetRotation(1.5),
                ]
            );
        }

        #[test]
        fn clear_commands_keeps_meshes() {
            let mut recorder = DrawRecorder::new();
            let mut models = ModelRegistry::new();
            let handle = models.get_or_register(&mut recorder, "quad", meshes::bullet_quad);
            recorder.draw_model(handle);

            recorder.clear_commands();
            assert!(recorder.commands().is_empty());
            assert_eq!(recorder.registered_models(), 1);
        }
    }
}
