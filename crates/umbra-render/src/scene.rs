//! Scene model registry and per-frame draw lists

use std::fmt;
use std::path::Path;

use glam::{Mat4, Vec3};
use tracing::{info, warn};
use umbra_assets::AssetServer;
use umbra_core::{Color, Transform};

use crate::error::MeshError;
use crate::loader::process_obj;
use crate::mesh::{Mesh, Topology};
use crate::upload::{BufferHandle, MeshUploader};

/// Default length of debug normal lines, in normalized model units
pub const DEFAULT_NORMAL_LINE_LENGTH: f32 = 0.1;

/// Flat color used for debug normal lines
pub const NORMAL_LINE_COLOR: Color = Color::rgb(1.0, 1.0, 0.0);

/// Errors from adding a model to a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError<E: std::error::Error + 'static> {
    #[error("failed to prepare mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("backend upload failed: {0}")]
    Upload(#[source] E),
}

/// A generational handle to a model slot. Stale once the model is destroyed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle {
    index: u32,
    generation: u32,
}

impl ModelHandle {
    /// The slot index of this model.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of this handle (incremented when the slot is reused).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Model({}v{})", self.index, self.generation)
    }
}

/// Where and how a new model is shown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub transform: Transform,
    pub color: Color,
    pub render_normals: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            color: Color::WHITE,
            render_normals: false,
        }
    }
}

/// A mesh placed in the scene.
#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub visible: bool,
    pub render_normals: bool,
    pub transform: Transform,
    pub color: Color,
    mesh: Mesh,
}

impl Model {
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

/// Which pass a draw list is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Depth-only pass from the light; models only
    Shadow,
    /// Main pass: skybox, models, normal lines, shadow map preview
    Color,
}

/// One draw call for the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Owning model, `None` for built-in meshes
    pub model: Option<ModelHandle>,
    pub model_matrix: Mat4,
    pub color: [f32; 4],
    pub buffers: BufferHandle,
    pub topology: Topology,
    pub index_count: u32,
}

struct Slot {
    generation: u32,
    model: Option<Model>,
}

/// Owns every model on screen plus the built-in skybox and preview quad.
pub struct Scene {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    len: usize,
    normal_line_length: f32,
    skybox: Mesh,
    shadow_preview: Mesh,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_normal_line_length(DEFAULT_NORMAL_LINE_LENGTH)
    }

    pub fn with_normal_line_length(normal_line_length: f32) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            normal_line_length,
            skybox: Mesh::inward_cube(),
            shadow_preview: Mesh::screen_quad(),
        }
    }

    /// Upload the skybox cube and the shadow preview quad.
    pub fn upload_builtins<U: MeshUploader>(&mut self, uploader: &mut U) -> Result<(), U::Error> {
        self.skybox.materialize(uploader)?;
        self.shadow_preview.materialize(uploader)?;
        Ok(())
    }

    /// Add a processed mesh to the scene, uploading it and its normal lines.
    pub fn spawn<U: MeshUploader>(
        &mut self,
        name: impl Into<String>,
        mut mesh: Mesh,
        placement: Placement,
        uploader: &mut U,
    ) -> Result<ModelHandle, SceneError<U::Error>> {
        let uploaded = mesh
            .materialize(uploader)
            .and_then(|_| mesh.normal_lines(self.normal_line_length).materialize(uploader));

        if let Err(e) = uploaded {
            for buffers in mesh.release() {
                uploader.release(buffers);
            }
            return Err(SceneError::Upload(e));
        }

        let model = Model {
            name: name.into(),
            visible: true,
            render_normals: placement.render_normals,
            transform: placement.transform,
            color: placement.color,
            mesh,
        };
        let handle = self.insert(model);
        info!("Spawned model {:?}", handle);
        Ok(handle)
    }

    /// Load an OBJ through the asset cache, process it, and spawn it.
    pub fn load_model<U: MeshUploader>(
        &mut self,
        assets: &mut AssetServer,
        path: &Path,
        placement: Placement,
        uploader: &mut U,
    ) -> Result<ModelHandle, SceneError<U::Error>> {
        let obj = assets.load_obj_data(path).map_err(MeshError::from)?;
        let mesh = process_obj(obj)?;
        self.spawn(path.display().to_string(), mesh, placement, uploader)
    }

    fn insert(&mut self, model: Model) -> ModelHandle {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.model = Some(model);
            ModelHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                model: Some(model),
            });
            ModelHandle {
                index,
                generation: 0,
            }
        }
    }

    /// Remove a model and hand its buffers back to the backend.
    /// Returns `false` if the handle was stale.
    pub fn destroy<U: MeshUploader>(&mut self, handle: ModelHandle, uploader: &mut U) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
        else {
            return false;
        };
        let Some(mut model) = slot.model.take() else {
            return false;
        };

        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;

        for buffers in model.mesh.release() {
            uploader.release(buffers);
        }
        info!("Destroyed model {:?} ({})", handle, model.name);
        true
    }

    /// Destroy every model and release the built-in meshes.
    pub fn shutdown<U: MeshUploader>(&mut self, uploader: &mut U) {
        let handles: Vec<ModelHandle> = self.handles().collect();
        for handle in handles {
            self.destroy(handle, uploader);
        }
        for buffers in self.skybox.release().into_iter().chain(self.shadow_preview.release()) {
            uploader.release(buffers);
        }
    }

    pub fn get(&self, handle: ModelHandle) -> Option<&Model> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.model.as_ref())
    }

    pub fn get_mut(&mut self, handle: ModelHandle) -> Option<&mut Model> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.model.as_mut())
    }

    pub fn contains(&self, handle: ModelHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live models.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handles of all live models in slot order.
    pub fn handles(&self) -> impl Iterator<Item = ModelHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.model.as_ref().map(|_| ModelHandle {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    fn with_model(&mut self, handle: ModelHandle, f: impl FnOnce(&mut Model)) -> bool {
        match self.get_mut(handle) {
            Some(model) => {
                f(model);
                true
            }
            None => {
                warn!("Ignoring update for stale handle {:?}", handle);
                false
            }
        }
    }

    pub fn set_position(&mut self, handle: ModelHandle, position: Vec3) -> bool {
        self.with_model(handle, |m| m.transform.position = position)
    }

    pub fn offset_position(&mut self, handle: ModelHandle, offset: Vec3) -> bool {
        self.with_model(handle, |m| m.transform.translate(offset))
    }

    pub fn set_scale(&mut self, handle: ModelHandle, scale: Vec3) -> bool {
        self.with_model(handle, |m| m.transform.scale = scale)
    }

    /// Add `delta` to the current scale on each axis.
    pub fn offset_scale(&mut self, handle: ModelHandle, delta: Vec3) -> bool {
        self.with_model(handle, |m| m.transform.scale += delta)
    }

    pub fn set_yaw_degrees(&mut self, handle: ModelHandle, degrees: f32) -> bool {
        self.with_model(handle, |m| m.transform.set_yaw_degrees(degrees))
    }

    pub fn rotate_yaw_degrees(&mut self, handle: ModelHandle, degrees: f32) -> bool {
        self.with_model(handle, |m| m.transform.rotate_yaw_degrees(degrees))
    }

    pub fn set_color(&mut self, handle: ModelHandle, color: Color) -> bool {
        self.with_model(handle, |m| m.color = color)
    }

    pub fn set_visible(&mut self, handle: ModelHandle, visible: bool) -> bool {
        self.with_model(handle, |m| m.visible = visible)
    }

    pub fn set_render_normals(&mut self, handle: ModelHandle, render_normals: bool) -> bool {
        self.with_model(handle, |m| m.render_normals = render_normals)
    }

    /// Draw calls for one pass, in submission order. Meshes that have not
    /// been uploaded are skipped.
    pub fn draw_list(&self, pass: RenderPass) -> Vec<DrawItem> {
        let mut items = Vec::new();

        if pass == RenderPass::Color {
            items.extend(builtin_item(&self.skybox, Mat4::IDENTITY));
        }

        for handle in self.handles() {
            let Some(model) = self.get(handle).filter(|m| m.visible) else {
                continue;
            };
            let model_matrix = model.transform.matrix();

            if let Some(buffers) = model.mesh.buffers() {
                items.push(DrawItem {
                    model: Some(handle),
                    model_matrix,
                    color: model.color.to_array(),
                    buffers,
                    topology: model.mesh.topology(),
                    index_count: model.mesh.index_count() as u32,
                });
            }

            if pass == RenderPass::Color && model.render_normals {
                let lines = model.mesh.cached_normal_lines();
                if let Some((lines, buffers)) = lines.and_then(|l| l.buffers().map(|b| (l, b))) {
                    items.push(DrawItem {
                        model: Some(handle),
                        model_matrix,
                        color: NORMAL_LINE_COLOR.to_array(),
                        buffers,
                        topology: lines.topology(),
                        index_count: lines.index_count() as u32,
                    });
                }
            }
        }

        if pass == RenderPass::Color {
            // Small preview in the upper left quadrant of the screen.
            let preview = Mat4::from_scale_rotation_translation(
                Vec3::new(0.2, 0.2, 1.0),
                glam::Quat::IDENTITY,
                Vec3::new(-0.5, 0.5, 0.0),
            );
            items.extend(builtin_item(&self.shadow_preview, preview));
        }

        items
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_item(mesh: &Mesh, model_matrix: Mat4) -> Option<DrawItem> {
    mesh.buffers().map(|buffers| DrawItem {
        model: None,
        model_matrix,
        color: Color::WHITE.to_array(),
        buffers,
        topology: mesh.topology(),
        index_count: mesh.index_count() as u32,
    })
}
