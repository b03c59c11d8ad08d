//! Per-draw-call records handed to a sprite batcher.
//!
//! A [`BatchDescriptor`] only holds handles: the renderable, its texture and the
//! batcher/batch it was enqueued into all live in pools owned elsewhere. Blend
//! mode and color are read through from the renderable on demand.

use std::borrow::Cow;

use crate::blend_mode::BlendMode;
use crate::id::{BatchId, BatcherId, RenderableId, TextureId};

/// Primitive topology a batcher draws the descriptor's geometry with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

impl From<Topology> for wgpu::PrimitiveTopology {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::PointList => wgpu::PrimitiveTopology::PointList,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Axis-aligned bounds in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Group-level state of renderables, provided by the scene graph.
pub trait GroupStateSource {
    /// Blend mode inherited through the renderable's group.
    fn group_blend_mode(&self, renderable: RenderableId) -> Option<BlendMode>;

    /// Color and alpha inherited through the group, packed as `0xAABBGGRR`.
    fn group_color_alpha(&self, renderable: RenderableId) -> Option<u32>;
}

/// Batching metadata for one drawable.
///
/// Shape configuration (`batcher_name` through `round_pixels`) stays put across
/// [`reset`](Self::reset); the references are cleared so the descriptor can be
/// pooled and reused next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchDescriptor {
    pub batcher_name: Cow<'static, str>,
    pub topology: Topology,
    /// Vertices per element.
    pub attribute_size: u32,
    /// Indices per element.
    pub index_size: u32,
    pub pack_as_quad: bool,
    pub round_pixels: bool,

    pub renderable: Option<RenderableId>,
    pub texture: Option<TextureId>,
    pub bounds: Option<Bounds>,
    pub(crate) batcher: Option<BatcherId>,
    pub(crate) batch: Option<BatchId>,
}

impl Default for BatchDescriptor {
    fn default() -> Self {
        Self {
            batcher_name: Cow::Borrowed("default"),
            topology: Topology::TriangleList,
            attribute_size: 4,
            index_size: 6,
            pack_as_quad: true,
            round_pixels: false,
            renderable: None,
            texture: None,
            bounds: None,
            batcher: None,
            batch: None,
        }
    }
}

impl BatchDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for a textured quad belonging to `renderable`.
    pub fn for_quad(renderable: RenderableId, texture: TextureId, bounds: Bounds) -> Self {
        Self {
            renderable: Some(renderable),
            texture: Some(texture),
            bounds: Some(bounds),
            ..Self::default()
        }
    }

    pub fn batcher(&self) -> Option<BatcherId> {
        self.batcher
    }

    pub fn batch(&self) -> Option<BatchId> {
        self.batch
    }

    /// Called by the batcher when the descriptor is enqueued.
    pub fn assign(&mut self, batcher: BatcherId, batch: BatchId) {
        self.batcher = Some(batcher);
        self.batch = Some(batch);
    }

    /// Blend mode of the renderable's group, `None` without a renderable.
    pub fn blend_mode(&self, source: &impl GroupStateSource) -> Option<BlendMode> {
        self.renderable
            .and_then(|renderable| source.group_blend_mode(renderable))
    }

    /// Packed group color of the renderable, `None` without a renderable.
    pub fn color(&self, source: &impl GroupStateSource) -> Option<u32> {
        self.renderable
            .and_then(|renderable| source.group_color_alpha(renderable))
    }

    /// Drops every reference. Configuration fields are left untouched.
    pub fn reset(&mut self) {
        self.renderable = None;
        self.texture = None;
        self.batcher = None;
        self.batch = None;
        self.bounds = None;
    }

    /// Hook for descriptors that own disposable resources. Nothing to release here.
    pub fn destroy(&mut self) {}
}

/// Recycles descriptors between frames.
pub struct BatchDescriptorPool {
    available: Vec<BatchDescriptor>,
}

impl Default for BatchDescriptorPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchDescriptorPool {
    pub fn new() -> Self {
        Self {
            available: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// Takes a descriptor out of the pool, allocating one when the pool is empty.
    pub fn acquire(&mut self) -> BatchDescriptor {
        if let Some(descriptor) = self.available.pop() {
            descriptor
        } else {
            tracing::trace!("Batch descriptor pool empty, allocating a new descriptor");
            BatchDescriptor::new()
        }
    }

    /// Returns a descriptor for reuse. Its references are cleared first.
    pub fn release(&mut self, mut descriptor: BatchDescriptor) {
        descriptor.reset();
        self.available.push(descriptor);
    }
}
