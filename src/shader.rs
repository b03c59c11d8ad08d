//! Programs and resource bindings shared by every effect.
//!
//! A [`Shader`] holds up to two compiled-once programs, one per backend, plus the
//! list of resources the owner promises to bind. Linking the programs into GPU
//! pipelines is left to the renderer.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::FilterError;

pub mod bits;
pub mod local_uniform;
mod program;

pub use program::{
    clear_program_cache, GlProgram, GlProgramSource, GpuProgram, GpuProgramSource, StageSource,
};

/// The two shading backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Explicit bind groups, WGSL.
    Gpu,
    /// Implicit global uniforms, GLSL.
    Gl,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Gpu => f.write_str("wgsl"),
            Backend::Gl => f.write_str("glsl"),
        }
    }
}

/// A resource the shader expects at `@group(group) @binding(slot)`.
///
/// GLSL programs have no explicit slots and match by `name` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceBinding {
    pub name: Cow<'static, str>,
    pub group: u32,
    pub slot: u32,
}

/// Programs for each backend. Either may be missing.
#[derive(Debug, Clone, Default)]
pub struct Programs {
    pub gpu: Option<Arc<GpuProgram>>,
    pub gl: Option<Arc<GlProgram>>,
}

#[derive(Debug, Clone)]
pub struct Shader {
    programs: Programs,
    resources: SmallVec<[ResourceBinding; 4]>,
}

impl Shader {
    pub fn new(programs: Programs) -> Self {
        Self {
            programs,
            resources: SmallVec::new(),
        }
    }

    pub fn gpu_program(&self) -> Option<&Arc<GpuProgram>> {
        self.programs.gpu.as_ref()
    }

    pub fn gl_program(&self) -> Option<&Arc<GlProgram>> {
        self.programs.gl.as_ref()
    }

    pub fn supports(&self, backend: Backend) -> bool {
        match backend {
            Backend::Gpu => self.programs.gpu.is_some(),
            Backend::Gl => self.programs.gl.is_some(),
        }
    }

    /// Registers a resource. Order matters: slots are positional in the programs.
    pub fn add_resource(&mut self, name: impl Into<Cow<'static, str>>, group: u32, slot: u32) {
        self.resources.push(ResourceBinding {
            name: name.into(),
            group,
            slot,
        });
    }

    pub fn resources(&self) -> &[ResourceBinding] {
        &self.resources
    }

    /// Checks that every registered resource is declared by each present program.
    pub fn validate_bindings(&self) -> Result<(), FilterError> {
        if self.programs.gpu.is_none() && self.programs.gl.is_none() {
            return Err(FilterError::NoProgram);
        }

        for resource in &self.resources {
            if let Some(gpu) = &self.programs.gpu {
                if !gpu.declares(&resource.name, resource.group, resource.slot) {
                    return Err(FilterError::MissingGpuBinding {
                        name: resource.name.to_string(),
                        group: resource.group,
                        slot: resource.slot,
                    });
                }
            }

            if let Some(gl) = &self.programs.gl {
                if !gl.declares_uniform(&resource.name) {
                    return Err(FilterError::MissingGlUniform {
                        name: resource.name.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
