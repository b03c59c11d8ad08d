use crate::shader::Backend;

/// Errors that can occur when building filter programs or checking their bindings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Neither a WGSL nor a GLSL program was supplied.
    #[error("filter has no program for any backend")]
    NoProgram,
    /// A stage of a program has no source text.
    #[error("{backend} program has an empty {stage} stage")]
    EmptySource { backend: Backend, stage: &'static str },
    /// A registered resource is not declared by the WGSL program.
    #[error("resource `{name}` is not declared at @group({group}) @binding({slot})")]
    MissingGpuBinding { name: String, group: u32, slot: u32 },
    /// A registered resource is not declared as a GLSL uniform.
    #[error("resource `{name}` is not declared as a uniform")]
    MissingGlUniform { name: String },
}
