use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use ahash::{HashMap, HashMapExt};
use regex::Regex;
use smallvec::SmallVec;

use super::Backend;
use crate::error::FilterError;

/// One stage of a WGSL program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageSource {
    pub source: Cow<'static, str>,
    pub entry_point: Cow<'static, str>,
}

impl StageSource {
    pub fn new(
        source: impl Into<Cow<'static, str>>,
        entry_point: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            source: source.into(),
            entry_point: entry_point.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GpuProgramSource {
    pub vertex: StageSource,
    pub fragment: StageSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlProgramSource {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

/// A `@group(g) @binding(b) var name` declaration found in WGSL source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeclaredBinding {
    group: u32,
    binding: u32,
    name: String,
}

/// A WGSL program with the bindings it declares.
#[derive(Debug)]
pub struct GpuProgram {
    source: GpuProgramSource,
    key: u64,
    bindings: SmallVec<[DeclaredBinding; 8]>,
}

impl GpuProgram {
    /// Builds a program, reusing a cached one when the same source was seen before.
    pub fn from_source(source: GpuProgramSource) -> Result<Arc<Self>, FilterError> {
        for (stage, text) in [
            ("vertex", &source.vertex.source),
            ("fragment", &source.fragment.source),
        ] {
            if text.trim().is_empty() {
                return Err(FilterError::EmptySource {
                    backend: Backend::Gpu,
                    stage,
                });
            }
        }

        let key = source_key(&source);
        Ok(cached(gpu_cache(), key, source, GpuProgram::source, |source| {
            GpuProgram::build(source, key)
        }))
    }

    fn build(source: GpuProgramSource, key: u64) -> Self {
        let mut bindings = SmallVec::new();
        for text in [&source.vertex.source, &source.fragment.source] {
            for binding in parse_wgsl_bindings(text) {
                if !bindings.contains(&binding) {
                    bindings.push(binding);
                }
            }
        }

        GpuProgram {
            source,
            key,
            bindings,
        }
    }

    /// Drops the cached program for `key`. Returns whether one was cached.
    ///
    /// Filters still holding the program keep it alive; the next
    /// [`from_source`](Self::from_source) with the same source builds a new one.
    pub fn unload(key: u64) -> bool {
        unload(gpu_cache(), key)
    }

    pub fn source(&self) -> &GpuProgramSource {
        &self.source
    }

    /// Hash of the stage sources and entry points.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Whether `name` is declared at `@group(group) @binding(slot)`.
    pub fn declares(&self, name: &str, group: u32, slot: u32) -> bool {
        self.bindings
            .iter()
            .any(|b| b.group == group && b.binding == slot && b.name == name)
    }

    /// `(group, binding)` pairs declared by either stage.
    pub fn declared_slots(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.bindings.iter().map(|b| (b.group, b.binding))
    }
}

/// A GLSL program with the uniforms it declares.
#[derive(Debug)]
pub struct GlProgram {
    source: GlProgramSource,
    key: u64,
    uniforms: SmallVec<[String; 8]>,
}

impl GlProgram {
    /// Builds a program, reusing a cached one when the same source was seen before.
    pub fn from_source(source: GlProgramSource) -> Result<Arc<Self>, FilterError> {
        for (stage, text) in [("vertex", &source.vertex), ("fragment", &source.fragment)] {
            if text.trim().is_empty() {
                return Err(FilterError::EmptySource {
                    backend: Backend::Gl,
                    stage,
                });
            }
        }

        let key = source_key(&source);
        Ok(cached(gl_cache(), key, source, GlProgram::source, |source| {
            GlProgram::build(source, key)
        }))
    }

    fn build(source: GlProgramSource, key: u64) -> Self {
        let mut uniforms = SmallVec::new();
        for text in [&source.vertex, &source.fragment] {
            for name in parse_glsl_uniforms(text) {
                if !uniforms.contains(&name) {
                    uniforms.push(name);
                }
            }
        }

        GlProgram {
            source,
            key,
            uniforms,
        }
    }

    /// Drops the cached program for `key`. Returns whether one was cached.
    pub fn unload(key: u64) -> bool {
        unload(gl_cache(), key)
    }

    pub fn source(&self) -> &GlProgramSource {
        &self.source
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn declares_uniform(&self, name: &str) -> bool {
        self.uniforms.iter().any(|uniform| uniform == name)
    }

    pub fn uniforms(&self) -> impl Iterator<Item = &str> + '_ {
        self.uniforms.iter().map(String::as_str)
    }
}

type ProgramCache<T> = OnceLock<Mutex<HashMap<u64, Arc<T>>>>;

static GPU_PROGRAMS: ProgramCache<GpuProgram> = OnceLock::new();
static GL_PROGRAMS: ProgramCache<GlProgram> = OnceLock::new();

fn gpu_cache() -> &'static Mutex<HashMap<u64, Arc<GpuProgram>>> {
    GPU_PROGRAMS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn gl_cache() -> &'static Mutex<HashMap<u64, Arc<GlProgram>>> {
    GL_PROGRAMS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Drops every cached program of both backends.
///
/// Programs still referenced by a filter stay alive until that filter is dropped.
pub fn clear_program_cache() {
    let gpu = clear(gpu_cache());
    let gl = clear(gl_cache());
    tracing::debug!("Cleared program cache: {gpu} wgsl, {gl} glsl");
}

/// Returns the cached program for `key` if it was built from `source`, otherwise
/// builds one and caches it under `key`, replacing a colliding entry.
fn cached<T, S: PartialEq>(
    cache: &Mutex<HashMap<u64, Arc<T>>>,
    key: u64,
    source: S,
    source_of: fn(&T) -> &S,
    build: impl FnOnce(S) -> T,
) -> Arc<T> {
    let mut programs = cache.lock().unwrap_or_else(PoisonError::into_inner);
    match programs.get(&key) {
        Some(program) if *source_of(program) == source => {
            tracing::trace!("Program cache hit for {key:#x}");
            return Arc::clone(program);
        }
        Some(_) => tracing::warn!("Program cache key {key:#x} collides with another source"),
        None => tracing::trace!("Program cache miss for {key:#x}"),
    }

    let program = Arc::new(build(source));
    programs.insert(key, Arc::clone(&program));
    program
}

fn unload<T>(cache: &Mutex<HashMap<u64, Arc<T>>>, key: u64) -> bool {
    let removed = cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&key)
        .is_some();
    if removed {
        tracing::trace!("Unloaded program {key:#x}");
    }
    removed
}

fn clear<T>(cache: &Mutex<HashMap<u64, Arc<T>>>) -> usize {
    let mut programs = cache.lock().unwrap_or_else(PoisonError::into_inner);
    let count = programs.len();
    programs.clear();
    count
}

fn source_key(source: &impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

/// Removes `/* … */` and `//` comments so commented-out declarations are ignored.
fn strip_comments(source: &str) -> String {
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    static LINE: OnceLock<Regex> = OnceLock::new();

    let block = BLOCK.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment regex"));
    let line = LINE.get_or_init(|| Regex::new(r"//[^\n]*").expect("line comment regex"));

    let no_block = block.replace_all(source, "");
    line.replace_all(&no_block, "").into_owned()
}

fn parse_wgsl_bindings(source: &str) -> Vec<DeclaredBinding> {
    static BINDING: OnceLock<Regex> = OnceLock::new();
    let binding = BINDING.get_or_init(|| {
        Regex::new(
            r"@group\s*\(\s*(\d+)\s*\)\s*@binding\s*\(\s*(\d+)\s*\)\s*var(?:\s*<[^>]*>)?\s+(\w+)",
        )
        .expect("binding regex")
    });

    let stripped = strip_comments(source);
    binding
        .captures_iter(&stripped)
        .filter_map(|captures| {
            Some(DeclaredBinding {
                group: captures[1].parse().ok()?,
                binding: captures[2].parse().ok()?,
                name: captures[3].to_owned(),
            })
        })
        .collect()
}

fn parse_glsl_uniforms(source: &str) -> Vec<String> {
    static UNIFORM: OnceLock<Regex> = OnceLock::new();
    let uniform = UNIFORM.get_or_init(|| {
        Regex::new(r"\buniform\s+(?:(?:lowp|mediump|highp)\s+)?\w+\s+(\w+)\s*(?:\[[^\]]*\])?\s*;")
            .expect("uniform regex")
    });

    let stripped = strip_comments(source);
    uniform
        .captures_iter(&stripped)
        .map(|captures| captures[1].to_owned())
        .collect()
}
