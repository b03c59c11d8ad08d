use rendition::filter::{
    BACK_TEXTURE, BACK_TEXTURE_SLOT, DEFAULT_FILTER_VERTEX_GLSL, DEFAULT_FILTER_WGSL, FILTER_GROUP,
    INPUT_TEXTURE, INPUT_TEXTURE_SLOT,
};
use rendition::shader::{GlProgramSource, GpuProgramSource, StageSource};
use rendition::{
    AlphaFilter, Backend, BlendMode, Filter, FilterError, FilterOptions, FilterSources,
};

use crate::expectations::BindingExpectation;
use crate::shaders::*;

const INPUT: (&str, u32, u32) = (INPUT_TEXTURE, FILTER_GROUP, INPUT_TEXTURE_SLOT);
const BACK: (&str, u32, u32) = (BACK_TEXTURE, FILTER_GROUP, BACK_TEXTURE_SLOT);

/// Labelled filters built by [`build_main_scene`].
#[derive(Default)]
pub struct FilterScene {
    filters: Vec<(&'static str, Filter)>,
}

impl FilterScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &'static str, filter: Filter) {
        self.filters.push((label, filter));
    }

    pub fn filter(&self, label: &str) -> Option<&Filter> {
        self.filters
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, filter)| filter)
    }

    pub fn filters(&self) -> impl Iterator<Item = (&'static str, &Filter)> {
        self.filters.iter().map(|(label, filter)| (*label, filter))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

fn wgsl(fragment: &str) -> GpuProgramSource {
    let module = format!("{DEFAULT_FILTER_WGSL}\n{fragment}");
    GpuProgramSource {
        vertex: StageSource::new(module.clone(), "mainVertex"),
        fragment: StageSource::new(module, "mainFragment"),
    }
}

fn glsl(fragment: &'static str) -> GlProgramSource {
    GlProgramSource {
        vertex: DEFAULT_FILTER_VERTEX_GLSL.into(),
        fragment: fragment.into(),
    }
}

// ── Filters ─────────────────────────────────────────────────────────────────

fn alpha_half(scene: &mut FilterScene, expectations: &mut Vec<BindingExpectation>) {
    let alpha = AlphaFilter::new(Some(0.5), FilterOptions::new())
        .expect("alpha filter programs are valid");
    scene.add("alpha-half", alpha.filter().clone());
    expectations.push(BindingExpectation::new("alpha-half", &[INPUT]));
}

fn blur_horizontal(scene: &mut FilterScene, expectations: &mut Vec<BindingExpectation>) {
    let filter = Filter::from_sources(FilterSources {
        gpu: Some(wgsl(HORIZONTAL_BLUR_WGSL)),
        gl: Some(glsl(BLUR_GLSL)),
        options: FilterOptions::new().padding(8.0),
    })
    .expect("blur programs are valid");
    scene.add("blur-horizontal", filter);
    expectations.push(BindingExpectation::new("blur-horizontal", &[INPUT]));
}

fn blur_vertical_gpu_only(scene: &mut FilterScene, expectations: &mut Vec<BindingExpectation>) {
    let filter = Filter::from_sources(FilterSources {
        gpu: Some(wgsl(VERTICAL_BLUR_WGSL)),
        options: FilterOptions::new().padding(8.0),
        ..Default::default()
    })
    .expect("blur programs are valid");
    scene.add("blur-vertical", filter);
    expectations.push(BindingExpectation::new("blur-vertical", &[INPUT]).only(Backend::Gpu));
}

fn backdrop_tint(scene: &mut FilterScene, expectations: &mut Vec<BindingExpectation>) {
    let filter = Filter::from_sources(FilterSources {
        gpu: Some(wgsl(BACKDROP_TINT_WGSL)),
        options: FilterOptions::new()
            .blend_required(true)
            .blend_mode(BlendMode::Screen),
        ..Default::default()
    })
    .expect("backdrop programs are valid");
    scene.add("backdrop-tint", filter);
    expectations.push(BindingExpectation::new("backdrop-tint", &[INPUT, BACK]).only(Backend::Gpu));
}

fn backdrop_missing_declaration(
    scene: &mut FilterScene,
    expectations: &mut Vec<BindingExpectation>,
) {
    let filter = Filter::from_sources(FilterSources {
        gpu: Some(wgsl(BROKEN_BACKDROP_WGSL)),
        options: FilterOptions::new().blend_required(true),
        ..Default::default()
    })
    .expect("broken backdrop still parses");
    scene.add("backdrop-broken", filter);
    expectations.push(
        BindingExpectation::new("backdrop-broken", &[INPUT, BACK])
            .only(Backend::Gpu)
            .with_error(FilterError::MissingGpuBinding {
                name: BACK_TEXTURE.to_owned(),
                group: FILTER_GROUP,
                slot: BACK_TEXTURE_SLOT,
            }),
    );
}

/// Builds every filter of the scene and returns the expectations for each.
pub fn build_main_scene(scene: &mut FilterScene) -> Vec<BindingExpectation> {
    let mut expectations = Vec::new();

    alpha_half(scene, &mut expectations);
    blur_horizontal(scene, &mut expectations);
    blur_vertical_gpu_only(scene, &mut expectations);
    backdrop_tint(scene, &mut expectations);
    backdrop_missing_declaration(scene, &mut expectations);

    expectations
}
