use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rendition::{local_uniform_bit, pack_color, wgpu, BlendMode, RenderState, ShaderTarget};

fn bench_render_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_state");

    group.bench_function("toggle_flags", |b| {
        let mut state = RenderState::for_2d();
        b.iter(|| {
            let on = black_box(true);
            state.set_depth_test(on);
            state.set_culling(on);
            state.set_clockwise_front_face(!on);
            state.set_depth_test(!on);
            black_box(state.data())
        })
    });

    group.bench_function("set_blend_mode_name", |b| {
        let mut state = RenderState::for_2d();
        b.iter(|| {
            state.set_blend_mode_name(black_box("screen-npm"));
            black_box(state.blend_mode_id())
        })
    });

    group.bench_function("wgpu_states", |b| {
        let mut state = RenderState::for_2d();
        state.set_blend_mode(BlendMode::Multiply);
        state.set_polygon_offset(2.0);
        b.iter(|| {
            let primitive = state.primitive_state(wgpu::PrimitiveTopology::TriangleList);
            let depth = state.depth_stencil_state(wgpu::TextureFormat::Depth24Plus);
            black_box((primitive, depth, state.blend_state()))
        })
    });

    group.finish();
}

fn bench_pack_color(c: &mut Criterion) {
    let colors: Vec<u32> = (0..1024u32).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();
    let mut out = vec![0.0f32; colors.len() * 4];

    c.bench_function("pack_color_1024", |b| {
        b.iter(|| {
            for (i, color) in colors.iter().enumerate() {
                pack_color(black_box(*color), &mut out, i * 4);
            }
            black_box(&out);
        })
    });
}

fn bench_fragments(c: &mut Criterion) {
    c.bench_function("local_uniform_bit_wgsl", |b| {
        b.iter(|| black_box(local_uniform_bit(black_box(ShaderTarget::WGSL))))
    });
}

criterion_group!(benches, bench_render_state, bench_pack_color, bench_fragments);
criterion_main!(benches);
