//! Transparent Shadow Pool Tests
//!
//! Tests for:
//! - Colour arrays matching depth arrays for any sizing
//! - `[identity, colour]` attachment order over the shared depth layer
//! - Two-value clears (identity 0, transparent black) plus far depth
//! - The nine-name binding override

use glam::Vec4;

use npr_shadows::shadows::{
    SHADOWMAPS_DEPTH, SHADOWMAPS_ID, TRANSPARENT_SHADOWMAPS_COLOR, TRANSPARENT_SHADOWMAPS_DEPTH,
    TRANSPARENT_SHADOWMAPS_ID,
};
use npr_shadows::{
    ClearValue, GraphicsContext, HeadlessGraphics, LayeredKind, LightKind, ShaderBindings,
    ShadowError, ShadowFormat, ShadowMapPool, ShadowMapStorage, ShadowSettings,
    TransparentShadowMapPool,
};

fn ready_pool(gfx: &mut HeadlessGraphics, settings: ShadowSettings) -> TransparentShadowMapPool {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut pool = TransparentShadowMapPool::new(settings).unwrap();
    pool.setup(gfx, true).unwrap();
    pool
}

// ============================================================================
// Storage
// ============================================================================

#[test]
fn color_dimensions_match_depth_for_various_sizes() {
    let sizes = [
        (64, 1, 1, 1, 1),
        (512, 2, 1, 4, 1),
        (1024, 4, 3, 2, 5),
        (128, 1, 8, 1, 3),
    ];

    for (resolution, max_spots, max_suns, sun_cascades, max_points) in sizes {
        let mut gfx = HeadlessGraphics::new();
        let pool = ready_pool(
            &mut gfx,
            ShadowSettings {
                spot_resolution: resolution,
                sun_resolution: resolution * 2,
                point_resolution: resolution / 2,
                sun_cascades,
                max_spots,
                max_suns,
                max_points,
            },
        );

        let depth = *pool.depth_textures().unwrap();
        let color = *pool.color_textures().unwrap();
        for kind in LightKind::ALL {
            let depth_desc = gfx.texture_desc(*depth.get(kind)).unwrap();
            let color_desc = gfx.texture_desc(*color.get(kind)).unwrap();
            assert_eq!(depth_desc.dimensions(), color_desc.dimensions(), "{kind}");
            assert_eq!(color_desc.format, ShadowFormat::Rgba32Float);
        }
        let point = gfx.texture_desc(color.point).unwrap();
        assert_eq!(point.kind, LayeredKind::CubeArray);
    }
}

#[test]
fn targets_attach_identity_then_color() {
    let mut gfx = HeadlessGraphics::new();
    let pool = ready_pool(&mut gfx, ShadowSettings::default());
    let depth = *pool.depth_textures().unwrap();
    let id = *pool.id_textures().unwrap();
    let color = *pool.color_textures().unwrap();

    for kind in LightKind::ALL {
        let targets = pool.render_targets(kind);
        let layers = gfx.texture_desc(*depth.get(kind)).unwrap().layer_count();
        assert_eq!(targets.len(), layers as usize);

        for (layer, target) in targets.iter().enumerate() {
            let (colors, depth_attachment) = gfx.attachments(*target).unwrap();
            assert_eq!(colors.len(), 2);
            assert_eq!(colors[0].texture, *id.get(kind));
            assert_eq!(colors[1].texture, *color.get(kind));
            assert!(colors.iter().all(|c| c.layer == layer as u32));
            assert_eq!(depth_attachment.texture, *depth.get(kind));
            assert_eq!(depth_attachment.layer, layer as u32);
        }
    }
}

#[test]
fn setup_twice_keeps_list_lengths() {
    let settings = ShadowSettings {
        max_spots: 2,
        max_suns: 1,
        sun_cascades: 4,
        max_points: 1,
        ..Default::default()
    };
    let mut gfx = HeadlessGraphics::new();
    let mut pool = ready_pool(&mut gfx, settings);

    pool.setup(&mut gfx, true).unwrap();

    assert_eq!(pool.render_targets(LightKind::Spot).len(), 2);
    assert_eq!(pool.render_targets(LightKind::Sun).len(), 4);
    assert_eq!(pool.render_targets(LightKind::Point).len(), 6);
    // depth + identity + colour for three kinds
    assert_eq!(gfx.texture_count(), 9);
    assert_eq!(gfx.render_target_count(), 12);
}

#[test]
fn setup_without_targets_allocates_all_arrays() {
    let mut gfx = HeadlessGraphics::new();
    let mut pool = TransparentShadowMapPool::default();

    pool.setup(&mut gfx, false).unwrap();

    assert!(pool.color_textures().is_some());
    assert!(pool.id_textures().is_some());
    assert_eq!(gfx.texture_count(), 9);
    assert_eq!(gfx.render_target_count(), 0);
}

// ============================================================================
// Clear
// ============================================================================

#[test]
fn clear_uses_identity_and_transparent_black() {
    let mut gfx = HeadlessGraphics::new();
    let pool = ready_pool(&mut gfx, ShadowSettings::default());

    pool.clear(&mut gfx, 1, 0, 0).unwrap();

    let record = &gfx.clears(pool.render_targets(LightKind::Spot)[0])[0];
    assert_eq!(
        record.colors.as_slice(),
        &[ClearValue::Scalar(0.0), ClearValue::Color(Vec4::ZERO)]
    );
    assert!((record.depth - 1.0).abs() < f32::EPSILON);
}

#[test]
fn clear_touches_only_active_slots() {
    let mut gfx = HeadlessGraphics::new();
    let pool = ready_pool(
        &mut gfx,
        ShadowSettings {
            max_spots: 2,
            max_suns: 2,
            sun_cascades: 2,
            max_points: 2,
            ..Default::default()
        },
    );

    pool.clear(&mut gfx, 2, 1, 1).unwrap();

    assert_eq!(gfx.total_clears(), 2 + 2 + 6);
    let sun: Vec<usize> = pool
        .render_targets(LightKind::Sun)
        .iter()
        .map(|t| gfx.clears(*t).len())
        .collect();
    assert_eq!(sun, vec![1, 1, 0, 0]);
    let untouched_point = pool.render_targets(LightKind::Point)[6..]
        .iter()
        .all(|t| gfx.clears(*t).is_empty());
    assert!(untouched_point);
}

#[test]
fn clear_before_setup_fails() {
    let mut gfx = HeadlessGraphics::new();
    let pool = TransparentShadowMapPool::default();
    assert!(matches!(
        pool.clear(&mut gfx, 0, 0, 0),
        Err(ShadowError::NotConfigured { .. })
    ));
}

// ============================================================================
// Shader binding
// ============================================================================

#[test]
fn callback_binds_exactly_nine_transparent_names() {
    let mut gfx = HeadlessGraphics::new();
    let pool = ready_pool(&mut gfx, ShadowSettings::default());

    let mut bindings = ShaderBindings::new();
    pool.shader_callback(&mut bindings).unwrap();

    assert_eq!(bindings.len(), 9);
    for kind in LightKind::ALL {
        assert_eq!(
            bindings.texture(TRANSPARENT_SHADOWMAPS_DEPTH.get(kind)),
            Some(*pool.depth_textures().unwrap().get(kind))
        );
        assert_eq!(
            bindings.texture(TRANSPARENT_SHADOWMAPS_ID.get(kind)),
            Some(*pool.id_textures().unwrap().get(kind))
        );
        assert_eq!(
            bindings.texture(TRANSPARENT_SHADOWMAPS_COLOR.get(kind)),
            Some(*pool.color_textures().unwrap().get(kind))
        );
        assert!(!bindings.contains(SHADOWMAPS_ID.get(kind)));
        assert!(!bindings.contains(SHADOWMAPS_DEPTH.get(kind)));
    }
}

#[test]
fn both_callbacks_together_cover_opaque_and_transparent() {
    let mut gfx = HeadlessGraphics::new();
    let transparent = ready_pool(&mut gfx, ShadowSettings::default());
    let mut opaque = ShadowMapPool::default();
    opaque.setup(&mut gfx, true).unwrap();

    let mut bindings = ShaderBindings::new();
    opaque.shader_callback(&mut bindings).unwrap();
    transparent.shader_callback(&mut bindings).unwrap();

    assert_eq!(bindings.len(), 15);
    assert_eq!(
        bindings.texture("SHADOWMAPS_ID_SPOT"),
        opaque.id_textures().map(|id| id.spot)
    );
    assert_ne!(
        bindings.texture("SHADOWMAPS_ID_SPOT"),
        bindings.texture("TRANSPARENT_SHADOWMAPS_ID_SPOT")
    );
}
