//! Integration tests for the baking pipeline
//!
//! Drives full bakes over in-memory sources and checks the mesh, layout and
//! image contents that come out.

mod common;

use common::{exact_config, fluid_source, rising_source, TrackingStage};
use glam::Vec3;
use vat_common::{unpack_normal_alpha, TexelFormat};
use vat_export::{
    bake, AnimatedSource, BakeConfig, BakeError, Baker, CancelToken, ComputeStage, CpuComputeStage,
    MaxTextureWidth, TopologyType,
};

#[test]
fn test_fixed_topology_bake() {
    let mut source = rising_source(21);
    let result = bake(&mut source, &exact_config())
        .expect("bake failed")
        .expect("bake cancelled");

    assert_eq!(result.topology(), TopologyType::Fixed);
    assert_eq!(result.mesh.vertex_count(), 7);
    assert_eq!(result.mesh.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6]);

    // 7 slots -> width 8, one row per frame, 20 intervals + closing frame
    assert_eq!(result.layout.width, 8);
    assert_eq!(result.layout.rows_per_frame, 1);
    assert_eq!(result.layout.height, 21);

    let image = &result.position_image;
    assert_eq!(image.format, TexelFormat::Rgba16Float);
    assert_eq!((image.width, image.height), (8, 21));

    // Quad vertex 1 at frame 12 has risen 12 * 0.25
    assert_eq!(image.texel(1, 12), [1.0, 3.0, 0.0, 1.0]);
    // Triangle vertex 1 carries its parent offset
    assert_eq!(image.texel(5, 7), [3.0, 0.0, 0.0, 1.0]);
    // Slot 7 is beyond the vertex count and never written
    assert_eq!(image.texel(7, 3), [0.0; 4]);

    let normals = result.normal_image.as_ref().expect("normal image");
    assert_eq!(normals.texel(0, 20), [0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn test_dynamic_topology_bake() {
    let mut source = fluid_source(21);
    let result = bake(&mut source, &exact_config())
        .expect("bake failed")
        .expect("bake cancelled");

    assert_eq!(result.topology(), TopologyType::Dynamic);
    assert_eq!(result.report.max_triangles, 3);

    // Placeholder soup: 9 corners, identity indices
    assert_eq!(result.mesh.vertex_count(), 9);
    assert_eq!(result.mesh.indices, (0..9).collect::<Vec<u32>>());
    assert!(result.mesh.positions.iter().all(|p| *p == Vec3::ZERO));

    assert_eq!(result.layout.width, 16);
    assert_eq!(result.layout.max_vertex_count, 9);

    // Frame 0 has a single triangle: corners 0..3 written, 3..9 zero padding
    let image = &result.position_image;
    assert_eq!(image.texel(1, 0), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(image.texel(4, 0), [0.0, 0.0, 0.0, 1.0]);
    // Frame 2 has three triangles, at height 1.0
    assert_eq!(image.texel(8, 2), [2.0, 1.0, 2.0, 1.0]);
    // Beyond the slot count
    assert_eq!(image.texel(12, 2), [0.0; 4]);
}

#[test]
fn test_bounds_are_symmetric_and_cover_all_frames() {
    let mut source = rising_source(21);
    let result = bake(&mut source, &exact_config()).unwrap().unwrap();
    let bounds = result.mesh.bounds;

    assert_eq!(bounds.min, -bounds.max);
    // Highest quad vertex reaches y = 20 * 0.25
    assert!(bounds.max.y >= 5.0 || bounds.min.y <= -5.0);
    assert!(bounds.max.length() >= Vec3::new(3.0, 5.0, 1.0).length() - 1e-4);
}

#[test]
fn test_root_scale_applies_to_mesh_images_and_bounds() {
    let mut plain = rising_source(21);
    let mut scaled = rising_source(21).with_root_scale(Vec3::splat(2.0));

    let plain = bake(&mut plain, &exact_config()).unwrap().unwrap();
    let scaled = bake(&mut scaled, &exact_config()).unwrap().unwrap();

    assert_eq!(scaled.mesh.positions[1], plain.mesh.positions[1] * 2.0);
    assert_eq!(scaled.position_image.texel(1, 12), [2.0, 6.0, 0.0, 1.0]);
    assert_eq!(scaled.mesh.bounds.max, plain.mesh.bounds.max * 2.0);
}

#[test]
fn test_bake_is_idempotent() {
    let mut source = fluid_source(21);
    let first = bake(&mut source, &BakeConfig::default()).unwrap().unwrap();
    let second = bake(&mut source, &BakeConfig::default()).unwrap().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_source_left_at_start_time() {
    let mut source = rising_source(21);
    bake(&mut source, &exact_config()).unwrap();
    assert_eq!(source.current_keyframe(), Some(0));
}

#[test]
fn test_cancel_midway_releases_resources() {
    let mut source = rising_source(21);
    let token = CancelToken::new();
    let trigger = token.clone();
    let mut stage = TrackingStage::default();

    let result = Baker::new(exact_config())
        .with_cancel(token)
        .with_progress(move |done, _| {
            if done == 5 {
                trigger.cancel();
            }
        })
        .run(&mut source, &mut stage)
        .expect("cancellation is not an error");

    assert!(result.is_none());
    assert!(stage.created > 0, "images are allocated before sampling");
    assert_eq!(stage.created, stage.released);
    assert_eq!(stage.live_resources(), 0);
}

#[test]
fn test_capacity_overflow_is_an_error() {
    let mut source = fluid_source(21);
    let config = BakeConfig {
        max_texture_width: MaxTextureWidth::W32,
        ..exact_config()
    };
    let mut stage = TrackingStage::default();
    let result = Baker::new(config).run(&mut source, &mut stage);

    // 9 slots fit one 16-wide row; 21 rows still fit 32
    assert!(result.unwrap().is_some());

    let mut tall = rising_source(41);
    let config = BakeConfig {
        max_texture_width: MaxTextureWidth::W32,
        ..exact_config()
    };
    let mut stage = TrackingStage::default();
    let result = Baker::new(config).run(&mut tall, &mut stage);
    assert_eq!(
        result,
        Err(BakeError::Capacity {
            height: 41,
            max_width: 32
        })
    );
    assert_eq!(stage.created, 0, "nothing is allocated on capacity failure");
}

#[test]
fn test_packed_normals() {
    let mut source = rising_source(21);
    let config = BakeConfig {
        pack_normal_into_alpha: true,
        ..exact_config()
    };
    let result = bake(&mut source, &config).unwrap().unwrap();

    assert!(result.normal_image.is_none());
    assert_eq!(result.position_image.format, TexelFormat::Rgba32Float);

    let texel = result.position_image.texel(2, 4);
    assert_eq!(&texel[..3], &[1.0, 1.0, 1.0]);
    assert!((unpack_normal_alpha(texel[3]) - Vec3::Y).length() < 0.01);
}

#[test]
fn test_cpu_stage_left_empty_after_bake() {
    let mut source = fluid_source(21);
    let mut stage = CpuComputeStage::new();
    Baker::new(BakeConfig::default())
        .run(&mut source, &mut stage)
        .unwrap();
    assert_eq!(stage.live_resources(), 0);
    assert!(source.duration() > 0.0);
}
