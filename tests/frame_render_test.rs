mod common;

use cgmath::{InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};
use common::{
    recording_device::{Event, RecordingDevice},
    test_utils,
};
use forest_ngin::{
    SceneConfig,
    camera::CameraController,
    data_structures::{instance::InstancePosition, model::Material},
    device::Viewport,
    flow::{FrameLoop, LoopControl},
    render::FrameRenderer,
};

fn row(n: usize) -> Vec<InstancePosition> {
    (0..n).map(|i| InstancePosition::new(i as f32 * 10.0, -(i as f32))).collect()
}

#[test]
fn floor_only_scene_issues_one_draw() {
    let mut device = RecordingDevice::new(800, 600);
    let scene = test_utils::scene(&mut device, 2, vec![], 1, vec![]);
    device.clear_events();

    let stats = FrameRenderer::default().render_frame(&mut device, &scene, &CameraController::new());

    assert_eq!(stats.draw_calls, 1);
    assert_eq!(scene.draw_count(), 1);
    let draws = device.draws();
    assert_eq!(draws.len(), 1);
    let (buffer, texture, uniforms) = draws[0];
    assert_eq!(buffer, Some(scene.floor.buffer));
    assert_eq!(texture, scene.floor.texture);
    assert_eq!(uniforms.world, Matrix4::identity());
    assert_eq!(uniforms.material, Material::FLOOR);
}

#[test]
fn instances_draw_every_part_after_the_floor() {
    let mut device = RecordingDevice::new(800, 600);
    let trees = row(3);
    let scene = test_utils::scene(&mut device, 2, trees.clone(), 1, vec![]);
    device.clear_events();

    let stats = FrameRenderer::default().render_frame(&mut device, &scene, &CameraController::new());
    assert_eq!(stats.draw_calls, 1 + 3 * 2);

    let draws = device.draws();
    assert_eq!(draws[0].0, Some(scene.floor.buffer));
    let tree_parts = &scene.trees.asset.parts;
    for (i, position) in trees.iter().enumerate() {
        for (p, part) in tree_parts.iter().enumerate() {
            let (buffer, texture, uniforms) = draws[1 + i * 2 + p];
            assert_eq!(buffer, Some(part.buffer));
            assert_eq!(texture, scene.trees.asset.texture);
            assert_eq!(uniforms.world, position.to_matrix());
            assert_eq!(uniforms.material, test_utils::part_material(p));
        }
    }
}

#[test]
fn rocks_follow_trees() {
    let mut device = RecordingDevice::new(640, 480);
    let scene = test_utils::scene(&mut device, 1, row(2), 3, row(4));
    device.clear_events();

    let stats = FrameRenderer::default().render_frame(&mut device, &scene, &CameraController::new());
    assert_eq!(stats.draw_calls, 1 + 2 + 4 * 3);
    assert_eq!(stats.draw_calls, scene.draw_count());

    let textures: Vec<_> = device.draws().iter().map(|(_, texture, _)| *texture).collect();
    let mut expected = vec![scene.floor.texture];
    expected.extend(std::iter::repeat_n(scene.trees.asset.texture, 2));
    expected.extend(std::iter::repeat_n(scene.rocks.asset.texture, 12));
    assert_eq!(textures, expected);
}

#[test]
fn frame_state_is_set_up_before_the_first_draw() {
    let mut device = RecordingDevice::new(1024, 768);
    let scene = test_utils::scene(&mut device, 2, row(2), 1, row(1));
    device.clear_events();

    FrameRenderer::default().render_frame(&mut device, &scene, &CameraController::new());

    let events = &device.events;
    assert_eq!(events[0], Event::FitViewport(Viewport::fit(1024, 768)));
    assert_eq!(events[1], Event::EnableDepthTest);
    assert_eq!(events[2], Event::UseProgram);
    assert!(matches!(events[3], Event::SetSharedUniforms(_)));
    assert_eq!(events.last(), Some(&Event::EndFrame));
    assert_eq!(device.count(&Event::UseProgram), 1);
    assert_eq!(device.count(&Event::EnableDepthTest), 1);

    // Every draw is directly preceded by binding the buffer it draws.
    for (idx, event) in events.iter().enumerate() {
        if let Event::Draw { buffer, .. } = event {
            let Some(buffer) = buffer else {
                panic!("draw without a bound buffer")
            };
            assert_eq!(events[idx - 1], Event::BindBuffer(*buffer));
        }
    }
}

#[test]
fn zero_display_size_is_clamped() {
    let mut device = RecordingDevice::new(0, 0);
    let scene = test_utils::scene(&mut device, 1, row(1), 1, vec![]);
    device.clear_events();

    let stats = FrameRenderer::default().render_frame(&mut device, &scene, &CameraController::new());

    let viewport = Viewport { width: 1, height: 1 };
    assert_eq!(stats.viewport, Some(viewport));
    assert_eq!(device.events[0], Event::FitViewport(viewport));
    assert_eq!(stats.draw_calls, 2);
}

#[test]
fn shared_uniforms_follow_camera_and_light() {
    let mut device = RecordingDevice::new(800, 600);
    let scene = test_utils::scene(&mut device, 1, vec![], 1, vec![]);
    let mut config = SceneConfig::default();
    config.ambient_light = [0.2, 0.2, 0.2];
    let renderer = FrameRenderer::from_config(&config);
    let mut camera = CameraController::new();

    let shared_of = |device: &RecordingDevice| {
        device
            .last_frame()
            .iter()
            .find_map(|event| match event {
                Event::SetSharedUniforms(uniforms) => Some(*uniforms),
                _ => None,
            })
            .expect("frame sets shared uniforms")
    };

    renderer.render_frame(&mut device, &scene, &camera);
    let shared = shared_of(&device);
    assert_eq!(shared.view_world_position, Point3::new(0.0, 50.0, 200.0));
    assert_eq!(shared.ambient_light, [0.2, 0.2, 0.2]);
    let expected = Vector3::new(-1.0, 3.0, 5.0).normalize();
    assert!((shared.light_direction - expected).magnitude() < 1e-6);

    camera.on_wheel(1.0);
    renderer.render_frame(&mut device, &scene, &camera);
    let shared = shared_of(&device);
    assert!((shared.view_world_position.z - 200.0 / 1.1).abs() < 1e-3);
}

#[test]
fn bounded_frame_loop_renders_exactly_n_frames() {
    let mut device = RecordingDevice::new(320, 240);
    let scene = test_utils::scene(&mut device, 2, row(3), 1, row(2));
    device.clear_events();
    let renderer = FrameRenderer::default();
    let camera = CameraController::new();

    let mut frame_loop = FrameLoop::with_frame_limit(4);
    let frames = frame_loop.run(|_| {
        renderer.render_frame(&mut device, &scene, &camera);
    });

    assert_eq!(frames, 4);
    assert_eq!(device.count(&Event::EndFrame), 4);
    assert_eq!(device.draws().len(), 4 * scene.draw_count());
}

#[test]
fn stopped_frame_loop_renders_nothing_more() {
    let mut device = RecordingDevice::new(320, 240);
    let scene = test_utils::scene(&mut device, 1, row(1), 1, row(1));
    device.clear_events();
    let renderer = FrameRenderer::default();
    let camera = CameraController::new();
    let mut frame_loop = FrameLoop::new();

    let control = frame_loop.tick(|| {
        renderer.render_frame(&mut device, &scene, &camera);
    });
    assert_eq!(control, LoopControl::Continue);

    frame_loop.request_stop();
    let control = frame_loop.tick(|| {
        renderer.render_frame(&mut device, &scene, &camera);
    });
    assert_eq!(control, LoopControl::Stop);
    assert_eq!(device.count(&Event::EndFrame), 1);
}
