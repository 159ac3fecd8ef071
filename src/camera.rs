//! Zoomable orbit-less camera.
//!
//! The camera always looks at the origin from above and in front. The only mutable
//! state is the zoom factor, which the mouse wheel scales and which pulls the camera
//! closer along the z-axis.

use cgmath::{Deg, Matrix4, Point3, Vector3, perspective};
use winit::event::{MouseScrollDelta, WindowEvent};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;

const ZOOM_IN_FACTOR: f32 = 1.1;
const ZOOM_OUT_FACTOR: f32 = 0.9;

const FOV_Y: Deg<f32> = Deg(60.0);
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 2000.0;
const CAMERA_HEIGHT: f32 = 50.0;
const CAMERA_DISTANCE: f32 = 200.0;

/// cgmath builds OpenGL clip space (z in -1..1); wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Camera values derived for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub position: Point3<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraController {
    zoom: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self { zoom: 1.0 }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Scales the zoom by one wheel notch. `delta_y` follows the DOM convention:
    /// positive means the wheel was turned towards the user.
    pub fn on_wheel(&mut self, delta_y: f64) {
        let factor = if delta_y > 0.0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Feeds wheel events into [`Self::on_wheel`]. Returns `true` when the event was consumed.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive, the DOM as negative.
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -f64::from(*y),
                    MouseScrollDelta::PixelDelta(position) => -position.y,
                };
                self.on_wheel(delta_y);
                log::trace!("zoom is now {}", self.zoom);
                true
            }
            _ => false,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::new(0.0, CAMERA_HEIGHT, CAMERA_DISTANCE / self.zoom)
    }

    /// Derives position, view and projection for the current zoom.
    pub fn compute_frame(&self, aspect_ratio: f32) -> CameraFrame {
        let position = self.position();
        let view = Matrix4::look_at_rh(position, Point3::new(0.0, 0.0, 0.0), Vector3::unit_y());
        let projection = OPENGL_TO_WGPU_MATRIX * perspective(FOV_Y, aspect_ratio, Z_NEAR, Z_FAR);
        CameraFrame {
            position,
            view,
            projection,
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}
