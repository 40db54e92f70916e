use glam::Vec3;
use serde::Serialize;


/// How far ahead of the camera (in curve parameter) the look-at target sits.
pub const LOOKAHEAD: f32 = 0.1;

/// Exponential smoothing rate for the camera rig, per second.
pub const SMOOTHING_RATE: f32 = 24.0;

/// Named overlay sections, one per fifth of the scroll range.
pub const SECTIONS: [&str; 5] = ["intro", "podcast", "fintech", "academy", "creator"];

/// An authored anchor on the camera route.
#[derive(Debug, Clone, Serialize)]
pub struct Waypoint {
    pub name: &'static str,
    #[serde(serialize_with = "serialize_vec3")]
    pub position: Vec3,
}

fn serialize_vec3<S: serde::Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
    v.to_array().serialize(s)
}

/// The fixed city flythrough route, authored once and immutable for the
/// session: start at street level, rise past each district, end overhead.
pub fn city_route() -> Vec<Waypoint> {
    vec![
        Waypoint { name: "intro", position: Vec3::new(0.0, 2.0, 10.0) },
        Waypoint { name: "podcast", position: Vec3::new(0.0, 5.0, -10.0) },
        Waypoint { name: "fintech", position: Vec3::new(0.0, 6.0, -30.0) },
        Waypoint { name: "academy", position: Vec3::new(0.0, 6.0, -50.0) },
        Waypoint { name: "creator-tower", position: Vec3::new(0.0, 12.0, -70.0) },
        Waypoint { name: "overview", position: Vec3::new(0.0, 20.0, -90.0) },
    ]
}

/// Camera position and look-at target derived for one progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTarget {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// A Catmull-Rom spline over the authored waypoints, evaluated by
/// normalized parameter in [0,1]. Out-of-range parameters clamp to the
/// route ends rather than extrapolate.
pub struct CameraPath {
    points: Vec<Vec3>,
}

impl CameraPath {
    pub fn new(points: Vec<Vec3>) -> Self {
        debug_assert!(points.len() >= 2, "a camera path needs at least two waypoints");
        Self { points }
    }

    /// Evaluate the curve at `t` in [0,1] (clamped).
    pub fn point(&self, t: f32) -> Vec3 {
        let n = self.points.len();
        if n == 1 {
            return self.points[0];
        }

        let segments = n - 1;
        let scaled = t.clamp(0.0, 1.0) * segments as f32;
        let i = (scaled.floor() as usize).min(segments - 1);
        let local = scaled - i as f32;

        // Duplicate the endpoints so the first and last segments still have
        // four control points.
        let p0 = self.points[i.saturating_sub(1)];
        let p1 = self.points[i];
        let p2 = self.points[i + 1];
        let p3 = self.points[(i + 2).min(n - 1)];

        catmull_rom(p0, p1, p2, p3, local)
    }

    /// Derive the camera pose for a scroll progress value: position on the
    /// curve, looking at a point slightly ahead (clamped at the route end).
    pub fn pose(&self, progress: f32) -> PoseTarget {
        PoseTarget {
            position: self.point(progress),
            look_at: self.point((progress + LOOKAHEAD).min(1.0)),
        }
    }
}

/// Uniform Catmull-Rom segment (tension 0.5), interpolating p1..p2.
fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    (p1 * 2.0
        + (p2 - p0) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

/// The mutable render pose. Advanced toward its target every frame with
/// frame-time-scaled exponential decay, never assigned directly, so rapid
/// scrolling produces easing instead of teleportation.
pub struct CameraRig {
    pub position: Vec3,
}

impl CameraRig {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    pub fn advance(&mut self, target: Vec3, dt: f32) {
        let alpha = 1.0 - (-SMOOTHING_RATE * dt).exp();
        self.position = self.position.lerp(target, alpha);
    }
}

/// Which overlay section a progress value falls into: `count` equal-width
/// segments of [0,1], with p = 1 closing the last segment.
pub fn section_index(progress: f32, count: usize) -> usize {
    debug_assert!(count > 0, "section_index needs at least one section");
    let clamped = progress.clamp(0.0, 1.0);
    ((clamped * count as f32) as usize).min(count.saturating_sub(1))
}
