//! Stepped overlap search along a displacement.
//!
//! The capsule set is sampled at `step` increments from offset 0 up to and
//! including the full displacement.  The first sample that overlaps foreign
//! geometry ends the walk.  On the first iteration a block past sample 0 is
//! refined once over the preceding interval at a tenth of the step.

use glam::Vec3;

use loco_core::BodyId;
use loco_physics::{Capsule, ContactMask, PhysicsWorld, Volume};

/// Refinement divides the step by this factor.
const REFINE_FACTOR: f32 = 10.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepResult {
    pub blocked:         bool,
    /// Bodies overlapped at the blocking sample, de-duplicated in query order.
    pub bodies:          Vec<BodyId>,
    /// Distance along the displacement of the blocking sample (full length
    /// when clear).
    pub distance:        f32,
    /// The block was already present at offset 0.
    pub at_first_sample: bool,
}

/// One sweep request.  `exclude` lists the sweeping agent's own bodies.
#[derive(Copy, Clone, Debug)]
pub struct Sweep<'a> {
    pub capsules:        &'a [Capsule],
    pub displacement:    Vec3,
    pub step:            f32,
    pub first_iteration: bool,
    pub mask:            ContactMask,
    pub exclude:         &'a [BodyId],
}

impl Sweep<'_> {
    pub fn run<W: PhysicsWorld + ?Sized>(&self, world: &W) -> SweepResult {
        let length = self.displacement.length();
        let offsets = sample_offsets(length, self.step);
        let dir = if length > 0.0 { self.displacement / length } else { Vec3::ZERO };

        for (k, &offset) in offsets.iter().enumerate() {
            let bodies = self.overlaps_at(world, dir * offset);
            if bodies.is_empty() {
                continue;
            }

            if self.first_iteration && k > 0 {
                let prev = offsets[k - 1];
                let shifted: Vec<Capsule> = self.capsules.iter().map(|c| c.translated(dir * prev)).collect();
                let refined = Sweep {
                    capsules:        &shifted,
                    displacement:    dir * (offset - prev),
                    step:            self.step / REFINE_FACTOR,
                    first_iteration: false,
                    ..*self
                }
                .run(world);
                if refined.blocked {
                    return SweepResult { distance: prev + refined.distance, at_first_sample: false, ..refined };
                }
            }

            return SweepResult { blocked: true, bodies, distance: offset, at_first_sample: k == 0 };
        }

        SweepResult { blocked: false, bodies: Vec::new(), distance: length, at_first_sample: false }
    }

    fn overlaps_at<W: PhysicsWorld + ?Sized>(&self, world: &W, offset: Vec3) -> Vec<BodyId> {
        let mut out: Vec<BodyId> = Vec::new();
        for capsule in self.capsules {
            let volume = Volume::Capsule(capsule.translated(offset));
            for id in world.volume_cast(&volume, self.mask, self.exclude) {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
        out
    }
}

/// Sample offsets `0, step, 2·step, …` followed by `length` itself.
/// A non-positive step or zero length yields the single offset 0.
pub fn sample_offsets(length: f32, step: f32) -> Vec<f32> {
    if !(step > 0.0) || !(length > 0.0) {
        return vec![0.0];
    }
    let count = (length / step).ceil() as usize;
    let mut out: Vec<f32> = (0..count).map(|i| i as f32 * step).filter(|&s| s < length).collect();
    out.push(length);
    out
}
