//! Gaze and pointer timing.
//!
//! Stateless models:
//! - Fitts' law for manual pointer movement (MacKenzie 1992)
//! - WHo, a speed-accuracy pointer model (Guiard and Rioul 2015)
//! - EMMA for eye movement and visual encoding (Salvucci 2001)
//!
//! EMMA decides whether the eye actually has to move to perceive a target:
//! if encoding finishes before a saccade could be prepared, the target is
//! perceived from the current fixation.

use crate::simulation::layout::{ElementId, Surface};
use crate::simulation::params::{
    EMMA_ENCODING_EXP, EMMA_ENCODING_SCALE, EMMA_EXEC_TIME, EMMA_PREP_TIME, EMMA_SACCADE_RATE,
    FITTS_A, FITTS_B, WHO_ALPHA, WHO_K_ALPHA, WHO_MIN_DISTANCE, WHO_X0, WHO_Y0,
};

/// Result of an EMMA timing query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fixation {
    /// Seconds until the target is encoded.
    pub time: f64,
    /// Whether a saccade to the target took place.
    pub moved: bool,
}

/// Fitts' law movement time model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FittsLaw {
    pub a: f64,
    pub b: f64,
}

impl Default for FittsLaw {
    fn default() -> Self {
        Self {
            a: FITTS_A,
            b: FITTS_B,
        }
    }
}

impl FittsLaw {
    /// `a` for zero distance, otherwise `a + b * log2(distance / width + 1)`.
    #[must_use]
    pub fn movement_time(&self, distance: f64, width: f64) -> f64 {
        if distance == 0.0 {
            self.a
        } else {
            self.a + self.b * (distance / width + 1.0).log2()
        }
    }
}

/// WHo movement time model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WhoModel {
    pub k_alpha: f64,
    /// Minimum movement time.
    pub x0: f64,
    /// Minimum spread of end points.
    pub y0: f64,
    pub alpha: f64,
}

impl Default for WhoModel {
    fn default() -> Self {
        Self {
            k_alpha: WHO_K_ALPHA,
            x0: WHO_X0,
            y0: WHO_Y0,
            alpha: WHO_ALPHA,
        }
    }
}

impl WhoModel {
    /// `(k * ((sigma - y0) / distance)^(alpha - 1))^(1 / alpha) + x0`, with
    /// end point spread `sigma`. A zero distance counts as
    /// [`WHO_MIN_DISTANCE`].
    #[must_use]
    pub fn movement_time(&self, distance: f64, sigma: f64) -> f64 {
        let distance = if distance == 0.0 { WHO_MIN_DISTANCE } else { distance };
        let spread = ((sigma - self.y0) / distance).powf(self.alpha - 1.0);
        (self.k_alpha * spread).powf(self.alpha.recip()) + self.x0
    }
}

/// EMMA encoding time for a target `distance` degrees away.
///
/// `E = K * -ln(f) * exp(k * d)`
#[must_use]
pub fn encoding_time(distance: f64, frequency: f64) -> f64 {
    EMMA_ENCODING_SCALE * -frequency.ln() * (EMMA_ENCODING_EXP * distance).exp()
}

/// EMMA fixation time for a target `distance` degrees away with fixation
/// frequency `frequency`.
#[must_use]
pub fn emma_fixation_time(distance: f64, frequency: f64) -> Fixation {
    let encoding = encoding_time(distance, frequency);
    if encoding < EMMA_PREP_TIME {
        return Fixation {
            time: encoding,
            moved: false,
        };
    }

    let saccade = EMMA_PREP_TIME + EMMA_EXEC_TIME + EMMA_SACCADE_RATE * distance;
    if encoding <= saccade {
        return Fixation {
            time: saccade,
            moved: true,
        };
    }

    // Encoding continues after the saccade lands, now at zero eccentricity.
    let encoding_at_target = EMMA_ENCODING_EXP * -frequency.ln();
    let remaining = (1.0 - saccade / encoding) * encoding_at_target;
    Fixation {
        time: saccade + remaining,
        moved: true,
    }
}

impl Surface {
    /// EMMA time to perceive `target` from `eye` (default: the surface's
    /// eye location).
    #[must_use]
    pub fn emma_time(&self, target: ElementId, eye: Option<ElementId>) -> Fixation {
        let eye = eye.or(self.eye()).unwrap_or(target);
        emma_fixation_time(
            self.visual_distance(eye, target),
            self.element(target).frequency,
        )
    }

    /// Total pointer movement time along a path of elements.
    ///
    /// The effective width of each target is its shorter side.
    #[must_use]
    pub fn fitts_path_time(&self, path: &[ElementId], law: &FittsLaw) -> f64 {
        path.windows(2)
            .map(|pair| {
                law.movement_time(
                    self.distance(pair[0], pair[1]),
                    self.element(pair[1]).min_size(),
                )
            })
            .sum()
    }

    /// WHo pointer movement time between two element centers.
    #[must_use]
    pub fn who_time(
        &self,
        start: ElementId,
        target: ElementId,
        sigma: f64,
        model: &WhoModel,
    ) -> f64 {
        model.movement_time(self.distance(start, target), sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::layout::Element;
    use crate::simulation::params::DEFAULT_FREQUENCY;

    #[test]
    fn test_fitts_zero_distance_is_intercept() {
        let law = FittsLaw::default();
        assert!((law.movement_time(0.0, 1.0) - 0.230).abs() < 1e-12);
        assert!((law.movement_time(0.0, 500.0) - 0.230).abs() < 1e-12);
    }

    #[test]
    fn test_fitts_index_of_difficulty() {
        let law = FittsLaw::default();
        // distance / width + 1 = 4 -> log2 = 2
        assert!((law.movement_time(30.0, 10.0) - (0.230 + 2.0 * 0.166)).abs() < 1e-12);
    }

    #[test]
    fn test_who_movement_time() {
        let model = WhoModel::default();
        // ((10 - 0.0018) / 100)^-0.4 * 0.12, to the power 1/0.6, plus 0.092
        assert!((model.movement_time(100.0, 10.0) - 0.227_525_451_701).abs() < 1e-9);
        let clamped = model.movement_time(WHO_MIN_DISTANCE, 10.0);
        assert!((model.movement_time(0.0, 10.0) - clamped).abs() < 1e-15);
        assert!((clamped - 0.092_000_135_525).abs() < 1e-9);
    }

    #[test]
    fn test_who_time_uses_center_distance() {
        let mut surface = Surface::default();
        let a = surface.add(Element::new("a", 0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = surface.add(Element::new("b", 100.0, 0.0, 10.0, 10.0)).unwrap();
        let model = WhoModel::default();
        let expected = model.movement_time(100.0, 10.0);
        assert!((surface.who_time(a, b, 10.0, &model) - expected).abs() < 1e-12);
        let in_place = model.movement_time(0.0, 10.0);
        assert!((surface.who_time(a, a, 10.0, &model) - in_place).abs() < 1e-12);
    }

    #[test]
    fn test_emma_foveal_target_is_encoded_without_moving() {
        let fixation = emma_fixation_time(0.0, DEFAULT_FREQUENCY);
        assert!(!fixation.moved);
        assert!((fixation.time - encoding_time(0.0, DEFAULT_FREQUENCY)).abs() < 1e-15);
        assert!((fixation.time - 0.006 * 10f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_emma_saccade_regime() {
        // E = 0.006 * ln(10) * exp(0.4 * 7) ~ 0.228, S = 0.205 + 0.014 = 0.219
        let d = 7.0;
        let e = encoding_time(d, DEFAULT_FREQUENCY);
        let s = 0.135 + 0.07 + 0.002 * d;
        assert!(e > s);
        let fixation = emma_fixation_time(d, DEFAULT_FREQUENCY);
        assert!(fixation.moved);
        let expected = s + (1.0 - s / e) * 0.4 * 10f64.ln();
        assert!((fixation.time - expected).abs() < 1e-12);
    }

    #[test]
    fn test_emma_encoding_within_saccade() {
        // E ~ 0.186 at 6.5 degrees, between prep (0.135) and S = 0.218
        let fixation = emma_fixation_time(6.5, DEFAULT_FREQUENCY);
        assert!(fixation.moved);
        assert!((fixation.time - (0.205 + 0.013)).abs() < 1e-12);
    }

    #[test]
    fn test_fitts_path_time_sums_segments() {
        let mut surface = Surface::default();
        let a = surface.add(Element::new("a", 0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = surface.add(Element::new("b", 30.0, 0.0, 10.0, 20.0)).unwrap();
        let law = FittsLaw::default();
        let expected = law.movement_time(surface.distance(a, b), 10.0)
            + law.movement_time(surface.distance(b, a), 10.0);
        assert!((surface.fitts_path_time(&[a, b, a], &law) - expected).abs() < 1e-12);
        assert!(surface.fitts_path_time(&[a], &law).abs() < 1e-12);
    }
}
