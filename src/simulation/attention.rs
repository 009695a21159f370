//! Attention engine: bottom-up saliency and top-down feature guidance.
//!
//! Only elements whose color can be resolved from the current fixation take
//! part in saliency. An element is visible when its eccentricity cost
//! `0.104 d^2 - 0.95 d` (d in degrees) is below its angular size.
//!
//! Activation maps are rebuilt from scratch for every fixation decision.

use std::collections::BTreeMap;

use crate::simulation::layout::{ElementId, Surface};
use crate::simulation::params::{
    BOTTOM_UP_WEIGHT, ECCENTRICITY_LINEAR, ECCENTRICITY_QUADRATIC, TOP_DOWN_UNSEEN,
    TOP_DOWN_WEIGHT,
};

/// Element id to non-negative activation, iterated in insertion order.
pub type ActivationMap = BTreeMap<ElementId, f64>;

/// Whether `id`'s color is perceivable while fixating `eye`.
#[must_use]
pub fn is_visible(surface: &Surface, eye: ElementId, id: ElementId) -> bool {
    let d = surface.visual_distance(id, eye);
    let cost = ECCENTRICITY_QUADRATIC * d.powi(2) - ECCENTRICITY_LINEAR * d;
    cost < surface.angular_size(surface.element_size(id))
}

/// All elements visible from `eye`, in insertion order.
#[must_use]
pub fn visible_elements(surface: &Surface, eye: ElementId) -> Vec<ElementId> {
    surface
        .ids()
        .filter(|&id| is_visible(surface, eye, id))
        .collect()
}

/// Color-contrast saliency of every element as seen from `eye`.
///
/// A visible element gains `1/sqrt(distance)` from each other visible
/// element of a different color. Everything else scores 0.
#[must_use]
pub fn bottom_up_activation(surface: &Surface, eye: ElementId) -> ActivationMap {
    let visible = visible_elements(surface, eye);
    let mut activation: ActivationMap = surface.ids().map(|id| (id, 0.0)).collect();

    for &e in &visible {
        let color = &surface.element(e).color;
        let score: f64 = visible
            .iter()
            .filter(|&&other| other != e && surface.element(other).color != *color)
            .map(|&other| surface.distance(e, other))
            // Coincident centers carry no spatial contrast.
            .filter(|&d| d > 0.0)
            .map(|d| 1.0 / d.sqrt())
            .sum();
        activation.insert(e, score);
    }

    activation
}

/// Feature match for a requested color as seen from `eye`.
///
/// Visible elements score 1 on a match and 0 otherwise; elements out of
/// view keep 0.5 since their color is unknown.
#[must_use]
pub fn top_down_activation(surface: &Surface, eye: ElementId, feature: &str) -> ActivationMap {
    surface
        .ids()
        .map(|id| {
            let score = if !is_visible(surface, eye, id) {
                TOP_DOWN_UNSEEN
            } else if surface.element(id).color == feature {
                1.0
            } else {
                0.0
            };
            (id, score)
        })
        .collect()
}

/// Unweighted sum of bottom-up and (optional) top-down activation.
///
/// This is the map both the guided search and the heuristic decision maker
/// choose fixations from.
#[must_use]
pub fn guided_activation(
    surface: &Surface,
    eye: ElementId,
    feature: Option<&str>,
) -> ActivationMap {
    let mut activation = bottom_up_activation(surface, eye);
    if let Some(feature) = feature {
        for (id, score) in top_down_activation(surface, eye, feature) {
            *activation.entry(id).or_insert(0.0) += score;
        }
    }
    activation
}

/// Weighted combination: 1.1 x bottom-up + 0.45 x top-down.
#[must_use]
pub fn total_activation(surface: &Surface, eye: ElementId, feature: Option<&str>) -> ActivationMap {
    let mut activation: ActivationMap = bottom_up_activation(surface, eye)
        .into_iter()
        .map(|(id, score)| (id, score * BOTTOM_UP_WEIGHT))
        .collect();
    if let Some(feature) = feature {
        for (id, score) in top_down_activation(surface, eye, feature) {
            *activation.entry(id).or_insert(0.0) += TOP_DOWN_WEIGHT * score;
        }
    }
    activation
}

/// The most active element; ties go to the earliest id.
#[must_use]
pub fn most_active(activation: &ActivationMap) -> Option<ElementId> {
    let mut best: Option<(ElementId, f64)> = None;
    for (&id, &score) in activation {
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((id, score));
        }
    }
    best.map(|(id, _)| id)
}
