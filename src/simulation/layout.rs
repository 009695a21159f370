//! Layout model: rectangular elements on a flat surface viewed from a
//! fixed distance.
//!
//! Distances between elements are measured between their (pixel-rounded)
//! centers. Pixel distances convert to visual angle using a viewing distance
//! of twice the longer side of the surface.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::simulation::error::LayoutError;
use crate::simulation::params::{
    DEFAULT_COLOR, DEFAULT_FREQUENCY, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH,
    EXPERT_STRENGTH, INTERMEDIATE_STRENGTH, RECALL_DECAY, RECALL_SCALE, VIEWING_DISTANCE_FACTOR,
};

/// Handle of an element within the [`Surface`] that created it.
///
/// Ids are dense insertion indices, so ordering by id is insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    /// Position of the element in insertion order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A point in surface (pixel) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A rectangular on-screen element.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    /// Task payload, e.g. a stimulus value in [0, 1].
    pub data: f64,
    /// Fixation frequency prior used by EMMA encoding.
    pub frequency: f64,
}

impl Element {
    /// Creates a grey element with the default fixation frequency.
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
            color: DEFAULT_COLOR.to_string(),
            data: 0.0,
            frequency: DEFAULT_FREQUENCY,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: f64) -> Self {
        self.data = data;
        self
    }

    /// Center of the element, rounded to whole pixels.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.x + self.width / 2.0).round(),
            (self.y + self.height / 2.0).round(),
        )
    }

    /// The longer side.
    #[must_use]
    pub fn max_size(&self) -> f64 {
        self.width.max(self.height)
    }

    /// The shorter side.
    #[must_use]
    pub fn min_size(&self) -> f64 {
        self.width.min(self.height)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        check_geometry(&self.name, self.width, self.height)?;
        if !(self.frequency > 0.0 && self.frequency <= 1.0) {
            return Err(LayoutError::InvalidFrequency {
                name: self.name.clone(),
                frequency: self.frequency,
            });
        }
        Ok(())
    }
}

fn check_geometry(name: &str, width: f64, height: f64) -> Result<(), LayoutError> {
    if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
        Ok(())
    } else {
        Err(LayoutError::DegenerateGeometry {
            name: name.to_string(),
            width,
            height,
        })
    }
}

/// How well a fact about an element has been learned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Expertise {
    Intermediate,
    Expert,
    Strength(f64),
}

impl Expertise {
    /// Memory activation strength for this level of expertise.
    #[must_use]
    pub const fn strength(self) -> f64 {
        match self {
            Self::Intermediate => INTERMEDIATE_STRENGTH,
            Self::Expert => EXPERT_STRENGTH,
            Self::Strength(s) => s,
        }
    }
}

/// Seconds needed to retrieve a memory of the given strength.
///
/// `t = 1.06 * exp(-1.53 * strength)`
#[must_use]
pub fn recall_time(strength: f64) -> f64 {
    RECALL_SCALE * (-RECALL_DECAY * strength).exp()
}

/// A learned fact and how strongly it is remembered.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryTrace<T> {
    pub strength: f64,
    pub fact: T,
}

impl<T> MemoryTrace<T> {
    #[must_use]
    pub fn recall_time(&self) -> f64 {
        recall_time(self.strength)
    }
}

/// Remembered element positions and colors.
#[derive(Clone, Debug, Default)]
pub struct LongTermMemory {
    positions: HashMap<ElementId, MemoryTrace<Point>>,
    colors: HashMap<ElementId, MemoryTrace<String>>,
}

impl LongTermMemory {
    #[must_use]
    pub fn position(&self, id: ElementId) -> Option<&MemoryTrace<Point>> {
        self.positions.get(&id)
    }

    #[must_use]
    pub fn color(&self, id: ElementId) -> Option<&MemoryTrace<String>> {
        self.colors.get(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.colors.is_empty()
    }
}

/// The screen: a set of uniquely named elements plus viewing geometry.
///
/// The bounding box only ever grows to fit the elements. The surface also
/// keeps a default eye location (the first element added) and the
/// long-term memory learned about its elements.
#[derive(Clone, Debug)]
pub struct Surface {
    width: f64,
    height: f64,
    viewing_distance: f64,
    elements: Vec<Element>,
    index: HashMap<String, ElementId>,
    eye: Option<ElementId>,
    memory: LongTermMemory,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT)
    }
}

impl Surface {
    /// Creates an empty surface with the given initial bounds.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            viewing_distance: VIEWING_DISTANCE_FACTOR * width.max(height),
            elements: Vec::new(),
            index: HashMap::new(),
            eye: None,
            memory: LongTermMemory::default(),
        }
    }

    /// Adds an element, growing the bounds if needed.
    ///
    /// The first element added becomes the default eye location.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name, non-positive size or a fixation frequency
    /// outside (0, 1]. The surface is unchanged on error.
    pub fn add(&mut self, element: Element) -> Result<ElementId, LayoutError> {
        if self.index.contains_key(&element.name) {
            return Err(LayoutError::DuplicateElement(element.name));
        }
        element.validate()?;

        let id = ElementId(self.elements.len());
        self.index.insert(element.name.clone(), id);
        self.elements.push(element);
        self.fit_bounds();
        if self.eye.is_none() {
            self.eye = Some(id);
        }
        Ok(id)
    }

    fn fit_bounds(&mut self) {
        for e in &self.elements {
            self.width = self.width.max(e.x + e.width);
            self.height = self.height.max(e.y + e.height);
        }
        self.viewing_distance = VIEWING_DISTANCE_FACTOR * self.width.max(self.height);
    }

    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Distance from the viewer to the surface, in pixels.
    #[must_use]
    pub const fn viewing_distance(&self) -> f64 {
        self.viewing_distance
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len()).map(ElementId)
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this surface.
    #[must_use]
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Looks up an element by name.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownElement`] if no element has this name.
    pub fn id(&self, name: &str) -> Result<ElementId, LayoutError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| LayoutError::UnknownElement(name.to_string()))
    }

    #[must_use]
    pub fn name(&self, id: ElementId) -> &str {
        &self.elements[id.0].name
    }

    /// Resolves a path of ids to element names.
    #[must_use]
    pub fn names(&self, path: &[ElementId]) -> Vec<&str> {
        path.iter().map(|&id| self.name(id)).collect()
    }

    /// Default eye location, `None` only for an empty surface.
    #[must_use]
    pub const fn eye(&self) -> Option<ElementId> {
        self.eye
    }

    pub fn set_eye(&mut self, id: ElementId) {
        self.eye = Some(id);
    }

    /// Pixel distance between element centers.
    #[must_use]
    pub fn distance(&self, a: ElementId, b: ElementId) -> f64 {
        self.element(a).center().distance(self.element(b).center())
    }

    /// Visual distance between element centers, in degrees.
    #[must_use]
    pub fn visual_distance(&self, a: ElementId, b: ElementId) -> f64 {
        self.angular_size(self.distance(a, b))
    }

    /// Visual angle, in degrees, subtended by a pixel extent.
    #[must_use]
    pub fn angular_size(&self, pixels: f64) -> f64 {
        180.0 * (pixels / self.viewing_distance).atan() / PI
    }

    /// Longer side of an element, in pixels.
    #[must_use]
    pub fn element_size(&self, id: ElementId) -> f64 {
        self.element(id).max_size()
    }

    /// The candidate whose center is closest to `point`.
    ///
    /// Ties go to the first candidate yielded.
    pub fn nearest_element(
        &self,
        point: Point,
        candidates: impl IntoIterator<Item = ElementId>,
    ) -> Option<ElementId> {
        let mut best: Option<(ElementId, f64)> = None;
        for id in candidates {
            let d = point.distance(self.element(id).center());
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Exchanges the top-left corners of two elements, growing the bounds if
    /// the larger one now reaches past them.
    pub fn swap_positions(&mut self, a: ElementId, b: ElementId) {
        let (ax, ay) = (self.elements[a.0].x, self.elements[a.0].y);
        let (bx, by) = (self.elements[b.0].x, self.elements[b.0].y);
        self.elements[a.0].x = bx;
        self.elements[a.0].y = by;
        self.elements[b.0].x = ax;
        self.elements[b.0].y = ay;
        self.fit_bounds();
    }

    /// Moves an element's top-left corner.
    pub fn move_element(&mut self, id: ElementId, x: f64, y: f64) {
        let e = &mut self.elements[id.0];
        e.x = x;
        e.y = y;
        self.fit_bounds();
    }

    /// Resizes an element.
    ///
    /// # Errors
    ///
    /// Rejects non-positive sizes, leaving the element unchanged.
    pub fn resize_element(
        &mut self,
        id: ElementId,
        width: f64,
        height: f64,
    ) -> Result<(), LayoutError> {
        check_geometry(&self.elements[id.0].name, width, height)?;
        let e = &mut self.elements[id.0];
        e.width = width;
        e.height = height;
        self.fit_bounds();
        Ok(())
    }

    pub fn recolor(&mut self, id: ElementId, color: impl Into<String>) {
        self.elements[id.0].color = color.into();
    }

    pub fn set_data(&mut self, id: ElementId, data: f64) {
        self.elements[id.0].data = data;
    }

    /// Remembered facts about the elements.
    #[must_use]
    pub const fn memory(&self) -> &LongTermMemory {
        &self.memory
    }

    /// Memorises where an element currently is.
    pub fn learn_position(&mut self, id: ElementId, expertise: Expertise) {
        let fact = self.element(id).center();
        self.memory.positions.insert(
            id,
            MemoryTrace {
                strength: expertise.strength(),
                fact,
            },
        );
    }

    /// Memorises an element's current color.
    pub fn learn_color(&mut self, id: ElementId, expertise: Expertise) {
        let fact = self.element(id).color.clone();
        self.memory.colors.insert(
            id,
            MemoryTrace {
                strength: expertise.strength(),
                fact,
            },
        );
    }

    /// Memorises position and color of every element.
    pub fn learn_all(&mut self, expertise: Expertise) {
        for i in 0..self.elements.len() {
            self.learn_position(ElementId(i), expertise);
            self.learn_color(ElementId(i), expertise);
        }
    }

    /// Recall time for the remembered position of an element.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NotLearned`] if the position was never learned.
    pub fn position_recall_time(&self, id: ElementId) -> Result<f64, LayoutError> {
        self.memory
            .position(id)
            .map(MemoryTrace::recall_time)
            .ok_or_else(|| LayoutError::NotLearned(self.name(id).to_string()))
    }

    pub fn forget_all(&mut self) {
        self.memory = LongTermMemory::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_boxes() -> (Surface, ElementId, ElementId) {
        let mut surface = Surface::default();
        let a = surface.add(Element::new("a", 0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = surface.add(Element::new("b", 30.0, 40.0, 10.0, 10.0)).unwrap();
        (surface, a, b)
    }

    #[test]
    fn test_center_is_rounded() {
        let e = Element::new("e", 0.0, 0.0, 5.0, 7.0);
        assert_eq!(e.center(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_first_element_is_default_eye() {
        let (surface, a, _) = two_boxes();
        assert_eq!(surface.eye(), Some(a));
    }

    #[test]
    fn test_distance_between_centers() {
        let (surface, a, b) = two_boxes();
        assert!((surface.distance(a, b) - 50.0).abs() < 1e-10);
        assert!((surface.distance(b, a) - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_bounds_grow_and_recalibrate_distance() {
        let mut surface = Surface::new(100.0, 50.0);
        assert!((surface.viewing_distance() - 200.0).abs() < 1e-10);
        surface.add(Element::new("wide", 250.0, 0.0, 50.0, 10.0)).unwrap();
        assert!((surface.width() - 300.0).abs() < 1e-10);
        assert!((surface.height() - 50.0).abs() < 1e-10);
        assert!((surface.viewing_distance() - 600.0).abs() < 1e-10);
    }

    #[test]
    fn test_angular_size_of_viewing_distance_is_45_degrees() {
        let surface = Surface::new(100.0, 100.0);
        assert!((surface.angular_size(200.0) - 45.0).abs() < 1e-10);
        assert!(surface.angular_size(0.0).abs() < 1e-10);
    }

    #[test]
    fn test_rejected_element_leaves_surface_untouched() {
        let (mut surface, _, _) = two_boxes();
        let before = surface.len();
        let err = surface
            .add(Element::new("flat", 500.0, 500.0, 10.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, LayoutError::DegenerateGeometry { .. }));
        assert_eq!(surface.len(), before);
        assert!((surface.width() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_nearest_element_tie_goes_to_first() {
        let mut surface = Surface::default();
        let left = surface.add(Element::new("left", 0.0, 0.0, 10.0, 10.0)).unwrap();
        let right = surface.add(Element::new("right", 20.0, 0.0, 10.0, 10.0)).unwrap();
        let midpoint = Point::new(15.0, 5.0);
        assert_eq!(surface.nearest_element(midpoint, surface.ids()), Some(left));
        assert_eq!(surface.nearest_element(midpoint, [right, left]), Some(right));
        assert_eq!(surface.nearest_element(midpoint, []), None);
    }

    #[test]
    fn test_swap_is_its_own_inverse() {
        let (mut surface, a, b) = two_boxes();
        surface.swap_positions(a, b);
        assert!((surface.element(a).x - 30.0).abs() < 1e-10);
        assert!((surface.element(b).y).abs() < 1e-10);
        surface.swap_positions(a, b);
        assert!((surface.element(a).x).abs() < 1e-10);
    }

    #[test]
    fn test_swap_grows_bounds_for_larger_element() {
        let mut surface = Surface::new(100.0, 100.0);
        let big = surface.add(Element::new("big", 0.0, 0.0, 90.0, 90.0)).unwrap();
        let small = surface.add(Element::new("small", 95.0, 0.0, 5.0, 5.0)).unwrap();
        assert!((surface.width() - 100.0).abs() < 1e-10);

        surface.swap_positions(big, small);
        assert!((surface.width() - 185.0).abs() < 1e-10);
        assert!((surface.height() - 100.0).abs() < 1e-10);
        assert!((surface.viewing_distance() - 370.0).abs() < 1e-10);
    }

    #[test]
    fn test_recall_time_falls_with_strength() {
        assert!((recall_time(0.0) - 1.06).abs() < 1e-10);
        assert!(recall_time(Expertise::Expert.strength()) < recall_time(0.0));
        assert!(recall_time(Expertise::Intermediate.strength()) > recall_time(0.0));
    }

    #[test]
    fn test_learn_position_records_center() {
        let (mut surface, _, b) = two_boxes();
        assert!(surface.position_recall_time(b).is_err());
        surface.learn_position(b, Expertise::Expert);
        let trace = surface.memory().position(b).unwrap();
        assert_eq!(trace.fact, Point::new(35.0, 45.0));
        assert!((surface.position_recall_time(b).unwrap() - recall_time(1.0)).abs() < 1e-12);
        surface.forget_all();
        assert!(surface.memory().is_empty());
    }
}
