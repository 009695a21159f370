//! TOML configuration for layouts, the decision agent and the heuristic.
//!
//! ```toml
//! [layout]
//! grid = { rows = 3, cols = 3, size = 400.0, gap = 200.0 }
//!
//! [agent]
//! alpha = 0.1
//! exploration = { kind = "softmax", temperature = 1.0 }
//!
//! [heuristic]
//! threshold = 0.5
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::simulation::decision::AgentConfig;
use crate::simulation::error::{ConfigError, LayoutError};
use crate::simulation::heuristic::HeuristicDecision;
use crate::simulation::layout::{Element, Surface};
use crate::simulation::params::{
    DEFAULT_COLOR, DEFAULT_FREQUENCY, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH,
};

/// Root of a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub layout: LayoutConfig,
    pub agent: AgentConfig,
    pub heuristic: HeuristicDecision,
}

impl SimulationConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML for this schema,
    /// or holds invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// See [`SimulationConfig::load`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for bad agent parameters or a layout
    /// that cannot be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agent.validate()?;
        self.layout
            .build_surface()
            .map(drop)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Surface bounds plus either explicit elements or a generated grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub grid: GridSpec,
    /// When non-empty, used instead of the grid.
    pub elements: Vec<ElementSpec>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SURFACE_WIDTH,
            height: DEFAULT_SURFACE_HEIGHT,
            grid: GridSpec::default(),
            elements: Vec::new(),
        }
    }
}

/// A `rows` x `cols` grid of square elements named `e1`, `e2`, ... row by row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub size: f64,
    pub gap: f64,
    pub color: String,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            size: 400.0,
            gap: 200.0,
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_frequency")]
    pub frequency: f64,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

const fn default_frequency() -> f64 {
    DEFAULT_FREQUENCY
}

impl LayoutConfig {
    /// Builds the configured surface.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::EmptyLayout`] for a grid without cells or
    /// spacing, and any error raised while adding the elements.
    pub fn build_surface(&self) -> Result<Surface, LayoutError> {
        let mut surface = Surface::new(self.width, self.height);
        if self.elements.is_empty() {
            let grid = &self.grid;
            if grid.rows == 0 || grid.cols == 0 || grid.gap < 0.0 {
                return Err(LayoutError::EmptyLayout);
            }
            let pitch = grid.size + grid.gap;
            for row in 0..grid.rows {
                for col in 0..grid.cols {
                    let n = row * grid.cols + col + 1;
                    surface.add(
                        Element::new(
                            format!("e{n}"),
                            col as f64 * pitch,
                            row as f64 * pitch,
                            grid.size,
                            grid.size,
                        )
                        .with_color(grid.color.as_str()),
                    )?;
                }
            }
        } else {
            for element in &self.elements {
                surface.add(
                    Element::new(
                        element.name.as_str(),
                        element.x,
                        element.y,
                        element.width,
                        element.height,
                    )
                    .with_color(element.color.as_str())
                    .with_frequency(element.frequency),
                )?;
            }
        }
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::decision::Exploration;

    #[test]
    fn test_default_grid() {
        let surface = SimulationConfig::default().layout.build_surface().unwrap();
        assert_eq!(surface.len(), 9);
        let e5 = surface.element(surface.id("e5").unwrap());
        assert!((e5.x - 600.0).abs() < f64::EPSILON);
        assert!((e5.y - 600.0).abs() < f64::EPSILON);
        assert!((surface.width() - 1600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert!((config.heuristic.threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explicit_elements_and_softmax() {
        let text = r#"
            [layout]
            elements = [
                { name = "a", x = 0.0, y = 0.0, width = 50.0, height = 50.0, color = "red" },
                { name = "b", x = 100.0, y = 0.0, width = 50.0, height = 50.0 },
            ]

            [agent]
            exploration = { kind = "softmax", temperature = 2.0 }
            seed = 7
        "#;
        let config = SimulationConfig::from_toml_str(text).unwrap();
        let surface = config.layout.build_surface().unwrap();
        assert_eq!(surface.len(), 2);
        assert_eq!(surface.element(surface.id("b").unwrap()).color, DEFAULT_COLOR);
        assert_eq!(config.agent.exploration, Exploration::Softmax { temperature: 2.0 });
        assert_eq!(config.agent.seed, Some(7));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            SimulationConfig::from_toml_str("[agent]\nalpha = 2.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[layout.grid]\nrows = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[layout]\nwidth = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
