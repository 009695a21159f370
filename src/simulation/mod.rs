pub mod attention;
pub mod config;
pub mod decision;
pub mod error;
pub mod heuristic;
pub mod layout;
pub mod params;
pub mod search;
pub mod timing;

pub use config::SimulationConfig;
pub use decision::DecisionAgent;
pub use layout::{Element, ElementId, Surface};
pub use search::{run_search, SearchOutcome, SearchQuery};
