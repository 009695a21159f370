//! Model constants.

// Fitts' law (MacKenzie 1992), seconds.
pub const FITTS_A: f64 = 0.230;
pub const FITTS_B: f64 = 0.166;

// WHo pointer model (Guiard et al. 2011), seconds and pixels.
pub const WHO_K_ALPHA: f64 = 0.12;
pub const WHO_X0: f64 = 0.092;
pub const WHO_Y0: f64 = 0.0018;
pub const WHO_ALPHA: f64 = 0.6;
pub const WHO_MIN_DISTANCE: f64 = 1e-7;

// EMMA eye movement model (Salvucci 2001).
pub const EMMA_ENCODING_SCALE: f64 = 0.006;
pub const EMMA_ENCODING_EXP: f64 = 0.4;
pub const EMMA_PREP_TIME: f64 = 0.135;
pub const EMMA_EXEC_TIME: f64 = 0.07;
pub const EMMA_SACCADE_RATE: f64 = 0.002; // Seconds per degree
pub const DEFAULT_FREQUENCY: f64 = 0.1;

// Surface geometry.
pub const DEFAULT_SURFACE_WIDTH: f64 = 100.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 100.0;
pub const VIEWING_DISTANCE_FACTOR: f64 = 2.0;
pub const DEFAULT_COLOR: &str = "grey";

// Peripheral visibility: cost = a*d^2 - b*d (degrees).
pub const ECCENTRICITY_QUADRATIC: f64 = 0.104;
pub const ECCENTRICITY_LINEAR: f64 = 0.95;

// Activation weights.
pub const BOTTOM_UP_WEIGHT: f64 = 1.1;
pub const TOP_DOWN_WEIGHT: f64 = 0.45;
pub const TOP_DOWN_UNSEEN: f64 = 0.5;

// Long-term memory recall: t = scale * exp(-decay * strength).
pub const RECALL_SCALE: f64 = 1.06;
pub const RECALL_DECAY: f64 = 1.53;
pub const INTERMEDIATE_STRENGTH: f64 = -0.75;
pub const EXPERT_STRENGTH: f64 = 1.0;

// Decision task.
pub const POSITIVE_COLOR: &str = "green";
pub const NEGATIVE_COLOR: &str = "red";
pub const POSITIVE_THRESHOLD: f64 = 0.5;
pub const PERIPHERAL_RADIUS: f64 = 2.5; // In multiples of element size
pub const DECISION_TIME: f64 = 0.5;
pub const MAX_EPISODE_STEPS: usize = 100;

// Q-learning defaults.
pub const LEARNING_RATE: f64 = 0.1;
pub const DISCOUNT: f64 = 0.9;
pub const EPSILON: f64 = 0.1;
pub const SOFTMAX_TEMPERATURE: f64 = 1.0;
pub const CORRECT_REWARD: f64 = 20.0;
pub const INCORRECT_REWARD: f64 = 0.0;
pub const TIME_COST: f64 = 1.0;
