#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::collapsible_if)]

//! Scanpath simulation for graphical layouts.
//!
//! Predicts where people look on a layout and how long it takes: EMMA and
//! Fitts timing, saliency-driven guided search with long-term memory recall,
//! a heuristic decision maker and a Q-learning decision agent.

pub mod simulation;
