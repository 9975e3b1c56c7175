//! Quiz builder backend: quiz authoring (CRUD), quiz-taking sessions and grading.

pub mod config;
pub mod domain;
pub mod error;
pub mod grading;
pub mod logic;
pub mod normalize;
pub mod protocol;
pub mod routes;
pub mod runtime;
pub mod seeds;
pub mod state;
pub mod store;
pub mod telemetry;
