//! stepform - a multi-step sign-up wizard
//!
//! The wizard core validates and navigates a three-step form and hands the
//! final values to a submission collaborator. The terminal front end, the
//! HTTP submitter and the submission endpoint are built around it.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod rest;
pub mod submit;
pub mod ui;
pub mod wizard;
