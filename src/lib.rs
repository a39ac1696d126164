//! HMC Dashboard - per-user health record charts
//!
//! A native viewer for the dashboard server: pick a user and a record type,
//! and the chart for that pair is fetched from `/update_view` and drawn.
//! Further pages compare two users, pair two record types for one user, or
//! summarize record counts from the user metadata.

pub mod charts;
pub mod client;
pub mod config;
pub mod controller;
pub mod data;
pub mod gui;
pub mod logging;
