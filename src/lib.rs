pub mod app;
pub mod braille;
pub mod breakdown;
pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod join;
pub mod map;
pub mod region;
pub mod ui;
