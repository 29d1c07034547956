// src/controllers/mod.rs
pub mod main_controller;

pub use main_controller::{MainController, Verdict, INTRUSION_MESSAGE, NORMAL_MESSAGE};
