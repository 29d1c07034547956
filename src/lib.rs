// src/lib.rs
pub mod config;
pub mod controllers;
pub mod error;
pub mod ml;
pub mod models;
pub mod observability;
pub mod views;
pub mod web;
