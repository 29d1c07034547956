// src/views/mod.rs
mod form_view;

pub use form_view::FormView;
