// src/views/form_view.rs
use tera::{Context, Tera};

use crate::models::FEATURE_NAMES;

const INDEX_TEMPLATE: &str = "index.html";

/// Renders the single page: the feature form plus, after a POST, the result.
pub struct FormView {
    tera: Tera,
}

impl FormView {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(INDEX_TEMPLATE, include_str!("../../templates/index.html"))?;
        Ok(Self { tera })
    }

    pub fn render(&self, result: Option<&str>) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("fields", &FEATURE_NAMES);
        context.insert("result", &result);
        self.tera.render(INDEX_TEMPLATE, &context)
    }
}
