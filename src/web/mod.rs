// src/web/mod.rs
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::controllers::{MainController, Verdict};
use crate::error::DetectionError;
use crate::ml::IntrusionModel;
use crate::views::FormView;

#[derive(Clone)]
pub struct AppState {
    controller: Arc<MainController>,
    view: Arc<FormView>,
}

impl AppState {
    pub fn new(model: Arc<dyn IntrusionModel>) -> Result<Self> {
        let view = FormView::new().context("Failed to compile page template")?;
        Ok(Self {
            controller: Arc::new(MainController::new(model)),
            view: Arc::new(view),
        })
    }
}

/// `GET /` shows the form, `POST /` classifies it. Both always answer 200.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Response {
    render(&state, None)
}

async fn submit(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let verdict = match form {
        Ok(Form(pairs)) => state.controller.classify(&first_values(pairs)),
        Err(rejection) => Verdict::from(DetectionError::MalformedRequest(rejection.body_text())),
    };
    render(&state, Some(&verdict.message()))
}

/// Collapses repeated fields, keeping the first value submitted.
fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut fields = HashMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        fields.entry(name).or_insert(value);
    }
    fields
}

fn render(state: &AppState, result: Option<&str>) -> Response {
    match state.view.render(result) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render page: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}

pub struct WebServer {
    config: ServerConfig,
    state: AppState,
}

impl WebServer {
    pub fn new(config: ServerConfig, model: Arc<dyn IntrusionModel>) -> Result<Self> {
        Ok(Self {
            config,
            state: AppState::new(model)?,
        })
    }

    pub async fn run(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        info!("Serving on http://{}", addr);
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Web server failed")?;

        info!("Shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_fields_keep_first_value() {
        let pairs = vec![
            ("count".to_string(), "5".to_string()),
            ("service".to_string(), "2".to_string()),
            ("count".to_string(), "100".to_string()),
        ];
        let fields = first_values(pairs);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["count"], "5");
    }
}
