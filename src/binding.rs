//! Server-side binding of view-model factories to HTTP routes.
//!
//! A [`ViewModelFactory`] builds a fresh view-model graph per request; the
//! binding layer wraps it in an axum handler that checks the client's claimed
//! version, picks a locale from `Accept-Language`, encodes the graph through
//! the localizing encoder, and stamps the response with the server's current
//! version.

use crate::i18n::encoder::LocalizingEncoder;
use crate::i18n::registry::Localized;
use crate::i18n::store::LocalizationStore;
use crate::i18n::LocalizationError;
use crate::locale::Locale;
use crate::runtime::RuntimeContext;
use crate::transport::{version_from_headers, VERSION_HEADER};
use crate::version::{Version, VersionError};
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Builds a view-model graph for one request.
///
/// The factory receives the client's claimed version and the resolved locale
/// so it can shape the graph per client; the binding layer handles version
/// checking, localization, and encoding around it.
pub trait ViewModelFactory: Send + Sync + 'static {
    type ViewModel: Localized + Serialize + Send;

    fn view_model(
        &self,
        version: Version,
        locale: Locale,
    ) -> impl Future<Output = anyhow::Result<Self::ViewModel>> + Send;
}

/// Errors a bound route can answer with.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// Version header missing, malformed, or incompatible.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// The graph could not be localized for the resolved locale.
    #[error(transparent)]
    Localization(#[from] LocalizationError),

    /// The factory failed to build the graph.
    #[error("view-model factory failed: {0}")]
    Factory(#[from] anyhow::Error),
}

impl IntoResponse for BindingError {
    fn into_response(self) -> Response {
        // Bodies use the same {code, message} shape the client transport
        // decodes as a structured server error.
        let (status, code) = match &self {
            BindingError::Version(VersionError::Incompatible { .. }) => {
                (StatusCode::UPGRADE_REQUIRED, "incompatible_version")
            }
            BindingError::Version(_) => (StatusCode::BAD_REQUEST, "bad_version_header"),
            BindingError::Localization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "localization_failed")
            }
            BindingError::Factory(_) => (StatusCode::INTERNAL_SERVER_ERROR, "factory_failed"),
        };

        if status.is_server_error() {
            warn!(%status, error = %self, "View-model binding failed");
        }

        let body = serde_json::json!({
            "code": code,
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Shared state behind every bound view-model route.
pub struct BindingState<F> {
    factory: Arc<F>,
    store: Arc<LocalizationStore>,
    runtime: Arc<RuntimeContext>,
    default_locale: Locale,
}

impl<F> Clone for BindingState<F> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            store: self.store.clone(),
            runtime: self.runtime.clone(),
            default_locale: self.default_locale.clone(),
        }
    }
}

impl<F: ViewModelFactory> BindingState<F> {
    pub fn new(
        factory: F,
        store: Arc<LocalizationStore>,
        runtime: Arc<RuntimeContext>,
        default_locale: Locale,
    ) -> Self {
        Self {
            factory: Arc::new(factory),
            store,
            runtime,
            default_locale,
        }
    }
}

/// Bind a factory to a GET route at `path`.
///
/// # Arguments
/// * `path` - The route path (e.g. `"/view-model/home"`)
/// * `state` - The binding state wrapping factory, store, and runtime
pub fn view_model_router<F: ViewModelFactory>(path: &str, state: BindingState<F>) -> Router {
    Router::new()
        .route(path, get(serve_view_model::<F>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The bound GET handler: version check, locale pick, build, localize, emit.
///
/// Every answer carries the server's current version in [`VERSION_HEADER`],
/// error answers included.
async fn serve_view_model<F: ViewModelFactory>(
    State(state): State<BindingState<F>>,
    headers: HeaderMap,
) -> Response {
    let current = state.runtime.current_version();
    let mut response = match respond(state, headers).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => error.into_response(),
    };
    if let Ok(value) = HeaderValue::from_str(&current.to_string()) {
        response.headers_mut().insert(VERSION_HEADER, value);
    }
    response
}

async fn respond<F: ViewModelFactory>(
    state: BindingState<F>,
    headers: HeaderMap,
) -> Result<serde_json::Value, BindingError> {
    let claimed = version_from_headers(&headers)?;
    state.runtime.check_compatible(&claimed)?;

    let locale = negotiate_locale(&headers, &state.default_locale);
    info!(version = %claimed, locale = %locale, "Serving view-model");

    let view_model = state
        .factory
        .view_model(claimed, locale.clone())
        .await
        .map_err(BindingError::Factory)?;

    let encoder = LocalizingEncoder::new(&state.store, locale);
    Ok(encoder.encode(view_model)?)
}

/// Pick the first well-formed tag from `Accept-Language`, else the default.
///
/// Quality weights are not ranked: the header's leading tag wins, matching
/// exact-lookup localization where the client lists its preferred locale
/// first.
fn negotiate_locale(headers: &HeaderMap, default: &Locale) -> Locale {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|tag| tag.split(';').next().unwrap_or(tag).trim())
        .and_then(|tag| Locale::new(tag).ok())
        .unwrap_or_else(|| default.clone())
}
