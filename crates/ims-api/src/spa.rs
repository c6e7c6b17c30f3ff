//! Static content for the single-page frontend
//!
//! Built assets are served from a directory. Any other path, whatever the
//! method, gets the entry document so client-side routing can take over.

use std::convert::Infallible;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::Service;
use tower_http::services::ServeDir;

use crate::error::ApiError;

/// Default directory holding the built frontend
pub const DEFAULT_STATIC_DIR: &str = "dist";
/// Default entry document inside the static directory
pub const DEFAULT_INDEX: &str = "index.html";

/// Location of the frontend build output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFiles {
    pub dir: PathBuf,
    /// Entry document, relative to `dir`
    pub index: PathBuf,
}

impl StaticFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            index: PathBuf::from(DEFAULT_INDEX),
        }
    }

    pub fn with_index(mut self, index: impl Into<PathBuf>) -> Self {
        self.index = index.into();
        self
    }

    /// Full path of the entry document
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index)
    }
}

impl Default for StaticFiles {
    fn default() -> Self {
        Self::new(DEFAULT_STATIC_DIR)
    }
}

/// Service answering every request the router does not match
pub fn service(files: &StaticFiles) -> ServeDir<IndexService> {
    ServeDir::new(&files.dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(IndexService {
            path: Arc::new(files.index_path()),
        })
}

/// Answers any request with the entry document
#[derive(Debug, Clone)]
pub struct IndexService {
    path: Arc<PathBuf>,
}

impl<B> Service<Request<B>> for IndexService {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<B>) -> Self::Future {
        let path = self.path.clone();
        Box::pin(async move { Ok(serve_index(&path).await) })
    }
}

async fn serve_index(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Entry document unavailable");
            ApiError::NotFound("Not found".to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_location() {
        let files = StaticFiles::default();
        assert_eq!(files.index_path(), PathBuf::from("dist/index.html"));
    }

    #[test]
    fn custom_index() {
        let files = StaticFiles::new("/srv/ims").with_index("app.html");
        assert_eq!(files.index_path(), PathBuf::from("/srv/ims/app.html"));
    }

    #[tokio::test]
    async fn missing_index_is_not_found() {
        let response = serve_index(Path::new("/nonexistent/index.html")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
