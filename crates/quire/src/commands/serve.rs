//! Preview server command.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Router;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_status::SetStatus;

use super::load_site_from_cwd;

/// Run the serve command.
pub async fn run(
    config_path: Option<PathBuf>,
    port: u16,
    dir: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let site = load_site_from_cwd(config_path)?;
    let dir = dir.unwrap_or_else(|| site.output_dir());

    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'quire build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let app = router(&site.base, dir.clone());

    tracing::info!("Serving {} at http://{}{}", dir.display(), addr, site.base);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    if open {
        let url = format!("http://{}{}", addr, site.base);
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;

    Ok(())
}

/// Built output mounted under a base path.
struct SiteFiles {
    base: String,
    files: ServeDir<SetStatus<ServeFile>>,
}

/// Serve `dir` under `base`, redirecting `/` to the base.
fn router(base: &str, dir: PathBuf) -> Router {
    let files = ServeDir::new(&dir).not_found_service(ServeFile::new(dir.join("404.html")));
    let site = Arc::new(SiteFiles {
        base: base.to_string(),
        files,
    });

    Router::new().fallback(serve_site).with_state(site)
}

async fn serve_site(State(site): State<Arc<SiteFiles>>, mut request: Request) -> Response {
    let path = request.uri().path();
    if path == "/" && site.base != "/" {
        return Redirect::temporary(&site.base).into_response();
    }

    let Some(local) = local_path(&site.base, path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match local.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    }

    match site.files.clone().oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Map a request path under `base` to its file in the output directory.
///
/// Pages are written as `<route>/index.html`, so extensionless paths resolve
/// straight to their index file. Returns `None` for paths outside the base.
fn local_path(base: &str, path: &str) -> Option<String> {
    let rest = if path == base.trim_end_matches('/') {
        ""
    } else {
        path.strip_prefix(base)?
    };

    let last = rest.rsplit('/').next().unwrap_or_default();
    if rest.is_empty() || rest.ends_with('/') {
        Some(format!("/{rest}index.html"))
    } else if last.contains('.') {
        Some(format!("/{rest}"))
    } else {
        Some(format!("/{rest}/index.html"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use std::fs;

    fn built_site() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        let files = [
            ("index.html", "home"),
            ("backend/spotify/index.html", "spotify"),
            ("guide/index.html", "guide"),
            ("assets/main.css", "body{}"),
            ("404.html", "not found"),
        ];
        for (path, content) in files {
            let path = temp.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        temp
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let request = axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, location, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn maps_request_paths_to_output_files() {
        let base = "/social-playlist/";

        assert_eq!(local_path(base, "/social-playlist/").as_deref(), Some("/index.html"));
        assert_eq!(local_path(base, "/social-playlist").as_deref(), Some("/index.html"));
        assert_eq!(
            local_path(base, "/social-playlist/backend/spotify").as_deref(),
            Some("/backend/spotify/index.html")
        );
        assert_eq!(
            local_path(base, "/social-playlist/guide/").as_deref(),
            Some("/guide/index.html")
        );
        assert_eq!(
            local_path(base, "/social-playlist/assets/main.css").as_deref(),
            Some("/assets/main.css")
        );
        assert_eq!(local_path(base, "/backend/spotify"), None);
        assert_eq!(
            local_path("/", "/backend/spotify").as_deref(),
            Some("/backend/spotify/index.html")
        );
    }

    #[tokio::test]
    async fn serves_sidebar_links_under_base() {
        let site = built_site();
        let app = router("/social-playlist/", site.path().to_path_buf());

        let (status, location, body) = get(app.clone(), "/social-playlist/backend/spotify").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(location, None);
        assert_eq!(body, "spotify");

        let (status, _, body) = get(app.clone(), "/social-playlist/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "home");

        let (status, _, body) = get(app, "/social-playlist/assets/main.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body{}");
    }

    #[tokio::test]
    async fn redirects_root_to_base() {
        let site = built_site();
        let app = router("/social-playlist/", site.path().to_path_buf());

        let (status, location, _) = get(app, "/").await;

        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/social-playlist/"));
    }

    #[tokio::test]
    async fn answers_missing_pages_with_not_found_page() {
        let site = built_site();
        let app = router("/social-playlist/", site.path().to_path_buf());

        let (status, _, body) = get(app.clone(), "/social-playlist/backend/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "not found");

        let (status, _, _) = get(app, "/backend/spotify").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_root_base() {
        let site = built_site();
        let app = router("/", site.path().to_path_buf());

        let (status, _, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "home");

        let (status, _, body) = get(app, "/backend/spotify").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "spotify");
    }
}
