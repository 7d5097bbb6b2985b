//! Static file serving module
//!
//! Serves files from the configured asset directory. A miss is not an error:
//! the router falls through to the render step.

use crate::config::StaticFilesConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve `ctx.path` from the static directory, `None` when no file matches
pub async fn serve_static(
    ctx: &RequestContext<'_>,
    cfg: &StaticFilesConfig,
) -> Option<Response<Full<Bytes>>> {
    let decoded = percent_decode_str(ctx.path).decode_utf8().ok()?;
    let (content, file_path) = load_from_directory(&cfg.dir, &decoded, &cfg.index_files).await?;

    let content_type = mime::content_type_for(&file_path);
    let cache_control = cache::cache_control_for(ctx.path);
    let etag = cache::generate_etag(&content);

    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return Some(http::build_304_response(&etag, cache_control));
    }

    Some(http::response::build_cached_response(
        Bytes::from(content),
        content_type,
        &etag,
        cache_control,
        ctx.is_head,
    ))
}

/// Load static file from directory with index file support
pub async fn load_from_directory(
    static_dir: &str,
    path: &str,
    index_files: &[String],
) -> Option<(Vec<u8>, PathBuf)> {
    // Remove leading slash and prevent directory traversal
    let relative_path = path.trim_start_matches('/').replace("..", "");

    // Missing asset directory just means every request renders
    let Ok(static_dir_canonical) = fs::canonicalize(static_dir).await else {
        return None;
    };

    let mut file_path = Path::new(static_dir).join(&relative_path);

    // Check if path is a directory, try index files
    if is_dir(&file_path).await {
        let mut index_hit = None;
        for index_file in index_files {
            let index_path = file_path.join(index_file);
            if is_file(&index_path).await {
                index_hit = Some(index_path);
                break;
            }
        }
        file_path = index_hit?;
    }

    // File not found is common, no need to log
    let file_path_canonical = fs::canonicalize(&file_path).await.ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }
    if !is_file(&file_path_canonical).await {
        return None;
    }

    match fs::read(&file_path_canonical).await {
        Ok(content) => Some((content, file_path_canonical)),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            None
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}
