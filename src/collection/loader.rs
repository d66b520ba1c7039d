use std::path::{Path, PathBuf};

use http::Method;
use http::header::{HeaderName, HeaderValue};
use tracing::debug;
use url::Url;

use crate::engine::RequestSpec;
use crate::error::{AppError, AppResult, CollectionError};

use super::types::{BodyValue, Collection, CollectionEntry, CollectionFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

/// Reads and validates a `.json` or `.toml` collection file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, has no requests,
/// or contains a request with a bad method, header or URL.
pub fn load_collection(path: &Path) -> AppResult<Collection> {
    let format = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Format::Json,
        Some("toml") => Format::Toml,
        Some(ext) => {
            return Err(AppError::collection(CollectionError::UnsupportedExtension {
                ext: ext.to_owned(),
            }));
        }
        None => return Err(AppError::collection(CollectionError::MissingExtension)),
    };
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::collection(CollectionError::Read {
            path: path.to_path_buf(),
            source: err,
        })
    })?;

    let file: CollectionFile = match format {
        Format::Json => serde_json::from_str(&content).map_err(|err| {
            AppError::collection(CollectionError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
        Format::Toml => toml::from_str(&content).map_err(|err| {
            AppError::collection(CollectionError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
    };

    let collection = resolve_collection(file, path)?;
    debug!(
        "Loaded collection {} with {} request(s) from {}.",
        collection.name.as_deref().unwrap_or("<unnamed>"),
        collection.requests.len(),
        path.display()
    );
    Ok(collection)
}

/// Parses collection JSON held in memory.
///
/// # Errors
///
/// Same as [`load_collection`], with `<inline>` as the path.
pub fn collection_from_str(content: &str) -> AppResult<Collection> {
    let path = PathBuf::from("<inline>");
    let file: CollectionFile = serde_json::from_str(content).map_err(|err| {
        AppError::collection(CollectionError::ParseJson {
            path: path.clone(),
            source: err,
        })
    })?;
    resolve_collection(file, &path)
}

fn resolve_collection(file: CollectionFile, path: &Path) -> AppResult<Collection> {
    if file.requests.is_empty() {
        return Err(AppError::collection(CollectionError::Empty {
            path: path.to_path_buf(),
        }));
    }

    let base_url = file
        .base_url
        .as_deref()
        .map(|raw| {
            Url::parse(raw).map_err(|err| {
                AppError::collection(CollectionError::InvalidBaseUrl {
                    url: raw.to_owned(),
                    source: err,
                })
            })
        })
        .transpose()?;

    let requests = file
        .requests
        .into_iter()
        .enumerate()
        .map(|(index, entry)| resolve_entry(index, entry, base_url.as_ref(), &file.headers))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Collection {
        name: file.name,
        requests,
    })
}

fn resolve_entry(
    index: usize,
    entry: CollectionEntry,
    base_url: Option<&Url>,
    shared_headers: &std::collections::BTreeMap<String, String>,
) -> AppResult<RequestSpec> {
    let method = match entry.method.as_deref() {
        None => Method::GET,
        Some(raw) => Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes()).map_err(
            |_err| {
                AppError::collection(CollectionError::InvalidMethod {
                    index,
                    method: raw.to_owned(),
                })
            },
        )?,
    };

    let url = resolve_url(index, &entry, base_url)?;
    let mut spec = RequestSpec::get(url.as_str()).with_method(method);

    for (name, value) in shared_headers.iter().chain(entry.headers.iter()) {
        validate_header(name, value)?;
        spec = spec.with_header(name, value.as_str());
    }

    if let Some(name) = entry.name {
        spec = spec.with_name(name);
    }
    match entry.body {
        Some(BodyValue::Text(text)) => spec = spec.with_body(text),
        Some(BodyValue::Json(value)) => spec = spec.with_body(value.to_string()),
        None => {}
    }
    Ok(spec)
}

fn resolve_url(index: usize, entry: &CollectionEntry, base_url: Option<&Url>) -> AppResult<Url> {
    let (raw, parsed) = match (entry.url.as_deref(), entry.path.as_deref()) {
        (Some(raw), _) => (raw, Url::parse(raw)),
        (None, Some(path)) => {
            let base = base_url
                .ok_or_else(|| AppError::collection(CollectionError::BaseUrlRequired { index }))?;
            (path, base.join(path))
        }
        (None, None) => {
            return Err(AppError::collection(CollectionError::MissingUrlOrPath {
                index,
            }));
        }
    };

    let url = parsed.map_err(|err| {
        AppError::collection(CollectionError::InvalidUrl {
            index,
            url: raw.to_owned(),
            source: err,
        })
    })?;
    if url.host_str().is_none() {
        return Err(AppError::collection(CollectionError::UrlMissingHost {
            index,
            url: raw.to_owned(),
        }));
    }
    Ok(url)
}

fn validate_header(name: &str, value: &str) -> AppResult<()> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
        AppError::collection(CollectionError::InvalidHeaderName {
            header: name.to_owned(),
            source: err,
        })
    })?;
    HeaderValue::from_str(value).map_err(|err| {
        AppError::collection(CollectionError::InvalidHeaderValue {
            header: name.to_owned(),
            source: err,
        })
    })?;
    Ok(())
}
