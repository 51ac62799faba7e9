use super::xml;
use http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, info, warn};
use url::Url;

/// Transport-context variable names read by [`normalize`].
pub mod keys {
    pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
    pub const REQUEST_URI: &str = "REQUEST_URI";
    pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
    pub const HTTP_HOST: &str = "HTTP_HOST";
    pub const HTTP_X_FORWARDED_HOST: &str = "HTTP_X_FORWARDED_HOST";
    pub const HTTPS: &str = "HTTPS";
    pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
}

/// Read-only key-value data describing an incoming request, supplied by the
/// hosting environment. Serializable so captured contexts can be stored and
/// replayed as fixtures.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TransportContext {
    vars: HashMap<String, String>,
}

impl TransportContext {
    /// Look up a raw transport variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for TransportContext {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TransportContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Request normalization failure.
#[derive(Debug)]
pub enum NormalizeError {
    /// `REQUEST_METHOD` is missing from the transport context.
    MissingMethod,
    /// The method is outside the GET/POST/PUT/DELETE set this layer handles,
    /// or does not parse as an HTTP method at all.
    UnsupportedMethod {
        method: String,
    },
    /// I/O failure draining the raw body stream.
    BodyRead(std::io::Error),
    /// The body claimed to be JSON or XML but did not parse as such.
    BodyDecode {
        detail: String,
    },
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::MissingMethod => {
                write!(f, "transport context has no REQUEST_METHOD")
            }
            NormalizeError::UnsupportedMethod { method } => {
                write!(
                    f,
                    "unsupported HTTP method '{}': expected GET, POST, PUT or DELETE",
                    method
                )
            }
            NormalizeError::BodyRead(err) => {
                write!(f, "unable to read the request body: {}", err)
            }
            NormalizeError::BodyDecode { detail } => {
                write!(f, "unable to decode the request body: {}", detail)
            }
        }
    }
}

impl std::error::Error for NormalizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NormalizeError::BodyRead(err) => Some(err),
            _ => None,
        }
    }
}

/// Canonical request value, one per transport event.
///
/// Read-only after construction except for `path` and `attributes`, which a
/// dispatcher may rewrite.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
    base_url: String,
    body: Option<Value>,
    attributes: HashMap<String, Value>,
}

impl Request {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// `"http"` or `"https"`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port from the host header, if any.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Application-relative path, query string stripped.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Overwrite the path, e.g. after stripping a matched prefix.
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = path.into();
        self
    }

    /// Leading portion of the request URI attributable to the script's own
    /// mount point.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Decoded body: query parameters for GET, decoded payload otherwise.
    /// `None` means no content type was supplied, distinct from parsed-empty.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Replace the attribute map wholesale.
    pub fn set_attributes(&mut self, attributes: HashMap<String, Value>) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Set a single attribute.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Normalize one transport event into a [`Request`].
///
/// `body` is a single-use scoped resource: it is drained exactly once for
/// POST/PUT/DELETE and left untouched for GET. The call is synchronous and
/// stateless; the only suspension point is the body read itself.
///
/// # Errors
///
/// [`NormalizeError::MissingMethod`] when the context has no
/// `REQUEST_METHOD`; [`NormalizeError::UnsupportedMethod`] for methods
/// outside GET/POST/PUT/DELETE; [`NormalizeError::BodyRead`] when draining
/// the body fails; [`NormalizeError::BodyDecode`] for malformed JSON or XML
/// payloads.
pub fn normalize(
    ctx: &TransportContext,
    body: impl Read,
) -> Result<Request, NormalizeError> {
    let raw_method = ctx
        .get(keys::REQUEST_METHOD)
        .ok_or(NormalizeError::MissingMethod)?;
    let method = Method::from_str(raw_method).map_err(|_| NormalizeError::UnsupportedMethod {
        method: raw_method.to_string(),
    })?;

    let (scheme, host, port) = derive_origin(ctx);

    let script_name = ctx.get(keys::SCRIPT_NAME).unwrap_or("");
    let request_uri = ctx.get(keys::REQUEST_URI).unwrap_or("/");
    let (base_url, path) = split_base_url(script_name, request_uri);

    debug!(
        scheme = %scheme,
        host = %host,
        port = ?port,
        script_name = %script_name,
        request_uri = %request_uri,
        base_url = %base_url,
        path = %path,
        "URI derived"
    );

    let body = derive_body(&method, ctx, request_uri, body)?;

    info!(
        method = %method,
        path = %path,
        base_url = %base_url,
        has_body = body.is_some(),
        "Request normalized"
    );

    Ok(Request {
        method,
        scheme,
        host,
        port,
        path,
        base_url,
        body,
        attributes: HashMap::new(),
    })
}

/// Derive canonical scheme/host/port from the forwarded-host chain and TLS
/// flag. Falls back to `http://localhost` with no port when the host does
/// not parse as a URL authority.
fn derive_origin(ctx: &TransportContext) -> (String, String, Option<u16>) {
    let host = ctx
        .get(keys::HTTP_X_FORWARDED_HOST)
        .or_else(|| ctx.get(keys::HTTP_HOST))
        .unwrap_or("localhost");
    let scheme = match ctx.get(keys::HTTPS) {
        Some(https) if https != "off" => "https",
        _ => "http",
    };

    match Url::parse(&format!("{scheme}://{host}")) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("localhost").to_string();
            (url.scheme().to_string(), host, url.port())
        }
        Err(err) => {
            warn!(host = %host, scheme = %scheme, error = %err, "Host header did not parse, using defaults");
            ("http".to_string(), "localhost".to_string(), None)
        }
    }
}

/// Directory portion of a script path, `dirname` semantics:
/// `/app/index.php` → `/app`, `/index.php` → `/`, `index.php` → `.`.
fn script_dir(script_name: &str) -> &str {
    match script_name.rfind('/') {
        Some(0) => "/",
        Some(pos) => &script_name[..pos],
        None => ".",
    }
}

/// Split the raw request URI into `(base_url, path)`.
///
/// The base URL is the script's own mount point: the whole script name when
/// the URI runs through it, its directory when the URI only shares the
/// directory, empty otherwise. The path is the URI with the first
/// `base_url.len()` bytes dropped and any query string truncated.
fn split_base_url(script_name: &str, request_uri: &str) -> (String, String) {
    let base_url = if request_uri == script_name {
        ""
    } else if request_uri.starts_with(script_name) {
        script_name
    } else {
        let dir = script_dir(script_name);
        if request_uri.starts_with(dir) {
            dir.trim_end_matches('/')
        } else {
            ""
        }
    };

    let path = request_uri.get(base_url.len()..).unwrap_or("");
    let path = match path.find('?') {
        Some(pos) => &path[..pos],
        None => path,
    };

    (base_url.to_string(), path.to_string())
}

/// Decode query parameters from the request URI into a JSON object of
/// strings. Duplicate keys: last one wins.
fn parse_query(request_uri: &str) -> Map<String, Value> {
    let Some(pos) = request_uri.find('?') else {
        return Map::new();
    };
    let query = &request_uri[pos + 1..];
    let mut params = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    params
}

/// Content-type-driven body decoding.
///
/// GET takes the already-parsed query parameters and never touches the
/// stream. POST/PUT/DELETE drain the stream once, then branch on the media
/// type: JSON passes through, XML is converted by the convention in
/// [`super::xml`], anything else decodes to an empty object. A missing or
/// empty content type leaves the body unset.
fn derive_body(
    method: &Method,
    ctx: &TransportContext,
    request_uri: &str,
    mut body: impl Read,
) -> Result<Option<Value>, NormalizeError> {
    if *method == Method::GET {
        return Ok(Some(Value::Object(parse_query(request_uri))));
    }

    if !matches!(method.as_str(), "POST" | "PUT" | "DELETE") {
        return Err(NormalizeError::UnsupportedMethod {
            method: method.to_string(),
        });
    }

    // Drained before the content-type branch: the stream is consumed exactly
    // once per event regardless of what the headers claim.
    let mut raw = Vec::new();
    body.read_to_end(&mut raw).map_err(NormalizeError::BodyRead)?;

    let content_type = ctx.get(keys::CONTENT_TYPE).unwrap_or("");
    if content_type.is_empty() {
        debug!(bytes = raw.len(), "No content type, body left unset");
        return Ok(None);
    }

    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    info!(
        bytes = raw.len(),
        content_type = %content_type,
        media_type = %media_type,
        "Request body read"
    );

    match media_type.as_str() {
        "application/json" => serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|err| NormalizeError::BodyDecode {
                detail: format!("malformed JSON body: {err}"),
            }),
        "text/xml" | "application/xml" => {
            let text = std::str::from_utf8(&raw).map_err(|err| NormalizeError::BodyDecode {
                detail: format!("XML body is not valid UTF-8: {err}"),
            })?;
            xml::to_value(text)
                .map(Some)
                .map_err(|err| NormalizeError::BodyDecode {
                    detail: err.to_string(),
                })
        }
        _ => Ok(Some(Value::Object(Map::new()))),
    }
}
