//! Rewrites relative `<img src>` values of rendered HTML.

use std::fmt;
use std::sync::LazyLock;

use lol_html::element;
use regex::Regex;

use crate::error::Result;
use crate::rewriter::rewrite_fragment;

static EXTERNAL_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.\-]*:|//|/)").expect("invalid external source regex")
});

pub type UrlResolver<'a> = Box<dyn Fn(&str, &str) -> String + 'a>;
pub type PathResolver<'a> = Box<dyn Fn(&str, &str) -> Option<String> + 'a>;
pub type ExternalDetector<'a> = Box<dyn Fn(&str) -> bool + 'a>;

/// Callbacks used by [`rewrite_html_image_sources`].
pub struct ImageRewriteOptions<'a> {
    resolve_url: UrlResolver<'a>,
    resolve_path: PathResolver<'a>,
    is_external: ExternalDetector<'a>,
}

impl<'a> ImageRewriteOptions<'a> {
    /// `resolve_url` receives the resolved path and the original `src` and
    /// returns the final URL.
    pub fn new(resolve_url: impl Fn(&str, &str) -> String + 'a) -> Self {
        Self {
            resolve_url: Box::new(resolve_url),
            resolve_path: Box::new(resolve_relative_path),
            is_external: Box::new(is_external_source),
        }
    }

    /// Replaces the resolver that joins a relative source onto the base path.
    pub fn with_path_resolver(
        mut self,
        resolve_path: impl Fn(&str, &str) -> Option<String> + 'a,
    ) -> Self {
        self.resolve_path = Box::new(resolve_path);
        self
    }

    /// Replaces the predicate deciding which sources are left alone.
    pub fn with_external_detector(mut self, is_external: impl Fn(&str) -> bool + 'a) -> Self {
        self.is_external = Box::new(is_external);
        self
    }
}

impl fmt::Debug for ImageRewriteOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRewriteOptions").finish_non_exhaustive()
    }
}

/// True for scheme-prefixed (`https:`, `data:`), protocol-relative (`//`) and
/// root-relative (`/`) sources.
pub fn is_external_source(src: &str) -> bool {
    EXTERNAL_SOURCE.is_match(src.trim())
}

/// Resolves `relative` against the directory of `base_path`, POSIX style.
///
/// Query strings and fragments are dropped. Returns `None` for an empty source
/// or one that climbs above the root of `base_path`.
pub fn resolve_relative_path(base_path: &str, relative: &str) -> Option<String> {
    let relative = relative
        .trim()
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    if relative.is_empty() {
        return None;
    }

    let absolute = base_path.starts_with('/');
    let mut segments: Vec<&str> = base_path.split('/').filter(|s| !s.is_empty()).collect();
    // The last segment of the base is the document itself.
    if !base_path.ends_with('/') {
        segments.pop();
    }

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    Some(if absolute { format!("/{joined}") } else { joined })
}

/// Rewrites every relative `<img src>` in `html` through the URL resolver.
/// Sources that do not resolve are left untouched.
pub fn rewrite_html_image_sources(
    html: &str,
    base_path: &str,
    options: &ImageRewriteOptions<'_>,
) -> Result<String> {
    if !html.contains("<img") {
        return Ok(html.to_string());
    }

    let handlers = vec![element!("img[src]", |el| {
        let Some(src) = el.get_attribute("src") else {
            return Ok(());
        };
        if (options.is_external)(src.as_str()) {
            return Ok(());
        }

        match (options.resolve_path)(base_path, src.as_str()) {
            Some(resolved) => {
                let url = (options.resolve_url)(resolved.as_str(), src.as_str());
                el.set_attribute("src", &url)?;
            }
            None => tracing::debug!(src = %src, base_path, "image source did not resolve, leaving it"),
        }
        Ok(())
    })];

    rewrite_fragment(html, handlers)
}
