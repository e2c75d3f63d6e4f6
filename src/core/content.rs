//! core::content
//!
//! `naucse:` pseudo-links embedded in rendered HTML.
//!
//! The renderer emits links between content items as pseudo-URLs in `href`
//! and `src` attributes:
//!
//! - `naucse:page?lesson=<slug>[&page=<slug>]` (page defaults to `index`)
//! - `naucse:solution?solution=<n>`
//! - `naucse:static?filename=<name>`
//!
//! [`rewrite_links`] replaces each of them with the URL returned by a
//! [`LinkResolver`]; anything else in the markup is left untouched.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use super::convert::{LinkResolver, LoadCx};
use super::error::ModelError;

/// Scheme of content pseudo-links.
pub const SCHEME: &str = "naucse";

static LINK_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(href|src)=(?:"(naucse:[^"]*)"|'(naucse:[^']*)')"#)
        .expect("link attribute pattern is valid")
});

/// A parsed content pseudo-link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLink {
    /// A page of some lesson
    Page { lesson: String, page: String },
    /// A solution of the page being loaded
    Solution { index: usize },
    /// A static file of the lesson being loaded
    Static { filename: String },
}

impl ContentLink {
    /// Parse a `naucse:` URL.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ContentReference`] for unknown link types or
    /// missing parameters.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let fail = |reason: &str| ModelError::ContentReference {
            identifier: raw.to_string(),
            reason: reason.to_string(),
        };
        let url = Url::parse(&raw.replace("&amp;", "&")).map_err(|e| fail(&e.to_string()))?;
        if url.scheme() != SCHEME {
            return Err(fail("not a content link"));
        }
        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };
        match url.path() {
            "page" => Ok(ContentLink::Page {
                lesson: param("lesson").ok_or_else(|| fail("missing lesson"))?,
                page: param("page").unwrap_or_else(|| "index".to_string()),
            }),
            "solution" => {
                let index = param("solution").ok_or_else(|| fail("missing solution number"))?;
                let index = index
                    .parse()
                    .map_err(|_| fail("solution number is not an integer"))?;
                Ok(ContentLink::Solution { index })
            }
            "static" => Ok(ContentLink::Static {
                filename: param("filename").ok_or_else(|| fail("missing filename"))?,
            }),
            other => Err(fail(&format!("unknown link type '{other}'"))),
        }
    }
}

impl fmt::Display for ContentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentLink::Page { lesson, page } => {
                write!(f, "{SCHEME}:page?lesson={lesson}&page={page}")
            }
            ContentLink::Solution { index } => write!(f, "{SCHEME}:solution?solution={index}"),
            ContentLink::Static { filename } => write!(f, "{SCHEME}:static?filename={filename}"),
        }
    }
}

/// Rewrite all pseudo-links in `html` through `resolver`.
///
/// Without a resolver the markup is returned unchanged.
pub fn rewrite_links(
    cx: &mut LoadCx<'_>,
    html: &str,
    resolver: Option<LinkResolver>,
) -> Result<String, ModelError> {
    let Some(LinkResolver(resolve)) = resolver else {
        return Ok(html.to_string());
    };
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for caps in LINK_ATTR.captures_iter(html) {
        let Some((whole, attr, target)) = split(&caps) else {
            continue;
        };
        let link = ContentLink::parse(target)?;
        let resolved = resolve(cx, &link)?;
        out.push_str(&html[last..whole.start()]);
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&resolved.replace('"', "%22"));
        out.push('"');
        last = whole.end();
    }
    out.push_str(&html[last..]);
    Ok(out)
}

fn split<'h>(caps: &Captures<'h>) -> Option<(regex::Match<'h>, &'h str, &'h str)> {
    let whole = caps.get(0)?;
    let attr = caps.get(1)?.as_str();
    let target = caps.get(2).or_else(|| caps.get(3))?.as_str();
    Some((whole, attr, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_links(html: &str) -> Vec<String> {
        LINK_ATTR
            .captures_iter(html)
            .filter_map(|caps| split(&caps).map(|(_, _, target)| target.to_string()))
            .collect()
    }

    #[test]
    fn page_defaults_to_index() {
        assert_eq!(
            ContentLink::parse("naucse:page?lesson=beginners/install").unwrap(),
            ContentLink::Page {
                lesson: "beginners/install".into(),
                page: "index".into()
            }
        );
        assert_eq!(
            ContentLink::parse("naucse:page?lesson=a/b&amp;page=extra").unwrap(),
            ContentLink::Page {
                lesson: "a/b".into(),
                page: "extra".into()
            }
        );
    }

    #[test]
    fn solutions_and_static_files() {
        assert_eq!(
            ContentLink::parse("naucse:solution?solution=2").unwrap(),
            ContentLink::Solution { index: 2 }
        );
        assert_eq!(
            ContentLink::parse("naucse:static?filename=turtle.png").unwrap(),
            ContentLink::Static {
                filename: "turtle.png".into()
            }
        );
    }

    #[test]
    fn malformed_links_name_the_identifier() {
        let err = ContentLink::parse("naucse:solution?solution=two").unwrap_err();
        match err {
            ModelError::ContentReference { identifier, .. } => {
                assert_eq!(identifier, "naucse:solution?solution=two")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ContentLink::parse("naucse:video?id=1").is_err());
        assert!(ContentLink::parse("naucse:static").is_err());
    }

    #[test]
    fn display_is_canonical() {
        let link = ContentLink::parse("naucse:page?lesson=a/b").unwrap();
        assert_eq!(link.to_string(), "naucse:page?lesson=a/b&page=index");
        assert_eq!(ContentLink::parse(&link.to_string()).unwrap(), link);
    }

    #[test]
    fn finds_links_in_both_quote_styles() {
        let html = r#"<a href="naucse:page?lesson=x">x</a><img src='naucse:static?filename=a.png'><a href="https://python.cz">"#;
        assert_eq!(
            find_links(html),
            vec!["naucse:page?lesson=x", "naucse:static?filename=a.png"]
        );
    }
}
