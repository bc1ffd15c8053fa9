//! Polled source table.
//!
//! Each [`FeedSource`] is one origin the relay checks. The `kind` decides
//! which delta detector runs: an ordered feed keeps a bounded ID history,
//! a release source only remembers the last release ID.

use serde::Deserialize;

/// Pattern/replacement pair applied to entry links before display.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkRewrite {
    /// Substring to look for.
    pub pattern: String,
    /// Replacement for the first occurrence of `pattern`.
    pub replacement: String,
}

impl LinkRewrite {
    /// Create a new rewrite rule.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Apply the rule to a link.
    pub fn apply(&self, link: &str) -> String {
        if self.pattern.is_empty() {
            return link.to_string();
        }
        link.replacen(&self.pattern, &self.replacement, 1)
    }
}

/// What kind of upstream a source is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// RSS/Atom feed with an ordered entry list.
    Feed {
        /// Feed URL.
        url: String,
        /// Optional link rewrite.
        #[serde(default)]
        link_rewrite: Option<LinkRewrite>,
    },
    /// Latest release of a source-control repository (`owner/name`).
    Release {
        /// Repository slug.
        repo: String,
        /// Display title prefix, e.g. "Deno".
        title: String,
        /// Whether the newest release message stays pinned in the channel.
        #[serde(default)]
        pin: bool,
    },
}

/// One polled origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSource {
    /// Stable short identifier, also the dedup store key.
    pub key: String,
    /// Source kind and its parameters.
    #[serde(flatten)]
    pub kind: SourceKind,
}

impl FeedSource {
    /// Create an ordered-feed source.
    pub fn feed(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: SourceKind::Feed {
                url: url.into(),
                link_rewrite: None,
            },
        }
    }

    /// Create a single-release source.
    pub fn release(key: impl Into<String>, repo: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: SourceKind::Release {
                repo: repo.into(),
                title: title.into(),
                pin: false,
            },
        }
    }

    /// Set the link rewrite (feed sources only).
    pub fn with_link_rewrite(mut self, rewrite: LinkRewrite) -> Self {
        if let SourceKind::Feed { link_rewrite, .. } = &mut self.kind {
            *link_rewrite = Some(rewrite);
        }
        self
    }

    /// Keep the newest release pinned (release sources only).
    pub fn pinned(mut self) -> Self {
        if let SourceKind::Release { pin, .. } = &mut self.kind {
            *pin = true;
        }
        self
    }

    /// Rewrite an entry link for display.
    pub fn display_link(&self, link: &str) -> String {
        match &self.kind {
            SourceKind::Feed {
                link_rewrite: Some(rewrite),
                ..
            } => rewrite.apply(link),
            _ => link.to_string(),
        }
    }
}

/// Default source table.
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::feed("blog", "https://deno.com/feed"),
        FeedSource::feed("news", "https://buttondown.email/denonews/rss")
            .with_link_rewrite(LinkRewrite::new("buttondown.email/denonews", "deno.news")),
        FeedSource::feed("typescript", "https://devblogs.microsoft.com/typescript/feed/"),
        FeedSource::feed("v8_blog", "https://v8.dev/blog.atom"),
        FeedSource::feed("deploy_changelog", "https://deno.com/deploy/feed"),
        FeedSource::release("release", "denoland/deno", "Deno").pinned(),
        FeedSource::release("std_release", "denoland/deno_std", "std"),
        FeedSource::feed("bun_blog", "https://bun.sh/rss.xml"),
    ]
}
