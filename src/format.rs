//! Channel message formatting.
//!
//! Messages use Telegram's HTML parse mode, so every piece of upstream text
//! goes through [`escape_html`] before it is embedded.

use std::collections::HashMap;

use crate::feed::Entry;
use crate::release::Release;
use crate::status::Incident;
use crate::telegram::{LinkPreview, SendOptions};

/// Maximum length, in characters before escaping, of the affected systems
/// list in incident reports.
pub const MAX_AFFECTED_LEN: usize = 2048;

/// Text plus send options, ready for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub options: SendOptions,
}

/// Escape text for Telegram HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Instant View link for `url`, if its host has a known rule hash.
pub fn instant_view_url(url: &str, rhashes: &HashMap<String, String>) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let rhash = rhashes.get(parsed.host_str()?)?;
    Some(format!(
        "https://t.me/iv?rhash={}&url={}",
        rhash,
        urlencoding::encode(url)
    ))
}

/// Message for a new feed entry. `link` is the display link after any
/// source rewrite.
pub fn format_entry(
    entry: &Entry,
    link: &str,
    rhashes: &HashMap<String, String>,
) -> OutgoingMessage {
    let text = format!(
        "<b>{}</b>\n\n{}",
        escape_html(entry.display_title()),
        escape_html(link)
    );

    let preview = match instant_view_url(link, rhashes) {
        Some(url) => LinkPreview::Url {
            url,
            prefer_small_media: true,
        },
        None => LinkPreview::Default,
    };

    OutgoingMessage {
        text,
        options: SendOptions::html().with_link_preview(preview),
    }
}

/// Message for a new release of a release source titled `title`.
pub fn format_release(title: &str, release: &Release) -> OutgoingMessage {
    OutgoingMessage {
        text: format!(
            "<b>{} {}</b>\n\n{}",
            escape_html(title),
            escape_html(release.display_name()),
            escape_html(&release.html_url)
        ),
        options: SendOptions::html().with_link_preview(LinkPreview::Disabled),
    }
}

/// Incident report message.
pub fn format_incident(incident: &Incident) -> OutgoingMessage {
    let affected = incident
        .affected_components
        .iter()
        .map(|c| format!("• {}: {}", c.name, c.status))
        .collect::<Vec<_>>()
        .join("\n");
    // Cut before escaping so the limit never splits an entity
    let affected = escape_html(truncate_chars(&affected, MAX_AFFECTED_LEN));

    let text = format!(
        "{} Incident Report\n<b>{}</b>\nCurrent Status: {}\n\n<b>Affected Systems</b>\n{}\n\n{}",
        incident.status.emoji(),
        escape_html(&incident.name),
        incident.status,
        affected,
        escape_html(&incident.url)
    );

    OutgoingMessage {
        text,
        options: SendOptions::html().with_link_preview(LinkPreview::Disabled),
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{Component, IncidentStatus};
    use crate::telegram::ParseMode;

    fn rhashes() -> HashMap<String, String> {
        HashMap::from([("deno.com".to_string(), "28aee3eda1037a".to_string())])
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b <c> d"), "a &amp; b &lt;c&gt; d");
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(escape_html("\"quotes\""), "\"quotes\"");
    }

    #[test]
    fn test_instant_view_url() {
        let url = instant_view_url("https://deno.com/blog/v2", &rhashes()).unwrap();
        assert_eq!(
            url,
            "https://t.me/iv?rhash=28aee3eda1037a&url=https%3A%2F%2Fdeno.com%2Fblog%2Fv2"
        );
        assert!(instant_view_url("https://example.com/x", &rhashes()).is_none());
        assert!(instant_view_url("not a url", &rhashes()).is_none());
    }

    #[test]
    fn test_format_entry_with_instant_view() {
        let entry = Entry::new("post-1").with_title("Deno 2 <is> out & more");
        let msg = format_entry(&entry, "https://deno.com/blog/v2", &rhashes());

        assert_eq!(
            msg.text,
            "<b>Deno 2 &lt;is&gt; out &amp; more</b>\n\nhttps://deno.com/blog/v2"
        );
        assert_eq!(msg.options.parse_mode, Some(ParseMode::Html));
        match msg.options.link_preview {
            LinkPreview::Url {
                url,
                prefer_small_media,
            } => {
                assert!(url.starts_with("https://t.me/iv?rhash=28aee3eda1037a&url="));
                assert!(prefer_small_media);
            }
            other => panic!("unexpected preview: {other:?}"),
        }
    }

    #[test]
    fn test_format_entry_without_instant_view() {
        let entry = Entry::new("p").with_title("Title");
        let msg = format_entry(&entry, "https://example.com/?a=1&b=2", &rhashes());
        assert_eq!(msg.text, "<b>Title</b>\n\nhttps://example.com/?a=1&amp;b=2");
        assert_eq!(msg.options.link_preview, LinkPreview::Default);
    }

    #[test]
    fn test_format_release() {
        let release = Release::new(6, "v1.46.0", "https://github.com/denoland/deno/releases/tag/v1.46.0");
        let msg = format_release("Deno", &release);
        assert_eq!(
            msg.text,
            "<b>Deno v1.46.0</b>\n\nhttps://github.com/denoland/deno/releases/tag/v1.46.0"
        );
        assert_eq!(msg.options.link_preview, LinkPreview::Disabled);
    }

    #[test]
    fn test_format_incident() {
        let incident = Incident {
            name: "Deploy <outage>".to_string(),
            status: IncidentStatus::Investigating,
            affected_components: vec![
                Component {
                    name: "Deploy".to_string(),
                    status: "Major outage".to_string(),
                },
                Component {
                    name: "KV".to_string(),
                    status: "Degraded".to_string(),
                },
            ],
            url: "https://denostatus.com/incidents/1".to_string(),
        };
        let msg = format_incident(&incident);
        assert_eq!(
            msg.text,
            "🔍 Incident Report\n<b>Deploy &lt;outage&gt;</b>\nCurrent Status: Investigating\n\n\
             <b>Affected Systems</b>\n• Deploy: Major outage\n• KV: Degraded\n\n\
             https://denostatus.com/incidents/1"
        );
        assert_eq!(msg.options.link_preview, LinkPreview::Disabled);
    }

    #[test]
    fn test_format_incident_truncates_affected_list() {
        let components = (0..500)
            .map(|i| Component {
                name: format!("Système {i}"),
                status: "Dégradé".to_string(),
            })
            .collect();
        let incident = Incident {
            name: "Big".to_string(),
            status: IncidentStatus::Resolved,
            affected_components: components,
            url: "https://denostatus.com/incidents/2".to_string(),
        };
        let msg = format_incident(&incident);
        let list = msg
            .text
            .split("<b>Affected Systems</b>\n")
            .nth(1)
            .unwrap()
            .rsplit_once("\n\n")
            .unwrap()
            .0;
        assert_eq!(list.chars().count(), MAX_AFFECTED_LEN);
    }

    #[test]
    fn test_format_incident_truncation_keeps_entities_whole() {
        let components = (0..300)
            .map(|_| Component {
                name: "A&B".to_string(),
                status: "<down>".to_string(),
            })
            .collect();
        let incident = Incident {
            name: "Big".to_string(),
            status: IncidentStatus::Investigating,
            affected_components: components,
            url: "https://denostatus.com/incidents/3".to_string(),
        };
        let msg = format_incident(&incident);
        let list = msg
            .text
            .split("<b>Affected Systems</b>\n")
            .nth(1)
            .unwrap()
            .rsplit_once("\n\n")
            .unwrap()
            .0;

        // Every '&' starts a complete entity
        for (idx, _) in list.match_indices('&') {
            let rest = &list[idx..];
            assert!(
                rest.starts_with("&amp;") || rest.starts_with("&lt;") || rest.starts_with("&gt;"),
                "bare '&' at {idx}: {:?}",
                &list[idx.saturating_sub(10)..]
            );
        }
        assert!(!list.contains('<'));
        assert!(list.starts_with("• A&amp;B: &lt;down&gt;\n"));

        let raw = list
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
        assert_eq!(raw.chars().count(), MAX_AFFECTED_LEN);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
