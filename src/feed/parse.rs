//! RSS 2.0 and Atom parsing into normalized [`Article`]s.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use regex::Regex;
use roxmltree::{Document, Node};
use sha2::{Digest, Sha256};

use super::{Article, FeedSource};
use crate::html;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";

pub const ITEMS_PER_FEED: usize = 10;
pub const DESCRIPTION_CHARS: usize = 300;
const ID_CHARS: usize = 16;

static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src="([^">]+)""#).expect("valid img regex"));

/// Fields as they appear in the feed, before normalization.
#[derive(Debug, Default)]
struct RawEntry {
    title: String,
    link: String,
    summary: Option<String>,
    content: Option<String>,
    published: Option<String>,
    author: Option<String>,
    guid: Option<String>,
    image: Option<String>,
}

/// Parses up to [`ITEMS_PER_FEED`] entries from an RSS or Atom document.
pub fn parse_feed(xml: &str, source: &FeedSource) -> anyhow::Result<Vec<Article>> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let entries: Vec<RawEntry> = match root.tag_name().name() {
        "rss" => root
            .descendants()
            .filter(|n| is(*n, None, "item"))
            .take(ITEMS_PER_FEED)
            .map(rss_entry)
            .collect(),
        "feed" if root.tag_name().namespace() == Some(ATOM_NS) => root
            .children()
            .filter(|n| is(*n, Some(ATOM_NS), "entry"))
            .take(ITEMS_PER_FEED)
            .map(atom_entry)
            .collect(),
        other => anyhow::bail!("unsupported feed root element <{other}>"),
    };

    Ok(entries.into_iter().map(|entry| normalize(entry, source)).collect())
}

fn rss_entry(item: Node) -> RawEntry {
    let enclosure = child(item, None, "enclosure").and_then(|n| n.attribute("url"));
    let media_content = child(item, Some(MEDIA_NS), "content").and_then(|n| n.attribute("url"));
    let media_thumbnail = child(item, Some(MEDIA_NS), "thumbnail").and_then(|n| n.attribute("url"));

    RawEntry {
        title: child_text(item, None, "title").unwrap_or_default(),
        link: child_text(item, None, "link").unwrap_or_default(),
        summary: child_text(item, None, "description"),
        content: child_text(item, Some(CONTENT_NS), "encoded"),
        published: child_text(item, None, "pubDate").or_else(|| child_text(item, Some(DC_NS), "date")),
        author: child_text(item, Some(DC_NS), "creator").or_else(|| child_text(item, None, "author")),
        guid: child_text(item, None, "guid"),
        image: media_content.or(media_thumbnail).or(enclosure).map(str::to_owned),
    }
}

fn atom_entry(entry: Node) -> RawEntry {
    let links: Vec<Node> = entry.children().filter(|n| is(*n, Some(ATOM_NS), "link")).collect();
    let link = links
        .iter()
        .find(|n| matches!(n.attribute("rel"), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|n| n.attribute("href"))
        .unwrap_or_default()
        .to_string();
    let enclosure = links
        .iter()
        .find(|n| n.attribute("rel") == Some("enclosure"))
        .and_then(|n| n.attribute("href"));
    let media_thumbnail = child(entry, Some(MEDIA_NS), "thumbnail").and_then(|n| n.attribute("url"));

    RawEntry {
        title: child_text(entry, Some(ATOM_NS), "title").unwrap_or_default(),
        link,
        summary: child_text(entry, Some(ATOM_NS), "summary"),
        content: child_text(entry, Some(ATOM_NS), "content"),
        published: child_text(entry, Some(ATOM_NS), "published")
            .or_else(|| child_text(entry, Some(ATOM_NS), "updated")),
        author: child(entry, Some(ATOM_NS), "author").and_then(|a| child_text(a, Some(ATOM_NS), "name")),
        guid: child_text(entry, Some(ATOM_NS), "id"),
        image: media_thumbnail.or(enclosure).map(str::to_owned),
    }
}

fn normalize(entry: RawEntry, source: &FeedSource) -> Article {
    let content = entry
        .content
        .clone()
        .or_else(|| entry.summary.clone())
        .unwrap_or_default();
    let snippet = entry.summary.as_deref().unwrap_or(&content);
    let image = entry
        .image
        .or_else(|| IMG_SRC.captures(&content).map(|caps| caps[1].to_string()));

    Article {
        id: article_id(&entry.link),
        description: clean_description(snippet),
        pub_date: entry.published.as_deref().and_then(parse_date),
        author: entry.author.unwrap_or_else(|| source.name.clone()),
        source: source.name.clone(),
        category: source.category.clone(),
        guid: entry.guid.unwrap_or_else(|| entry.link.clone()),
        title: entry.title,
        link: entry.link,
        content,
        image,
    }
}

/// Stable 16-char id derived from the article link.
pub fn article_id(link: &str) -> String {
    let digest = Sha256::digest(link.as_bytes());
    let mut id = URL_SAFE_NO_PAD.encode(digest);
    id.truncate(ID_CHARS);
    id
}

pub fn clean_description(text: &str) -> String {
    html::truncate_chars(html::strip_tags(text).trim(), DESCRIPTION_CHARS)
}

/// RFC 2822 (RSS) or RFC 3339 (Atom).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

fn is(node: Node, namespace: Option<&str>, name: &str) -> bool {
    node.is_element() && node.tag_name().namespace() == namespace && node.tag_name().name() == name
}

fn child<'a, 'input>(node: Node<'a, 'input>, namespace: Option<&str>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is(*n, namespace, name))
}

/// All text beneath the child element, with CDATA included. Empty text counts as absent.
fn child_text(node: Node, namespace: Option<&str>, name: &str) -> Option<String> {
    let element = child(node, namespace, name)?;
    let text: String = element
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
