// src/feed.rs
//! RSS 2.0 output. Pure formatting: ordering, the item cap, and
//! serialization — deduplication already happened upstream.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::path::Path;

use crate::config::FeedMode;
use crate::seen::write_atomic;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    /// Rendered HTML for the description block (highlighted excerpt plus a
    /// backlink); emitted inside CDATA.
    pub description_html: String,
    pub published: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ChannelMeta {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl ChannelMeta {
    pub fn for_mode(mode: FeedMode, lookback_days: i64) -> Self {
        match mode {
            FeedMode::Filtered => Self {
                title: "SEC Schedule 13D Item 4 (Keyword Filtered)".to_string(),
                link: "https://www.sec.gov".to_string(),
                description:
                    "Item 4 from Schedule 13D and 13D/A filings containing specified keywords"
                        .to_string(),
            },
            FeedMode::Firehose => Self {
                title: "SEC Schedule 13D and 13D/A Filings".to_string(),
                link: "https://www.sec.gov".to_string(),
                description: format!(
                    "All SC 13D and 13D/A filings from the last {lookback_days} days"
                ),
            },
        }
    }
}

fn write_text_element<W: std::io::Write>(
    w: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Serialize the channel: items sorted by publish date descending,
/// truncated to `cap`.
pub fn build_rss(channel: &ChannelMeta, items: &[FeedItem], cap: usize) -> Result<String> {
    let mut sorted: Vec<&FeedItem> = items.iter().collect();
    sorted.sort_by(|a, b| b.published.cmp(&a.published));
    sorted.truncate(cap);

    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss_start = BytesStart::new("rss");
    rss_start.push_attribute(("version", "2.0"));
    w.write_event(Event::Start(rss_start))?;
    w.write_event(Event::Start(BytesStart::new("channel")))?;
    write_text_element(&mut w, "title", &channel.title)?;
    write_text_element(&mut w, "link", &channel.link)?;
    write_text_element(&mut w, "description", &channel.description)?;

    for item in sorted {
        w.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut w, "title", &item.title)?;
        write_text_element(&mut w, "link", &item.link)?;
        write_text_element(&mut w, "pubDate", &item.published.to_rfc2822())?;
        w.write_event(Event::Start(BytesStart::new("description")))?;
        w.write_event(Event::CData(BytesCData::new(item.description_html.as_str())))?;
        w.write_event(Event::End(BytesEnd::new("description")))?;
        w.write_event(Event::End(BytesEnd::new("item")))?;
    }

    w.write_event(Event::End(BytesEnd::new("channel")))?;
    w.write_event(Event::End(BytesEnd::new("rss")))?;

    String::from_utf8(w.into_inner()).context("rss output is not valid utf-8")
}

/// Atomic whole-file write of the finished feed. Failure here is fatal to
/// the run.
pub fn write_feed(path: &Path, xml: &str) -> Result<()> {
    write_atomic(path, xml.as_bytes())
}
