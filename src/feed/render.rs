//! RSS 2.0 rendering of cached broadcasts.
//!
//! Produces a podcast feed with the iTunes and Atom namespaces. Channel
//! metadata comes from the first record; every record becomes one item.

use chrono::Utc;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::broadcast::{BroadcastRecord, ChannelProgramme};
use crate::error::{FeedError, Result};
use crate::feed::format::{
    cdata_sections, format_duration, format_rfc2822, item_guid, xml_text,
};

/// Atom namespace, used for the self link.
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// iTunes podcast namespace.
const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";

/// MIME type announced for enclosures.
const ENCLOSURE_TYPE: &str = "audio/mpeg";

/// Request-derived inputs of a render.
#[derive(Debug, Clone)]
pub struct FeedRequest<'a> {
    /// Feed being rendered.
    pub key: &'a ChannelProgramme,
    /// Full URL the feed was requested at.
    pub self_url: &'a str,
    /// Site root, the channel link of last resort.
    pub site_url: &'a str,
    /// Channel language.
    pub language: &'a str,
}

/// Channel-level metadata resolved from the first record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    /// Channel title.
    pub title: String,
    /// Channel link.
    pub link: String,
    /// Channel description.
    pub description: String,
    /// `lastBuildDate` value.
    pub last_build_date: String,
}

impl ChannelInfo {
    /// Resolve channel metadata.
    ///
    /// Each field prefers the first record's programme metadata, then the
    /// record's own field, then a request-derived default.
    pub fn resolve(first: &BroadcastRecord, request: &FeedRequest<'_>) -> Self {
        let programme = first.programme();

        let title = programme
            .and_then(|p| p.name())
            .or_else(|| first.name())
            .unwrap_or_else(|| request.key.programme.clone());
        let link = programme
            .and_then(|p| p.url())
            .or_else(|| first.url())
            .unwrap_or_else(|| request.site_url.to_string());
        let description = programme
            .and_then(|p| p.description())
            .or_else(|| first.description())
            .unwrap_or_else(|| format!("Episodes for {title}"));
        let last_build_date = first
            .aired_at()
            .and_then(|from| format_rfc2822(&from))
            .unwrap_or_else(|| Utc::now().to_rfc2822());

        Self {
            title,
            link,
            description,
            last_build_date,
        }
    }
}

/// Render a feed document.
///
/// # Errors
///
/// Returns [`FeedError::NotFound`] when there are no records, and
/// [`FeedError::Xml`] if the document cannot be written.
pub fn render_feed(request: &FeedRequest<'_>, records: &[BroadcastRecord]) -> Result<String> {
    let first = records
        .first()
        .ok_or_else(|| FeedError::NotFound(format!("broadcasts for {}", request.key)))?;
    let channel = ChannelInfo::resolve(first, request);

    let mut xml = RssWriter::new();
    xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:atom", ATOM_NS));
    rss.push_attribute(("xmlns:itunes", ITUNES_NS));
    xml.event(Event::Start(rss))?;
    xml.event(Event::Start(BytesStart::new("channel")))?;

    xml.text_element("title", &channel.title)?;
    xml.text_element("link", &channel.link)?;
    xml.cdata_element("description", &channel.description)?;
    xml.text_element("language", request.language)?;
    xml.text_element("lastBuildDate", &channel.last_build_date)?;

    let mut self_link = BytesStart::new("atom:link");
    self_link.push_attribute(("href", &*xml_text(request.self_url)));
    self_link.push_attribute(("rel", "self"));
    self_link.push_attribute(("type", "application/rss+xml"));
    xml.event(Event::Empty(self_link))?;

    for record in records {
        write_item(&mut xml, record, &channel)?;
    }

    xml.event(Event::End(BytesEnd::new("channel")))?;
    xml.event(Event::End(BytesEnd::new("rss")))?;

    xml.finish()
}

/// Write one `<item>`.
fn write_item(xml: &mut RssWriter, record: &BroadcastRecord, channel: &ChannelInfo) -> Result<()> {
    let title = record.name().unwrap_or_else(|| channel.title.clone());
    let link = record.url().unwrap_or_else(|| channel.link.clone());
    let guid = item_guid(record, &title, &link);
    let description = record
        .description()
        .unwrap_or_else(|| channel.description.clone());
    let pub_date = record.aired_at().and_then(|from| format_rfc2822(&from));
    let asset = record.audio_asset();
    let audio_url = asset.and_then(|a| a.url());
    let duration = asset
        .and_then(|a| a.duration_ms())
        .and_then(format_duration);

    xml.event(Event::Start(BytesStart::new("item")))?;
    xml.text_element("title", &title)?;
    xml.text_element("link", &link)?;

    let mut guid_start = BytesStart::new("guid");
    guid_start.push_attribute(("isPermaLink", "false"));
    xml.event(Event::Start(guid_start))?;
    xml.event(Event::Text(BytesText::new(&xml_text(&guid))))?;
    xml.event(Event::End(BytesEnd::new("guid")))?;

    xml.cdata_element("description", &description)?;

    if let Some(pub_date) = pub_date {
        xml.text_element("pubDate", &pub_date)?;
    }

    if let Some(audio_url) = audio_url {
        let mut enclosure = BytesStart::new("enclosure");
        enclosure.push_attribute(("url", &*xml_text(&audio_url)));
        enclosure.push_attribute(("length", "0"));
        enclosure.push_attribute(("type", ENCLOSURE_TYPE));
        xml.event(Event::Empty(enclosure))?;
    }

    if let Some(duration) = duration {
        xml.text_element("itunes:duration", &duration)?;
    }

    xml.event(Event::End(BytesEnd::new("item")))
}

/// Indenting XML writer with RSS-shaped helpers.
struct RssWriter {
    inner: Writer<Vec<u8>>,
}

impl RssWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| FeedError::Xml(e.to_string()))
    }

    /// `<name>escaped text</name>`
    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.event(Event::Start(BytesStart::new(name)))?;
        self.event(Event::Text(BytesText::new(&xml_text(text))))?;
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// `<name><![CDATA[text]]></name>`, split where the text contains `]]>`.
    fn cdata_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.event(Event::Start(BytesStart::new(name)))?;
        for section in cdata_sections(&xml_text(text)) {
            self.event(Event::CData(BytesCData::new(section)))?;
        }
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.inner.into_inner())
            .map_err(|e| FeedError::Xml(format!("generated feed is not UTF-8: {e}")))
    }
}
