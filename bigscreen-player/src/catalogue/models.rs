//! Wire models for the media service
//!
//! Every response is a JSON envelope with a `data` payload. Item listings
//! wrap a `mediaItems` array, playlist listings put the array directly in
//! `data`, and single-item lookups wrap a `mediaItem` object.

use serde::{Deserialize, Serialize};

/// Response envelope wrapping every payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Capabilities granted to the presented API key
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    /// May resolve on-demand video URLs
    #[serde(default)]
    pub vod_uris: bool,
    /// May resolve live stream URLs
    #[serde(default)]
    pub stream_uris: bool,
}

/// Payload of an item listing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemsPage {
    pub media_items: Vec<MediaItem>,
}

/// Payload of a single-item lookup
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemLookup {
    pub media_item: MediaItem,
}

/// A piece of content in the catalogue, with an on-demand variant and/or a
/// live variant
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: u64,

    /// On-demand variant, if the item has one
    #[serde(default)]
    pub vod: Option<VodInfo>,

    /// Live variant, if the item has one
    #[serde(default)]
    pub live_stream: Option<LiveStreamInfo>,
}

/// On-demand variant of a media item
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VodInfo {
    pub available: bool,

    #[serde(default)]
    pub qualities: Vec<Quality>,

    #[serde(default)]
    pub url_data: Vec<QualityUrls>,
}

/// Live variant of a media item
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamInfo {
    pub state: LiveStreamState,

    pub live_stream_id: u64,

    #[serde(default)]
    pub qualities: Vec<Quality>,

    #[serde(default)]
    pub url_data: Vec<QualityUrls>,
}

/// Broadcast state of a live stream. Anything the service reports other than
/// `LIVE` means the stream cannot be watched right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveStreamState {
    Live,
    #[serde(other)]
    NotLive,
}

/// A quality level offered by an item
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Quality {
    pub id: u32,

    #[serde(default)]
    pub name: Option<String>,
}

/// The URLs an item offers at one quality level
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityUrls {
    pub quality: Quality,

    #[serde(default)]
    pub urls: Vec<UrlEntry>,
}

/// One content-negotiated URL
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UrlEntry {
    /// Content type of the resource behind `url`
    #[serde(rename = "type")]
    pub content_type: String,

    pub url: String,
}
