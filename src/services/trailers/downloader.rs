//! Trailer Catalog Downloader
//!
//! Fetches the trailer catalog page and pulls one [`TrailerRecord`] out of
//! every `<movieinfo>` block. The whole page is downloaded on every call.

use super::types::TrailerRecord;
use crate::models::{PersonInfo, PersonKind};
use crate::services::metrics::TRAILERS_SKIPPED;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Public trailer catalog
pub const DEFAULT_CATALOG_URL: &str = "https://trailers.apple.com/trailers/home/xml/current.xml";

/// 100ns ticks per second
const TICKS_PER_SECOND: i64 = 10_000_000;

fn tag_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{0}\b[^>]*>(.*?)</{0}>", tag)).unwrap()
}

lazy_static! {
    static ref MOVIEINFO_REGEX: Regex = tag_regex("movieinfo");

    // Sections
    static ref INFO_REGEX: Regex = tag_regex("info");
    static ref CAST_REGEX: Regex = tag_regex("cast");
    static ref GENRE_REGEX: Regex = tag_regex("genre");
    static ref POSTER_REGEX: Regex = tag_regex("poster");
    static ref PREVIEW_REGEX: Regex = tag_regex("preview");

    // Fields
    static ref TITLE_REGEX: Regex = tag_regex("title");
    static ref RATING_REGEX: Regex = tag_regex("rating");
    static ref USER_RATING_REGEX: Regex = tag_regex("userrating");
    static ref STUDIO_REGEX: Regex = tag_regex("studio");
    static ref POSTDATE_REGEX: Regex = tag_regex("postdate");
    static ref RELEASEDATE_REGEX: Regex = tag_regex("releasedate");
    static ref RUNTIME_REGEX: Regex = tag_regex("runtime");
    static ref DIRECTOR_REGEX: Regex = tag_regex("director");
    static ref DESCRIPTION_REGEX: Regex = tag_regex("description");
    static ref NAME_REGEX: Regex = tag_regex("name");
    static ref LOCATION_REGEX: Regex = tag_regex("location");
    static ref XLARGE_REGEX: Regex = tag_regex("xlarge");
    static ref LARGE_REGEX: Regex = tag_regex("large");

    static ref CDATA_REGEX: Regex = Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap();
    static ref ENTITY_REGEX: Regex = Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap();
}

#[derive(Debug, Error)]
pub enum TrailerError {
    #[error("trailer catalog unreachable: {0}")]
    Unreachable(String),
    #[error("trailer catalog returned HTTP {0}")]
    Http(u16),
}

/// Downloads and parses the trailer catalog
#[derive(Clone)]
pub struct TrailerListingDownloader {
    http: Client,
    catalog_url: String,
}

impl TrailerListingDownloader {
    pub fn new(http: Client, catalog_url: impl Into<String>) -> Self {
        Self {
            http,
            catalog_url: catalog_url.into(),
        }
    }

    /// Download the catalog and return every well-formed entry
    pub async fn get_trailer_list(&self) -> Result<Vec<TrailerRecord>, TrailerError> {
        debug!("Downloading trailer catalog from {}", self.catalog_url);

        let response = self.http.get(&self.catalog_url).send().await.map_err(|e| {
            if e.is_timeout() {
                TrailerError::Unreachable("connection timeout".to_string())
            } else {
                TrailerError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrailerError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TrailerError::Unreachable(e.to_string()))?;

        let trailers = parse_catalog(&body);
        info!("Trailer catalog parsed: {} entries", trailers.len());
        Ok(trailers)
    }
}

/// Parse every `<movieinfo>` block, skipping malformed ones
pub fn parse_catalog(body: &str) -> Vec<TrailerRecord> {
    MOVIEINFO_REGEX
        .captures_iter(body)
        .filter_map(|caps| {
            let block = caps.get(1).map_or("", |m| m.as_str());
            match parse_movie(block) {
                Ok(record) => Some(record),
                Err(reason) => {
                    TRAILERS_SKIPPED.inc();
                    warn!("Skipping trailer entry: {}", reason);
                    None
                }
            }
        })
        .collect()
}

fn parse_movie(block: &str) -> Result<TrailerRecord, String> {
    let info = section(&INFO_REGEX, block).unwrap_or("");

    let name = field(&TITLE_REGEX, info).ok_or("missing title")?;
    let trailer_url = section(&PREVIEW_REGEX, block)
        .and_then(|preview| field(&LARGE_REGEX, preview))
        .ok_or_else(|| format!("'{}' has no trailer URL", name))?;
    let post_date = field(&POSTDATE_REGEX, info)
        .and_then(|d| parse_date(&d))
        .ok_or_else(|| format!("'{}' has no valid post date", name))?;

    let premiere_date = field(&RELEASEDATE_REGEX, info).and_then(|d| parse_date(&d));
    let poster = section(&POSTER_REGEX, block).unwrap_or("");

    let mut people: Vec<PersonInfo> = section(&CAST_REGEX, block)
        .map(|cast| {
            names(cast)
                .into_iter()
                .map(|name| PersonInfo {
                    name,
                    kind: PersonKind::Actor,
                })
                .collect()
        })
        .unwrap_or_default();
    if let Some(directors) = field(&DIRECTOR_REGEX, info) {
        people.extend(
            directors
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| PersonInfo {
                    name: d.to_string(),
                    kind: PersonKind::Director,
                }),
        );
    }

    Ok(TrailerRecord {
        name,
        trailer_url,
        image_url: field(&LOCATION_REGEX, poster),
        hd_image_url: field(&XLARGE_REGEX, poster),
        official_rating: field(&RATING_REGEX, info),
        community_rating: field(&USER_RATING_REGEX, info).and_then(|r| r.parse().ok()),
        genres: section(&GENRE_REGEX, block)
            .map(names)
            .unwrap_or_default(),
        studios: field(&STUDIO_REGEX, info).into_iter().collect(),
        people,
        overview: field(&DESCRIPTION_REGEX, info),
        post_date,
        production_year: premiere_date.map(|d| d.year()),
        premiere_date,
        run_time_ticks: field(&RUNTIME_REGEX, info).and_then(|r| parse_runtime(&r)),
    })
}

/// Raw inner markup of the first `regex` match
fn section<'a>(regex: &Regex, text: &'a str) -> Option<&'a str> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Decoded, trimmed text of the first `regex` match; empty counts as absent
fn field(regex: &Regex, text: &str) -> Option<String> {
    section(regex, text)
        .map(decode_text)
        .filter(|value| !value.is_empty())
}

/// Every `<name>` inside a cast or genre section
fn names(text: &str) -> Vec<String> {
    NAME_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_text(m.as_str()))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Unwrap CDATA, decode entities, trim
pub fn decode_text(raw: &str) -> String {
    let unwrapped = CDATA_REGEX.replace_all(raw, "$1");
    ENTITY_REGEX
        .replace_all(&unwrapped, |caps: &Captures| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .trim()
        .to_string()
}

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        numeric => {
            let code = if let Some(hex) = numeric
                .strip_prefix("#x")
                .or_else(|| numeric.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                numeric.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

/// Catalog dates are `YYYY-MM-DD`, occasionally `MM/DD/YYYY`
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// `m:ss` or `h:mm:ss` to ticks
fn parse_runtime(raw: &str) -> Option<i64> {
    let mut seconds: i64 = 0;
    for part in raw.trim().split(':') {
        seconds = seconds * 60 + part.trim().parse::<i64>().ok()?;
    }
    Some(seconds * TICKS_PER_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use axum::{http::StatusCode, routing::get, Router};
    use chrono::TimeZone;

    const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<records date="Mon, 16 Jun 2014 10:15:00 -0700">
<movieinfo id="15432">
  <info>
    <title>Fast &amp; Curious</title>
    <runtime>2:15</runtime>
    <rating>PG-13</rating>
    <studio>Big Studio</studio>
    <postdate>2014-06-10</postdate>
    <releasedate>2014-07-25</releasedate>
    <director>Jane Doe, John Roe</director>
    <description><![CDATA[Two friends &quot;race&quot; across town.]]></description>
  </info>
  <cast><name>Actor One</name><name>Actor &#233;lan</name></cast>
  <genre><name>Action</name><name>Comedy</name></genre>
  <poster><location>http://img/poster.jpg</location><xlarge>http://img/poster-xl.jpg</xlarge></poster>
  <preview><large filesize="1000">http://video/fast_h720p.mov</large></preview>
</movieinfo>
<movieinfo id="15433">
  <info><title>No Preview</title><postdate>2014-06-11</postdate></info>
  <preview></preview>
</movieinfo>
<movieinfo id="15434">
  <info><title>Bad Date</title><postdate>sometime</postdate></info>
  <preview><large>http://video/bad.mov</large></preview>
</movieinfo>
<movieinfo id="15435">
  <info><title>Plain</title><postdate>2014-06-12</postdate></info>
  <poster><location>http://img/plain.jpg</location></poster>
  <preview><large>http://video/plain.mov</large></preview>
</movieinfo>
</records>"#;

    #[test]
    fn test_parse_catalog_skips_malformed_entries() {
        let trailers = parse_catalog(CATALOG);

        assert_eq!(trailers.len(), 2);
        assert_eq!(trailers[0].name, "Fast & Curious");
        assert_eq!(trailers[1].name, "Plain");
    }

    #[test]
    fn test_parse_catalog_fields() {
        let trailers = parse_catalog(CATALOG);
        let fast = &trailers[0];

        assert_eq!(fast.trailer_url, "http://video/fast_h720p.mov");
        assert_eq!(fast.best_image_url(), Some("http://img/poster-xl.jpg"));
        assert_eq!(fast.official_rating.as_deref(), Some("PG-13"));
        assert_eq!(fast.studios, vec!["Big Studio".to_string()]);
        assert_eq!(fast.genres, vec!["Action".to_string(), "Comedy".to_string()]);
        assert_eq!(fast.overview.as_deref(), Some(r#"Two friends "race" across town."#));
        assert_eq!(fast.post_date, Utc.with_ymd_and_hms(2014, 6, 10, 0, 0, 0).unwrap());
        assert_eq!(fast.production_year, Some(2014));
        assert_eq!(fast.run_time_ticks, Some(135 * TICKS_PER_SECOND));

        let actors: Vec<&str> = fast
            .people
            .iter()
            .filter(|p| p.kind == PersonKind::Actor)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(actors, vec!["Actor One", "Actor élan"]);
        assert_eq!(
            fast.people.iter().filter(|p| p.kind == PersonKind::Director).count(),
            2
        );

        let plain = &trailers[1];
        assert_eq!(plain.best_image_url(), Some("http://img/plain.jpg"));
        assert!(plain.people.is_empty());
        assert_eq!(plain.premiere_date, None);
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text("  Tom &amp; Jerry "), "Tom & Jerry");
        assert_eq!(decode_text("&#x41;&#66;&unknown;"), "AB&unknown;");
        assert_eq!(decode_text("<![CDATA[a < b]]>"), "a < b");
    }

    #[test]
    fn test_parse_runtime() {
        assert_eq!(parse_runtime("2:15"), Some(135 * TICKS_PER_SECOND));
        assert_eq!(parse_runtime("1:00:00"), Some(3600 * TICKS_PER_SECOND));
        assert_eq!(parse_runtime("n/a"), None);
    }

    #[tokio::test]
    async fn test_get_trailer_list_downloads_catalog() {
        let app = Router::new().route("/current.xml", get(|| async { CATALOG }));
        let base = test_support::serve(app).await;
        let downloader =
            TrailerListingDownloader::new(test_support::client(), format!("{}/current.xml", base));

        let trailers = downloader.get_trailer_list().await.unwrap();
        assert_eq!(trailers.len(), 2);
    }

    #[tokio::test]
    async fn test_get_trailer_list_http_error() {
        let app = Router::new().route("/current.xml", get(|| async { StatusCode::NOT_FOUND }));
        let base = test_support::serve(app).await;
        let downloader =
            TrailerListingDownloader::new(test_support::client(), format!("{}/current.xml", base));

        assert!(matches!(
            downloader.get_trailer_list().await,
            Err(TrailerError::Http(404))
        ));
    }
}
