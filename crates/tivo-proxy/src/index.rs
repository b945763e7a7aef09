//! Channel index and fuzzy resolution
//!
//! The index holds three views of one channel lineup: by call-sign name, by
//! channel number and by affiliate. All three are rebuilt together from the
//! same filtered snapshot by [`ChannelIndex::fill`] and are never edited
//! individually.

use std::collections::HashMap;

use tivo_protocol::{Channel, CommandError};
use tracing::{debug, info};

use crate::scorer::Scorer;

/// Keywords that distinguish otherwise identically named channels
pub const REFINERS: [&str; 3] = ["sports", "business", "news"];

/// Which view of the index to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Keyed by channel name
    Name,
    /// Keyed by channel number
    Number,
    /// Keyed by affiliate
    Affiliate,
}

/// One keyed view over the lineup
///
/// Iteration follows the order in which each key first appeared. A later
/// channel with a duplicate key replaces the earlier channel but keeps its
/// position.
#[derive(Debug, Clone, Default)]
pub struct ChannelView {
    entries: Vec<(String, Channel)>,
    positions: HashMap<String, usize>,
}

impl ChannelView {
    fn build<'a, I, F>(channels: I, key: F) -> Self
    where
        I: IntoIterator<Item = &'a Channel>,
        F: Fn(&Channel) -> &str,
    {
        let mut view = ChannelView::default();
        for channel in channels {
            let k = key(channel);
            match view.positions.get(k) {
                Some(&pos) => view.entries[pos].1 = channel.clone(),
                None => {
                    view.positions.insert(k.to_string(), view.entries.len());
                    view.entries.push((k.to_string(), channel.clone()));
                }
            }
        }
        view
    }

    /// Exact lookup by key
    pub fn get(&self, key: &str) -> Option<&Channel> {
        self.positions.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Iterate over `(key, channel)` pairs in view order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Channel)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Iterate over keys in view order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the view is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A ranked candidate from fuzzy resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMatch {
    /// Key of the matching entry in the queried view
    pub key: String,
    /// Similarity score in `0..=100`
    pub score: u8,
}

/// Indexed channel lineup
#[derive(Debug, Clone, Default)]
pub struct ChannelIndex {
    hd_only: bool,
    scorer: Scorer,
    by_name: ChannelView,
    by_number: ChannelView,
    by_affiliate: ChannelView,
}

impl ChannelIndex {
    /// Create an empty index
    pub fn new(hd_only: bool, scorer: Scorer) -> Self {
        Self {
            hd_only,
            scorer,
            ..Default::default()
        }
    }

    /// Create an index and fill it from `channels`
    pub fn with_channels(hd_only: bool, scorer: Scorer, channels: &[Channel]) -> Self {
        let mut index = Self::new(hd_only, scorer);
        index.fill(channels);
        index
    }

    /// Rebuild all three views from `channels`
    ///
    /// When the index is HD-only, non-HD channels are dropped before any view
    /// is built.
    pub fn fill(&mut self, channels: &[Channel]) {
        let filtered: Vec<&Channel> = channels
            .iter()
            .filter(|c| !self.hd_only || c.is_hdtv)
            .collect();

        let by_name = ChannelView::build(filtered.iter().copied(), |c| c.name.as_str());
        let by_number = ChannelView::build(filtered.iter().copied(), |c| c.channel_number.as_str());
        let by_affiliate = ChannelView::build(filtered.iter().copied(), |c| c.affiliate.as_str());

        self.by_name = by_name;
        self.by_number = by_number;
        self.by_affiliate = by_affiliate;

        info!(
            "Channel index built from {} of {} channels ({} names, {} numbers, {} affiliates)",
            filtered.len(),
            channels.len(),
            self.by_name.len(),
            self.by_number.len(),
            self.by_affiliate.len()
        );
    }

    /// Access one of the three views
    pub fn view(&self, view: View) -> &ChannelView {
        match view {
            View::Name => &self.by_name,
            View::Number => &self.by_number,
            View::Affiliate => &self.by_affiliate,
        }
    }

    /// Rank every candidate in `view` against a free-text `query`
    ///
    /// With `prefer_hd` (and an index that is not already HD-only), non-HD
    /// channels are left out. Candidates whose key mentions a refiner keyword
    /// the query does not use are left out too, so "ESPN" never ranks
    /// "ESPN News".
    pub fn resolve(&self, query: &str, view: View, prefer_hd: bool) -> Vec<ChannelMatch> {
        let unused = unused_refiners(query);
        let drop_sd = prefer_hd && !self.hd_only;

        let candidates = self.view(view).iter().filter(|(key, channel)| {
            if drop_sd && !channel.is_hdtv {
                return false;
            }
            let key = key.to_lowercase();
            !unused.iter().any(|refiner| key.contains(refiner))
        });

        let ranked: Vec<ChannelMatch> = self
            .scorer
            .extract_bests(query, candidates.map(|(key, _)| key), None)
            .into_iter()
            .map(|(key, score)| ChannelMatch {
                key: key.to_string(),
                score,
            })
            .collect();

        debug!(
            "Resolved {:?} against {:?} view: {} candidates, best {:?}",
            query,
            view,
            ranked.len(),
            ranked.first()
        );
        ranked
    }

    /// Fuzzy lookup against channel names
    pub fn get_by_name(&self, query: &str, prefer_hd: bool) -> Vec<ChannelMatch> {
        self.resolve(query, View::Name, prefer_hd)
    }

    /// Fuzzy lookup against affiliates
    pub fn get_by_affiliate(&self, query: &str, prefer_hd: bool) -> Vec<ChannelMatch> {
        self.resolve(query, View::Affiliate, prefer_hd)
    }

    /// Exact lookup by channel number
    pub fn get_by_number(&self, number: &str) -> Result<&Channel, CommandError> {
        self.by_number
            .get(number)
            .ok_or_else(|| CommandError::ChannelNotFound(number.to_string()))
    }

    /// Number of indexed channels (distinct channel numbers)
    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    /// Returns true if nothing has been indexed
    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }
}

/// Refiner keywords absent from the whitespace-separated tokens of `query`
pub fn unused_refiners(query: &str) -> Vec<&'static str> {
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    REFINERS
        .iter()
        .copied()
        .filter(|refiner| !tokens.iter().any(|t| t == refiner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineup() -> Vec<Channel> {
        vec![
            Channel::new("ESPN", "206", "ESPN", true, 1),
            Channel::new("ESPN News", "207", "ESPN", true, 2),
            Channel::new("WGN", "9", "CW", false, 3),
            Channel::new("WGNHD", "509", "CW", true, 4),
        ]
    }

    #[test]
    fn test_fill_hd_only_filters_every_view() {
        let index = ChannelIndex::with_channels(true, Scorer::Ratio, &lineup());

        assert_eq!(index.len(), 3);
        assert!(index.view(View::Name).get("WGN").is_none());
        assert!(index.get_by_number("9").is_err());
        assert_eq!(index.view(View::Affiliate).get("CW").unwrap().name, "WGNHD");
    }

    #[test]
    fn test_fill_last_write_wins_keeps_position() {
        let channels = vec![
            Channel::new("A", "1", "NET", true, 1),
            Channel::new("B", "2", "OTHER", true, 2),
            Channel::new("C", "3", "NET", true, 3),
        ];
        let index = ChannelIndex::with_channels(false, Scorer::Ratio, &channels);
        let affiliates = index.view(View::Affiliate);

        assert_eq!(affiliates.len(), 2);
        assert_eq!(affiliates.keys().collect::<Vec<_>>(), vec!["NET", "OTHER"]);
        assert_eq!(affiliates.get("NET").unwrap().name, "C");
    }

    #[test]
    fn test_refill_replaces_all_views() {
        let mut index = ChannelIndex::with_channels(false, Scorer::Ratio, &lineup());
        index.fill(&[Channel::new("HBO", "800", "HBO", true, 9)]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.view(View::Name).len(), 1);
        assert_eq!(index.view(View::Affiliate).len(), 1);
        assert!(index.get_by_number("206").is_err());
    }

    #[test]
    fn test_get_by_number() {
        let index = ChannelIndex::with_channels(false, Scorer::Ratio, &lineup());

        assert_eq!(index.get_by_number("206").unwrap().name, "ESPN");
        assert_eq!(
            index.get_by_number("20"),
            Err(CommandError::ChannelNotFound("20".into()))
        );
    }

    #[test]
    fn test_unused_refiners() {
        assert_eq!(unused_refiners("ESPN"), vec!["sports", "business", "news"]);
        assert_eq!(unused_refiners("espn  NEWS"), vec!["sports", "business"]);
        assert_eq!(unused_refiners("newsy"), vec!["sports", "business", "news"]);
    }

    #[test]
    fn test_resolve_drops_unused_refiners() {
        let index = ChannelIndex::with_channels(true, Scorer::Ratio, &lineup());

        let plain = index.get_by_name("ESPN", false);
        assert!(plain.iter().all(|m| m.key != "ESPN News"));
        assert_eq!(plain[0], ChannelMatch { key: "ESPN".into(), score: 100 });

        let news = index.get_by_name("ESPN news", false);
        assert_eq!(news[0].key, "ESPN News");
    }

    #[test]
    fn test_resolve_prefer_hd() {
        let index = ChannelIndex::with_channels(false, Scorer::Ratio, &lineup());

        let any = index.get_by_name("WGN", false);
        assert_eq!(any[0].key, "WGN");

        let hd = index.get_by_name("WGN", true);
        assert!(hd.iter().all(|m| m.key != "WGN"));
        assert_eq!(hd[0].key, "WGNHD");
    }

    #[test]
    fn test_resolve_returns_all_candidates_ranked() {
        let index = ChannelIndex::with_channels(false, Scorer::Ratio, &lineup());
        let ranked = index.get_by_name("wgn", false);

        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
