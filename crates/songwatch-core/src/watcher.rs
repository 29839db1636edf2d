use tracing::{debug, info, warn};

use crate::dom::{Document, MutationRecord, Node};
use crate::error::SongwatchError;
use crate::event_log::{EventLog, WatchEvent};
use crate::host::NotifyHost;
use crate::selectors::SelectorTable;
use crate::snapshot::{self, TrackSnapshot};

/// Title, artist and album of the most recently notified track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastReported {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl LastReported {
    fn matches(&self, track: &TrackSnapshot) -> bool {
        (self.title.as_str(), self.artist.as_str(), self.album.as_str()) == track.identity()
    }

    fn record(&mut self, track: &TrackSnapshot) {
        self.title.clone_from(&track.title);
        self.artist.clone_from(&track.artist);
        self.album.clone_from(&track.album);
    }
}

/// State that lives for one page session: the attach guard and the
/// last-reported track.
#[derive(Debug, Clone, Default)]
pub struct WatchContext {
    attached: bool,
    last: LastReported,
}

/// Result of an attach call.
#[derive(Debug, Clone)]
pub enum AttachOutcome<N> {
    /// Guard was unset; the caller should observe this container.
    Attached(N),
    /// A previous attach already registered the subscription.
    AlreadyAttached,
}

/// What happened to a single inserted node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionOutcome {
    /// Not a marker insertion.
    Ignored,
    /// Marker insertion for the track already reported.
    Duplicate,
    /// The host was notified of a new track.
    Notified(TrackSnapshot),
}

/// Per-batch tally of insertion outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub ignored: usize,
    pub duplicates: usize,
    pub notified: usize,
}

impl BatchReport {
    fn count(&mut self, outcome: &InsertionOutcome) {
        match outcome {
            InsertionOutcome::Ignored => self.ignored += 1,
            InsertionOutcome::Duplicate => self.duplicates += 1,
            InsertionOutcome::Notified(_) => self.notified += 1,
        }
    }

    /// Add another batch's tally into this one.
    pub fn absorb(&mut self, other: BatchReport) {
        self.ignored += other.ignored;
        self.duplicates += other.duplicates;
        self.notified += other.notified;
    }
}

/// Watches marker insertions under the player's track-info container and
/// tells the host once per track change.
pub struct TrackWatcher<H> {
    selectors: SelectorTable,
    context: WatchContext,
    host: H,
    events: EventLog,
}

impl<H: NotifyHost> TrackWatcher<H> {
    pub fn new(selectors: SelectorTable, host: H) -> Self {
        Self {
            selectors,
            context: WatchContext::default(),
            host,
            events: EventLog::new(),
        }
    }

    /// Find the container to observe and arm the watcher.
    ///
    /// Safe to call repeatedly: once attached, later calls return
    /// [`AttachOutcome::AlreadyAttached`] without touching state. A missing
    /// container is an error and leaves the guard unset.
    pub fn attach<D: Document>(
        &mut self,
        document: &D,
    ) -> Result<AttachOutcome<D::Node>, SongwatchError> {
        if self.context.attached {
            debug!("Watcher already attached, skipping");
            self.events.push(WatchEvent::AlreadyAttached);
            return Ok(AttachOutcome::AlreadyAttached);
        }

        let selector = &self.selectors.container;
        let Some(container) = document.query_selector(selector) else {
            warn!(selector = %selector, "Track info container not found");
            self.events.push(WatchEvent::ContainerMissing {
                selector: selector.clone(),
            });
            return Err(SongwatchError::ContainerMissing {
                selector: selector.clone(),
            });
        };

        self.context.attached = true;
        self.context.last = LastReported::default();
        info!(container = %selector, marker = %self.selectors.marker, "Watcher attached");
        self.events.push(WatchEvent::Attached {
            container: selector.clone(),
        });
        Ok(AttachOutcome::Attached(container))
    }

    /// Process one mutation batch. Does nothing while detached.
    pub fn handle_batch<D, N>(&mut self, document: &D, records: &[MutationRecord<N>]) -> BatchReport
    where
        D: Document,
        N: Node,
    {
        let mut report = BatchReport::default();
        if !self.context.attached {
            return report;
        }

        for node in records.iter().flat_map(|r| r.added_nodes.iter()) {
            let outcome = self.handle_insertion(document, node);
            report.count(&outcome);
        }
        report
    }

    /// Process a single inserted node.
    pub fn handle_insertion<D, N>(&mut self, document: &D, node: &N) -> InsertionOutcome
    where
        D: Document,
        N: Node,
    {
        let marker = node.marker_name();
        if marker.as_deref() != Some(self.selectors.marker.as_str()) {
            debug!(marker = ?marker, "Ignoring insertion");
            self.events.push(WatchEvent::Ignored { marker });
            return InsertionOutcome::Ignored;
        }

        let track = snapshot::extract(document, &self.selectors);
        if self.context.last.matches(&track) {
            debug!(title = %track.title, "Same track as last reported");
            self.events.push(WatchEvent::Duplicate {
                title: track.title,
            });
            return InsertionOutcome::Duplicate;
        }

        info!(
            title = %track.title,
            artist = %track.artist,
            album = %track.album,
            duration = %track.duration,
            "Track changed"
        );
        self.host.notify_song(&track);
        self.context.last.record(&track);
        self.events.push(WatchEvent::Notified {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
        });
        InsertionOutcome::Notified(track)
    }

    pub fn is_attached(&self) -> bool {
        self.context.attached
    }

    pub fn last_reported(&self) -> &LastReported {
        &self.context.last
    }

    pub fn selectors(&self) -> &SelectorTable {
        &self.selectors
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, MemoryElement};
    use crate::host::RecordingHost;
    use crate::snapshot::UNKNOWN;

    fn page(title: &str, artist: &str, album: &str) -> MemoryDocument {
        MemoryDocument::new(vec![
            MemoryElement::new("div").with_id("playerSongInfo"),
            MemoryElement::new("div").with_id("playerSongTitle").with_text(title),
            MemoryElement::new("div").with_id("player-artist").with_text(artist),
            MemoryElement::new("div").with_class("player-album").with_text(album),
            MemoryElement::new("img")
                .with_id("playingAlbumArt")
                .with_src("//img.example/a.png"),
            MemoryElement::new("div")
                .with_id("time_container_duration")
                .with_text("3:21"),
        ])
    }

    fn marker_batch() -> Vec<MutationRecord<MemoryElement>> {
        vec![MutationRecord::new(vec![
            MemoryElement::new("div").with_class("text-wrapper"),
        ])]
    }

    fn attached_watcher(doc: &MemoryDocument) -> TrackWatcher<RecordingHost> {
        let mut watcher = TrackWatcher::new(SelectorTable::embedded(), RecordingHost::default());
        watcher.attach(doc).unwrap();
        watcher
    }

    #[test]
    fn test_first_track_notifies() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut watcher = attached_watcher(&doc);

        let report = watcher.handle_batch(&doc, &marker_batch());
        assert_eq!(report.notified, 1);

        assert_eq!(
            watcher.host().notifications,
            vec![TrackSnapshot {
                title: "Song A".into(),
                artist: "Artist A".into(),
                album: "Album A".into(),
                art_url: Some("https://img.example/a.png".into()),
                duration: "3:21".into(),
            }]
        );
        assert_eq!(
            watcher.last_reported(),
            &LastReported {
                title: "Song A".into(),
                artist: "Artist A".into(),
                album: "Album A".into(),
            }
        );
    }

    #[test]
    fn test_repeat_batch_is_suppressed() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut watcher = attached_watcher(&doc);

        watcher.handle_batch(&doc, &marker_batch());
        let report = watcher.handle_batch(&doc, &marker_batch());

        assert_eq!(report.duplicates, 1);
        assert_eq!(report.notified, 0);
        assert_eq!(watcher.host().notifications.len(), 1);
    }

    #[test]
    fn test_multiple_markers_in_one_batch_notify_once() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut watcher = attached_watcher(&doc);

        let marker = MemoryElement::new("div").with_class("text-wrapper");
        let records = vec![
            MutationRecord::new(vec![marker.clone(), marker.clone()]),
            MutationRecord::new(vec![marker]),
        ];
        let report = watcher.handle_batch(&doc, &records);

        assert_eq!(report.notified, 1);
        assert_eq!(report.duplicates, 2);
        assert_eq!(watcher.host().notifications.len(), 1);
    }

    #[test]
    fn test_duration_and_artwork_do_not_gate() {
        let mut doc = page("Song A", "Artist A", "Album A");
        let mut watcher = attached_watcher(&doc);
        watcher.handle_batch(&doc, &marker_batch());

        doc.remove("#time_container_duration");
        doc.remove("#playingAlbumArt");
        let report = watcher.handle_batch(&doc, &marker_batch());

        assert_eq!(report.duplicates, 1);
        assert_eq!(watcher.host().notifications.len(), 1);
    }

    #[test]
    fn test_any_field_change_notifies() {
        let mut watcher = attached_watcher(&page("Song A", "Artist A", "Album A"));
        let pages = [
            page("Song A", "Artist A", "Album A"),
            page("Song A", "Artist A", "Album B"),
            page("Song A", "Artist B", "Album B"),
            page("Song B", "Artist B", "Album B"),
        ];
        for doc in &pages {
            watcher.handle_batch(doc, &marker_batch());
        }
        assert_eq!(watcher.host().notifications.len(), 4);
    }

    #[test]
    fn test_unrelated_insertions_are_ignored() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut watcher = attached_watcher(&doc);

        let records = vec![MutationRecord::new(vec![
            MemoryElement::new("span"),
            MemoryElement::new("div").with_class("text-wrapper-inner"),
            MemoryElement::new("div").with_id("playerSongTitle"),
        ])];
        let report = watcher.handle_batch(&doc, &records);

        assert_eq!(report.ignored, 3);
        assert!(watcher.host().notifications.is_empty());
        assert_eq!(watcher.last_reported(), &LastReported::default());
    }

    #[test]
    fn test_marker_matched_by_id() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut watcher = attached_watcher(&doc);

        let records = vec![MutationRecord::new(vec![
            MemoryElement::new("div").with_id("text-wrapper").with_class("other"),
        ])];
        assert_eq!(watcher.handle_batch(&doc, &records).notified, 1);
    }

    #[test]
    fn test_missing_artist_reports_unknown() {
        let mut doc = page("Song A", "Artist A", "Album A");
        doc.remove("#player-artist");
        let mut watcher = attached_watcher(&doc);

        watcher.handle_batch(&doc, &marker_batch());

        let track = &watcher.host().notifications[0];
        assert_eq!(track.artist, UNKNOWN);
        assert_eq!(track.title, "Song A");
        assert_eq!(track.album, "Album A");
    }

    #[test]
    fn test_double_attach_keeps_one_subscription() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut watcher = attached_watcher(&doc);
        watcher.handle_batch(&doc, &marker_batch());

        let again = watcher.attach(&doc).unwrap();
        assert!(matches!(again, AttachOutcome::AlreadyAttached));
        // A second attach must not reset the last-reported track.
        assert_eq!(watcher.last_reported().title, "Song A");
        assert_eq!(watcher.handle_batch(&doc, &marker_batch()).notified, 0);
    }

    #[test]
    fn test_missing_container_is_an_error() {
        let mut doc = page("Song A", "Artist A", "Album A");
        doc.remove("#playerSongInfo");
        let mut watcher = TrackWatcher::new(SelectorTable::embedded(), RecordingHost::default());

        match watcher.attach(&doc) {
            Err(SongwatchError::ContainerMissing { selector }) => {
                assert_eq!(selector, "#playerSongInfo")
            }
            other => panic!("Expected ContainerMissing, got {other:?}"),
        }
        assert!(!watcher.is_attached());
        let (_, event) = watcher.events().snapshot().pop().unwrap();
        assert_eq!(
            event,
            WatchEvent::ContainerMissing {
                selector: "#playerSongInfo".into()
            }
        );

        doc.push(MemoryElement::new("div").with_id("playerSongInfo"));
        assert!(matches!(watcher.attach(&doc).unwrap(), AttachOutcome::Attached(_)));
    }

    #[test]
    fn test_detached_watcher_does_nothing() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut watcher = TrackWatcher::new(SelectorTable::embedded(), RecordingHost::default());

        let report = watcher.handle_batch(&doc, &marker_batch());
        assert_eq!(report, BatchReport::default());
        assert!(watcher.host().notifications.is_empty());
    }

    #[test]
    fn test_custom_marker() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut selectors = SelectorTable::embedded();
        selectors.marker = "now-playing".into();
        let mut watcher = TrackWatcher::new(selectors, RecordingHost::default());
        watcher.attach(&doc).unwrap();

        assert_eq!(watcher.handle_batch(&doc, &marker_batch()).ignored, 1);
        let records = vec![MutationRecord::new(vec![
            MemoryElement::new("div").with_class("now-playing"),
        ])];
        assert_eq!(watcher.handle_batch(&doc, &records).notified, 1);
    }

    #[test]
    fn test_closure_host() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut titles = Vec::new();
        {
            let mut watcher =
                TrackWatcher::new(SelectorTable::embedded(), |t: &TrackSnapshot| {
                    titles.push(t.title.clone())
                });
            watcher.attach(&doc).unwrap();
            watcher.handle_batch(&doc, &marker_batch());
        }
        assert_eq!(titles, vec!["Song A".to_string()]);
    }

    #[test]
    fn test_events_recorded() {
        let doc = page("Song A", "Artist A", "Album A");
        let mut watcher = attached_watcher(&doc);
        watcher.handle_batch(&doc, &marker_batch());
        watcher.handle_batch(&doc, &marker_batch());

        let events: Vec<_> = watcher.events().snapshot().into_iter().map(|(_, e)| e).collect();
        assert_eq!(
            events,
            vec![
                WatchEvent::Attached {
                    container: "#playerSongInfo".into()
                },
                WatchEvent::Notified {
                    title: "Song A".into(),
                    artist: "Artist A".into(),
                    album: "Album A".into(),
                },
                WatchEvent::Duplicate {
                    title: "Song A".into()
                },
            ]
        );
    }
}
