use crate::snapshot::TrackSnapshot;

/// The native application's notification entry point.
///
/// Fire-and-forget: nothing the host does is reported back to the watcher.
pub trait NotifyHost {
    fn notify_song(&mut self, track: &TrackSnapshot);
}

impl<F> NotifyHost for F
where
    F: FnMut(&TrackSnapshot),
{
    fn notify_song(&mut self, track: &TrackSnapshot) {
        self(track)
    }
}

/// Host that keeps every notification, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub notifications: Vec<TrackSnapshot>,
}

impl NotifyHost for RecordingHost {
    fn notify_song(&mut self, track: &TrackSnapshot) {
        self.notifications.push(track.clone());
    }
}
