use std::time::Duration;

/// Contains Config properties which will be used by a room session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomConfig {
    /// Minimum time between two replication pushes
    pub tick_interval: Duration,
    /// How long the signaling channel stays open after the realtime channel
    /// closes during exit
    pub realtime_close_grace: Duration,
    /// How long after the signaling channel closes the room counts as torn
    /// down
    pub signaling_close_grace: Duration,
    /// Bytes reserved in front of every frame for the transport's own prefix
    pub header_padding: usize,
    /// Length of popup fades
    pub fade_duration: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            realtime_close_grace: Duration::from_millis(500),
            signaling_close_grace: Duration::from_millis(500),
            header_padding: 0,
            fade_duration: Duration::from_millis(250),
        }
    }
}

impl RoomConfig {
    pub fn tick_interval(mut self, duration: Duration) -> Self {
        self.tick_interval = duration;
        self
    }

    pub fn realtime_close_grace(mut self, duration: Duration) -> Self {
        self.realtime_close_grace = duration;
        self
    }

    pub fn signaling_close_grace(mut self, duration: Duration) -> Self {
        self.signaling_close_grace = duration;
        self
    }

    pub fn header_padding(mut self, bytes: usize) -> Self {
        self.header_padding = bytes;
        self
    }

    pub fn fade_duration(mut self, duration: Duration) -> Self {
        self.fade_duration = duration;
        self
    }
}
