use std::fmt;

/// Logical message stream multiplexed over the transport's single socket.
///
/// Every datagram starts with one tag byte naming its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    /// Server → client world snapshots.
    Update = 1,
    /// Client → server velocity intents.
    Move = 2,
    /// Client → server shot intents.
    Shoot = 3,
    /// Client → server latency probe.
    Probe = 0xFE,
    /// Server → client echo of a probe.
    Echo = 0xFF,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Update,
        Channel::Move,
        Channel::Shoot,
        Channel::Probe,
        Channel::Echo,
    ];

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Update),
            2 => Some(Self::Move),
            3 => Some(Self::Shoot),
            0xFE => Some(Self::Probe),
            0xFF => Some(Self::Echo),
            _ => None,
        }
    }

    /// Probe and echo belong to the transport's latency measurement.
    #[inline]
    pub fn is_reserved(self) -> bool {
        matches!(self, Self::Probe | Self::Echo)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Move => "move",
            Self::Shoot => "shoot",
            Self::Probe => "probe",
            Self::Echo => "echo",
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::from_tag(tag).ok_or(tag)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
