/// The instrument palette: each pixel color maps to exactly one voice
use strum::{EnumIter, EnumString};

pub type Rgb = [u8; 3];

/// Color of an empty cell
pub const EMPTY_RGB: Rgb = [0, 0, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Instrument {
    #[strum(serialize = "kick", serialize = "1")]
    Kick,
    #[strum(serialize = "snare", serialize = "2")]
    Snare,
    #[strum(serialize = "hi-hat", serialize = "hihat", serialize = "hat", serialize = "3")]
    HiHat,
    #[strum(serialize = "bass", serialize = "4")]
    Bass,
    #[strum(serialize = "lead", serialize = "5")]
    Lead,
}

impl Instrument {
    pub const ALL: [Instrument; 5] = [
        Instrument::Kick,
        Instrument::Snare,
        Instrument::HiHat,
        Instrument::Bass,
        Instrument::Lead,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Kick => "Kick",
            Instrument::Snare => "Snare",
            Instrument::HiHat => "Hi-Hat",
            Instrument::Bass => "Bass",
            Instrument::Lead => "Lead",
        }
    }

    /// Keyboard shortcut used to select the instrument
    pub fn key(self) -> char {
        (b'1' + self.index() as u8) as char
    }

    pub fn from_key(key: char) -> Option<Self> {
        let digit = key.to_digit(10)? as usize;
        digit.checked_sub(1).and_then(Self::from_index)
    }

    pub fn rgb(self) -> Rgb {
        match self {
            Instrument::Kick => [255, 80, 80],
            Instrument::Snare => [80, 160, 255],
            Instrument::HiHat => [100, 220, 100],
            Instrument::Bass => [255, 230, 100],
            Instrument::Lead => [200, 120, 255],
        }
    }

    /// Exact palette lookup; near misses are silent
    pub fn from_rgb(rgb: Rgb) -> Option<Self> {
        Self::ALL.into_iter().find(|inst| inst.rgb() == rgb)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// General MIDI note used when mirroring triggers
    pub fn midi_note(self) -> u8 {
        match self {
            Instrument::Kick => 36,
            Instrument::Snare => 38,
            Instrument::HiHat => 42,
            Instrument::Bass => 45,
            Instrument::Lead => 69,
        }
    }

    /// Zero-based MIDI channel: percussion on channel 10, tonal voices on channel 1
    pub fn midi_channel(self) -> u8 {
        match self {
            Instrument::Kick | Instrument::Snare | Instrument::HiHat => 9,
            Instrument::Bass | Instrument::Lead => 0,
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
