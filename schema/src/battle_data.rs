use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u16);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Major status a move can inflict. Turn counters are rolled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusType {
    Poison,
    Paralysis,
    Sleep,
    Burn,
    Freeze,
    Confusion,
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusType::Poison => "poison",
            StatusType::Paralysis => "paralysis",
            StatusType::Sleep => "sleep",
            StatusType::Burn => "burn",
            StatusType::Freeze => "freeze",
            StatusType::Confusion => "confusion",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureDevice {
    Standard,
    Great,
    Ultra,
    Master,
}

impl CaptureDevice {
    pub const ALL: [CaptureDevice; 4] = [
        CaptureDevice::Standard,
        CaptureDevice::Great,
        CaptureDevice::Ultra,
        CaptureDevice::Master,
    ];

    pub fn modifier(self) -> f32 {
        match self {
            CaptureDevice::Standard => 1.0,
            CaptureDevice::Great => 1.5,
            CaptureDevice::Ultra => 2.0,
            CaptureDevice::Master => 255.0,
        }
    }
}

impl fmt::Display for CaptureDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureDevice::Standard => "Standard Orb",
            CaptureDevice::Great => "Great Orb",
            CaptureDevice::Ultra => "Ultra Orb",
            CaptureDevice::Master => "Master Orb",
        };
        write!(f, "{}", name)
    }
}
