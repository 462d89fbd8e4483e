//! Control sources for cars.
//!
//! Exactly one mode per car, fixed at creation. Human flags come from an
//! [`InputPort`] sampled by the driver once per tick; network flags are
//! written back after each brain evaluation; traffic cars simply hold
//! forward forever.

/// The four drive flags, read as a snapshot at the start of each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub forward: bool,
    pub left: bool,
    pub right: bool,
    pub reverse: bool,
}

impl ControlFlags {
    pub const FORWARD: ControlFlags = ControlFlags {
        forward: true,
        left: false,
        right: false,
        reverse: false,
    };
}

/// Who is driving.
#[derive(Clone, Debug)]
pub enum Controls {
    /// Flags asserted externally (keyboard, gamepad, test fixture).
    Human(ControlFlags),
    /// Forward permanently held; used for obstacle traffic.
    FixedForward,
    /// Flags set from the most recent network evaluation.
    NetworkDriven(ControlFlags),
}

impl Controls {
    /// Current flag snapshot for this tick.
    pub fn flags(&self) -> ControlFlags {
        match self {
            Controls::Human(flags) | Controls::NetworkDriven(flags) => *flags,
            Controls::FixedForward => ControlFlags::FORWARD,
        }
    }

    /// Overwrite the flags of a `Human` or `NetworkDriven` car.
    /// No effect on `FixedForward`.
    pub fn set_flags(&mut self, new: ControlFlags) {
        match self {
            Controls::Human(flags) | Controls::NetworkDriven(flags) => *flags = new,
            Controls::FixedForward => {}
        }
    }

    pub fn is_network_driven(&self) -> bool {
        matches!(self, Controls::NetworkDriven(_))
    }
}

/// Abstract input source for human-controlled cars. The driver polls it
/// once per tick; how the flags get asserted (key events, scripted replay)
/// is the port's business.
pub trait InputPort {
    fn poll(&self) -> ControlFlags;
}
