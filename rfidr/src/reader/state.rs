// rfidr-rs/rfidr/src/reader/state.rs
//! Reader states and the transition guard.

/// Top-level reader state. The discriminant is the byte exchanged with the
/// host in both directions.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum ReaderState {
    #[default]
    #[display(fmt = "idle (unconfigured)")]
    IdleUnconfigured = 0,
    #[display(fmt = "idle (configured)")]
    IdleConfigured = 1,
    #[display(fmt = "initializing")]
    Initializing = 2,
    #[display(fmt = "searching app-specified tag")]
    SearchAppTarget = 3,
    #[display(fmt = "searching last inventoried tag")]
    SearchLastInventoried = 4,
    #[display(fmt = "inventorying")]
    Inventorying = 5,
    #[display(fmt = "testing DTC")]
    TestingDtc = 6,
    #[display(fmt = "programming app-specified tag")]
    ProgramAppTarget = 7,
    #[display(fmt = "programming last inventoried tag")]
    ProgramLastInventoried = 8,
    #[display(fmt = "recovering waveform memory")]
    RecoverWaveform = 9,
    #[display(fmt = "resetting radio")]
    ResetRadio = 10,
    #[display(fmt = "killing tag")]
    KillTag = 11,
    #[display(fmt = "programming kill password")]
    ProgramKillPassword = 12,
    #[display(fmt = "tracking app-specified tag")]
    TrackAppTarget = 13,
    #[display(fmt = "tracking last inventoried tag")]
    TrackLastInventoried = 14,
}

impl ReaderState {
    pub const ALL: [ReaderState; 15] = [
        ReaderState::IdleUnconfigured,
        ReaderState::IdleConfigured,
        ReaderState::Initializing,
        ReaderState::SearchAppTarget,
        ReaderState::SearchLastInventoried,
        ReaderState::Inventorying,
        ReaderState::TestingDtc,
        ReaderState::ProgramAppTarget,
        ReaderState::ProgramLastInventoried,
        ReaderState::RecoverWaveform,
        ReaderState::ResetRadio,
        ReaderState::KillTag,
        ReaderState::ProgramKillPassword,
        ReaderState::TrackAppTarget,
        ReaderState::TrackLastInventoried,
    ];

    /// Decode a host command byte. Unknown codes fall back to the boot
    /// state.
    pub fn from_code(code: u8) -> Self {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .unwrap_or(ReaderState::IdleUnconfigured)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_tracking(self) -> bool {
        matches!(
            self,
            ReaderState::TrackAppTarget | ReaderState::TrackLastInventoried
        )
    }

    /// Short name used in the fault diagnostic.
    pub fn activity(self) -> &'static str {
        match self {
            ReaderState::IdleUnconfigured | ReaderState::IdleConfigured => "idle",
            ReaderState::Initializing => "initializing",
            ReaderState::SearchAppTarget | ReaderState::SearchLastInventoried => "searching",
            ReaderState::Inventorying => "inventorying",
            ReaderState::TestingDtc => "DTC",
            ReaderState::ProgramAppTarget
            | ReaderState::ProgramLastInventoried
            | ReaderState::KillTag
            | ReaderState::ProgramKillPassword => "programming",
            ReaderState::RecoverWaveform => "recovering waveform memory",
            ReaderState::ResetRadio => "radio reset",
            ReaderState::TrackAppTarget | ReaderState::TrackLastInventoried => "tracking",
        }
    }
}

/// What a transition request does to the staged state and the tracking
/// continuation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ReaderState,
    /// `Some(on)` sets the tracking flag, `None` leaves it alone.
    pub tracking: Option<bool>,
}

impl Transition {
    fn stay(current: ReaderState) -> Self {
        Self {
            next: current,
            tracking: None,
        }
    }

    fn to(next: ReaderState) -> Self {
        Self {
            next,
            tracking: None,
        }
    }
}

/// The transition guard: where a request for `requested` made while in
/// `current` leads. Refused requests leave the state unchanged.
pub fn guard(current: ReaderState, requested: ReaderState) -> Transition {
    use ReaderState::*;

    match requested {
        Initializing if current == IdleUnconfigured => Transition::to(Initializing),
        SearchAppTarget | SearchLastInventoried | Inventorying | ProgramAppTarget
        | ProgramLastInventoried | KillTag | ProgramKillPassword | RecoverWaveform
        | TestingDtc
            if current == IdleConfigured =>
        {
            Transition::to(requested)
        }
        TrackAppTarget | TrackLastInventoried if current == IdleConfigured => Transition {
            next: requested,
            tracking: Some(true),
        },
        TrackAppTarget | TrackLastInventoried if current == requested => Transition {
            next: current,
            tracking: Some(false),
        },
        ResetRadio if current.is_tracking() => Transition {
            next: ResetRadio,
            tracking: Some(false),
        },
        ResetRadio if matches!(current, IdleConfigured | IdleUnconfigured | TestingDtc) => {
            Transition::to(ResetRadio)
        }
        _ => Transition::stay(current),
    }
}
