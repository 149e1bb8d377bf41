use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::TeamSide;

/// A single step of the draft state machine.
///
/// The three ready phases and `Finished` carry no timer; every other phase
/// belongs to exactly one side and writes exactly one slot of that side's
/// ban or pick array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    NoReady,
    BlueReady,
    RedReady,
    BanBlue1,
    BanRed1,
    BanBlue2,
    BanRed2,
    BanBlue3,
    BanRed3,
    PickBlue1,
    PickRed1,
    PickRed2,
    PickBlue2,
    BanRed4,
    BanBlue4,
    BanRed5,
    BanBlue5,
    PickBlue3,
    PickRed3,
    Finished,
}

/// Draft order when at least one side has bans enabled.
pub const WITH_BANS_SEQUENCE: [Phase; 17] = [
    Phase::BanBlue1,
    Phase::BanRed1,
    Phase::BanBlue2,
    Phase::BanRed2,
    Phase::BanBlue3,
    Phase::BanRed3,
    Phase::PickBlue1,
    Phase::PickRed1,
    Phase::PickRed2,
    Phase::PickBlue2,
    Phase::BanRed4,
    Phase::BanBlue4,
    Phase::BanRed5,
    Phase::BanBlue5,
    Phase::PickBlue3,
    Phase::PickRed3,
    Phase::Finished,
];

/// Draft order when neither side has bans enabled.
pub const PICK_ONLY_SEQUENCE: [Phase; 7] = [
    Phase::PickBlue1,
    Phase::PickRed1,
    Phase::PickRed2,
    Phase::PickBlue2,
    Phase::PickBlue3,
    Phase::PickRed3,
    Phase::Finished,
];

impl Phase {
    /// Which side acts in this phase, if any.
    pub fn side(self) -> Option<TeamSide> {
        match self {
            Phase::BanBlue1
            | Phase::BanBlue2
            | Phase::BanBlue3
            | Phase::BanBlue4
            | Phase::BanBlue5
            | Phase::PickBlue1
            | Phase::PickBlue2
            | Phase::PickBlue3 => Some(TeamSide::Blue),
            Phase::BanRed1
            | Phase::BanRed2
            | Phase::BanRed3
            | Phase::BanRed4
            | Phase::BanRed5
            | Phase::PickRed1
            | Phase::PickRed2
            | Phase::PickRed3 => Some(TeamSide::Red),
            Phase::NoReady | Phase::BlueReady | Phase::RedReady | Phase::Finished => None,
        }
    }

    pub fn is_ban(self) -> bool {
        matches!(
            self,
            Phase::BanBlue1
                | Phase::BanBlue2
                | Phase::BanBlue3
                | Phase::BanBlue4
                | Phase::BanBlue5
                | Phase::BanRed1
                | Phase::BanRed2
                | Phase::BanRed3
                | Phase::BanRed4
                | Phase::BanRed5
        )
    }

    pub fn is_pick(self) -> bool {
        matches!(
            self,
            Phase::PickBlue1
                | Phase::PickBlue2
                | Phase::PickBlue3
                | Phase::PickRed1
                | Phase::PickRed2
                | Phase::PickRed3
        )
    }

    /// A draft phase carries a countdown; ready phases and `Finished` do not.
    pub fn is_draft(self) -> bool {
        self.is_ban() || self.is_pick()
    }

    /// Index into the acting side's ban or pick array for this phase.
    pub fn position(self) -> Option<usize> {
        match self {
            Phase::BanBlue1 | Phase::BanRed1 | Phase::PickBlue1 | Phase::PickRed1 => Some(0),
            Phase::BanBlue2 | Phase::BanRed2 | Phase::PickBlue2 | Phase::PickRed2 => Some(1),
            Phase::BanBlue3 | Phase::BanRed3 | Phase::PickBlue3 | Phase::PickRed3 => Some(2),
            Phase::BanBlue4 | Phase::BanRed4 => Some(3),
            Phase::BanBlue5 | Phase::BanRed5 => Some(4),
            Phase::NoReady | Phase::BlueReady | Phase::RedReady | Phase::Finished => None,
        }
    }

    /// The phase that follows this one in the applicable draft order.
    ///
    /// Returns `None` for `Finished`, for the ready phases, and for draft
    /// phases that do not appear in the applicable sequence.
    pub fn next(self, with_bans: bool) -> Option<Phase> {
        let sequence: &[Phase] = if with_bans {
            &WITH_BANS_SEQUENCE
        } else {
            &PICK_ONLY_SEQUENCE
        };
        let index = sequence.iter().position(|phase| *phase == self)?;
        sequence.get(index + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NoReady => "NoReady",
            Phase::BlueReady => "BlueReady",
            Phase::RedReady => "RedReady",
            Phase::BanBlue1 => "BanBlue1",
            Phase::BanRed1 => "BanRed1",
            Phase::BanBlue2 => "BanBlue2",
            Phase::BanRed2 => "BanRed2",
            Phase::BanBlue3 => "BanBlue3",
            Phase::BanRed3 => "BanRed3",
            Phase::PickBlue1 => "PickBlue1",
            Phase::PickRed1 => "PickRed1",
            Phase::PickRed2 => "PickRed2",
            Phase::PickBlue2 => "PickBlue2",
            Phase::BanRed4 => "BanRed4",
            Phase::BanBlue4 => "BanBlue4",
            Phase::BanRed5 => "BanRed5",
            Phase::BanBlue5 => "BanBlue5",
            Phase::PickBlue3 => "PickBlue3",
            Phase::PickRed3 => "PickRed3",
            Phase::Finished => "Finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_cover_every_draft_phase() {
        for phase in WITH_BANS_SEQUENCE {
            if phase == Phase::Finished {
                assert_eq!(phase.side(), None);
            } else {
                assert!(phase.side().is_some(), "{phase} has no side");
            }
        }
        assert_eq!(Phase::NoReady.side(), None);
        assert_eq!(Phase::BlueReady.side(), None);
        assert_eq!(Phase::RedReady.side(), None);
    }

    #[test]
    fn ban_and_pick_are_disjoint() {
        for phase in WITH_BANS_SEQUENCE {
            assert!(!(phase.is_ban() && phase.is_pick()), "{phase}");
        }
        assert!(!Phase::Finished.is_draft());
        assert!(!Phase::NoReady.is_draft());
    }

    #[test]
    fn positions_match_slot_layout() {
        assert_eq!(Phase::BanBlue1.position(), Some(0));
        assert_eq!(Phase::BanRed5.position(), Some(4));
        assert_eq!(Phase::PickBlue3.position(), Some(2));
        assert_eq!(Phase::PickRed1.position(), Some(0));
        assert_eq!(Phase::NoReady.position(), None);
        assert_eq!(Phase::Finished.position(), None);
    }

    #[test]
    fn with_bans_sequence_walks_to_finished() {
        let mut phase = Phase::BanBlue1;
        let mut visited = vec![phase];
        while let Some(next) = phase.next(true) {
            visited.push(next);
            phase = next;
        }
        assert_eq!(visited, WITH_BANS_SEQUENCE.to_vec());
        assert_eq!(Phase::Finished.next(true), None);
    }

    #[test]
    fn pick_only_sequence_skips_bans() {
        let mut phase = Phase::PickBlue1;
        let mut visited = vec![phase];
        while let Some(next) = phase.next(false) {
            visited.push(next);
            phase = next;
        }
        assert_eq!(visited, PICK_ONLY_SEQUENCE.to_vec());
        // Ban phases are unreachable without bans enabled.
        assert_eq!(Phase::BanBlue1.next(false), None);
    }

    #[test]
    fn pick_order_alternates_per_rules() {
        // The middle of the pick order is red twice then blue twice.
        assert_eq!(Phase::PickRed1.next(true), Some(Phase::PickRed2));
        assert_eq!(Phase::PickRed2.next(true), Some(Phase::PickBlue2));
        assert_eq!(Phase::PickBlue2.next(true), Some(Phase::BanRed4));
        assert_eq!(Phase::PickBlue2.next(false), Some(Phase::PickBlue3));
    }

    #[test]
    fn wire_names_round_trip() {
        for phase in WITH_BANS_SEQUENCE {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            let back: Phase = serde_json::from_str(&json).unwrap();
            assert_eq!(back, phase);
        }
    }
}
