//! Trigger kinds and per-weapon trigger bindings.

use crate::env::{Hand, InputSnapshot};
use serde::{Deserialize, Serialize};

/// Input event that can activate a weapon.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    RightClick,
    LeftClick,
    Melee,
    StartSneak,
    StartSprint,
    StartSwim,
    StartGlide,
    StartWalk,
    StartInMidair,
    StartStand,
    DoubleJump,
    DoubleSneak,
    SwapHands,
    DropItem,
}

impl TriggerKind {
    /// Whether this trigger describes a circumstance that can be held,
    /// which is what full-automatic fire polls every tick.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            Self::StartSneak
                | Self::StartSprint
                | Self::RightClick
                | Self::StartSwim
                | Self::StartGlide
                | Self::StartWalk
                | Self::StartInMidair
                | Self::StartStand
        )
    }

    /// Whether the held circumstance behind a continuous trigger still holds.
    /// Non-continuous triggers never hold.
    pub fn is_held(&self, input: &InputSnapshot) -> bool {
        match self {
            Self::StartSneak => input.sneaking,
            Self::StartSprint => input.sprinting,
            Self::RightClick => input.right_clicking,
            Self::StartSwim => input.swimming,
            Self::StartGlide => input.gliding,
            Self::StartWalk => input.walking,
            Self::StartInMidair => input.in_midair,
            Self::StartStand => input.standing,
            _ => false,
        }
    }
}

/// Actor circumstance under which a trigger binding refuses to fire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Circumstance {
    Reloading,
    Zooming,
    Sneaking,
    Sprinting,
    Swimming,
    Gliding,
    InMidair,
    DualWielding,
}

/// What the trigger check needs to know about the actor right now.
#[derive(Clone, Copy, Debug, Default)]
pub struct CircumstanceView {
    pub input: InputSnapshot,
    pub reloading: bool,
    pub zooming: bool,
    pub dual_wielding: bool,
}

impl CircumstanceView {
    fn holds(&self, circumstance: Circumstance) -> bool {
        match circumstance {
            Circumstance::Reloading => self.reloading,
            Circumstance::Zooming => self.zooming,
            Circumstance::Sneaking => self.input.sneaking,
            Circumstance::Sprinting => self.input.sprinting,
            Circumstance::Swimming => self.input.swimming,
            Circumstance::Gliding => self.input.gliding,
            Circumstance::InMidair => self.input.in_midair,
            Circumstance::DualWielding => self.dual_wielding,
        }
    }
}

/// Which trigger activates a weapon in each hand slot.
///
/// Dual-wield slots fall back to the plain hand slot when unset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerBinding {
    #[serde(default)]
    pub main_hand: Option<TriggerKind>,
    #[serde(default)]
    pub off_hand: Option<TriggerKind>,
    #[serde(default)]
    pub dual_wield_main_hand: Option<TriggerKind>,
    #[serde(default)]
    pub dual_wield_off_hand: Option<TriggerKind>,
    #[serde(default)]
    pub deny_when: Vec<Circumstance>,
}

impl TriggerBinding {
    /// Binding that only fires from the main hand.
    pub fn main_hand(kind: TriggerKind) -> Self {
        Self {
            main_hand: Some(kind),
            ..Self::default()
        }
    }

    /// Binding that fires from either hand with the same trigger.
    pub fn both_hands(kind: TriggerKind) -> Self {
        Self {
            main_hand: Some(kind),
            off_hand: Some(kind),
            ..Self::default()
        }
    }

    /// Override the triggers used while dual wielding.
    pub fn with_dual_wield(mut self, main_hand: TriggerKind, off_hand: TriggerKind) -> Self {
        self.dual_wield_main_hand = Some(main_hand);
        self.dual_wield_off_hand = Some(off_hand);
        self
    }

    /// Refuse to fire while `circumstance` holds.
    pub fn deny_when(mut self, circumstance: Circumstance) -> Self {
        self.deny_when.push(circumstance);
        self
    }

    /// The trigger bound to `hand`, honouring dual-wield overrides.
    pub fn kind_for(&self, hand: Hand, dual_wield: bool) -> Option<TriggerKind> {
        match (hand, dual_wield) {
            (Hand::Main, true) => self.dual_wield_main_hand.or(self.main_hand),
            (Hand::Off, true) => self.dual_wield_off_hand.or(self.off_hand),
            (Hand::Main, false) => self.main_hand,
            (Hand::Off, false) => self.off_hand,
        }
    }

    /// Every trigger slot that is set, with its slot label.
    pub fn slots(&self) -> impl Iterator<Item = (&'static str, TriggerKind)> + '_ {
        [
            ("main_hand", self.main_hand),
            ("off_hand", self.off_hand),
            ("dual_wield_main_hand", self.dual_wield_main_hand),
            ("dual_wield_off_hand", self.dual_wield_off_hand),
        ]
        .into_iter()
        .filter_map(|(slot, kind)| kind.map(|kind| (slot, kind)))
    }

    /// Whether no deny circumstance currently holds.
    pub fn check_circumstances(&self, view: &CircumstanceView) -> bool {
        !self.deny_when.iter().any(|c| view.holds(*c))
    }

    /// Whether `kind` on `hand` activates this binding right now.
    pub fn check(
        &self,
        kind: TriggerKind,
        hand: Hand,
        dual_wield: bool,
        view: &CircumstanceView,
    ) -> bool {
        self.kind_for(hand, dual_wield) == Some(kind) && self.check_circumstances(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_matches_hand_slot() {
        let binding = TriggerBinding::main_hand(TriggerKind::RightClick);
        let view = CircumstanceView::default();

        assert!(binding.check(TriggerKind::RightClick, Hand::Main, false, &view));
        assert!(!binding.check(TriggerKind::RightClick, Hand::Off, false, &view));
        assert!(!binding.check(TriggerKind::LeftClick, Hand::Main, false, &view));
    }

    #[test]
    fn dual_wield_slot_falls_back_to_hand_slot() {
        let plain = TriggerBinding::both_hands(TriggerKind::RightClick);
        assert_eq!(
            plain.kind_for(Hand::Off, true),
            Some(TriggerKind::RightClick)
        );

        let split = plain.with_dual_wield(TriggerKind::LeftClick, TriggerKind::RightClick);
        assert_eq!(split.kind_for(Hand::Main, true), Some(TriggerKind::LeftClick));
        assert_eq!(split.kind_for(Hand::Main, false), Some(TriggerKind::RightClick));
    }

    #[test]
    fn deny_circumstance_blocks_trigger() {
        let binding =
            TriggerBinding::main_hand(TriggerKind::RightClick).deny_when(Circumstance::Sprinting);
        let mut view = CircumstanceView::default();
        assert!(binding.check(TriggerKind::RightClick, Hand::Main, false, &view));

        view.input.sprinting = true;
        assert!(!binding.check(TriggerKind::RightClick, Hand::Main, false, &view));
    }

    #[test]
    fn continuous_triggers_follow_input() {
        let input = InputSnapshot {
            right_clicking: true,
            ..InputSnapshot::default()
        };

        assert!(TriggerKind::RightClick.is_continuous());
        assert!(TriggerKind::RightClick.is_held(&input));
        assert!(!TriggerKind::StartSneak.is_held(&input));
        assert!(!TriggerKind::LeftClick.is_continuous());
        assert!(!TriggerKind::LeftClick.is_held(&input));
    }

    #[test]
    fn trigger_kind_uses_screaming_case() {
        let kind: TriggerKind = serde_json::from_str("\"START_IN_MIDAIR\"").unwrap();
        assert_eq!(kind, TriggerKind::StartInMidair);
    }
}
