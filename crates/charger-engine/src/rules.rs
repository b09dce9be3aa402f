//! Ordered decision rules
//!
//! Rules are evaluated top to bottom and the first guard that holds decides
//! the direction. Later guards may assume every earlier guard was false, so
//! inserting or reordering entries changes behaviour.

use charger_core::{Direction, DoorState, SafetyState, TelemetrySnapshot};

use crate::staging::StagingState;

/// Everything a decision depends on
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub telemetry: &'a TelemetrySnapshot,
    pub safety: &'a SafetyState,
    pub staging: &'a StagingState,
    /// Name of the home geofence zone
    pub home: &'a str,
}

impl DecisionInput<'_> {
    fn at_home(&self) -> bool {
        self.telemetry.geofence.is_zone(self.home)
    }

    fn door_open(&self) -> bool {
        self.telemetry.charge_door == DoorState::Open
    }

    fn door_closed(&self) -> bool {
        self.telemetry.charge_door == DoorState::Closed
    }

    fn both_known(&self) -> bool {
        self.telemetry.geofence.is_known() && self.telemetry.charge_door.is_known()
    }
}

/// A guarded rule in the priority table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Stable name, used in logs
    pub name: &'static str,
    pub guard: fn(&DecisionInput<'_>) -> bool,
    pub direction: Direction,
}

/// The priority table, highest priority first
pub const RULES: [Rule; 5] = [
    Rule {
        name: "estop",
        guard: |input| input.safety.is_tripped(),
        direction: Direction::Down,
    },
    Rule {
        name: "staging",
        guard: |input| input.staging.is_active(),
        direction: Direction::Down,
    },
    // An away reading while the door is still open is treated as a glitch
    // (typically an empty geofence) until one of the two signals settles.
    Rule {
        name: "away_door_open",
        guard: |input| !input.at_home() && input.door_open(),
        direction: Direction::Hold,
    },
    Rule {
        name: "home_door_open",
        guard: |input| input.at_home() && input.door_open() && input.both_known(),
        direction: Direction::Down,
    },
    Rule {
        name: "away_or_door_closed",
        guard: |input| {
            (!input.at_home() || input.door_closed())
                && input.both_known()
                && !input.safety.is_tripped()
        },
        direction: Direction::Up,
    },
];

/// The outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    /// Name of the matching rule, `None` when nothing matched
    pub rule: Option<&'static str>,
}

/// Evaluate the rule table, reporting which rule decided
pub fn evaluate(input: &DecisionInput<'_>) -> Decision {
    RULES
        .iter()
        .find(|rule| (rule.guard)(input))
        .map(|rule| Decision {
            direction: rule.direction,
            rule: Some(rule.name),
        })
        .unwrap_or(Decision {
            direction: Direction::Hold,
            rule: None,
        })
}

/// Decide the charger direction for one tick
///
/// Pure: identical inputs always give the same direction.
pub fn decide(
    telemetry: &TelemetrySnapshot,
    safety: &SafetyState,
    staging: &StagingState,
    home: &str,
) -> Direction {
    evaluate(&DecisionInput {
        telemetry,
        safety,
        staging,
        home,
    })
    .direction
}

#[cfg(test)]
mod tests {
    use super::*;
    use charger_core::{CarState, Geofence, Heading, ShiftState};
    use std::time::Instant;

    const HOME: &str = "Home";

    fn snapshot(geofence: Geofence, charge_door: DoorState) -> TelemetrySnapshot {
        TelemetrySnapshot {
            geofence,
            charge_door,
            ..TelemetrySnapshot::unknown()
        }
    }

    fn idle() -> StagingState {
        StagingState::default()
    }

    fn geofences() -> Vec<Geofence> {
        vec![
            Geofence::Unset,
            Geofence::Empty,
            Geofence::zone(HOME),
            Geofence::zone("Work"),
            Geofence::zone("home"),
        ]
    }

    fn doors() -> [DoorState; 3] {
        [DoorState::Unknown, DoorState::Open, DoorState::Closed]
    }

    #[test]
    fn test_home_with_door_open_retracts() {
        let t = snapshot(Geofence::zone(HOME), DoorState::Open);
        assert_eq!(decide(&t, &SafetyState::new(), &idle(), HOME), Direction::Down);
    }

    #[test]
    fn test_door_closed_extends() {
        let t = snapshot(Geofence::zone(HOME), DoorState::Closed);
        assert_eq!(decide(&t, &SafetyState::new(), &idle(), HOME), Direction::Up);
    }

    #[test]
    fn test_away_with_door_closed_extends() {
        let t = snapshot(Geofence::zone("Work"), DoorState::Closed);
        assert_eq!(decide(&t, &SafetyState::new(), &idle(), HOME), Direction::Up);
    }

    #[test]
    fn test_empty_geofence_with_door_open_holds() {
        let t = snapshot(Geofence::Empty, DoorState::Open);
        let decision = evaluate(&DecisionInput {
            telemetry: &t,
            safety: &SafetyState::new(),
            staging: &idle(),
            home: HOME,
        });
        assert_eq!(decision.direction, Direction::Hold);
        assert_eq!(decision.rule, Some("away_door_open"));
    }

    #[test]
    fn test_empty_geofence_with_door_closed_extends() {
        let t = snapshot(Geofence::Empty, DoorState::Closed);
        assert_eq!(decide(&t, &SafetyState::new(), &idle(), HOME), Direction::Up);
    }

    #[test]
    fn test_unknown_signals_hold() {
        let safety = SafetyState::new();
        let cases = [
            snapshot(Geofence::Unset, DoorState::Unknown),
            snapshot(Geofence::zone(HOME), DoorState::Unknown),
            snapshot(Geofence::Unset, DoorState::Closed),
        ];
        for t in cases {
            let decision = evaluate(&DecisionInput {
                telemetry: &t,
                safety: &safety,
                staging: &idle(),
                home: HOME,
            });
            assert_eq!(decision.direction, Direction::Hold, "{:?}", t);
            assert_eq!(decision.rule, None, "{:?}", t);
        }
    }

    #[test]
    fn test_failsafe_defaults_retract() {
        let t = TelemetrySnapshot::failsafe(HOME);
        assert_eq!(decide(&t, &SafetyState::new(), &idle(), HOME), Direction::Down);
    }

    #[test]
    fn test_estop_overrides_everything() {
        let tripped = SafetyState::tripped();
        let staging = StagingState::started(Instant::now());
        for geofence in geofences() {
            for door in doors() {
                let t = snapshot(geofence.clone(), door);
                assert_eq!(decide(&t, &tripped, &idle(), HOME), Direction::Down);
                assert_eq!(decide(&t, &tripped, &staging, HOME), Direction::Down);
            }
        }
    }

    #[test]
    fn test_staging_overrides_signals() {
        let staging = StagingState::started(Instant::now());
        let t = snapshot(Geofence::zone("Work"), DoorState::Closed);
        let decision = evaluate(&DecisionInput {
            telemetry: &t,
            safety: &SafetyState::new(),
            staging: &staging,
            home: HOME,
        });
        assert_eq!(decision.direction, Direction::Down);
        assert_eq!(decision.rule, Some("staging"));
    }

    #[test]
    fn test_never_up_while_door_open() {
        let safety = SafetyState::new();
        for geofence in geofences() {
            let t = snapshot(geofence, DoorState::Open);
            assert_ne!(decide(&t, &safety, &idle(), HOME), Direction::Up);
        }
    }

    #[test]
    fn test_decide_is_deterministic() {
        let safety = SafetyState::new();
        let staging = StagingState::started(Instant::now());
        for geofence in geofences() {
            for door in doors() {
                let t = TelemetrySnapshot {
                    geofence: geofence.clone(),
                    charge_door: door,
                    car_state: Some(CarState::Online),
                    heading: Heading::new(350),
                    shift_state: Some(ShiftState::Reverse),
                };
                for s in [&idle(), &staging] {
                    let first = decide(&t, &safety, s, HOME);
                    let second = decide(&t.clone(), &safety, s, HOME);
                    assert_eq!(first, second);
                }
            }
        }
    }

    #[test]
    fn test_rule_names_are_unique() {
        for (i, a) in RULES.iter().enumerate() {
            for b in &RULES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
