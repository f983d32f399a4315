//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::messages::{DEFAULT_MENU, DRUG_TRIGGER, FACILITY_TRIGGER, NO_DEPARTMENT};
use super::*;
use proptest::prelude::*;

const USER: &str = "U-prop";

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_department() -> impl Strategy<Value = Department> {
    proptest::sample::select(Department::ALL.to_vec())
}

fn arb_info_type() -> impl Strategy<Value = InfoType> {
    proptest::sample::select(InfoType::ALL.to_vec())
}

/// Text that is never one of the literal triggers
fn arb_free_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9ぁ-んァ-ン ]{0,20}".prop_filter("must not be a trigger", |t| {
        let t = t.trim();
        t != FACILITY_TRIGGER
            && t != DRUG_TRIGGER
            && Department::from_label(t).is_none()
            && InfoType::from_label(t).is_none()
    })
}

fn arb_state() -> impl Strategy<Value = DialogueState> {
    prop_oneof![
        Just(DialogueState::Idle),
        Just(DialogueState::AwaitingDepartment),
        arb_department().prop_map(|department| DialogueState::AwaitingLocation { department }),
        Just(DialogueState::AwaitingDrugName),
        "[a-zA-Zァ-ン]{1,12}".prop_map(|drug_name| DialogueState::AwaitingInfoType { drug_name }),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(FACILITY_TRIGGER.to_string()),
        Just(DRUG_TRIGGER.to_string()),
        arb_department().prop_map(|d| d.label().to_string()),
        arb_info_type().prop_map(|t| t.label().to_string()),
        arb_free_text(),
    ]
}

fn arb_event() -> impl Strategy<Value = InboundEvent> {
    prop_oneof![
        3 => arb_text().prop_map(|text| InboundEvent::text(USER, text)),
        1 => (-90.0f64..90.0, -180.0f64..180.0)
            .prop_map(|(lat, lng)| InboundEvent::location(USER, lat, lng)),
    ]
}

fn step(state: &DialogueState, event: InboundEvent) -> TransitionResult {
    transition(&Session::with_state(USER, state.clone()), event)
        .expect("same-user transitions never fail")
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Facility trigger always opens the department menu
    #[test]
    fn prop_facility_trigger_opens_department_menu(state in arb_state()) {
        let result = step(&state, InboundEvent::text(USER, FACILITY_TRIGGER));
        prop_assert_eq!(result.session.state, DialogueState::AwaitingDepartment);
        prop_assert_eq!(result.action.quick_actions, QuickActions::department_menu());
    }

    // Non-department text while awaiting a department falls back to the menu
    #[test]
    fn prop_awaiting_department_rejects_free_text(text in arb_free_text()) {
        let result = step(&DialogueState::AwaitingDepartment, InboundEvent::text(USER, text));
        prop_assert_eq!(result.session.state, DialogueState::Idle);
        prop_assert_eq!(result.action.static_text(), Some(DEFAULT_MENU));
    }

    // A location always clears a pending facility search, whatever comes next
    #[test]
    fn prop_location_clears_awaiting_location(
        department in arb_department(),
        lat in -90.0f64..90.0,
        lng in -180.0f64..180.0,
    ) {
        let state = DialogueState::AwaitingLocation { department };
        let result = step(&state, InboundEvent::location(USER, lat, lng));
        prop_assert_eq!(result.session.state, DialogueState::Idle);
        prop_assert_eq!(
            result.action.side_effect_request(),
            Some(&SideEffect::SearchFacilities {
                location: GeoPoint::new(lat, lng),
                department,
            })
        );
    }

    // Drug round trip carries the exact name and info type into the lookup
    #[test]
    fn prop_drug_round_trip(drug_name in "[a-zA-Zァ-ン]{1,12}", info_type in arb_info_type()) {
        prop_assume!(Department::from_label(&drug_name).is_none());
        let result = step(&DialogueState::AwaitingDrugName, InboundEvent::text(USER, drug_name.clone()));
        prop_assert_eq!(
            &result.session.state,
            &DialogueState::AwaitingInfoType { drug_name: drug_name.clone() }
        );
        let result = step(&result.session.state, InboundEvent::text(USER, info_type.label()));
        prop_assert_eq!(result.session.state, DialogueState::Idle);
        prop_assert_eq!(
            result.action.side_effect_request(),
            Some(&SideEffect::LookupDrug { drug_name, info_type })
        );
    }

    // Location with no department recorded leaves the state alone
    #[test]
    fn prop_location_without_department_is_noop(state in arb_state(), lat in -90.0f64..90.0) {
        prop_assume!(state.department().is_none());
        let result = step(&state, InboundEvent::location(USER, lat, 135.0));
        prop_assert_eq!(result.session.state, state);
        prop_assert_eq!(result.action.static_text(), Some(NO_DEPARTMENT));
    }

    // Every side effect is a terminal request: the machine is back at Idle
    #[test]
    fn prop_side_effects_end_in_idle(state in arb_state(), event in arb_event()) {
        let result = step(&state, event);
        if result.action.side_effect_request().is_some() {
            prop_assert!(result.session.state.is_idle());
        }
    }

    // No user gets stuck: from any state, free text returns to Idle within two turns
    #[test]
    fn prop_every_state_can_reach_idle(
        events in proptest::collection::vec(arb_event(), 0..20),
        escape in arb_free_text(),
    ) {
        let mut state = DialogueState::Idle;
        for event in events {
            state = step(&state, event).session.state;
        }
        let mut escape = escape;
        for _ in 0..2 {
            state = step(&state, InboundEvent::text(USER, escape.clone())).session.state;
            if state.is_idle() {
                break;
            }
            escape = "menu".to_string();
        }
        prop_assert!(state.is_idle(), "stuck in {:?}", state);
    }

    // Quick action text is always an exact literal the machine recognizes
    #[test]
    fn prop_quick_actions_reenter_as_text(state in arb_state(), event in arb_event()) {
        let result = step(&state, event);
        if let QuickActions::Options(options) = &result.action.quick_actions {
            for option in options {
                prop_assert_eq!(&option.label, &option.text);
                let next = step(&result.session.state, InboundEvent::text(USER, option.text.clone()));
                prop_assert_ne!(next.action.static_text(), Some(DEFAULT_MENU));
            }
        }
    }
}
