//! End-to-end scenarios on Waerden(3,3;n) instances: clauses forbidding a
//! monochromatic 3-term arithmetic progression in a two-colouring of 1..=n.
//! Waerden(3,3;8) is satisfiable, Waerden(3,3;9) is not.

use calabash::AssignmentHandler;
use calabash::Literal;
use calabash::ModelBuilder;
use calabash::Propagator;

/// Build the Waerden(3,3;n) model. The returned literal vector is 1-based
/// (index 0 is a placeholder) so the tests read like the instance
/// definition.
fn waerden33(n: usize) -> (Vec<Literal>, ModelBuilder) {
    let mut model = ModelBuilder::default();
    let mut variables = vec![Literal::default()];
    for _ in 1..=n {
        variables.push(model.add_variable());
    }
    let mut distance = 1;
    while 2 * distance <= n - 1 {
        let mut i = 1;
        while i + 2 * distance <= n {
            model
                .add_clause([
                    variables[i],
                    variables[i + distance],
                    variables[i + 2 * distance],
                ])
                .unwrap();
            model
                .add_clause([
                    !variables[i],
                    !variables[i + distance],
                    !variables[i + 2 * distance],
                ])
                .unwrap();
            i += 1;
        }
        distance += 1;
    }
    (variables, model)
}

#[derive(Default)]
struct RecordingHandler {
    undone: Vec<Literal>,
    forced: Vec<Literal>,
}

impl AssignmentHandler for RecordingHandler {
    fn assignment_undone(&mut self, literal: Literal) {
        self.undone.push(literal);
    }

    fn assignment_forced(&mut self, literal: Literal) {
        self.forced.push(literal);
    }
}

#[test]
fn waerden_8_is_solved_after_one_conflict() {
    let (v, model) = waerden33(8);
    let mut propagator = Propagator::new(&model);
    assert!(propagator.get_trail().is_empty());
    assert_eq!(propagator.get_current_level(), 0);

    assert!(propagator.push_level(v[1]));
    assert_eq!(propagator.get_current_level(), 1);
    assert_eq!(propagator.get_trail(), [v[1]]);
    assert!(propagator.is_decision(v[1]));

    assert!(propagator.push_level(v[2]));
    assert_eq!(propagator.get_trail(), [v[1], v[2], !v[3]]);
    assert!(propagator.is_decision(v[2]));
    assert!(propagator.is_decision(v[1]));
    assert!(!propagator.is_decision(!v[3]));
    assert_eq!(propagator.get_current_level(), 2);

    assert!(!propagator.push_level(v[4]));
    assert!(propagator.is_conflicting());
    assert_eq!(propagator.get_current_level(), 3);

    assert!(propagator.resolve_conflicts());
    assert_eq!(propagator.get_current_level(), 2);
    assert!(!propagator.is_conflicting());
    // the learnt clause propagated the instance to a full solution
    assert_eq!(propagator.get_trail().len(), 8);

    let assignment = propagator.extract_assignment();
    assert_eq!(
        assignment,
        [true, true, false, false, true, true, false, false]
    );
    assert!(model.verify_trail(propagator.get_trail()).is_ok());
    assert!(model.verify_assignment(&assignment).is_ok());
}

#[test]
fn waerden_9_under_negated_v1_is_unsatisfiable() {
    let (v, mut model) = waerden33(9);
    model.add_clause([!v[1]]).unwrap(); // symmetry breaking
    let mut propagator = Propagator::new(&model);
    assert_eq!(propagator.get_trail(), [!v[1]]);
    assert_eq!(propagator.get_current_level(), 0);

    assert!(propagator.push_level(!v[2]));
    assert_eq!(propagator.get_trail(), [!v[1], !v[2], v[3]]);

    assert!(!propagator.push_level(!v[4]));
    assert!(propagator.is_conflicting());
    assert_eq!(propagator.get_current_level(), 2);
    assert!(propagator.resolve_conflicts());
    assert_eq!(propagator.get_current_level(), 0);
    assert!(!propagator.is_conflicting());
    assert_eq!(propagator.get_trail(), [!v[1], v[2]]);

    assert!(!propagator.push_level(!v[7]));
    assert!(propagator.is_conflicting());
    assert_eq!(propagator.get_current_level(), 1);
    assert!(propagator.resolve_conflicts());
    assert_eq!(propagator.get_current_level(), 0);
    assert!(!propagator.is_conflicting());
    assert_eq!(propagator.get_trail(), [!v[1], v[2], v[7]]);

    assert!(!propagator.push_level(v[6]));
    assert!(propagator.is_conflicting());
    assert!(propagator.resolve_conflicts());
    assert_eq!(propagator.get_current_level(), 0);
    assert!(!propagator.is_conflicting());
    assert_eq!(propagator.get_trail(), [!v[1], v[2], v[7], !v[6]]);

    assert!(!propagator.push_level(v[5]));
    assert!(propagator.is_conflicting());
    assert!(!propagator.resolve_conflicts()); // unsatisfiability proof
    assert!(propagator.is_conflicting());
    assert_eq!(propagator.get_current_level(), 0);
}

#[test]
fn conflict_resolution_reports_undone_and_forced_assignments() {
    let (v, mut model) = waerden33(9);
    model.add_clause([!v[1]]).unwrap();
    let mut propagator = Propagator::new(&model);
    assert!(propagator.push_level(!v[2]));
    assert!(!propagator.push_level(!v[4]));

    let mut handler = RecordingHandler::default();
    assert!(propagator.resolve_conflicts_with_handler(&mut handler));

    // the conflicting level 2 is rolled back silently; level 1 ([!v2, v3])
    // is undone with notifications, in reverse assignment order; the learnt
    // unary v2 is the only forced assignment on the target level
    assert_eq!(handler.undone, [v[3], !v[2]]);
    assert_eq!(handler.forced, [v[2]]);
    assert_eq!(propagator.get_trail(), [!v[1], v[2]]);
}

#[test]
fn pushing_and_popping_a_level_is_a_roundtrip() {
    let (v, model) = waerden33(8);
    let mut propagator = Propagator::new(&model);
    assert!(propagator.push_level(v[1]));

    let trail_before = propagator.get_trail().to_vec();
    let reasons_before = propagator.get_reasons().to_vec();
    let level_before = propagator.get_current_level();
    let values_before: Vec<_> = propagator
        .all_literals()
        .map(|literal| propagator.value_of(literal))
        .collect();

    assert!(propagator.push_level(v[2]));
    propagator.pop_level();

    assert_eq!(propagator.get_trail(), trail_before);
    assert_eq!(propagator.get_reasons(), reasons_before);
    assert_eq!(propagator.get_current_level(), level_before);
    let values_after: Vec<_> = propagator
        .all_literals()
        .map(|literal| propagator.value_of(literal))
        .collect();
    assert_eq!(values_after, values_before);
}

#[test]
fn supporting_decisions_are_recovered_from_the_reason_graph() {
    let (v, model) = waerden33(8);
    let mut propagator = Propagator::new(&model);
    assert!(propagator.push_level(v[1]));
    assert!(propagator.push_level(v[2]));

    // a decision is supported by itself alone
    assert_eq!(propagator.decisions_leading_to(v[1]), [(1, v[1])]);

    // the propagated !v3 is supported by both decisions
    let mut supporting = propagator.decisions_leading_to(!v[3]).to_vec();
    supporting.sort_unstable();
    assert_eq!(supporting, [(1, v[1]), (2, v[2])]);
}

#[test]
fn decisions_leading_to_a_conflict_include_the_conflicting_level() {
    let (v, model) = waerden33(8);
    let mut propagator = Propagator::new(&model);
    assert!(propagator.push_level(v[1]));
    assert!(propagator.push_level(v[2]));
    assert!(!propagator.push_level(v[4]));

    let supporting = propagator.decisions_leading_to_conflict().to_vec();
    assert!(!supporting.is_empty());
    assert!(supporting.contains(&(3, v[4])));
    for &(level, literal) in &supporting {
        assert!(propagator.is_decision(literal));
        assert_eq!(propagator.get_decision_level(literal), Some(level));
    }
}
