
use super::*;

const ALICE: i64 = 1001;
const BOB: i64 = 1002;

#[test]
fn fresh_poll_starts_at_zero() {
    let polls = PollStore::new();
    let poll_id = polls.create();
    assert_eq!(polls.tally(poll_id).unwrap(), Tally { up: 0, down: 0 });
}

#[test]
fn first_vote_counts() {
    let polls = PollStore::new();
    let poll_id = polls.create();

    let tally = polls.apply(poll_id, ALICE, VoteAction::Up).unwrap();
    assert_eq!(tally, Tally { up: 1, down: 0 });
}

#[test]
fn same_choice_twice_toggles_off() {
    let polls = PollStore::new();
    let poll_id = polls.create();

    polls.apply(poll_id, ALICE, VoteAction::Up).unwrap();
    let tally = polls.apply(poll_id, ALICE, VoteAction::Up).unwrap();

    // Second submission is equivalent to an explicit clear.
    assert_eq!(tally, Tally { up: 0, down: 0 });
    assert_eq!(polls.apply(poll_id, ALICE, VoteAction::Up).unwrap(), Tally { up: 1, down: 0 });
}

#[test]
fn switching_choice_is_atomic() {
    let polls = PollStore::new();
    let poll_id = polls.create();

    polls.apply(poll_id, ALICE, VoteAction::Up).unwrap();
    let tally = polls.apply(poll_id, ALICE, VoteAction::Down).unwrap();
    assert_eq!(tally, Tally { up: 0, down: 1 });
}

#[test]
fn clear_removes_any_standing_vote() {
    let polls = PollStore::new();
    let poll_id = polls.create();

    polls.apply(poll_id, ALICE, VoteAction::Down).unwrap();
    assert_eq!(polls.apply(poll_id, ALICE, VoteAction::Clear).unwrap(), Tally { up: 0, down: 0 });

    // Clearing with no standing vote is a no-op, not an error.
    assert_eq!(polls.apply(poll_id, ALICE, VoteAction::Clear).unwrap(), Tally { up: 0, down: 0 });
}

#[test]
fn voters_are_independent() {
    let polls = PollStore::new();
    let poll_id = polls.create();

    polls.apply(poll_id, ALICE, VoteAction::Up).unwrap();
    let tally = polls.apply(poll_id, BOB, VoteAction::Down).unwrap();
    assert_eq!(tally, Tally { up: 1, down: 1 });

    // Bob toggling off leaves Alice's vote standing.
    let tally = polls.apply(poll_id, BOB, VoteAction::Down).unwrap();
    assert_eq!(tally, Tally { up: 1, down: 0 });
}

#[test]
fn counts_match_census_over_arbitrary_sequences() {
    let polls = PollStore::new();
    let poll_id = polls.create();

    // A scripted pile-up of switches, toggles, and clears across five voters.
    let script: &[(i64, VoteAction)] = &[
        (1, VoteAction::Up),
        (2, VoteAction::Up),
        (3, VoteAction::Down),
        (1, VoteAction::Down),
        (2, VoteAction::Up),
        (4, VoteAction::Up),
        (3, VoteAction::Clear),
        (5, VoteAction::Down),
        (1, VoteAction::Down),
        (4, VoteAction::Clear),
        (5, VoteAction::Up),
        (2, VoteAction::Down),
    ];

    for (voter, action) in script {
        // apply() debug-asserts tally == census after every transition, so
        // walking the script is itself the invariant check.
        polls.apply(poll_id, *voter, *action).unwrap();
    }

    // Final state by hand: 1 cleared, 2 down, 3 cleared, 4 cleared, 5 up.
    assert_eq!(polls.tally(poll_id).unwrap(), Tally { up: 1, down: 1 });
}

#[test]
fn unknown_poll_is_stale_and_leaves_no_state() {
    let polls = PollStore::new();
    let ghost = Uuid::new_v4();

    let result = polls.apply(ghost, ALICE, VoteAction::Up);
    assert!(matches!(result, Err(VoteError::StalePoll(id)) if id == ghost));
    assert!(polls.is_empty());

    assert!(matches!(polls.tally(ghost), Err(VoteError::StalePoll(_))));
}

#[test]
fn polls_do_not_share_tallies() {
    let polls = PollStore::new();
    let first = polls.create();
    let second = polls.create();

    polls.apply(first, ALICE, VoteAction::Up).unwrap();
    assert_eq!(polls.tally(second).unwrap(), Tally { up: 0, down: 0 });
    assert_eq!(polls.len(), 2);
}

#[test]
fn action_tokens_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&VoteAction::Up).unwrap(), "\"up\"");
    assert_eq!(serde_json::to_string(&VoteAction::Down).unwrap(), "\"down\"");
    assert_eq!(serde_json::to_string(&VoteAction::Clear).unwrap(), "\"clear\"");
    let parsed: VoteAction = serde_json::from_str("\"down\"").unwrap();
    assert_eq!(parsed, VoteAction::Down);
}
