
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use super::*;
use crate::config::CardConfig;
use crate::render::CardFormat;
use crate::state::test_helpers;
use crate::widget::ErrorCode;

const ROOM: i64 = -100_123;
const ACTOR: i64 = 501;
const VOTER_A: i64 = 601;
const VOTER_B: i64 = 602;

fn request(text: &str) -> CreateCardRequest {
    CreateCardRequest {
        room_id: ROOM,
        actor_id: ACTOR,
        author_name: "Alice".into(),
        quoted_text: text.into(),
        avatar: None,
    }
}

struct StubAvatar {
    calls: AtomicUsize,
    payload: Option<Vec<u8>>,
}

impl StubAvatar {
    fn returning(payload: Option<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), payload })
    }
}

#[async_trait::async_trait]
impl AvatarFetch for StubAvatar {
    async fn fetch(&self) -> Option<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payload.clone()
    }
}

fn avatar_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(48, 48, Rgba([200, 40, 40, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

// =============================================================================
// END TO END
// =============================================================================

#[tokio::test]
async fn hello_world_card_and_vote_flow() {
    test_helpers::init_test_tracing();
    let state = test_helpers::test_state();

    let post = create_card(&state, request("hello world")).await.unwrap();
    assert!(!post.card.encoded.is_empty());
    assert_eq!(post.card.format, CardFormat::Jpeg);
    assert_eq!(post.widget.label, "👍 0 | 👎 0");
    assert_eq!(poll_tally(&state, post.poll_id).unwrap(), Tally { up: 0, down: 0 });

    assert_eq!(vote(&state, post.poll_id, VOTER_A, VoteAction::Up).unwrap(), Tally { up: 1, down: 0 });
    // Same choice again toggles off.
    assert_eq!(vote(&state, post.poll_id, VOTER_A, VoteAction::Up).unwrap(), Tally { up: 0, down: 0 });
    assert_eq!(vote(&state, post.poll_id, VOTER_A, VoteAction::Down).unwrap(), Tally { up: 0, down: 1 });
    assert_eq!(vote(&state, post.poll_id, VOTER_B, VoteAction::Up).unwrap(), Tally { up: 1, down: 1 });
}

#[tokio::test]
async fn vote_on_unknown_poll_is_stale_and_creates_nothing() {
    let state = test_helpers::test_state();
    let ghost = Uuid::new_v4();

    let result = vote(&state, ghost, VOTER_A, VoteAction::Up);
    assert!(matches!(result, Err(VoteError::StalePoll(_))));
    assert!(state.polls.is_empty());
}

// =============================================================================
// RATE LIMITING
// =============================================================================

#[tokio::test]
async fn second_card_in_the_cooldown_is_denied() {
    let state = test_helpers::test_state();

    create_card(&state, request("first")).await.unwrap();
    let denied = create_card(&state, request("second")).await;

    match denied {
        Err(CardError::RateLimited(e)) => assert!(e.remaining_secs() >= 1),
        other => panic!("expected RateLimited, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn other_actors_and_rooms_are_not_blocked() {
    let state = test_helpers::test_state();
    create_card(&state, request("first")).await.unwrap();

    let other_actor = CreateCardRequest { actor_id: ACTOR + 1, ..request("second") };
    create_card(&state, other_actor).await.unwrap();

    let other_room = CreateCardRequest { room_id: ROOM + 1, ..request("third") };
    create_card(&state, other_room).await.unwrap();
}

// =============================================================================
// VALIDATION
// =============================================================================

#[tokio::test]
async fn empty_and_whitespace_text_is_rejected() {
    let state = test_helpers::test_state();

    assert!(matches!(create_card(&state, request("")).await, Err(CardError::NoText)));
}

#[tokio::test]
async fn command_text_is_rejected() {
    let state = test_helpers::test_state();

    let result = create_card(&state, request("/quote do it again")).await;
    assert!(matches!(result, Err(CardError::NoText)));
}

#[tokio::test]
async fn rejected_text_still_consumes_the_cooldown() {
    // The limiter runs first, exactly like the original flow: a rejected
    // request does not grant a free retry inside the cooldown.
    let state = test_helpers::test_state();

    assert!(matches!(create_card(&state, request("   ")).await, Err(CardError::NoText)));
    assert!(matches!(
        create_card(&state, request("now with text")).await,
        Err(CardError::RateLimited(_))
    ));
}

#[tokio::test]
async fn long_text_is_bounded_with_an_ellipsis() {
    let state = test_helpers::test_state();
    let long = "word ".repeat(400);

    let post = create_card(&state, request(&long)).await.unwrap();
    // The card still renders and encodes despite the oversized input.
    assert!(!post.card.encoded.is_empty());
}

// =============================================================================
// AVATARS
// =============================================================================

#[tokio::test]
async fn failed_avatar_fetch_still_produces_a_card() {
    let state = test_helpers::test_state();
    let fetcher = StubAvatar::returning(None);

    let mut req = request("quote with broken avatar");
    req.avatar = Some(fetcher.clone());

    let post = create_card(&state, req).await.unwrap();
    assert!(!post.card.encoded.is_empty());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn avatar_is_fetched_once_per_actor_across_rooms() {
    let state = test_helpers::test_state();
    let fetcher = StubAvatar::returning(Some(avatar_png()));

    let mut first = request("one");
    first.avatar = Some(fetcher.clone());
    create_card(&state, first).await.unwrap();

    // Same actor, different room: rate limiter allows it, avatar cache hits.
    let mut second = request("two");
    second.room_id = ROOM + 7;
    second.avatar = Some(fetcher.clone());
    create_card(&state, second).await.unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

// =============================================================================
// ERROR SURFACE
// =============================================================================

#[tokio::test]
async fn error_codes_are_stable() {
    let state = test_helpers::test_state();

    let no_text = create_card(&state, request("")).await.unwrap_err();
    assert_eq!(no_text.error_code(), "E_NO_TEXT");
    assert!(!no_text.retryable());

    let limited = create_card(&state, request("again")).await.unwrap_err();
    assert_eq!(limited.error_code(), "E_RATE_LIMITED");
    assert!(limited.retryable());

    let stale = vote(&state, Uuid::new_v4(), VOTER_A, VoteAction::Clear).unwrap_err();
    assert_eq!(stale.error_code(), "E_STALE_POLL");
}
