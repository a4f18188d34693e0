use chrono::{Duration, Utc};
use moonboard_api::{Comment, CommentId, UserId};
use rand::Rng;

const NUM_USERS: u64 = 5;

const NUM_TOP_LEVEL: u64 = 20;
const NUM_REPLIES: u64 = 80;
const NUM_ORPHANS: u64 = 3;

const COMMENT_MIN_WORDS: usize = 3;
const COMMENT_MAX_WORDS: usize = 40;
const MAX_LIKES: u64 = 30;

/// Share of comments the viewer liked
const LIKED_PERCENT: f64 = 0.2;

fn gen_comment(rng: &mut impl Rng, id: u64, parent: Option<u64>, minutes_ago: i64) -> Comment {
    let author = rng.gen_range(1..=NUM_USERS);
    Comment {
        id: CommentId(id),
        parent_id: parent.map(CommentId),
        author_id: UserId(author),
        display_name: format!("user{}", author),
        avatar: format!("https://example.invalid/avatars/{}.png", author),
        body: lipsum::lipsum_words(rng.gen_range(COMMENT_MIN_WORDS..=COMMENT_MAX_WORDS)),
        created_at: Utc::now() - Duration::minutes(minutes_ago),
        like_count: rng.gen_range(0..=MAX_LIKES),
        liked_by_me: rng.gen_bool(LIKED_PERCENT),
        report_count: 0,
        border_image_url: None,
        nickname_color: None,
    }
}

fn main() -> Result<(), serde_json::Error> {
    let mut rng = rand::thread_rng();
    let total = NUM_TOP_LEVEL + NUM_REPLIES + NUM_ORPHANS;
    let mut comments = Vec::new();

    // Board order is creation order, so every reply comes after its parent
    for id in 1..=total {
        let minutes_ago = (total - id) as i64;
        let parent = match id {
            id if id <= NUM_TOP_LEVEL => None,
            id if id <= NUM_TOP_LEVEL + NUM_REPLIES => Some(rng.gen_range(1..id)),
            // points at a comment that was deleted in the meantime
            _ => Some(total + rng.gen_range(1..=NUM_ORPHANS)),
        };
        comments.push(gen_comment(&mut rng, id, parent, minutes_ago));
    }

    println!("{}", serde_json::to_string_pretty(&comments)?);
    Ok(())
}
