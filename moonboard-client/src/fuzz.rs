#![cfg(test)]

use std::{cmp, collections::HashSet, ops::RangeTo, panic::AssertUnwindSafe};

use bolero::generator::TypeGenerator;
use moonboard_mock_server::MockServer;

use crate::{
    api::{Board, CommentId, Error, PostId, UserId},
    ops, test_util::record, tree, Comment, CommentStore, LikeOutcome, LikeSnapshot, StoreConfig,
};

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            if std::env::var("RUST_LOG").is_ok() {
                let _ = tracing_subscriber::fmt::try_init();
            }
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

const POST: PostId = PostId(1);
const USERS: [UserId; 2] = [UserId(1), UserId(2)];

#[derive(Clone, Copy, Debug, bolero::generator::TypeGenerator)]
enum FuzzFailure {
    AuthRequired,
    NotFound,
    ServerError,
    Validation,
}

impl FuzzFailure {
    fn error(self) -> Error {
        match self {
            FuzzFailure::AuthRequired => Error::AuthRequired,
            FuzzFailure::NotFound => Error::NotFound,
            FuzzFailure::ServerError => Error::ServerError(String::from("fuzz")),
            FuzzFailure::Validation => Error::Validation(String::from("fuzz")),
        }
    }
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    Reply {
        parent: Option<usize>,
        #[generator(bolero::generator::gen_with::<String>().len(0..20usize))]
        text: String,
    },
    Delete {
        comment: usize,
    },
    ToggleLike {
        comment: usize,
    },
    /// The viewer likes a comment from another device
    LikeElsewhere {
        comment: usize,
    },
    FailNext(FuzzFailure),
    LikePayload(bool),
    SwitchViewer {
        user: usize,
    },
    Refresh,
}

fn resize_int(fuzz_id: usize, RangeTo { end }: RangeTo<usize>) -> Option<usize> {
    if end == 0 {
        return None;
    }
    let bucket_size = cmp::max(1, usize::MAX / end); // in case we rounded to 0
    let id = fuzz_id / bucket_size;
    Some(cmp::min(id, end - 1)) // in case id was actually over end - 1 due to rounding
}

struct ComparativeFuzzer {
    mock: MockServer,
    store: CommentStore,

    /// Comments whose like state the store cannot know about yet
    stale: HashSet<CommentId>,
}

impl ComparativeFuzzer {
    fn new() -> ComparativeFuzzer {
        let mut mock = MockServer::new();
        mock.seed(
            POST,
            vec![
                record(1, None),
                record(2, Some(1)),
                record(3, None),
                record(4, Some(3)),
                record(5, Some(4)),
            ],
        );
        mock.sign_in(Some(USERS[0]));
        let mut store = CommentStore::new(POST, Some(USERS[0]), StoreConfig::default());
        store.load(mock.test_flat_comments(POST));
        ComparativeFuzzer {
            mock,
            store,
            stale: HashSet::new(),
        }
    }

    fn pick(&self, fuzz_id: usize) -> Option<CommentId> {
        let ids = self.mock.test_comment_ids(POST);
        resize_int(fuzz_id, ..ids.len()).map(|i| ids[i])
    }

    async fn execute_fuzz_op(&mut self, op: FuzzOp) {
        match op {
            FuzzOp::Reply { parent, text } => {
                let parent = match parent {
                    None => None,
                    Some(p) => match self.pick(p) {
                        None => return,
                        Some(p) => Some(p),
                    },
                };
                let _ = self.store.submit_reply(&mut self.mock, parent, text).await;
            }
            FuzzOp::Delete { comment } => {
                if let Some(id) = self.pick(comment) {
                    let _ = self.store.request_delete(&mut self.mock, id).await;
                }
            }
            FuzzOp::ToggleLike { comment } => {
                if let Some(id) = self.pick(comment) {
                    let outcome = self
                        .store
                        .toggle_like(&mut self.mock, id)
                        .await
                        .expect("viewer is always signed in");
                    match outcome {
                        None => panic!("toggle on {id:?} was ignored with nothing in flight"),
                        Some(LikeOutcome::RolledBack { .. }) => (),
                        Some(_) => {
                            self.stale.remove(&id);
                        }
                    }
                }
            }
            FuzzOp::LikeElsewhere { comment } => {
                if let Some(id) = self.pick(comment) {
                    if self.mock.like_comment(id).await.is_ok() {
                        self.stale.insert(id);
                    }
                }
            }
            FuzzOp::FailNext(failure) => self.mock.fail_next(failure.error()),
            FuzzOp::LikePayload(enabled) => self.mock.set_like_payload(enabled),
            FuzzOp::SwitchViewer { user } => {
                let user = USERS[user % USERS.len()];
                self.mock.sign_in(Some(user));
                self.store.set_viewer(Some(user));
                self.store.load(self.mock.test_flat_comments(POST));
                self.stale.clear();
            }
            FuzzOp::Refresh => {
                if self.store.refresh(&mut self.mock).await.is_ok() {
                    self.stale.clear();
                }
            }
        }
        self.store.drain_notices();
    }

    fn mask_stale(&self, mut tree: Vec<Comment>) -> Vec<Comment> {
        for id in &self.stale {
            tree = ops::set_like_state(
                tree,
                *id,
                LikeSnapshot {
                    liked: false,
                    count: 0,
                },
            );
        }
        tree
    }

    fn check(&self, op: &FuzzOp) {
        let expected = self.mask_stale(tree::build(self.mock.test_flat_comments(POST)));
        let actual = self.mask_stale((*self.store.comments()).clone());
        assert_eq!(
            actual, expected,
            "store and board disagree after {op:?}"
        );
    }
}

do_tokio_test!(compare_with_mock, Vec<FuzzOp>, |test: Vec<FuzzOp>| async move {
    let mut fuzzer = ComparativeFuzzer::new();
    for op in test {
        fuzzer.execute_fuzz_op(op.clone()).await;
        fuzzer.check(&op);
    }
});
