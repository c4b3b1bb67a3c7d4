use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use chirp_core::domain::{Notification, NotificationKind};
use chirp_core::error::NotifyError;
use chirp_core::ports::Notifier;
use chirp_core::{DomainError, FeedStore};
use chirp_infra::InMemoryPostRepository;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Publish("broker down".to_string()))
    }
}

fn feed() -> (FeedStore, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let store = FeedStore::new(Arc::new(InMemoryPostRepository::new()), notifier.clone());
    (store, notifier)
}

#[tokio::test]
async fn test_replies_flatten_to_thread_root() {
    let (feed, _) = feed();
    let (u1, u2, u3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let a = feed.create_post(u1, "hello".to_string()).await.unwrap();
    let b = feed.reply(a.id, u2, "hi back".to_string()).await.unwrap();
    let c = feed.reply(b.id, u3, "me too".to_string()).await.unwrap();

    assert_eq!(b.parent_id, Some(a.id));
    assert_eq!(c.parent_id, Some(a.id));
    assert!(b.is_reply && c.is_reply);
    assert!(!a.is_reply);
    assert_eq!(feed.count_replies(a.id).await.unwrap(), 2);

    // Every member of the thread resolves to the same root.
    for id in [a.id, b.id, c.id] {
        let root = feed.get_thread_root(id).await.unwrap();
        assert_eq!(root.id, a.id);
        assert_eq!(root.parent_id, None);
    }
}

#[tokio::test]
async fn test_reply_counts_match_listing() {
    let (feed, _) = feed();
    let author = Uuid::new_v4();
    let root = feed.create_post(author, "root".to_string()).await.unwrap();

    let mut last = root.id;
    for i in 0..4 {
        last = feed
            .reply(last, Uuid::new_v4(), format!("reply {i}"))
            .await
            .unwrap()
            .id;
    }

    let replies = feed.list_replies(root.id).await.unwrap();
    assert_eq!(replies.len() as u64, feed.count_replies(root.id).await.unwrap());
    assert_eq!(replies.len(), 4);
    assert!(
        replies
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at)
    );
    assert_eq!(replies[0].id, last);

    // Asking from inside the thread lists the same replies.
    let from_reply = feed.list_replies(last).await.unwrap();
    assert_eq!(from_reply, replies);
}

#[tokio::test]
async fn test_toggle_like_round_trip() {
    let (feed, _) = feed();
    let (author, u1) = (Uuid::new_v4(), Uuid::new_v4());
    let a = feed.create_post(author, "hello".to_string()).await.unwrap();

    assert!(feed.toggle_like(a.id, u1).await.unwrap());
    assert_eq!(feed.count_likes(a.id).await.unwrap(), 1);
    assert!(feed.list_likers(a.id).await.unwrap().contains(&u1));

    assert!(!feed.toggle_like(a.id, u1).await.unwrap());
    assert_eq!(feed.count_likes(a.id).await.unwrap(), 0);
    assert!(feed.list_likers(a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_like_count_matches_likers() {
    let (feed, _) = feed();
    let a = feed
        .create_post(Uuid::new_v4(), "hello".to_string())
        .await
        .unwrap();

    let users: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
    for user in &users {
        feed.toggle_like(a.id, *user).await.unwrap();
    }
    feed.toggle_like(a.id, users[0]).await.unwrap();

    let likers = feed.list_likers(a.id).await.unwrap();
    assert_eq!(feed.count_likes(a.id).await.unwrap(), likers.len() as u64);
    assert_eq!(likers.len(), 4);
    assert!(!likers.contains(&users[0]));
}

#[tokio::test]
async fn test_like_notifies_author_and_unlike_is_silent() {
    let (feed, notifier) = feed();
    let (author, fan) = (Uuid::new_v4(), Uuid::new_v4());
    let a = feed.create_post(author, "hello".to_string()).await.unwrap();
    assert!(notifier.sent().is_empty());

    feed.toggle_like(a.id, fan).await.unwrap();
    feed.toggle_like(a.id, fan).await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::Liked);
    assert_eq!(sent[0].actor_id, fan);
    assert_eq!(sent[0].recipient_id, author);
    assert_eq!(sent[0].subject_id, a.id);
}

#[tokio::test]
async fn test_reply_notifies_author_of_replied_post() {
    let (feed, notifier) = feed();
    let (u1, u2, u3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let a = feed.create_post(u1, "hello".to_string()).await.unwrap();
    let b = feed.reply(a.id, u2, "hi".to_string()).await.unwrap();
    let c = feed.reply(b.id, u3, "hey".to_string()).await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].recipient_id, u1);
    assert_eq!(sent[0].subject_id, b.id);
    // C hangs off A but B's author is the one replied to.
    assert_eq!(sent[1].recipient_id, u2);
    assert_eq!(sent[1].actor_id, u3);
    assert_eq!(sent[1].kind, NotificationKind::Reply);
    assert_eq!(sent[1].subject_id, c.id);
}

#[tokio::test]
async fn test_content_validation() {
    let (feed, notifier) = feed();
    let author = Uuid::new_v4();

    let too_long = feed.create_post(author, "x".repeat(281)).await;
    assert!(matches!(too_long, Err(DomainError::Validation(_))));

    let a = feed.create_post(author, "x".repeat(280)).await.unwrap();
    let empty_reply = feed.reply(a.id, Uuid::new_v4(), String::new()).await;
    assert!(matches!(empty_reply, Err(DomainError::Validation(_))));

    assert_eq!(feed.count_replies(a.id).await.unwrap(), 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_post_is_not_found() {
    let (feed, _) = feed();
    let missing = Uuid::new_v4();
    let user = Uuid::new_v4();

    assert!(matches!(
        feed.reply(missing, user, "hi".to_string()).await,
        Err(DomainError::NotFound { id, .. }) if id == missing
    ));
    assert!(matches!(
        feed.toggle_like(missing, user).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        feed.count_likes(missing).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        feed.list_replies(missing).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        feed.delete_post(missing).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_root_removes_thread() {
    let (feed, _) = feed();
    let a = feed
        .create_post(Uuid::new_v4(), "hello".to_string())
        .await
        .unwrap();
    let b = feed.reply(a.id, Uuid::new_v4(), "b".to_string()).await.unwrap();
    let c = feed.reply(b.id, Uuid::new_v4(), "c".to_string()).await.unwrap();

    feed.delete_post(a.id).await.unwrap();

    for id in [a.id, b.id, c.id] {
        assert!(matches!(
            feed.get_post(id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}

#[tokio::test]
async fn test_removed_author_posts_survive_without_notifications() {
    let (feed, notifier) = feed();
    let (author, fan) = (Uuid::new_v4(), Uuid::new_v4());
    let a = feed.create_post(author, "hello".to_string()).await.unwrap();

    assert_eq!(feed.remove_author(author).await.unwrap(), 1);

    let orphan = feed.get_post(a.id).await.unwrap();
    assert_eq!(orphan.author_id, None);

    // Orphaned posts still accept likes and replies.
    assert!(feed.toggle_like(a.id, fan).await.unwrap());
    feed.reply(a.id, fan, "anyone?".to_string()).await.unwrap();
    assert_eq!(feed.count_replies(a.id).await.unwrap(), 1);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_write() {
    let feed = FeedStore::new(
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(FailingNotifier),
    );
    let a = feed
        .create_post(Uuid::new_v4(), "hello".to_string())
        .await
        .unwrap();

    assert!(feed.toggle_like(a.id, Uuid::new_v4()).await.unwrap());
    let reply = feed.reply(a.id, Uuid::new_v4(), "hi".to_string()).await;
    assert!(reply.is_ok());
    assert_eq!(feed.count_likes(a.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_feed_and_author_listing() {
    let (feed, _) = feed();
    let author = Uuid::new_v4();

    let first = feed.create_post(author, "first".to_string()).await.unwrap();
    let second = feed
        .create_post(Uuid::new_v4(), "second".to_string())
        .await
        .unwrap();
    let reply = feed.reply(second.id, author, "re".to_string()).await.unwrap();

    let top = feed.list_feed(10).await.unwrap();
    let ids: Vec<Uuid> = top.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let by_author: Vec<Uuid> = feed
        .list_by_author(author)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(by_author, vec![reply.id, first.id]);
}
