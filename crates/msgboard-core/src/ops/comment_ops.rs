use chrono::{DateTime, Utc};

use super::store::Store;
use crate::errors::{BoardError, Result};
use crate::model::Comment;
use crate::rules::attributes::{ensure_non_blank, ensure_non_negative_id, ensure_not_future};

/// Create a comment on a post, optionally replying to another comment
///
/// The post binding is fixed for the comment's lifetime.
///
/// # Errors
/// * `InvalidId` / `AlreadyExists` - bad or duplicate id
/// * `BlankField` - blank content
/// * `PostNotFound` - a comment cannot exist without its post
/// * `CommentNotFound` - `reply_to` names an unknown comment
pub fn create_comment(
    store: &mut Store,
    id: i64,
    content: String,
    post_id: i64,
    reply_to: Option<i64>,
) -> Result<i64> {
    ensure_non_negative_id("comment", id)?;
    if store.comments.contains(&id) {
        return Err(BoardError::AlreadyExists {
            entity: "comment".to_string(),
            key: id.to_string(),
        });
    }
    ensure_non_blank("content", &content)?;
    store.get_post(post_id)?;
    if let Some(parent_id) = reply_to {
        store.get_comment(parent_id)?;
    }

    let comment = Comment::new(id, content, store.now(), post_id);
    store.comments.register(comment);
    store.get_post_mut(post_id)?.add_comment_id(id);
    tracing::debug!(comment_id = id, post_id, "registered comment");

    if reply_to.is_some() {
        set_reply_to(store, id, reply_to)?;
    }
    Ok(id)
}

/// Bind a comment to a post
///
/// Binding to the post it already belongs to is a no-op; any other post is
/// refused.
///
/// # Errors
/// * `CommentNotFound`
/// * `PostNotFound`
/// * `CommentPostImmutable`
pub fn bind_to_post(store: &mut Store, comment_id: i64, post_id: i64) -> Result<()> {
    let current = store.get_comment(comment_id)?.post_id;
    store.get_post(post_id)?;
    if current != post_id {
        return Err(BoardError::CommentPostImmutable {
            comment_id,
            current_post_id: current,
            requested_post_id: post_id,
        });
    }
    store.get_post_mut(post_id)?.add_comment_id(comment_id);
    Ok(())
}

/// Point a comment at a new parent, or detach it with `None`
///
/// The comment leaves the previous parent's reply list before joining the
/// new one. Setting the current parent again is a no-op.
///
/// # Errors
/// * `CommentNotFound` - the comment or the new parent is missing
/// * `SelfReply`
pub fn set_reply_to(store: &mut Store, comment_id: i64, parent: Option<i64>) -> Result<()> {
    let current = store.get_comment(comment_id)?.reply_to;
    if parent == Some(comment_id) {
        return Err(BoardError::SelfReply { comment_id });
    }
    if current == parent {
        return Ok(());
    }
    if let Some(parent_id) = parent {
        store.get_comment(parent_id)?;
    }

    if let Some(previous) = current {
        if let Some(old) = store.comments.get_mut(&previous) {
            old.remove_reply(comment_id);
        }
    }
    if let Some(parent_id) = parent {
        store.get_comment_mut(parent_id)?.add_reply(comment_id);
    }
    store.get_comment_mut(comment_id)?.reply_to = parent;

    tracing::debug!(comment_id, reply_to = ?parent, "reply link changed");
    Ok(())
}

/// # Errors
/// * `CommentNotFound`
/// * `BlankField`
pub fn set_content(store: &mut Store, comment_id: i64, content: String) -> Result<()> {
    store.get_comment(comment_id)?;
    ensure_non_blank("content", &content)?;
    store.get_comment_mut(comment_id)?.content = content;
    Ok(())
}

/// # Errors
/// * `CommentNotFound`
/// * `FutureTimestamp`
pub fn set_created_at(store: &mut Store, comment_id: i64, created_at: DateTime<Utc>) -> Result<()> {
    store.get_comment(comment_id)?;
    ensure_not_future("created_at", created_at, store.now())?;
    store.get_comment_mut(comment_id)?.created_at = created_at;
    Ok(())
}

/// # Errors
/// * `CommentNotFound`
/// * `VoteLimitReached` - the tally is already `i64::MAX`
pub fn upvote(store: &mut Store, comment_id: i64) -> Result<i64> {
    let votes = &mut store.get_comment_mut(comment_id)?.votes;
    votes
        .upvote()
        .ok_or_else(|| vote_limit(comment_id, votes.score()))
}

/// # Errors
/// * `CommentNotFound`
/// * `VoteLimitReached` - the tally is already `i64::MIN`
pub fn downvote(store: &mut Store, comment_id: i64) -> Result<i64> {
    let votes = &mut store.get_comment_mut(comment_id)?.votes;
    votes
        .downvote()
        .ok_or_else(|| vote_limit(comment_id, votes.score()))
}

fn vote_limit(comment_id: i64, score: i64) -> BoardError {
    BoardError::VoteLimitReached {
        entity: "comment".to_string(),
        id: comment_id,
        score,
    }
}

/// Delete a comment
///
/// Detaches it from its post and from its parent's reply list. Its own
/// replies survive with no parent.
///
/// # Errors
/// * `CommentNotFound`
pub fn delete_comment(store: &mut Store, comment_id: i64) -> Result<()> {
    let comment = store.get_comment(comment_id)?;
    let post_id = comment.post_id;
    let parent = comment.reply_to;
    let replies = comment.replies.clone();

    if let Some(post) = store.posts.get_mut(&post_id) {
        post.remove_comment_id(comment_id);
    }
    if let Some(parent_id) = parent {
        if let Some(p) = store.comments.get_mut(&parent_id) {
            p.remove_reply(comment_id);
        }
    }
    for reply_id in replies {
        if let Some(reply) = store.comments.get_mut(&reply_id) {
            reply.reply_to = None;
        }
    }
    store.get_comment_mut(comment_id)?.replies.clear();

    store.comments.remove(&comment_id);
    tracing::debug!(comment_id, post_id, "deleted comment");
    Ok(())
}
