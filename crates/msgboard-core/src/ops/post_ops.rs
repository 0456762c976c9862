use chrono::{DateTime, Utc};

use super::{comment_ops, store::Store};
use crate::errors::{BoardError, Result};
use crate::model::{ModerationAction, Post, PostContent, PostKind};
use crate::rules::attributes::{ensure_non_blank, ensure_non_negative_id, ensure_not_future};

/// Validate and register a post, then attach it to `community` if given
fn create_post(
    store: &mut Store,
    id: i64,
    title: String,
    mature: bool,
    content: PostContent,
    community: Option<&str>,
) -> Result<i64> {
    ensure_non_negative_id("post", id)?;
    if store.posts.contains(&id) {
        return Err(BoardError::AlreadyExists {
            entity: "post".to_string(),
            key: id.to_string(),
        });
    }
    ensure_non_blank("title", &title)?;
    if let Some(name) = community {
        store.get_community(name)?;
    }

    let post = Post::new(id, title.trim().to_string(), mature, store.now(), content);
    tracing::debug!(post_id = id, kind = post.kind().as_str(), "registered post");
    store.posts.register(post);

    if community.is_some() {
        set_community(store, id, community)?;
    }
    Ok(id)
}

/// Keep first occurrences, reject blank entries
fn dedup_entries(field: &str, entries: Vec<String>) -> Result<Vec<String>> {
    let mut unique: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        ensure_non_blank(field, &entry)?;
        if !unique.contains(&entry) {
            unique.push(entry);
        }
    }
    Ok(unique)
}

/// Create a text post
///
/// # Arguments
/// * `store` - Mutable reference to the Store
/// * `id` - Caller-supplied post id (non-negative, unique)
/// * `title` - Title; stored trimmed
/// * `text` - Body text (non-blank)
/// * `mature` - Mature content flag
/// * `community` - Community to attach the post to, if any
///
/// # Errors
/// * `InvalidId` / `AlreadyExists` - bad or duplicate id
/// * `BlankField` - blank title or text
/// * `CommunityNotFound` - `community` names an unknown community
pub fn create_text_post(
    store: &mut Store,
    id: i64,
    title: String,
    text: String,
    mature: bool,
    community: Option<&str>,
) -> Result<i64> {
    ensure_non_blank("text", &text)?;
    create_post(store, id, title, mature, PostContent::Text { text }, community)
}

/// Create a link post; duplicate links are dropped
///
/// # Errors
/// Same as `create_text_post`, with `BlankField` for any blank link.
pub fn create_link_post(
    store: &mut Store,
    id: i64,
    title: String,
    links: Vec<String>,
    mature: bool,
    community: Option<&str>,
) -> Result<i64> {
    let links = dedup_entries("link", links)?;
    create_post(store, id, title, mature, PostContent::Link { links }, community)
}

/// Create an image post; duplicate URLs are dropped
///
/// # Errors
/// Same as `create_text_post`, with `BlankField` for any blank URL.
pub fn create_image_post(
    store: &mut Store,
    id: i64,
    title: String,
    image_urls: Vec<String>,
    mature: bool,
    community: Option<&str>,
) -> Result<i64> {
    let image_urls = dedup_entries("image url", image_urls)?;
    create_post(
        store,
        id,
        title,
        mature,
        PostContent::Image { image_urls },
        community,
    )
}

/// Assign a post to a community, move it, or detach it (`None`)
///
/// Both sides are updated together: the post leaves the previous
/// community's post set before joining the new one. Re-assigning the
/// current community is a no-op.
///
/// # Errors
/// * `PostNotFound`
/// * `CommunityNotFound` - target community unknown
pub fn set_community(store: &mut Store, post_id: i64, community: Option<&str>) -> Result<()> {
    let current = store.get_post(post_id)?.community.clone();
    if current.as_deref() == community {
        return Ok(());
    }
    if let Some(name) = community {
        store.get_community(name)?;
    }

    if let Some(previous) = current.as_deref() {
        if let Some(old) = store.communities.get_mut(&previous.to_string()) {
            old.remove_post_id(post_id);
        }
    }
    if let Some(name) = community {
        store.get_community_mut(name)?.add_post_id(post_id);
    }
    store.get_post_mut(post_id)?.community = community.map(str::to_string);

    tracing::debug!(post_id, community = ?community, "post community changed");
    Ok(())
}

/// # Errors
/// * `PostNotFound`
/// * `BlankField`
pub fn set_title(store: &mut Store, post_id: i64, title: String) -> Result<()> {
    store.get_post(post_id)?;
    ensure_non_blank("title", &title)?;
    store.get_post_mut(post_id)?.title = title.trim().to_string();
    Ok(())
}

/// # Errors
/// * `PostNotFound`
pub fn set_mature(store: &mut Store, post_id: i64, mature: bool) -> Result<()> {
    store.get_post_mut(post_id)?.mature = mature;
    Ok(())
}

fn wrong_kind(post_id: i64, expected: PostKind) -> BoardError {
    BoardError::WrongPostKind {
        post_id,
        expected: expected.as_str().to_string(),
    }
}

/// Replace the body of a text post
///
/// # Errors
/// * `PostNotFound`
/// * `WrongPostKind` - not a text post
/// * `BlankField`
pub fn set_text(store: &mut Store, post_id: i64, text: String) -> Result<()> {
    if store.get_post(post_id)?.kind() != PostKind::Text {
        return Err(wrong_kind(post_id, PostKind::Text));
    }
    ensure_non_blank("text", &text)?;
    if let PostContent::Text { text: body } = &mut store.get_post_mut(post_id)?.content {
        *body = text;
    }
    Ok(())
}

/// Append a link; a link already present is ignored
///
/// # Errors
/// * `PostNotFound`
/// * `WrongPostKind` - not a link post
/// * `BlankField`
pub fn add_link(store: &mut Store, post_id: i64, link: String) -> Result<()> {
    if store.get_post(post_id)?.kind() != PostKind::Link {
        return Err(wrong_kind(post_id, PostKind::Link));
    }
    ensure_non_blank("link", &link)?;
    if let PostContent::Link { links } = &mut store.get_post_mut(post_id)?.content {
        if !links.contains(&link) {
            links.push(link);
        }
    }
    Ok(())
}

/// Append an image URL; a URL already present is ignored
///
/// # Errors
/// * `PostNotFound`
/// * `WrongPostKind` - not an image post
/// * `BlankField`
pub fn add_image_url(store: &mut Store, post_id: i64, url: String) -> Result<()> {
    if store.get_post(post_id)?.kind() != PostKind::Image {
        return Err(wrong_kind(post_id, PostKind::Image));
    }
    ensure_non_blank("image url", &url)?;
    if let PostContent::Image { image_urls } = &mut store.get_post_mut(post_id)?.content {
        if !image_urls.contains(&url) {
            image_urls.push(url);
        }
    }
    Ok(())
}

/// # Errors
/// * `PostNotFound`
/// * `FutureTimestamp`
pub fn set_created_at(store: &mut Store, post_id: i64, created_at: DateTime<Utc>) -> Result<()> {
    store.get_post(post_id)?;
    ensure_not_future("created_at", created_at, store.now())?;
    store.get_post_mut(post_id)?.created_at = created_at;
    Ok(())
}

/// # Errors
/// * `PostNotFound`
/// * `VoteLimitReached` - the tally is already `i64::MAX`
pub fn upvote(store: &mut Store, post_id: i64) -> Result<i64> {
    let votes = &mut store.get_post_mut(post_id)?.votes;
    votes.upvote().ok_or_else(|| vote_limit(post_id, votes.score()))
}

/// # Errors
/// * `PostNotFound`
/// * `VoteLimitReached` - the tally is already `i64::MIN`
pub fn downvote(store: &mut Store, post_id: i64) -> Result<i64> {
    let votes = &mut store.get_post_mut(post_id)?.votes;
    votes.downvote().ok_or_else(|| vote_limit(post_id, votes.score()))
}

fn vote_limit(post_id: i64, score: i64) -> BoardError {
    BoardError::VoteLimitReached {
        entity: "post".to_string(),
        id: post_id,
        score,
    }
}

/// Delete a post and every comment it owns
///
/// Comments are deleted first (their reply links unwound), then the post
/// leaves its community, which records a `PostRemoved` action, and finally
/// the post extent.
///
/// # Errors
/// * `PostNotFound`
pub fn delete_post(store: &mut Store, post_id: i64) -> Result<()> {
    let post = store.get_post(post_id)?;
    let comment_ids = post.comment_ids.clone();
    let community = post.community.clone();
    let title = post.title.clone();

    for comment_id in comment_ids {
        if store.comments.contains(&comment_id) {
            comment_ops::delete_comment(store, comment_id)?;
        }
    }
    store.get_post_mut(post_id)?.comment_ids.clear();

    if let Some(name) = community {
        let now = store.now();
        if let Some(c) = store.communities.get_mut(&name) {
            c.remove_post_id(post_id);
            c.record_action(
                ModerationAction::PostRemoved,
                format!("post {} ({}) removed", post_id, title),
                now,
            );
        }
    }

    store.posts.remove(&post_id);
    tracing::debug!(post_id, "deleted post");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::community_ops;

    #[test]
    fn test_title_trimmed_and_validated() {
        let mut store = Store::new();
        create_text_post(&mut store, 1, "  Hello  ".to_string(), "body".to_string(), false, None)
            .unwrap();
        assert_eq!(store.get_post(1).unwrap().title(), "Hello");
        assert!(matches!(
            set_title(&mut store, 1, "   ".to_string()),
            Err(BoardError::BlankField { .. })
        ));
        assert_eq!(store.get_post(1).unwrap().title(), "Hello");
    }

    #[test]
    fn test_links_deduplicated() {
        let mut store = Store::new();
        create_link_post(
            &mut store,
            1,
            "Links".to_string(),
            vec!["https://a".to_string(), "https://a".to_string()],
            false,
            None,
        )
        .unwrap();
        add_link(&mut store, 1, "https://b".to_string()).unwrap();
        add_link(&mut store, 1, "https://b".to_string()).unwrap();
        assert_eq!(
            store.get_post(1).unwrap().content(),
            &PostContent::Link {
                links: vec!["https://a".to_string(), "https://b".to_string()]
            }
        );
        assert!(matches!(
            add_image_url(&mut store, 1, "https://img".to_string()),
            Err(BoardError::WrongPostKind { .. })
        ));
    }

    #[test]
    fn test_move_between_communities() {
        let mut store = Store::new();
        community_ops::create_community(&mut store, "a".to_string(), None, false).unwrap();
        community_ops::create_community(&mut store, "b".to_string(), None, false).unwrap();
        create_text_post(&mut store, 1, "T".to_string(), "x".to_string(), false, Some("a"))
            .unwrap();

        set_community(&mut store, 1, Some("b")).unwrap();
        assert!(!store.get_community("a").unwrap().contains_post(1));
        assert!(store.get_community("b").unwrap().contains_post(1));
        assert_eq!(store.get_post(1).unwrap().community(), Some("b"));

        set_community(&mut store, 1, None).unwrap();
        assert!(!store.get_community("b").unwrap().contains_post(1));
        assert_eq!(store.get_post(1).unwrap().community(), None);
    }

    #[test]
    fn test_unknown_community_rejected_before_registration() {
        let mut store = Store::new();
        let err = create_text_post(
            &mut store,
            1,
            "T".to_string(),
            "x".to_string(),
            false,
            Some("missing"),
        )
        .unwrap_err();
        assert!(matches!(err, BoardError::CommunityNotFound { .. }));
        assert!(store.posts().is_empty());
    }

    #[test]
    fn test_votes() {
        let mut store = Store::new();
        create_text_post(&mut store, 1, "T".to_string(), "x".to_string(), false, None).unwrap();
        assert_eq!(upvote(&mut store, 1).unwrap(), 1);
        assert_eq!(upvote(&mut store, 1).unwrap(), 2);
        assert_eq!(downvote(&mut store, 1).unwrap(), 1);
    }
}
