use chrono::{DateTime, Utc};
use msgboard_core_types::Sensitive;

use super::{store::Store, subscription_ops};
use crate::errors::{BoardError, Result};
use crate::model::{BadgeType, MemberProfile, Preferences, StaffProfile, User, UserKind, UserRole};
use crate::rules::attributes::{
    ensure_non_blank, ensure_non_negative_id, ensure_non_negative_score, ensure_not_future,
    ensure_optional_non_blank, ensure_password_length, ensure_score_sum_fits,
};

/// Shared credential checks for every user constructor
fn check_new_user(
    store: &Store,
    id: i64,
    email: &str,
    username: &str,
    password: &str,
) -> Result<()> {
    ensure_non_negative_id("user", id)?;
    if store.users.contains(&id) {
        return Err(BoardError::AlreadyExists {
            entity: "user".to_string(),
            key: id.to_string(),
        });
    }
    ensure_non_blank("username", username)?;
    if !store.credentials.is_valid_username(username) {
        return Err(BoardError::BlankField {
            field: "username".to_string(),
        });
    }
    if store.find_user_by_username(username).is_some() {
        return Err(BoardError::UsernameTaken {
            username: username.to_string(),
        });
    }
    check_email(store, email)?;
    ensure_password_length(password, store.config.password_min_length)
}

fn check_email(store: &Store, email: &str) -> Result<()> {
    if !store.credentials.is_valid_email(email) {
        return Err(BoardError::InvalidEmail {
            email: email.to_string(),
        });
    }
    Ok(())
}

fn register_user(store: &mut Store, user: User) -> i64 {
    let id = user.id;
    tracing::debug!(user_id = id, role = user.role().as_str(), "registered user");
    store.users.register(user);
    id
}

/// Create a member who joins now
///
/// # Errors
/// * `InvalidId` - negative id
/// * `AlreadyExists` - id already used by another user
/// * `BlankField` - blank username
/// * `UsernameTaken` - username already used
/// * `InvalidEmail` - email rejected by the credential policy
/// * `PasswordTooShort` - shorter than the configured minimum
pub fn create_member(
    store: &mut Store,
    id: i64,
    email: String,
    username: String,
    password: String,
) -> Result<i64> {
    check_new_user(store, id, &email, &username, &password)?;
    let profile = MemberProfile::new(store.now());
    let user = User::new(id, email, username, password, UserKind::Member(profile));
    Ok(register_user(store, user))
}

/// Create an administrator assigned now
///
/// # Errors
/// Same as `create_member`.
pub fn create_administrator(
    store: &mut Store,
    id: i64,
    email: String,
    username: String,
    password: String,
) -> Result<i64> {
    check_new_user(store, id, &email, &username, &password)?;
    let staff = StaffProfile {
        assigned_at: store.now(),
    };
    let user = User::new(id, email, username, password, UserKind::Administrator(staff));
    Ok(register_user(store, user))
}

/// Create a moderator account with a caller-supplied assignment date
///
/// # Errors
/// Same as `create_member`, plus `FutureTimestamp` when `assigned_at` is
/// after the store clock.
pub fn create_moderator(
    store: &mut Store,
    id: i64,
    email: String,
    username: String,
    password: String,
    assigned_at: DateTime<Utc>,
) -> Result<i64> {
    check_new_user(store, id, &email, &username, &password)?;
    ensure_not_future("assigned_at", assigned_at, store.now())?;
    let user = User::new(
        id,
        email,
        username,
        password,
        UserKind::Moderator(StaffProfile { assigned_at }),
    );
    Ok(register_user(store, user))
}

/// # Errors
/// * `UserNotFound`
/// * `InvalidEmail`
pub fn set_email(store: &mut Store, user_id: i64, email: String) -> Result<()> {
    store.get_user(user_id)?;
    check_email(store, &email)?;
    store.get_user_mut(user_id)?.email = email;
    Ok(())
}

/// # Errors
/// * `UserNotFound`
/// * `PasswordTooShort`
pub fn set_password(store: &mut Store, user_id: i64, password: String) -> Result<()> {
    store.get_user(user_id)?;
    ensure_password_length(&password, store.config.password_min_length)?;
    store.get_user_mut(user_id)?.password = Sensitive::new(password);
    Ok(())
}

/// # Errors
/// * `UserNotFound`
pub fn set_preferences(store: &mut Store, user_id: i64, preferences: Preferences) -> Result<()> {
    store.get_user_mut(user_id)?.preferences = preferences;
    Ok(())
}

/// Set a member's optional first and last names
///
/// # Errors
/// * `UserNotFound`
/// * `WrongUserKind` - not a member
/// * `BlankField` - a provided name is blank
pub fn set_member_names(
    store: &mut Store,
    member_id: i64,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<()> {
    store.get_member(member_id)?;
    ensure_optional_non_blank("first_name", first_name.as_deref())?;
    ensure_optional_non_blank("last_name", last_name.as_deref())?;
    let profile = store.get_member_mut(member_id)?;
    profile.first_name = first_name;
    profile.last_name = last_name;
    Ok(())
}

/// # Errors
/// * `UserNotFound`
/// * `WrongUserKind`
/// * `BlankField` - bio provided but blank
pub fn set_bio(store: &mut Store, member_id: i64, bio: Option<String>) -> Result<()> {
    store.get_member(member_id)?;
    ensure_optional_non_blank("bio", bio.as_deref())?;
    store.get_member_mut(member_id)?.bio = bio;
    Ok(())
}

/// # Errors
/// * `UserNotFound`
/// * `WrongUserKind`
/// * `NegativeScore`
pub fn set_post_score(store: &mut Store, member_id: i64, score: i64) -> Result<()> {
    let comment_score = store.get_member(member_id)?.comment_score;
    ensure_non_negative_score("post_score", score)?;
    ensure_score_sum_fits(score, comment_score)?;
    store.get_member_mut(member_id)?.post_score = score;
    Ok(())
}

/// # Errors
/// * `UserNotFound`
/// * `WrongUserKind`
/// * `NegativeScore`
pub fn set_comment_score(store: &mut Store, member_id: i64, score: i64) -> Result<()> {
    let post_score = store.get_member(member_id)?.post_score;
    ensure_non_negative_score("comment_score", score)?;
    ensure_score_sum_fits(post_score, score)?;
    store.get_member_mut(member_id)?.comment_score = score;
    Ok(())
}

/// # Errors
/// * `UserNotFound`
/// * `WrongUserKind`
/// * `FutureTimestamp`
pub fn set_joined_at(store: &mut Store, member_id: i64, joined_at: DateTime<Utc>) -> Result<()> {
    store.get_member(member_id)?;
    ensure_not_future("joined_at", joined_at, store.now())?;
    store.get_member_mut(member_id)?.joined_at = joined_at;
    Ok(())
}

/// Change the assignment date of an administrator or moderator account
///
/// # Errors
/// * `UserNotFound`
/// * `WrongUserKind` - user is a member
/// * `FutureTimestamp`
pub fn set_assigned_at(store: &mut Store, user_id: i64, assigned_at: DateTime<Utc>) -> Result<()> {
    if store.get_user(user_id)?.staff().is_none() {
        return Err(BoardError::WrongUserKind {
            user_id,
            expected: "administrator or moderator".to_string(),
        });
    }
    ensure_not_future("assigned_at", assigned_at, store.now())?;
    if let Some(staff) = store.get_user_mut(user_id)?.staff_mut() {
        staff.assigned_at = assigned_at;
    }
    Ok(())
}

/// Add a badge to a member; a badge the member already holds is ignored
///
/// # Errors
/// * `UserNotFound`
/// * `WrongUserKind`
pub fn add_badge(store: &mut Store, member_id: i64, badge: BadgeType) -> Result<()> {
    store.get_member_mut(member_id)?.add_badge(badge);
    Ok(())
}

fn require_administrator(store: &Store, admin_id: i64) -> Result<()> {
    if store.get_user(admin_id)?.role() != UserRole::Administrator {
        return Err(BoardError::WrongUserKind {
            user_id: admin_id,
            expected: UserRole::Administrator.as_str().to_string(),
        });
    }
    Ok(())
}

/// Ban any user on behalf of an administrator
///
/// # Errors
/// * `UserNotFound` - either user is missing
/// * `WrongUserKind` - `admin_id` is not an administrator
pub fn ban_user(store: &mut Store, admin_id: i64, target_id: i64) -> Result<()> {
    require_administrator(store, admin_id)?;
    store.get_user_mut(target_id)?.banned = true;
    tracing::debug!(admin_id, user_id = target_id, "banned user");
    Ok(())
}

/// # Errors
/// Same as `ban_user`.
pub fn unban_user(store: &mut Store, admin_id: i64, target_id: i64) -> Result<()> {
    require_administrator(store, admin_id)?;
    store.get_user_mut(target_id)?.banned = false;
    tracing::debug!(admin_id, user_id = target_id, "unbanned user");
    Ok(())
}

/// Award a badge to a member on behalf of an administrator
///
/// # Errors
/// * `UserNotFound`
/// * `WrongUserKind` - `admin_id` is not an administrator or `member_id` is
///   not a member
pub fn award_badge(
    store: &mut Store,
    admin_id: i64,
    member_id: i64,
    badge: BadgeType,
) -> Result<()> {
    require_administrator(store, admin_id)?;
    add_badge(store, member_id, badge)
}

/// Delete a user, first deleting every subscription a member holds
///
/// Usernames recorded in community moderator lists are plain text and are
/// left as they are.
///
/// # Errors
/// * `UserNotFound`
pub fn delete_user(store: &mut Store, user_id: i64) -> Result<()> {
    let subscription_ids: Vec<i64> = store
        .get_user(user_id)?
        .member()
        .map(|m| m.subscription_ids().to_vec())
        .unwrap_or_default();

    for subscription_id in subscription_ids {
        subscription_ops::delete_subscription(store, subscription_id)?;
    }

    store.users.remove(&user_id);
    tracing::debug!(user_id, "deleted user");
    Ok(())
}
