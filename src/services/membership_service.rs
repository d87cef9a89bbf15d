use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::{hike_repo, join_request_repo, membership_repo};
use crate::models::JoinRequestRow;

// Business-rule outcomes are terminal and never retried; only `Storage`
// reflects a transient fault a caller may retry.
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("hike not found")]
    HikeNotFound,
    #[error("join request not found")]
    RequestNotFound,
    #[error("only the hike creator may perform this action")]
    Forbidden,
    #[error("not a member of this hike")]
    NotMember,
    #[error("hike is at capacity")]
    CapacityExceeded,
    #[error("join request is already resolved")]
    RequestAlreadyResolved,
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl MembershipError {
    pub fn code(&self) -> &'static str {
        match self {
            MembershipError::HikeNotFound => "hike_not_found",
            MembershipError::RequestNotFound => "request_not_found",
            MembershipError::Forbidden => "forbidden",
            MembershipError::NotMember => "not_member",
            MembershipError::CapacityExceeded => "capacity_exceeded",
            MembershipError::RequestAlreadyResolved => "request_already_resolved",
            MembershipError::Storage(_) => "storage_error",
        }
    }
}

/// What a join call did for this (hike, user) pair. Repeat calls are
/// idempotent: they report the stored state instead of writing a second row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
    RequestSubmitted,
    RequestPending,
    RequestRejected,
}

impl JoinOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            JoinOutcome::Joined => "joined",
            JoinOutcome::AlreadyMember => "already_member",
            JoinOutcome::RequestSubmitted | JoinOutcome::RequestPending => "pending",
            JoinOutcome::RequestRejected => "rejected",
        }
    }

    pub fn detail(&self) -> &'static str {
        match self {
            JoinOutcome::Joined => "Joined public hike.",
            JoinOutcome::AlreadyMember => "Already joined.",
            JoinOutcome::RequestSubmitted => "Join request created.",
            JoinOutcome::RequestPending => "Join request already pending.",
            JoinOutcome::RequestRejected => "Join request was rejected.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinRequestView {
    pub request_id: String,
    pub hike_id: String,
    pub user_id: String,
    pub status: String,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

impl From<JoinRequestRow> for JoinRequestView {
    fn from(row: JoinRequestRow) -> Self {
        JoinRequestView {
            request_id: row.request_id,
            hike_id: row.hike_id,
            user_id: row.user_id,
            status: row.status,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestDecisionView {
    pub request: JoinRequestView,
    pub member_count: i64,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// Decides what a join attempt does: immediate membership on a public hike,
/// a pending request on a private one, or a no-op report of the stored
/// state. Branches are evaluated in order and each is terminal.
pub async fn join_or_request(
    pool: &SqlitePool,
    hike_id: &str,
    user_id: &str,
) -> Result<JoinOutcome, MembershipError> {
    let Some(hike) = hike_repo::load_hike(pool, hike_id).await? else {
        return Err(MembershipError::HikeNotFound);
    };

    if membership_repo::member_exists(pool, hike_id, user_id).await? {
        return Ok(JoinOutcome::AlreadyMember);
    }

    // A full hike turns everyone away, whatever the visibility.
    if membership_repo::count_members(pool, hike_id).await? >= hike.capacity {
        return Err(MembershipError::CapacityExceeded);
    }

    if hike.visibility == "public" {
        return match membership_repo::insert_member_guarded(pool, hike_id, user_id).await {
            // Lost the race for the last open slot.
            Ok(0) => Err(MembershipError::CapacityExceeded),
            Ok(_) => Ok(JoinOutcome::Joined),
            Err(e) if is_unique_violation(&e) => Ok(JoinOutcome::AlreadyMember),
            Err(e) => Err(e.into()),
        };
    }

    if let Some(request) =
        join_request_repo::find_request_for_user(pool, hike_id, user_id).await?
    {
        let outcome = match request.status.as_str() {
            "rejected" => JoinOutcome::RequestRejected,
            // Approved between the membership check above and this read.
            "approved" => JoinOutcome::AlreadyMember,
            _ => JoinOutcome::RequestPending,
        };
        return Ok(outcome);
    }

    let request_id = Uuid::new_v4().to_string();
    match join_request_repo::insert_request(pool, &request_id, hike_id, user_id).await {
        Ok(_) => Ok(JoinOutcome::RequestSubmitted),
        // Raced another submit from the same user; their row stands.
        Err(e) if is_unique_violation(&e) => Ok(JoinOutcome::RequestPending),
        Err(e) => Err(e.into()),
    }
}

/// Creator-only. Moves `pending` to `approved` and seats the requester,
/// both inside one transaction; if the hike filled up in the meantime the
/// whole call fails and the request stays pending.
pub async fn approve_request(
    pool: &SqlitePool,
    hike_id: &str,
    request_id: &str,
    acting_user_id: &str,
) -> Result<RequestDecisionView, MembershipError> {
    let mut tx = pool.begin().await?;

    let Some(hike) = hike_repo::load_hike(&mut *tx, hike_id).await? else {
        return Err(MembershipError::HikeNotFound);
    };
    if hike.creator_id != acting_user_id {
        return Err(MembershipError::Forbidden);
    }
    let Some(request) = join_request_repo::load_request(&mut *tx, hike_id, request_id).await?
    else {
        return Err(MembershipError::RequestNotFound);
    };
    if request.status != "pending" {
        return Err(MembershipError::RequestAlreadyResolved);
    }

    match membership_repo::insert_member_guarded(&mut *tx, hike_id, &request.user_id).await {
        Ok(0) => {
            // Guard declined: the hike is full, unless the requester already
            // holds a seat through another path.
            if !membership_repo::member_exists(&mut *tx, hike_id, &request.user_id).await? {
                return Err(MembershipError::CapacityExceeded);
            }
        }
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {}
        Err(e) => return Err(e.into()),
    }

    join_request_repo::resolve_request(&mut *tx, request_id, "approved").await?;
    let member_count = membership_repo::count_members(&mut *tx, hike_id).await?;
    let updated = join_request_repo::load_request(&mut *tx, hike_id, request_id)
        .await?
        .ok_or(MembershipError::RequestNotFound)?;

    tx.commit().await?;
    Ok(RequestDecisionView {
        request: updated.into(),
        member_count,
    })
}

/// Creator-only. Moves `pending` to `rejected`; no membership row is
/// created and capacity is untouched.
pub async fn reject_request(
    pool: &SqlitePool,
    hike_id: &str,
    request_id: &str,
    acting_user_id: &str,
) -> Result<RequestDecisionView, MembershipError> {
    let Some(hike) = hike_repo::load_hike(pool, hike_id).await? else {
        return Err(MembershipError::HikeNotFound);
    };
    if hike.creator_id != acting_user_id {
        return Err(MembershipError::Forbidden);
    }
    let Some(request) = join_request_repo::load_request(pool, hike_id, request_id).await? else {
        return Err(MembershipError::RequestNotFound);
    };
    if request.status != "pending" {
        return Err(MembershipError::RequestAlreadyResolved);
    }

    let changed = join_request_repo::resolve_request(pool, request_id, "rejected").await?;
    if changed == 0 {
        // Resolved by a concurrent call between the read and the update.
        return Err(MembershipError::RequestAlreadyResolved);
    }

    let member_count = membership_repo::count_members(pool, hike_id).await?;
    let updated = join_request_repo::load_request(pool, hike_id, request_id)
        .await?
        .ok_or(MembershipError::RequestNotFound)?;
    Ok(RequestDecisionView {
        request: updated.into(),
        member_count,
    })
}

/// Leaving frees the seat and clears any resolved request row, so a former
/// member can go through the join flow again later. The creator holds the
/// hike's only admin role and cannot leave.
pub async fn leave(
    pool: &SqlitePool,
    hike_id: &str,
    user_id: &str,
) -> Result<(), MembershipError> {
    let Some(hike) = hike_repo::load_hike(pool, hike_id).await? else {
        return Err(MembershipError::HikeNotFound);
    };
    if hike.creator_id == user_id {
        return Err(MembershipError::Forbidden);
    }
    remove_membership(pool, hike_id, user_id).await
}

/// Creator-only removal of another attendee. The creator's own seat is not
/// removable.
pub async fn remove_member(
    pool: &SqlitePool,
    hike_id: &str,
    subject_user_id: &str,
    acting_user_id: &str,
) -> Result<(), MembershipError> {
    let Some(hike) = hike_repo::load_hike(pool, hike_id).await? else {
        return Err(MembershipError::HikeNotFound);
    };
    if hike.creator_id != acting_user_id {
        return Err(MembershipError::Forbidden);
    }
    if hike.creator_id == subject_user_id {
        return Err(MembershipError::Forbidden);
    }
    remove_membership(pool, hike_id, subject_user_id).await
}

async fn remove_membership(
    pool: &SqlitePool,
    hike_id: &str,
    user_id: &str,
) -> Result<(), MembershipError> {
    let mut tx = pool.begin().await?;
    let removed = membership_repo::delete_member(&mut *tx, hike_id, user_id).await?;
    if removed == 0 {
        return Err(MembershipError::NotMember);
    }
    join_request_repo::delete_request_for_user(&mut *tx, hike_id, user_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Deletes the caller's own pending request. Resolved requests stay put.
pub async fn cancel_request(
    pool: &SqlitePool,
    hike_id: &str,
    user_id: &str,
) -> Result<(), MembershipError> {
    if hike_repo::load_hike(pool, hike_id).await?.is_none() {
        return Err(MembershipError::HikeNotFound);
    }
    let deleted = join_request_repo::delete_pending_request(pool, hike_id, user_id).await?;
    if deleted == 0 {
        return Err(MembershipError::RequestNotFound);
    }
    Ok(())
}

/// Creator-only listing of a hike's join requests, newest first. Resolved
/// rows are included so the organizer can see past decisions.
pub async fn list_requests(
    pool: &SqlitePool,
    hike_id: &str,
    acting_user_id: &str,
) -> Result<Vec<JoinRequestView>, MembershipError> {
    let Some(hike) = hike_repo::load_hike(pool, hike_id).await? else {
        return Err(MembershipError::HikeNotFound);
    };
    if hike.creator_id != acting_user_id {
        return Err(MembershipError::Forbidden);
    }
    let rows = join_request_repo::list_requests(pool, hike_id).await?;
    Ok(rows.into_iter().map(JoinRequestView::from).collect())
}
