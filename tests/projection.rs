mod common;

use trailhead::services::hike_service;
use trailhead::services::membership_service;

#[tokio::test]
async fn guests_see_only_public_hikes_with_blank_flags() {
    let pool = common::test_pool().await;
    let public = common::create_hike(&pool, "u-creator", "public", 5).await;
    common::create_hike(&pool, "u-creator", "private", 5).await;

    let listed = hike_service::list_hikes(&pool, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    let view = &listed[0];
    assert_eq!(view.hike_id, public.hike_id);
    assert_eq!(view.member_count, 1);
    assert!(!view.is_member);
    assert!(!view.is_admin);
    assert!(view.join_request_status.is_none());
}

#[tokio::test]
async fn private_hikes_hide_from_outsiders() {
    let pool = common::test_pool().await;
    let private = common::create_hike(&pool, "u-creator", "private", 5).await;

    // Unknown id and invisible hike are indistinguishable.
    assert!(hike_service::load_hike_view(&pool, "no-such-hike", None)
        .await
        .unwrap()
        .is_none());
    assert!(hike_service::load_hike_view(&pool, &private.hike_id, None)
        .await
        .unwrap()
        .is_none());
    assert!(
        hike_service::load_hike_view(&pool, &private.hike_id, Some("u-outsider"))
            .await
            .unwrap()
            .is_none()
    );

    // The creator, as a member, sees it with the admin flag on.
    let view = hike_service::load_hike_view(&pool, &private.hike_id, Some("u-creator"))
        .await
        .unwrap()
        .unwrap();
    assert!(view.is_member);
    assert!(view.is_admin);
}

#[tokio::test]
async fn requesters_watch_their_own_status() {
    let pool = common::test_pool().await;
    let hike = common::create_hike(&pool, "u-creator", "private", 5).await;

    membership_service::join_or_request(&pool, &hike.hike_id, "u-1")
        .await
        .unwrap();

    // Submitting the request makes the hike visible to its requester.
    let view = hike_service::load_hike_view(&pool, &hike.hike_id, Some("u-1"))
        .await
        .unwrap()
        .unwrap();
    assert!(!view.is_member);
    assert!(!view.is_admin);
    assert_eq!(view.join_request_status.as_deref(), Some("pending"));

    let listed = hike_service::list_hikes(&pool, Some("u-1")).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].join_request_status.as_deref(), Some("pending"));

    let request = &membership_service::list_requests(&pool, &hike.hike_id, "u-creator")
        .await
        .unwrap()[0];
    membership_service::reject_request(&pool, &hike.hike_id, &request.request_id, "u-creator")
        .await
        .unwrap();

    // The projection is recomputed on every read, so the new status shows
    // up immediately.
    let view = hike_service::load_hike_view(&pool, &hike.hike_id, Some("u-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.join_request_status.as_deref(), Some("rejected"));
    assert!(!view.is_member);
}

#[tokio::test]
async fn approval_flips_the_member_flags() {
    let pool = common::test_pool().await;
    let hike = common::create_hike(&pool, "u-creator", "private", 5).await;

    membership_service::join_or_request(&pool, &hike.hike_id, "u-1")
        .await
        .unwrap();
    let request = &membership_service::list_requests(&pool, &hike.hike_id, "u-creator")
        .await
        .unwrap()[0];
    membership_service::approve_request(&pool, &hike.hike_id, &request.request_id, "u-creator")
        .await
        .unwrap();

    let view = hike_service::load_hike_view(&pool, &hike.hike_id, Some("u-1"))
        .await
        .unwrap()
        .unwrap();
    assert!(view.is_member);
    assert!(!view.is_admin);
    assert_eq!(view.member_count, 2);
    assert_eq!(view.join_request_status.as_deref(), Some("approved"));
}

#[tokio::test]
async fn my_hikes_lists_memberships_only() {
    let pool = common::test_pool().await;
    let mine = common::create_hike(&pool, "u-creator", "public", 5).await;
    let joined = common::create_hike(&pool, "u-other", "public", 5).await;
    common::create_hike(&pool, "u-other", "public", 5).await;

    membership_service::join_or_request(&pool, &joined.hike_id, "u-creator")
        .await
        .unwrap();

    let listed = hike_service::list_my_hikes(&pool, "u-creator").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|v| v.hike_id == mine.hike_id));
    assert!(listed.iter().any(|v| v.hike_id == joined.hike_id));
    assert!(listed.iter().all(|v| v.is_member));
}
