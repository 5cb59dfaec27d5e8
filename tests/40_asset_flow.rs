//! Assignment accounting against a real tenant schema.
//!
//! Needs DATABASE_URL pointing at a Postgres server where the test user may
//! create databases: `cargo test -- --ignored`.

use sqlx::PgPool;
use uuid::Uuid;

use opsdesk_api::database::models::{
    AssetStatus, AssetType, AssignAsset, AssignmentStatus, CreateAsset, CreateMaintenance, MaintenanceStatus,
    ReturnAsset, UpdateMaintenance,
};
use opsdesk_api::database::repositories::{MovementRepo, NotificationRepo, UserRepo};
use opsdesk_api::inventory::accounting::AccountingError;
use opsdesk_api::middleware::ValidatedUser;
use opsdesk_api::services::{AssetError, AssetService};
use opsdesk_api::types::Access;

async fn user(pool: &PgPool, auth: &str, access: Access) -> ValidatedUser {
    let user = UserRepo::create(pool, auth, auth, "not-a-real-hash", access, None, None)
        .await
        .unwrap();
    ValidatedUser {
        id: user.id,
        name: user.name,
        auth: user.auth,
        access,
        role: None,
        scope_id: None,
        visible_scopes: None,
    }
}

async fn asset(service: &AssetService, code: &str, asset_type: AssetType, quantity: i32) -> Uuid {
    let input = CreateAsset {
        asset_code: code.to_string(),
        name: format!("{} asset", code),
        asset_type,
        quantity,
        scope_id: None,
        notes: None,
    };
    service.create(&input).await.unwrap().id
}

fn assign(asset_id: Uuid, user_id: Uuid, quantity: i32) -> AssignAsset {
    AssignAsset { asset_id, user_id, quantity, assigned_at: None }
}

fn give_back(quantity: Option<i32>) -> ReturnAsset {
    ReturnAsset { return_quantity: quantity, return_date: None }
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn group_assign_extend_and_return(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let holder = user(&pool, "holder", Access::Read).await;
    let chairs = asset(&service, "CHAIR", AssetType::Group, 10).await;

    let out = service.assign(&admin, &assign(chairs, holder.id, 4), None).await.unwrap();
    assert_eq!(out.asset.available_quantity, 6);
    assert_eq!(out.asset.status, AssetStatus::PartiallyAssigned);
    assert_eq!(out.assignment.quantity, 4);

    let out = service.extend(&admin, out.assignment.id, 6, None).await.unwrap();
    assert_eq!(out.asset.available_quantity, 0);
    assert_eq!(out.asset.status, AssetStatus::Assigned);
    assert_eq!(out.assignment.quantity, 10);

    let assignment_id = out.assignment.id;
    let out = service.return_asset(&admin, assignment_id, &give_back(Some(3)), None).await.unwrap();
    assert_eq!(out.asset.available_quantity, 3);
    assert_eq!(out.assignment.returned_quantity, 3);
    assert_eq!(out.assignment.status, AssignmentStatus::PartiallyReturned);

    let err = service.return_asset(&admin, assignment_id, &give_back(Some(8)), None).await.unwrap_err();
    assert!(matches!(
        err,
        AssetError::Accounting(AccountingError::ReturnExceedsRemaining { requested: 8, remaining: 7 })
    ));

    // Omitted quantity returns everything still out
    let out = service.return_asset(&admin, assignment_id, &give_back(None), None).await.unwrap();
    assert_eq!(out.asset.available_quantity, 10);
    assert_eq!(out.asset.status, AssetStatus::Available);
    assert_eq!(out.assignment.status, AssignmentStatus::Returned);

    let movements = MovementRepo::list_for_asset(&pool, chairs).await.unwrap();
    assert_eq!(movements.len(), 4);
    assert_eq!(movements.iter().map(|m| m.quantity).sum::<i32>(), 4 + 6 + 3 + 7);

    let inbox = NotificationRepo::list_for_user(&pool, holder.id, true, 50, 0).await.unwrap();
    assert_eq!(inbox.len(), 2);
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn individual_asset_goes_to_one_holder(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let first = user(&pool, "first", Access::Read).await;
    let second = user(&pool, "second", Access::Read).await;
    let laptop = asset(&service, "LAPTOP-1", AssetType::Individual, 1).await;

    let out = service.assign(&admin, &assign(laptop, first.id, 1), None).await.unwrap();
    assert_eq!(out.asset.status, AssetStatus::Assigned);
    assert_eq!(out.asset.available_quantity, 0);

    let err = service.assign(&admin, &assign(laptop, second.id, 1), None).await.unwrap_err();
    assert!(matches!(err, AssetError::Accounting(_)), "unexpected: {:?}", err);

    let err = service.extend(&admin, out.assignment.id, 1, None).await.unwrap_err();
    assert!(matches!(err, AssetError::Accounting(_)), "unexpected: {:?}", err);

    // Individual returns ignore the requested quantity
    let back = service.return_asset(&admin, out.assignment.id, &give_back(Some(5)), None).await.unwrap();
    assert_eq!(back.asset.available_quantity, 1);
    assert_eq!(back.asset.status, AssetStatus::Available);

    let again = service.return_asset(&admin, out.assignment.id, &give_back(None), None).await.unwrap_err();
    assert!(matches!(again, AssetError::Accounting(AccountingError::AlreadyReturned)));

    // Freed pair can be reassigned once the old assignment is removed
    service.remove_assignment(&admin, out.assignment.id).await.unwrap();
    service.assign(&admin, &assign(laptop, first.id, 1), None).await.unwrap();
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn idempotency_key_replays_instead_of_double_counting(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let holder = user(&pool, "holder", Access::Read).await;
    let headsets = asset(&service, "HEADSET", AssetType::Group, 5).await;

    let key = Some("assign-headsets-1");
    let first = service.assign(&admin, &assign(headsets, holder.id, 2), key).await.unwrap();
    let second = service.assign(&admin, &assign(headsets, holder.id, 2), key).await.unwrap();

    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(second.assignment.id, first.assignment.id);
    assert_eq!(second.asset.available_quantity, 3);
    assert_eq!(MovementRepo::list_for_asset(&pool, headsets).await.unwrap().len(), 1);

    let err = service
        .return_asset(&admin, first.assignment.id, &give_back(Some(1)), key)
        .await
        .unwrap_err();
    assert!(matches!(err, AssetError::KeyReused));
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn maintenance_blocks_assignment_until_completed(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let holder = user(&pool, "holder", Access::Read).await;
    let printers = asset(&service, "PRINTER", AssetType::Group, 3).await;

    service.assign(&admin, &assign(printers, holder.id, 1), None).await.unwrap();

    let opened = service
        .open_maintenance(
            &admin,
            &CreateMaintenance {
                asset_id: printers,
                description: "Toner leak".to_string(),
                status: MaintenanceStatus::InProgress,
                started_at: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(opened.asset.status, AssetStatus::UnderMaintenance);

    let other = user(&pool, "other", Access::Read).await;
    let err = service.assign(&admin, &assign(printers, other.id, 1), None).await.unwrap_err();
    assert!(matches!(
        err,
        AssetError::Accounting(AccountingError::NotAssignable { status: AssetStatus::UnderMaintenance })
    ));

    let done = service
        .update_maintenance(
            &admin,
            opened.maintenance.id,
            &UpdateMaintenance { description: None, status: MaintenanceStatus::Completed },
        )
        .await
        .unwrap();
    // Status follows the quantities again: one unit is still out
    assert_eq!(done.asset.status, AssetStatus::PartiallyAssigned);
    assert_eq!(done.asset.available_quantity, 2);
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn asset_with_units_out_cannot_be_deleted(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let holder = user(&pool, "holder", Access::Read).await;
    let desks = asset(&service, "DESK", AssetType::Group, 2).await;

    let out = service.assign(&admin, &assign(desks, holder.id, 2), None).await.unwrap();
    let err = service.delete(&admin, desks).await.unwrap_err();
    assert!(matches!(
        err,
        AssetError::Accounting(AccountingError::UnitsOutstanding { outstanding: 2 })
    ));

    service.return_asset(&admin, out.assignment.id, &give_back(None), None).await.unwrap();
    service.delete(&admin, desks).await.unwrap();
    assert!(matches!(service.get(&admin, desks).await, Err(AssetError::NotFound(_))));
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn concurrent_assigns_never_oversell(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let monitors = asset(&service, "MONITOR", AssetType::Group, 5).await;

    let mut holders = Vec::new();
    for i in 0..8 {
        holders.push(user(&pool, &format!("holder{}", i), Access::Read).await);
    }

    let handles: Vec<_> = holders
        .iter()
        .map(|holder| {
            let service = service.clone();
            let admin = admin.clone();
            let input = assign(monitors, holder.id, 1);
            tokio::spawn(async move { service.assign(&admin, &input, None).await })
        })
        .collect();

    let mut granted = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => granted += 1,
            // Once the pool is empty the asset is `assigned` and no longer assignable
            Err(AssetError::Accounting(
                AccountingError::InsufficientQuantity { .. } | AccountingError::NotAssignable { .. },
            )) => refused += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(granted, 5);
    assert_eq!(refused, 3);

    let stored = service.get(&admin, monitors).await.unwrap();
    assert_eq!(stored.available_quantity, 0);
    assert_eq!(stored.status, AssetStatus::Assigned);
    assert_eq!(MovementRepo::list_for_asset(&pool, monitors).await.unwrap().len(), 5);
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn concurrent_retries_with_one_key_apply_once(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let holder = user(&pool, "holder", Access::Read).await;
    let keyboards = asset(&service, "KEYBOARD", AssetType::Group, 3).await;
    let out = service.assign(&admin, &assign(keyboards, holder.id, 3), None).await.unwrap();
    let assignment_id = out.assignment.id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            let admin = admin.clone();
            tokio::spawn(async move {
                service
                    .return_asset(&admin, assignment_id, &give_back(Some(3)), Some("return-keyboards"))
                    .await
            })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if !outcome.replayed {
            applied += 1;
        }
        assert_eq!(outcome.assignment.id, assignment_id);
        assert_eq!(outcome.movement.quantity, 3);
    }
    assert_eq!(applied, 1);

    let stored = service.get(&admin, keyboards).await.unwrap();
    assert_eq!(stored.available_quantity, 3);
    assert_eq!(stored.status, AssetStatus::Available);
    assert_eq!(MovementRepo::list_for_asset(&pool, keyboards).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn idempotency_key_is_bound_to_the_assignee(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let first = user(&pool, "first", Access::Read).await;
    let second = user(&pool, "second", Access::Read).await;
    let mice = asset(&service, "MOUSE", AssetType::Group, 4).await;

    let key = Some("assign-mouse");
    service.assign(&admin, &assign(mice, first.id, 1), key).await.unwrap();
    let err = service.assign(&admin, &assign(mice, second.id, 1), key).await.unwrap_err();
    assert!(matches!(err, AssetError::KeyReused));
    assert_eq!(service.get(&admin, mice).await.unwrap().available_quantity, 3);
}

#[sqlx::test(migrations = "migrations/tenant")]
#[ignore]
async fn asset_stays_under_maintenance_while_any_record_is_open(pool: PgPool) {
    let service = AssetService::new(pool.clone());
    let admin = user(&pool, "admin", Access::Full).await;
    let holder = user(&pool, "holder", Access::Read).await;
    let projector = asset(&service, "PROJECTOR", AssetType::Individual, 1).await;

    let open = |description: &str| CreateMaintenance {
        asset_id: projector,
        description: description.to_string(),
        status: MaintenanceStatus::InProgress,
        started_at: None,
    };
    let lamp = service.open_maintenance(&admin, &open("Replace lamp")).await.unwrap();
    let lens = service.open_maintenance(&admin, &open("Clean lens")).await.unwrap();
    let complete = UpdateMaintenance { description: None, status: MaintenanceStatus::Completed };

    let done = service.update_maintenance(&admin, lamp.maintenance.id, &complete).await.unwrap();
    assert_eq!(done.asset.status, AssetStatus::UnderMaintenance);
    let err = service.assign(&admin, &assign(projector, holder.id, 1), None).await.unwrap_err();
    assert!(matches!(err, AssetError::Accounting(AccountingError::NotAssignable { .. })));

    let done = service.update_maintenance(&admin, lens.maintenance.id, &complete).await.unwrap();
    assert_eq!(done.asset.status, AssetStatus::Available);
    service.assign(&admin, &assign(projector, holder.id, 1), None).await.unwrap();
}
