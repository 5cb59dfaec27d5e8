//! Transactional asset operations.
//!
//! Each write opens one transaction, locks the asset row (then the
//! assignment or maintenance row, always in that order), asks
//! [`crate::inventory::accounting`] for a plan, and persists the plan together
//! with its movement row. Any error drops the transaction, which rolls back.

use chrono::Utc;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::models::{
    Asset, AssetStatus, AssetType, AssignAsset, Assignment, CreateAsset, CreateMaintenance, Maintenance, Movement,
    MovementType, NewMovement, NewNotification, ReturnAsset, UpdateAsset, UpdateMaintenance,
};
use crate::database::repositories::{
    AssetRepo, AssignmentRepo, MaintenanceRepo, MovementRepo, NotificationRepo, UserRepo,
};
use crate::inventory::accounting::{self, AccountingError, AssetState, AssignmentState};
use crate::middleware::ValidatedUser;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Accounting(#[from] AccountingError),
    #[error("Idempotency-Key was already used for a different request")]
    KeyReused,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Result of an assign, extend or return.
#[derive(Debug, Serialize)]
pub struct MovementOutcome {
    pub asset: Asset,
    pub assignment: Assignment,
    pub movement: Movement,
    /// True when an Idempotency-Key replay returned the earlier result.
    pub replayed: bool,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceOutcome {
    pub asset: Asset,
    pub maintenance: Maintenance,
}

fn state_of(asset: &Asset) -> AssetState {
    AssetState {
        asset_type: asset.asset_type,
        quantity: asset.quantity,
        available_quantity: asset.available_quantity,
        status: asset.status,
    }
}

fn state_of_assignment(assignment: &Assignment) -> AssignmentState {
    AssignmentState {
        quantity: assignment.quantity,
        returned_quantity: assignment.returned_quantity,
        status: assignment.status,
    }
}

fn is_idempotency_conflict(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some("uq_movements_idempotency_key"))
}

#[derive(Clone)]
pub struct AssetService {
    pool: PgPool,
}

impl AssetService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &CreateAsset) -> Result<Asset, AssetError> {
        if input.asset_type == AssetType::Individual && input.quantity != 1 {
            return Err(AccountingError::IndividualQuantity { requested: input.quantity }.into());
        }
        let asset = AssetRepo::create(&self.pool, input).await?;
        tracing::info!(asset_id = %asset.id, code = %asset.asset_code, quantity = asset.quantity, "Asset created");
        Ok(asset)
    }

    /// Live asset visible to `user`.
    pub async fn get(&self, user: &ValidatedUser, id: Uuid) -> Result<Asset, AssetError> {
        AssetRepo::find_by_id(&self.pool, id)
            .await?
            .filter(|asset| user.can_see(asset.scope_id))
            .ok_or(AssetError::NotFound("Asset"))
    }

    pub async fn update(&self, user: &ValidatedUser, id: Uuid, input: &UpdateAsset) -> Result<Asset, AssetError> {
        let mut tx = self.pool.begin().await?;
        let asset = lock_visible_asset(&mut tx, user, id).await?;

        let mut updated = AssetRepo::update_details(&mut *tx, id, input).await?;
        if input.retire && asset.status != AssetStatus::Retired {
            let status = accounting::plan_retire(&state_of(&asset))?;
            updated = AssetRepo::set_status(&mut *tx, id, status).await?;
            tracing::info!(asset_id = %id, "Asset retired");
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Soft delete; refused while units are out with users.
    pub async fn delete(&self, user: &ValidatedUser, id: Uuid) -> Result<(), AssetError> {
        let mut tx = self.pool.begin().await?;
        let asset = lock_visible_asset(&mut tx, user, id).await?;

        let outstanding = AssignmentRepo::outstanding_for_asset(&mut *tx, id).await?;
        if outstanding > 0 || asset.available_quantity < asset.quantity {
            let outstanding = outstanding.max((asset.quantity - asset.available_quantity) as i64) as i32;
            return Err(AccountingError::UnitsOutstanding { outstanding }.into());
        }

        AssetRepo::soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        tracing::info!(asset_id = %id, "Asset deleted");
        Ok(())
    }

    pub async fn assign(
        &self,
        user: &ValidatedUser,
        input: &AssignAsset,
        idempotency_key: Option<&str>,
    ) -> Result<MovementOutcome, AssetError> {
        let same_request = |m: &Movement, a: &Assignment| {
            m.movement_type == MovementType::Assigned
                && m.asset_id == input.asset_id
                && m.quantity == input.quantity
                && a.user_id == input.user_id
        };
        if let Some(outcome) = self.replay(idempotency_key, &same_request).await? {
            return Ok(outcome);
        }

        let mut tx = self.pool.begin().await?;
        let asset = lock_visible_asset(&mut tx, user, input.asset_id).await?;

        // A retry that queued on the lock sees the first request's movement now
        if let Some(outcome) = replay_on(&mut tx, idempotency_key, &same_request).await? {
            return Ok(outcome);
        }

        UserRepo::find_by_id(&mut *tx, input.user_id)
            .await?
            .ok_or(AssetError::NotFound("User"))?;

        if AssignmentRepo::find_live_pair(&mut *tx, asset.id, input.user_id).await?.is_some() {
            return Err(AccountingError::DuplicateAssignment.into());
        }

        let plan = accounting::plan_assign(&state_of(&asset), input.quantity)?;

        let asset = AssetRepo::apply_quantities(&mut *tx, asset.id, plan.available_quantity, plan.asset_status).await?;
        let assigned_at = input.assigned_at.unwrap_or_else(Utc::now);
        let assignment =
            AssignmentRepo::create(&mut *tx, asset.id, input.user_id, plan.assignment_quantity, assigned_at).await?;

        let movement = NewMovement {
            asset_id: asset.id,
            assignment_id: assignment.id,
            movement_type: MovementType::Assigned,
            quantity: plan.moved,
            available_after: asset.available_quantity,
            actor_id: user.id,
            idempotency_key,
        };
        let movement = match MovementRepo::insert(&mut *tx, &movement).await {
            Ok(movement) => movement,
            Err(e) if is_idempotency_conflict(&e) => {
                drop(tx);
                return self.replay_required(idempotency_key).await;
            }
            Err(e) => return Err(e.into()),
        };

        notify_assignee(&mut tx, &asset, &assignment, plan.moved).await?;
        tx.commit().await?;

        tracing::info!(
            asset_id = %asset.id,
            assignment_id = %assignment.id,
            quantity = plan.moved,
            available = asset.available_quantity,
            status = %asset.status,
            "Asset assigned"
        );

        Ok(MovementOutcome { asset, assignment, movement, replayed: false })
    }

    pub async fn extend(
        &self,
        user: &ValidatedUser,
        assignment_id: Uuid,
        additional: i32,
        idempotency_key: Option<&str>,
    ) -> Result<MovementOutcome, AssetError> {
        let same_request = |m: &Movement, _: &Assignment| {
            m.movement_type == MovementType::Assigned && m.assignment_id == assignment_id && m.quantity == additional
        };
        if let Some(outcome) = self.replay(idempotency_key, &same_request).await? {
            return Ok(outcome);
        }

        let mut tx = self.pool.begin().await?;
        let (asset, assignment) = lock_assignment(&mut tx, user, assignment_id).await?;
        if let Some(outcome) = replay_on(&mut tx, idempotency_key, &same_request).await? {
            return Ok(outcome);
        }

        let plan = accounting::plan_extend(&state_of(&asset), &state_of_assignment(&assignment), additional)?;

        let asset = AssetRepo::apply_quantities(&mut *tx, asset.id, plan.available_quantity, plan.asset_status).await?;
        let assignment = AssignmentRepo::set_quantity(&mut *tx, assignment.id, plan.assignment_quantity).await?;

        let movement = NewMovement {
            asset_id: asset.id,
            assignment_id: assignment.id,
            movement_type: MovementType::Assigned,
            quantity: plan.moved,
            available_after: asset.available_quantity,
            actor_id: user.id,
            idempotency_key,
        };
        let movement = match MovementRepo::insert(&mut *tx, &movement).await {
            Ok(movement) => movement,
            Err(e) if is_idempotency_conflict(&e) => {
                drop(tx);
                return self.replay_required(idempotency_key).await;
            }
            Err(e) => return Err(e.into()),
        };

        notify_assignee(&mut tx, &asset, &assignment, plan.moved).await?;
        tx.commit().await?;

        tracing::info!(
            asset_id = %asset.id,
            assignment_id = %assignment.id,
            additional = plan.moved,
            total = assignment.quantity,
            available = asset.available_quantity,
            "Assignment extended"
        );

        Ok(MovementOutcome { asset, assignment, movement, replayed: false })
    }

    pub async fn return_asset(
        &self,
        user: &ValidatedUser,
        assignment_id: Uuid,
        input: &ReturnAsset,
        idempotency_key: Option<&str>,
    ) -> Result<MovementOutcome, AssetError> {
        let same_request =
            |m: &Movement, _: &Assignment| m.movement_type == MovementType::Returned && m.assignment_id == assignment_id;
        if let Some(outcome) = self.replay(idempotency_key, &same_request).await? {
            return Ok(outcome);
        }

        let mut tx = self.pool.begin().await?;
        let (asset, assignment) = lock_assignment(&mut tx, user, assignment_id).await?;
        if let Some(outcome) = replay_on(&mut tx, idempotency_key, &same_request).await? {
            return Ok(outcome);
        }

        // No quantity means "everything still out"
        let requested = input.return_quantity.unwrap_or_else(|| assignment.outstanding());
        let plan = accounting::plan_return(&state_of(&asset), &state_of_assignment(&assignment), requested)?;

        let asset = AssetRepo::apply_quantities(&mut *tx, asset.id, plan.available_quantity, plan.asset_status).await?;
        let returned_at = input.return_date.unwrap_or_else(Utc::now);
        let assignment = AssignmentRepo::apply_return(
            &mut *tx,
            assignment.id,
            plan.returned_quantity,
            plan.assignment_status,
            returned_at,
        )
        .await?;

        let movement = NewMovement {
            asset_id: asset.id,
            assignment_id: assignment.id,
            movement_type: MovementType::Returned,
            quantity: plan.moved,
            available_after: asset.available_quantity,
            actor_id: user.id,
            idempotency_key,
        };
        let movement = match MovementRepo::insert(&mut *tx, &movement).await {
            Ok(movement) => movement,
            Err(e) if is_idempotency_conflict(&e) => {
                drop(tx);
                return self.replay_required(idempotency_key).await;
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        tracing::info!(
            asset_id = %asset.id,
            assignment_id = %assignment.id,
            returned = plan.moved,
            assignment_status = %assignment.status,
            available = asset.available_quantity,
            status = %asset.status,
            "Asset returned"
        );

        Ok(MovementOutcome { asset, assignment, movement, replayed: false })
    }

    pub async fn get_assignment(&self, user: &ValidatedUser, id: Uuid) -> Result<Assignment, AssetError> {
        let assignment = AssignmentRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(AssetError::NotFound("Assignment"))?;
        // Visibility follows the asset
        self.get(user, assignment.asset_id).await?;
        Ok(assignment)
    }

    /// Soft-delete a fully returned assignment, freeing the (asset, user) pair.
    pub async fn remove_assignment(&self, user: &ValidatedUser, id: Uuid) -> Result<(), AssetError> {
        let mut tx = self.pool.begin().await?;
        let (_, assignment) = lock_assignment(&mut tx, user, id).await?;
        accounting::check_removable(&state_of_assignment(&assignment))?;
        AssignmentRepo::soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        tracing::info!(assignment_id = %id, "Assignment removed");
        Ok(())
    }

    pub async fn open_maintenance(
        &self,
        user: &ValidatedUser,
        input: &CreateMaintenance,
    ) -> Result<MaintenanceOutcome, AssetError> {
        let mut tx = self.pool.begin().await?;
        let asset = lock_visible_asset(&mut tx, user, input.asset_id).await?;

        let next_status = accounting::plan_maintenance_open(&state_of(&asset), input.status)?;
        let started_at = input.started_at.unwrap_or_else(Utc::now);
        let maintenance =
            MaintenanceRepo::create(&mut *tx, asset.id, &input.description, input.status, started_at)
                .await?;

        let asset = match next_status {
            Some(status) => AssetRepo::set_status(&mut *tx, asset.id, status).await?,
            None => asset,
        };

        tx.commit().await?;
        tracing::info!(
            asset_id = %asset.id,
            maintenance_id = %maintenance.id,
            maintenance_status = %maintenance.status,
            status = %asset.status,
            "Maintenance recorded"
        );
        Ok(MaintenanceOutcome { asset, maintenance })
    }

    pub async fn update_maintenance(
        &self,
        user: &ValidatedUser,
        id: Uuid,
        input: &UpdateMaintenance,
    ) -> Result<MaintenanceOutcome, AssetError> {
        let mut tx = self.pool.begin().await?;

        // Lock order: asset first, then the maintenance row
        let asset_id = MaintenanceRepo::find_by_id(&mut *tx, id)
            .await?
            .ok_or(AssetError::NotFound("Maintenance record"))?
            .asset_id;
        let asset = lock_visible_asset(&mut tx, user, asset_id).await?;
        MaintenanceRepo::find_for_update(&mut *tx, id)
            .await?
            .ok_or(AssetError::NotFound("Maintenance record"))?;

        let others_open = MaintenanceRepo::count_open_for_asset(&mut *tx, asset.id, id).await?;
        let status = accounting::plan_maintenance_update(&state_of(&asset), input.status, others_open)?;
        let maintenance = MaintenanceRepo::update(&mut *tx, id, input.description.as_deref(), input.status).await?;
        let asset = AssetRepo::set_status(&mut *tx, asset.id, status).await?;

        tx.commit().await?;
        tracing::info!(
            asset_id = %asset.id,
            maintenance_id = %maintenance.id,
            maintenance_status = %maintenance.status,
            status = %asset.status,
            "Maintenance updated"
        );
        Ok(MaintenanceOutcome { asset, maintenance })
    }

    /// Earlier result for `key`, read without taking any lock.
    async fn replay(
        &self,
        key: Option<&str>,
        matches: impl Fn(&Movement, &Assignment) -> bool,
    ) -> Result<Option<MovementOutcome>, AssetError> {
        if key.is_none() {
            return Ok(None);
        }
        let mut conn = self.pool.acquire().await?;
        replay_on(&mut conn, key, matches).await
    }

    /// A concurrent request committed the same key first.
    async fn replay_required(&self, key: Option<&str>) -> Result<MovementOutcome, AssetError> {
        self.replay(key, |_: &Movement, _: &Assignment| true)
            .await?
            .ok_or(AssetError::KeyReused)
    }
}

/// Stored outcome for `key`, if any. `matches` guards against a key being
/// reused for a different request.
async fn replay_on(
    conn: &mut PgConnection,
    key: Option<&str>,
    matches: impl Fn(&Movement, &Assignment) -> bool,
) -> Result<Option<MovementOutcome>, AssetError> {
    let Some(key) = key else {
        return Ok(None);
    };
    let Some(movement) = MovementRepo::find_by_key(&mut *conn, key).await? else {
        return Ok(None);
    };

    let assignment = AssignmentRepo::find_by_id(&mut *conn, movement.assignment_id)
        .await?
        .ok_or(AssetError::NotFound("Assignment"))?;
    if !matches(&movement, &assignment) {
        return Err(AssetError::KeyReused);
    }
    let asset = AssetRepo::find_by_id(&mut *conn, movement.asset_id)
        .await?
        .ok_or(AssetError::NotFound("Asset"))?;

    tracing::info!(key, movement_id = %movement.id, "Idempotent replay");
    Ok(Some(MovementOutcome { asset, assignment, movement, replayed: true }))
}

async fn lock_visible_asset(conn: &mut PgConnection, user: &ValidatedUser, id: Uuid) -> Result<Asset, AssetError> {
    AssetRepo::find_for_update(conn, id)
        .await?
        .filter(|asset| user.can_see(asset.scope_id))
        .ok_or(AssetError::NotFound("Asset"))
}

/// Lock an assignment and its asset, asset first.
async fn lock_assignment(
    conn: &mut PgConnection,
    user: &ValidatedUser,
    assignment_id: Uuid,
) -> Result<(Asset, Assignment), AssetError> {
    let asset_id = AssignmentRepo::find_by_id(&mut *conn, assignment_id)
        .await?
        .ok_or(AssetError::NotFound("Assignment"))?
        .asset_id;
    let asset = lock_visible_asset(&mut *conn, user, asset_id).await?;
    let assignment = AssignmentRepo::find_for_update(&mut *conn, assignment_id)
        .await?
        .ok_or(AssetError::NotFound("Assignment"))?;
    Ok((asset, assignment))
}

async fn notify_assignee(
    conn: &mut PgConnection,
    asset: &Asset,
    assignment: &Assignment,
    moved: i32,
) -> Result<(), AssetError> {
    let notification = NewNotification {
        user_id: assignment.user_id,
        title: "Asset assigned".to_string(),
        message: format!("{} x {} ({}) assigned to you", moved, asset.name, asset.asset_code),
        link: Some(format!("/assets/{}", asset.id)),
    };
    NotificationRepo::insert(conn, &notification).await?;
    Ok(())
}
