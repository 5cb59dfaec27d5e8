//! Quantity accounting for asset assignment, return and maintenance.
//!
//! Every function here is pure: it looks at the current asset (and
//! assignment) state and either rejects the request or returns a plan
//! describing the new state. Persisting a plan, with the asset row locked,
//! is the job of `services::asset_service`.

use crate::database::models::{AssetStatus, AssetType, AssignmentStatus, MaintenanceStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountingError {
    #[error("Quantity must be at least 1")]
    NonPositive,

    #[error("Asset is {status} and cannot be assigned")]
    NotAssignable { status: AssetStatus },

    #[error("Asset is already assigned")]
    AlreadyAssigned,

    #[error("User already holds an assignment for this asset; extend it instead")]
    DuplicateAssignment,

    #[error("Individual assets are assigned one unit at a time (requested {requested})")]
    IndividualQuantity { requested: i32 },

    #[error("Requested {requested} units but only {available} are available")]
    InsufficientQuantity { requested: i32, available: i32 },

    #[error("Assignment has already been returned")]
    AlreadyReturned,

    #[error("Cannot return {requested} units; only {remaining} are outstanding")]
    ReturnExceedsRemaining { requested: i32, remaining: i32 },

    #[error("Assignment must be fully returned before it can be removed")]
    NotReturned,

    #[error("Asset is retired")]
    Retired,

    #[error("{outstanding} units are still assigned")]
    UnitsOutstanding { outstanding: i32 },
}

/// The accounting-relevant columns of an asset row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetState {
    pub asset_type: AssetType,
    pub quantity: i32,
    pub available_quantity: i32,
    pub status: AssetStatus,
}

/// The accounting-relevant columns of an assignment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentState {
    pub quantity: i32,
    pub returned_quantity: i32,
    pub status: AssignmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignPlan {
    pub available_quantity: i32,
    pub asset_status: AssetStatus,
    /// Quantity the assignment row holds afterwards.
    pub assignment_quantity: i32,
    /// Units moved by this request, logged on the movement row.
    pub moved: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnPlan {
    pub available_quantity: i32,
    pub asset_status: AssetStatus,
    pub returned_quantity: i32,
    pub assignment_status: AssignmentStatus,
    pub moved: i32,
}

/// Status implied by how many units are at home.
pub fn status_for(available: i32, quantity: i32) -> AssetStatus {
    if available <= 0 {
        AssetStatus::Assigned
    } else if available < quantity {
        AssetStatus::PartiallyAssigned
    } else {
        AssetStatus::Available
    }
}

/// Maintenance and retirement outrank the quantity-derived status.
fn settle_status(current: AssetStatus, available: i32, quantity: i32) -> AssetStatus {
    match current {
        AssetStatus::UnderMaintenance | AssetStatus::Retired => current,
        _ => status_for(available, quantity),
    }
}

fn check_assignable(asset: &AssetState) -> Result<(), AccountingError> {
    if asset.asset_type == AssetType::Individual
        && (asset.status == AssetStatus::Assigned || asset.available_quantity < 1)
    {
        return Err(AccountingError::AlreadyAssigned);
    }
    if !asset.status.is_assignable() {
        return Err(AccountingError::NotAssignable { status: asset.status });
    }
    Ok(())
}

/// Hand out `quantity` units on a new assignment.
pub fn plan_assign(asset: &AssetState, quantity: i32) -> Result<AssignPlan, AccountingError> {
    if quantity < 1 {
        return Err(AccountingError::NonPositive);
    }
    check_assignable(asset)?;

    match asset.asset_type {
        AssetType::Individual => {
            if quantity != 1 {
                return Err(AccountingError::IndividualQuantity { requested: quantity });
            }
            Ok(AssignPlan {
                available_quantity: 0,
                asset_status: AssetStatus::Assigned,
                assignment_quantity: 1,
                moved: 1,
            })
        }
        AssetType::Group => {
            if quantity > asset.available_quantity {
                return Err(AccountingError::InsufficientQuantity {
                    requested: quantity,
                    available: asset.available_quantity,
                });
            }
            let available = asset.available_quantity - quantity;
            Ok(AssignPlan {
                available_quantity: available,
                asset_status: status_for(available, asset.quantity),
                assignment_quantity: quantity,
                moved: quantity,
            })
        }
    }
}

/// Add `additional` units to an existing assignment.
///
/// The units already held were deducted when the assignment was created, so
/// only `additional` comes out of availability and only `additional` is
/// logged.
pub fn plan_extend(
    asset: &AssetState,
    assignment: &AssignmentState,
    additional: i32,
) -> Result<AssignPlan, AccountingError> {
    if additional < 1 {
        return Err(AccountingError::NonPositive);
    }
    if assignment.status == AssignmentStatus::Returned {
        return Err(AccountingError::AlreadyReturned);
    }
    if asset.asset_type == AssetType::Individual {
        return Err(AccountingError::IndividualQuantity {
            requested: assignment.quantity + additional,
        });
    }
    check_assignable(asset)?;

    if additional > asset.available_quantity {
        return Err(AccountingError::InsufficientQuantity {
            requested: additional,
            available: asset.available_quantity,
        });
    }
    let available = asset.available_quantity - additional;
    Ok(AssignPlan {
        available_quantity: available,
        asset_status: status_for(available, asset.quantity),
        assignment_quantity: assignment.quantity + additional,
        moved: additional,
    })
}

/// Take back `requested` units. Individual assets always return their one unit.
pub fn plan_return(
    asset: &AssetState,
    assignment: &AssignmentState,
    requested: i32,
) -> Result<ReturnPlan, AccountingError> {
    if assignment.status == AssignmentStatus::Returned {
        return Err(AccountingError::AlreadyReturned);
    }

    let moved = match asset.asset_type {
        AssetType::Individual => 1,
        AssetType::Group => {
            if requested < 1 {
                return Err(AccountingError::NonPositive);
            }
            let remaining = assignment.quantity - assignment.returned_quantity;
            if requested > remaining {
                return Err(AccountingError::ReturnExceedsRemaining { requested, remaining });
            }
            requested
        }
    };

    let returned = (assignment.returned_quantity + moved).min(assignment.quantity);
    let assignment_status = if returned >= assignment.quantity {
        AssignmentStatus::Returned
    } else {
        AssignmentStatus::PartiallyReturned
    };

    // A unit never comes home twice
    let available = (asset.available_quantity + moved).min(asset.quantity);

    Ok(ReturnPlan {
        available_quantity: available,
        asset_status: settle_status(asset.status, available, asset.quantity),
        returned_quantity: returned,
        assignment_status,
        moved,
    })
}

/// Asset status after opening a maintenance record, or `None` to leave it as is.
///
/// A record opened directly as `completed` is history only and does not
/// touch the asset.
pub fn plan_maintenance_open(
    asset: &AssetState,
    status: MaintenanceStatus,
) -> Result<Option<AssetStatus>, AccountingError> {
    if asset.status == AssetStatus::Retired {
        return Err(AccountingError::Retired);
    }
    Ok(match status {
        MaintenanceStatus::Completed => None,
        _ => Some(AssetStatus::UnderMaintenance),
    })
}

/// Asset status after a maintenance record moves to `status`.
///
/// `others_open` counts the asset's other records not yet completed; the
/// asset stays under maintenance until the last of them closes.
pub fn plan_maintenance_update(
    asset: &AssetState,
    status: MaintenanceStatus,
    others_open: i64,
) -> Result<AssetStatus, AccountingError> {
    if asset.status == AssetStatus::Retired {
        return Err(AccountingError::Retired);
    }
    Ok(match status {
        MaintenanceStatus::Completed if others_open == 0 => status_for(asset.available_quantity, asset.quantity),
        _ => AssetStatus::UnderMaintenance,
    })
}

/// An asset can only be retired with every unit back home.
pub fn plan_retire(asset: &AssetState) -> Result<AssetStatus, AccountingError> {
    let outstanding = asset.quantity - asset.available_quantity;
    if outstanding > 0 {
        return Err(AccountingError::UnitsOutstanding { outstanding });
    }
    Ok(AssetStatus::Retired)
}

/// Only fully returned assignments may be soft-deleted.
pub fn check_removable(assignment: &AssignmentState) -> Result<(), AccountingError> {
    if assignment.status != AssignmentStatus::Returned {
        return Err(AccountingError::NotReturned);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(quantity: i32, available: i32) -> AssetState {
        AssetState {
            asset_type: AssetType::Group,
            quantity,
            available_quantity: available,
            status: status_for(available, quantity),
        }
    }

    fn individual(available: i32) -> AssetState {
        AssetState {
            asset_type: AssetType::Individual,
            quantity: 1,
            available_quantity: available,
            status: status_for(available, 1),
        }
    }

    fn held(quantity: i32, returned: i32) -> AssignmentState {
        AssignmentState {
            quantity,
            returned_quantity: returned,
            status: if returned == 0 {
                AssignmentStatus::Assigned
            } else if returned < quantity {
                AssignmentStatus::PartiallyReturned
            } else {
                AssignmentStatus::Returned
            },
        }
    }

    #[test]
    fn group_assignment_deducts_and_sets_thresholds() {
        let plan = plan_assign(&group(10, 10), 3).unwrap();
        assert_eq!(plan.available_quantity, 7);
        assert_eq!(plan.asset_status, AssetStatus::PartiallyAssigned);
        assert_eq!(plan.moved, 3);

        let plan = plan_assign(&group(10, 4), 4).unwrap();
        assert_eq!(plan.available_quantity, 0);
        assert_eq!(plan.asset_status, AssetStatus::Assigned);
    }

    #[test]
    fn group_assignment_never_goes_negative() {
        for available in 0..=5 {
            for requested in 1..=8 {
                let asset = AssetState {
                    status: AssetStatus::Available,
                    ..group(5, available)
                };
                match plan_assign(&asset, requested) {
                    Ok(plan) => {
                        assert!(requested <= available);
                        assert_eq!(plan.available_quantity, available - requested);
                        assert!(plan.available_quantity >= 0);
                    }
                    Err(AccountingError::InsufficientQuantity { .. }) => assert!(requested > available),
                    Err(other) => panic!("unexpected {other:?}"),
                }
            }
        }
    }

    #[test]
    fn individual_assignment_takes_exactly_one() {
        let plan = plan_assign(&individual(1), 1).unwrap();
        assert_eq!(plan.available_quantity, 0);
        assert_eq!(plan.asset_status, AssetStatus::Assigned);

        assert_eq!(
            plan_assign(&individual(1), 2),
            Err(AccountingError::IndividualQuantity { requested: 2 })
        );
        assert_eq!(plan_assign(&individual(0), 1), Err(AccountingError::AlreadyAssigned));
    }

    #[test]
    fn maintenance_and_retired_assets_are_not_assignable() {
        for status in [AssetStatus::UnderMaintenance, AssetStatus::Retired] {
            let asset = AssetState { status, ..group(5, 5) };
            assert_eq!(plan_assign(&asset, 1), Err(AccountingError::NotAssignable { status }));
        }
    }

    #[test]
    fn partially_returned_assets_accept_new_assignments() {
        let asset = AssetState {
            status: AssetStatus::PartiallyReturned,
            ..group(5, 2)
        };
        assert_eq!(plan_assign(&asset, 2).unwrap().asset_status, AssetStatus::Assigned);
    }

    #[test]
    fn extend_only_deducts_the_additional_units() {
        let plan = plan_extend(&group(10, 6), &held(4, 0), 2).unwrap();
        assert_eq!(plan.available_quantity, 4);
        assert_eq!(plan.assignment_quantity, 6);
        assert_eq!(plan.moved, 2);

        assert_eq!(
            plan_extend(&group(10, 1), &held(4, 0), 2),
            Err(AccountingError::InsufficientQuantity { requested: 2, available: 1 })
        );
    }

    #[test]
    fn extend_rejects_returned_and_individual() {
        assert_eq!(plan_extend(&group(10, 10), &held(2, 2), 1), Err(AccountingError::AlreadyReturned));
        assert!(matches!(
            plan_extend(&individual(0), &held(1, 0), 1),
            Err(AccountingError::IndividualQuantity { requested: 2 })
        ));
    }

    #[test]
    fn group_return_updates_both_sides() {
        let plan = plan_return(&group(10, 4), &held(6, 0), 2).unwrap();
        assert_eq!(plan.available_quantity, 6);
        assert_eq!(plan.asset_status, AssetStatus::PartiallyAssigned);
        assert_eq!(plan.returned_quantity, 2);
        assert_eq!(plan.assignment_status, AssignmentStatus::PartiallyReturned);

        let plan = plan_return(&group(10, 6), &held(6, 2), 4).unwrap();
        assert_eq!(plan.available_quantity, 10);
        assert_eq!(plan.asset_status, AssetStatus::Available);
        assert_eq!(plan.assignment_status, AssignmentStatus::Returned);
    }

    #[test]
    fn group_return_cannot_exceed_outstanding() {
        assert_eq!(
            plan_return(&group(10, 4), &held(6, 4), 3),
            Err(AccountingError::ReturnExceedsRemaining { requested: 3, remaining: 2 })
        );
        assert_eq!(plan_return(&group(10, 4), &held(6, 0), 0), Err(AccountingError::NonPositive));
    }

    #[test]
    fn availability_is_clamped_at_quantity() {
        // Drifted row: availability already full while an assignment is open
        let plan = plan_return(&group(5, 5), &held(2, 0), 2).unwrap();
        assert_eq!(plan.available_quantity, 5);
    }

    #[test]
    fn individual_return_is_one_unit_once() {
        let plan = plan_return(&individual(0), &held(1, 0), 7).unwrap();
        assert_eq!(plan.moved, 1);
        assert_eq!(plan.available_quantity, 1);
        assert_eq!(plan.asset_status, AssetStatus::Available);
        assert_eq!(plan.assignment_status, AssignmentStatus::Returned);

        assert_eq!(plan_return(&individual(1), &held(1, 1), 1), Err(AccountingError::AlreadyReturned));
    }

    #[test]
    fn return_during_maintenance_keeps_maintenance_status() {
        let asset = AssetState {
            status: AssetStatus::UnderMaintenance,
            ..group(4, 1)
        };
        let plan = plan_return(&asset, &held(3, 0), 3).unwrap();
        assert_eq!(plan.available_quantity, 4);
        assert_eq!(plan.asset_status, AssetStatus::UnderMaintenance);
    }

    #[test]
    fn maintenance_open_paths() {
        assert_eq!(
            plan_maintenance_open(&group(3, 3), MaintenanceStatus::Scheduled).unwrap(),
            Some(AssetStatus::UnderMaintenance)
        );
        assert_eq!(plan_maintenance_open(&group(3, 3), MaintenanceStatus::Completed).unwrap(), None);

        let retired = AssetState {
            status: AssetStatus::Retired,
            ..group(3, 3)
        };
        assert_eq!(
            plan_maintenance_open(&retired, MaintenanceStatus::InProgress),
            Err(AccountingError::Retired)
        );
    }

    #[test]
    fn maintenance_completion_restores_quantity_status() {
        let home = AssetState {
            status: AssetStatus::UnderMaintenance,
            ..individual(1)
        };
        assert_eq!(
            plan_maintenance_update(&home, MaintenanceStatus::Completed, 0).unwrap(),
            AssetStatus::Available
        );

        // Still out with a user: completing maintenance must not free it
        let out = AssetState {
            status: AssetStatus::UnderMaintenance,
            ..individual(0)
        };
        assert_eq!(
            plan_maintenance_update(&out, MaintenanceStatus::Completed, 0).unwrap(),
            AssetStatus::Assigned
        );
        assert_eq!(
            plan_maintenance_update(&home, MaintenanceStatus::InProgress, 0).unwrap(),
            AssetStatus::UnderMaintenance
        );
    }

    #[test]
    fn completing_one_of_two_open_records_keeps_maintenance() {
        let home = AssetState {
            status: AssetStatus::UnderMaintenance,
            ..group(4, 4)
        };
        assert_eq!(
            plan_maintenance_update(&home, MaintenanceStatus::Completed, 1).unwrap(),
            AssetStatus::UnderMaintenance
        );
        assert_eq!(
            plan_maintenance_update(&home, MaintenanceStatus::Completed, 0).unwrap(),
            AssetStatus::Available
        );
    }

    #[test]
    fn retire_requires_every_unit_home() {
        assert_eq!(plan_retire(&group(5, 5)), Ok(AssetStatus::Retired));
        assert_eq!(plan_retire(&group(5, 3)), Err(AccountingError::UnitsOutstanding { outstanding: 2 }));
    }

    #[test]
    fn only_returned_assignments_are_removable() {
        assert!(check_removable(&held(2, 2)).is_ok());
        assert_eq!(check_removable(&held(2, 1)), Err(AccountingError::NotReturned));
    }
}
