// handlers/protected/options.rs - GET /api/options/:kind
//
// Value/label lists for select inputs. Row-backed lists respect the
// caller's scope visibility.

use axum::extract::{Extension, Path};
use serde::Serialize;

use crate::database::models::{AssetStatus, AssetType, MaintenanceStatus};
use crate::database::repositories::{AssetRepo, ScopeRepo, UserRepo};
use crate::error::ApiError;
use crate::handlers::page_window;
use crate::middleware::{ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::types::{Access, Page};

crate::text_enum! {
    pub enum OptionKind {
        AssetTypes => "asset_types",
        AssetStatuses => "asset_statuses",
        MaintenanceStatuses => "maintenance_statuses",
        Users => "users",
        Scopes => "scopes",
        AssignableAssets => "assignable_assets",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// "partially_assigned" → "Partially assigned"
fn humanize(text: &str) -> String {
    let spaced = text.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn enum_options<T: std::fmt::Display>(values: &[T]) -> Vec<SelectOption> {
    values
        .iter()
        .map(|v| {
            let value = v.to_string();
            SelectOption { label: humanize(&value), value }
        })
        .collect()
}

/// GET /api/options/:kind
pub async fn options_get(
    Path(kind): Path<String>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<SelectOption>> {
    user.authorize(Access::Read, None)?;
    let kind: OptionKind = kind.parse().map_err(|_| ApiError::not_found(format!("Unknown option list '{}'", kind)))?;

    let options = match kind {
        OptionKind::AssetTypes => enum_options(AssetType::ALL),
        OptionKind::AssetStatuses => enum_options(AssetStatus::ALL),
        OptionKind::MaintenanceStatuses => enum_options(MaintenanceStatus::ALL),
        OptionKind::Users => {
            let (limit, offset) = page_window(&Page { limit: None, offset: None });
            UserRepo::list(&pool, user.scope_filter(), limit, offset)
                .await?
                .into_iter()
                .map(|u| SelectOption { value: u.id.to_string(), label: format!("{} ({})", u.name, u.auth) })
                .collect()
        }
        OptionKind::Scopes => ScopeRepo::list(&pool)
            .await?
            .into_iter()
            .filter(|s| user.can_see(Some(s.id)))
            .map(|s| SelectOption { value: s.id.to_string(), label: format!("{} ({})", s.name, s.kind) })
            .collect(),
        OptionKind::AssignableAssets => AssetRepo::list_assignable(&pool, user.scope_filter())
            .await?
            .into_iter()
            .map(|a| SelectOption {
                value: a.id.to_string(),
                label: format!("{} [{}] - {} available", a.name, a.asset_code, a.available_quantity),
            })
            .collect(),
    };

    Ok(ApiResponse::success(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_are_readable() {
        let options = enum_options(AssetStatus::ALL);
        assert_eq!(options.len(), 6);
        assert!(options.contains(&SelectOption {
            value: "partially_assigned".into(),
            label: "Partially assigned".into()
        }));
    }

    #[test]
    fn option_kinds_parse_from_path() {
        assert_eq!("assignable_assets".parse::<OptionKind>().unwrap(), OptionKind::AssignableAssets);
        assert!("payroll".parse::<OptionKind>().is_err());
    }
}
