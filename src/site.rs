use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::Account;

/// ModelAdmin
///
/// How one model is presented on the admin surface: listed columns, filters, searchable
/// fields and default ordering (`-field` means descending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ModelAdmin {
    pub model: String,
    pub list_display: Vec<String>,
    pub list_filter: Vec<String>,
    pub search_fields: Vec<String>,
    pub ordering: Vec<String>,
}

/// AdminSite
///
/// Presentation settings of the admin surface. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminSite {
    pub site_header: String,
    pub site_title: String,
    pub index_title: String,
    pub models: Vec<ModelAdmin>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl AdminSite {
    fn recursion() -> Self {
        Self {
            site_header: "RECursion Admin Panel".to_string(),
            site_title: "RECursion Admin".to_string(),
            index_title: "Welcome to RECursion Administration".to_string(),
            models: vec![
                ModelAdmin {
                    model: "account".to_string(),
                    list_display: strings(&[
                        "username",
                        "email",
                        "first_name",
                        "last_name",
                        "is_staff",
                        "is_active",
                        "created_at",
                    ]),
                    list_filter: strings(&["is_staff", "is_superuser", "is_active"]),
                    search_fields: strings(&["username", "email"]),
                    ordering: strings(&["-created_at"]),
                },
                ModelAdmin {
                    model: "profile".to_string(),
                    list_display: strings(&["user", "location", "birth_date"]),
                    list_filter: Vec::new(),
                    search_fields: strings(&["user__username", "user__email"]),
                    ordering: Vec::new(),
                },
            ],
        }
    }
}

lazy_static! {
    pub static ref ADMIN_SITE: AdminSite = AdminSite::recursion();
}

/// AccountQuery
///
/// Admin account listing parameters, following the account model admin's search fields
/// and list filters.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountQuery {
    /// Case-insensitive substring match on username or email.
    pub search: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

impl AccountQuery {
    pub fn matches(&self, account: &Account) -> bool {
        let search_hit = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                account.username.to_lowercase().contains(&term) || account.email.to_lowercase().contains(&term)
            }
        };
        search_hit
            && self.is_staff.is_none_or(|v| v == account.is_staff)
            && self.is_superuser.is_none_or(|v| v == account.is_superuser)
            && self.is_active.is_none_or(|v| v == account.is_active)
    }
}
