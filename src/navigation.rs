use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

const BRAND: &str = "SkillSync.ai";

/// (label, href, icon)
const MENU: [(&str, &str, &str); 7] = [
    ("Dashboard", "/dashboard", "HomeIcon"),
    ("Jobs", "/jobs", "BriefcaseIcon"),
    ("Resumes", "/resumes", "DocumentTextIcon"),
    ("Analytics", "/analytics", "ChartBarIcon"),
    ("Cover Letters", "/cover-letters", "EnvelopeOpenIcon"),
    ("Interview Preprations", "/interview-preps", "PencilSquareIcon"),
    ("Online Exam", "/online-exam", "ClipboardDocumentCheckIcon"),
];

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct NavItem {
    pub name: &'static str,
    pub href: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct Navigation {
    pub brand: &'static str,
    pub items: Vec<NavItem>,
}

/// Drops the query string and a trailing `/scan` segment.
fn current_path(raw: &str) -> &str {
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    path.strip_suffix("/scan/")
        .or_else(|| path.strip_suffix("/scan"))
        .unwrap_or(path)
}

pub fn menu(raw_path: &str) -> Navigation {
    let path = current_path(raw_path);
    Navigation {
        brand: BRAND,
        items: MENU
            .iter()
            .map(|&(name, href, icon)| NavItem {
                name,
                href,
                icon,
                active: path.starts_with(href),
            })
            .collect(),
    }
}

async fn navigation(Query(q): Query<NavigationQuery>) -> Json<Navigation> {
    Json(menu(q.path.as_deref().unwrap_or("/")))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/navigation", get(navigation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(raw: &str) -> Vec<&'static str> {
        menu(raw).items.into_iter().filter(|i| i.active).map(|i| i.href).collect()
    }

    #[test]
    fn lists_every_section_in_order() {
        let nav = menu("/");
        assert_eq!(nav.brand, "SkillSync.ai");
        let hrefs: Vec<_> = nav.items.iter().map(|i| i.href).collect();
        assert_eq!(
            hrefs,
            [
                "/dashboard",
                "/jobs",
                "/resumes",
                "/analytics",
                "/cover-letters",
                "/interview-preps",
                "/online-exam"
            ]
        );
        assert!(nav.items.iter().all(|i| !i.active));
    }

    #[test]
    fn marks_nested_paths_active() {
        assert_eq!(active("/jobs/42/edit"), ["/jobs"]);
        assert_eq!(active("/resumes?page=2"), ["/resumes"]);
    }

    #[test]
    fn scan_suffix_is_ignored() {
        assert_eq!(current_path("/analytics/scan"), "/analytics");
        assert_eq!(current_path("/analytics/scan/?job=1"), "/analytics");
        assert_eq!(active("/analytics/scan"), ["/analytics"]);
    }
}
