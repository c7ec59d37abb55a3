use serde::{Deserialize, Serialize};

/// An integration the user can connect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorApp {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub category: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl ConnectorApp {
    fn fixed(id: &str, name: &str, description: &str, icon: &str, category: &str, permissions: [&str; 2]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: Some(icon.to_string()),
            category: category.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Catalogue served when the provider is unreachable or returns nothing
pub fn fallback_apps() -> Vec<ConnectorApp> {
    vec![
        ConnectorApp::fixed(
            "gmail",
            "Gmail",
            "Email e comunicazione",
            "https://ssl.gstatic.com/ui/v1/icons/mail/rfr/gmail.ico",
            "communication",
            ["gmail:read", "gmail:write"],
        ),
        ConnectorApp::fixed(
            "slack",
            "Slack",
            "Messaggistica e collaborazione team",
            "https://a.slack-edge.com/80588/marketing/img/icons/icon_slack_hash_colored.png",
            "communication",
            ["channels:read", "chat:write"],
        ),
        ConnectorApp::fixed(
            "google_calendar",
            "Google Calendar",
            "Gestione calendario e eventi",
            "https://upload.wikimedia.org/wikipedia/commons/thumb/a/a5/Google_Calendar_icon_%282020%29.svg/2048px-Google_Calendar_icon_%282020%29.svg.png",
            "productivity",
            ["calendar:read", "calendar:write"],
        ),
        ConnectorApp::fixed(
            "notion",
            "Notion",
            "Workspace per note e documenti",
            "https://www.notion.so/images/logo-ios.png",
            "productivity",
            ["notion:read", "notion:write"],
        ),
        ConnectorApp::fixed(
            "github",
            "GitHub",
            "Gestione repository e codice",
            "https://github.githubassets.com/favicons/favicon.svg",
            "developer",
            ["repo:read", "repo:write"],
        ),
    ]
}

/// Icon of a known app, matched by id or case-insensitive name
pub fn fallback_icon(app_id: &str, app_name: &str) -> Option<String> {
    fallback_apps()
        .into_iter()
        .find(|app| app.id == app_id || app.name.eq_ignore_ascii_case(app_name))
        .and_then(|app| app.icon)
}
