use serde::{Deserialize, Serialize};

use crate::domain::user::{Role, Viewer};

/// Which audiences see a portal tab
///
/// Admins always see every tab, whatever the flags say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabVisibility {
    pub tab_key: String,
    pub visible_to_public: bool,
    pub visible_to_player_manager: bool,
    pub visible_to_referee: bool,
}

impl TabVisibility {
    pub fn new(tab_key: impl Into<String>) -> Result<Self, String> {
        let tab_key = tab_key.into().trim().to_lowercase();
        if tab_key.is_empty() {
            return Err("Tab key cannot be empty".to_string());
        }
        if !tab_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!("Invalid tab key: {}", tab_key));
        }
        Ok(Self {
            tab_key,
            visible_to_public: false,
            visible_to_player_manager: false,
            visible_to_referee: false,
        })
    }

    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        match viewer.role() {
            Some(Role::Admin) => true,
            Some(Role::Referee) => self.visible_to_referee,
            Some(Role::PlayerManager) => self.visible_to_player_manager,
            None => self.visible_to_public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn viewer(role: Role) -> Viewer {
        Viewer::User {
            user_id: Uuid::new_v4(),
            role,
            team_id: None,
        }
    }

    #[test]
    fn admin_sees_hidden_tab() {
        let tab = TabVisibility::new("financien").unwrap();
        assert!(tab.is_visible_to(&viewer(Role::Admin)));
        assert!(!tab.is_visible_to(&Viewer::Public));
    }

    #[test]
    fn flags_gate_each_audience() {
        let tab = TabVisibility {
            visible_to_referee: true,
            ..TabVisibility::new("scheidsrechters").unwrap()
        };
        assert!(tab.is_visible_to(&viewer(Role::Referee)));
        assert!(!tab.is_visible_to(&viewer(Role::PlayerManager)));
        assert!(!tab.is_visible_to(&Viewer::Public));
    }

    #[test]
    fn tab_key_is_normalized_and_checked() {
        assert_eq!(TabVisibility::new(" Kalender ").unwrap().tab_key, "kalender");
        assert!(TabVisibility::new("  ").is_err());
        assert!(TabVisibility::new("blog posts").is_err());
    }
}
