use crate::platform::Keyboard;
use crate::texts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Schedule,
    ViewLogs,
    ViewRegistry,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeTier {
    Ordinary,
    Administrator,
}

impl PrivilegeTier {
    pub fn of(sender_id: u64, admin_id: u64) -> Self {
        if sender_id == admin_id {
            PrivilegeTier::Administrator
        } else {
            PrivilegeTier::Ordinary
        }
    }
}

/// Trigger strings for each command. Matching is exact.
#[derive(Debug, Clone)]
pub struct CommandTable {
    triggers: Vec<(&'static str, Command)>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            triggers: vec![
                ("/start", Command::Start),
                ("/schedule", Command::Schedule),
                (texts::SCHEDULE_BUTTON, Command::Schedule),
                (texts::VIEW_LOGS_BUTTON, Command::ViewLogs),
                (texts::VIEW_REGISTRY_BUTTON, Command::ViewRegistry),
            ],
        }
    }
}

impl CommandTable {
    pub fn classify(&self, text: &str) -> Command {
        self.triggers
            .iter()
            .find(|(trigger, _)| *trigger == text)
            .map(|(_, command)| *command)
            .unwrap_or(Command::Unknown)
    }
}

/// Reply keyboards per tier, built once at startup
#[derive(Debug, Clone)]
pub struct Keyboards {
    pub user: Keyboard,
    pub admin: Keyboard,
}

impl Default for Keyboards {
    fn default() -> Self {
        Self {
            user: Keyboard::new(vec![vec![texts::SCHEDULE_BUTTON]]),
            admin: Keyboard::new(vec![
                vec![texts::VIEW_LOGS_BUTTON, texts::VIEW_REGISTRY_BUTTON],
                vec![texts::SCHEDULE_BUTTON],
            ]),
        }
    }
}

impl Keyboards {
    pub fn for_tier(&self, tier: PrivilegeTier) -> &Keyboard {
        match tier {
            PrivilegeTier::Administrator => &self.admin,
            PrivilegeTier::Ordinary => &self.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_triggers() {
        let table = CommandTable::default();
        assert_eq!(table.classify("/start"), Command::Start);
        assert_eq!(table.classify("/schedule"), Command::Schedule);
        assert_eq!(table.classify("📆 Расписание 2 корпуса"), Command::Schedule);
        assert_eq!(table.classify("📄 Посмотреть логи"), Command::ViewLogs);
        assert_eq!(table.classify("🗄️ Посмотреть БД"), Command::ViewRegistry);
    }

    #[test]
    fn test_classify_requires_exact_match() {
        let table = CommandTable::default();
        assert_eq!(table.classify("/start "), Command::Unknown);
        assert_eq!(table.classify("/START"), Command::Unknown);
        assert_eq!(table.classify("/schedule@bot"), Command::Unknown);
        assert_eq!(table.classify(""), Command::Unknown);
    }

    #[test]
    fn test_tier_is_exact_identity_match() {
        assert_eq!(PrivilegeTier::of(10, 10), PrivilegeTier::Administrator);
        assert_eq!(PrivilegeTier::of(11, 10), PrivilegeTier::Ordinary);
    }

    #[test]
    fn test_keyboards() {
        let keyboards = Keyboards::default();
        let user = keyboards.for_tier(PrivilegeTier::Ordinary);
        let admin = keyboards.for_tier(PrivilegeTier::Administrator);

        assert_eq!(user.button_count(), 1);
        assert!(user.contains(texts::SCHEDULE_BUTTON));
        assert_eq!(admin.button_count(), 3);
        assert!(admin.contains(texts::VIEW_LOGS_BUTTON));
        assert!(admin.contains(texts::VIEW_REGISTRY_BUTTON));
    }
}
