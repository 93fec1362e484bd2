//! Startup restore of saved filters and selections
//!
//! Restoring is spread over three loads that finish at different times: the
//! saved snapshot, the account list, then the repo list of the saved account.
//! [`RestoreSequencer`] tracks which of those has happened and answers each
//! event with the [`RestoreAction`]s the dashboard should carry out. It does
//! no I/O itself.
//!
//! ```text
//! Mount ──snapshot──▶ Accounts ──saved account──▶ Repos ──▶ Done
//!                        │                          │
//!                        └──── otherwise ───────────┴──────▶ Done
//! ```
//!
//! Filters are applied only once, as the last step before the latch, so the
//! PR list is not fetched for an intermediate selection.

use crate::filters::FilterSettings;
use crate::settings::PersistedSettingsSnapshot;
use crate::types::{Account, Repository};

/// Something the dashboard must do on behalf of the restore.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreAction {
    SelectAccount(String),
    SelectRepo(String),
    /// Pause for the configured settle delay before the next action
    Settle,
    ApplyFilters(FilterSettings),
    /// Restore finished; autosave may start
    Latch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    Mount,
    Accounts,
    Repos,
    Done,
}

#[derive(Debug)]
pub struct RestoreSequencer {
    phase: RestorePhase,
    snapshot: Option<PersistedSettingsSnapshot>,
}

impl Default for RestoreSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl RestoreSequencer {
    pub fn new() -> Self {
        Self {
            phase: RestorePhase::Mount,
            snapshot: None,
        }
    }

    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == RestorePhase::Done
    }

    /// The saved account this restore is waiting on, if any.
    pub fn pending_account(&self) -> Option<&str> {
        match self.phase {
            RestorePhase::Repos => self
                .snapshot
                .as_ref()
                .and_then(|s| s.selected_account_login.as_deref()),
            _ => None,
        }
    }

    /// Phase 1: the snapshot fetch finished (`None` when absent or failed).
    pub fn snapshot_loaded(
        &mut self,
        snapshot: Option<PersistedSettingsSnapshot>,
    ) -> Vec<RestoreAction> {
        if self.phase != RestorePhase::Mount {
            return Vec::new();
        }
        tracing::debug!(found = snapshot.is_some(), "Restore snapshot loaded");
        self.snapshot = snapshot;
        self.phase = RestorePhase::Accounts;
        Vec::new()
    }

    /// Phase 2: the account list finished loading.
    pub fn accounts_loaded(&mut self, accounts: &[Account]) -> Vec<RestoreAction> {
        if self.phase != RestorePhase::Accounts {
            return Vec::new();
        }

        let Some(snapshot) = self.snapshot.as_ref() else {
            return self.finish(None);
        };

        let saved_account = snapshot
            .selected_account_login
            .as_deref()
            .filter(|login| accounts.iter().any(|a| a.login == *login));

        match saved_account {
            Some(login) => {
                let login = login.to_string();
                self.phase = RestorePhase::Repos;
                vec![RestoreAction::SelectAccount(login)]
            }
            None => {
                let filters = snapshot.filters.clone();
                self.finish(Some(filters))
            }
        }
    }

    /// Phase 3: the repo list of `account` finished loading.
    ///
    /// Lists for any other account are ignored.
    pub fn repos_loaded(&mut self, account: &str, repos: &[Repository]) -> Vec<RestoreAction> {
        if self.phase != RestorePhase::Repos || self.pending_account() != Some(account) {
            return Vec::new();
        }

        let Some(snapshot) = self.snapshot.as_ref() else {
            return self.finish(None);
        };

        let saved_repo = snapshot
            .selected_repo_full_name
            .as_deref()
            .filter(|name| repos.iter().any(|r| r.full_name() == *name))
            .map(str::to_string);

        match saved_repo {
            Some(full_name) => {
                let filters = snapshot.filters.clone();
                let mut actions = vec![
                    RestoreAction::SelectRepo(full_name),
                    RestoreAction::Settle,
                ];
                actions.extend(self.finish(Some(filters)));
                actions
            }
            None => self.finish(None),
        }
    }

    /// Give up on the restore (a load failed); latches if not done yet.
    pub fn abandon(&mut self) -> Vec<RestoreAction> {
        if self.is_done() {
            return Vec::new();
        }
        tracing::warn!(phase = ?self.phase, "Abandoning settings restore");
        self.finish(None)
    }

    fn finish(&mut self, filters: Option<FilterSettings>) -> Vec<RestoreAction> {
        self.phase = RestorePhase::Done;
        self.snapshot = None;
        let mut actions = Vec::new();
        if let Some(filters) = filters {
            actions.push(RestoreAction::ApplyFilters(filters));
        }
        actions.push(RestoreAction::Latch);
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterField;
    use crate::types::{AccountKind, RepositoryOwner};

    fn account(login: &str) -> Account {
        Account {
            login: login.to_string(),
            name: None,
            avatar_url: None,
            kind: AccountKind::Org,
            is_personal: false,
        }
    }

    fn repo(owner: &str, name: &str) -> Repository {
        Repository {
            name: name.to_string(),
            owner: RepositoryOwner {
                login: owner.to_string(),
            },
            description: None,
            is_private: false,
            updated_at: None,
        }
    }

    fn snapshot(account: Option<&str>, repo: Option<&str>) -> PersistedSettingsSnapshot {
        let mut filters = FilterSettings::default();
        filters.set(FilterField::Author, "alice").unwrap();
        PersistedSettingsSnapshot {
            filters,
            selected_account_login: account.map(str::to_string),
            selected_repo_full_name: repo.map(str::to_string),
        }
    }

    #[test]
    fn test_full_restore_sequence() {
        let saved = snapshot(Some("acme"), Some("acme/widgets"));
        let mut seq = RestoreSequencer::new();

        assert!(seq.snapshot_loaded(Some(saved.clone())).is_empty());
        assert_eq!(
            seq.accounts_loaded(&[account("me"), account("acme")]),
            vec![RestoreAction::SelectAccount("acme".to_string())]
        );
        assert_eq!(seq.phase(), RestorePhase::Repos);

        let actions = seq.repos_loaded("acme", &[repo("acme", "api"), repo("acme", "widgets")]);
        assert_eq!(
            actions,
            vec![
                RestoreAction::SelectRepo("acme/widgets".to_string()),
                RestoreAction::Settle,
                RestoreAction::ApplyFilters(saved.filters),
                RestoreAction::Latch,
            ]
        );
        assert!(seq.is_done());
    }

    #[test]
    fn test_no_snapshot_latches_on_accounts() {
        let mut seq = RestoreSequencer::new();
        seq.snapshot_loaded(None);
        assert_eq!(
            seq.accounts_loaded(&[account("a"), account("b")]),
            vec![RestoreAction::Latch]
        );
    }

    #[test]
    fn test_missing_account_applies_filters_and_latches() {
        let saved = snapshot(Some("gone"), Some("gone/repo"));
        let mut seq = RestoreSequencer::new();
        seq.snapshot_loaded(Some(saved.clone()));
        assert_eq!(
            seq.accounts_loaded(&[account("acme")]),
            vec![
                RestoreAction::ApplyFilters(saved.filters),
                RestoreAction::Latch
            ]
        );
    }

    #[test]
    fn test_missing_repo_latches_without_filters() {
        let mut seq = RestoreSequencer::new();
        seq.snapshot_loaded(Some(snapshot(Some("acme"), Some("acme/deleted"))));
        seq.accounts_loaded(&[account("acme")]);
        assert_eq!(
            seq.repos_loaded("acme", &[repo("acme", "api")]),
            vec![RestoreAction::Latch]
        );
    }

    #[test]
    fn test_repos_for_other_account_are_ignored() {
        let mut seq = RestoreSequencer::new();
        seq.snapshot_loaded(Some(snapshot(Some("acme"), Some("acme/api"))));
        seq.accounts_loaded(&[account("acme"), account("other")]);
        assert!(seq.repos_loaded("other", &[repo("other", "api")]).is_empty());
        assert_eq!(seq.phase(), RestorePhase::Repos);
    }

    #[test]
    fn test_events_after_done_do_nothing() {
        let mut seq = RestoreSequencer::new();
        seq.snapshot_loaded(None);
        seq.accounts_loaded(&[account("a")]);
        assert!(seq.accounts_loaded(&[account("a")]).is_empty());
        assert!(seq.abandon().is_empty());
    }

    #[test]
    fn test_abandon_latches() {
        let mut seq = RestoreSequencer::new();
        seq.snapshot_loaded(Some(snapshot(Some("acme"), None)));
        assert_eq!(seq.abandon(), vec![RestoreAction::Latch]);
        assert!(seq.is_done());
    }
}
