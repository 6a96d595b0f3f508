// Dashboard service - per-owner totals for the overview screen
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Account, Campaign, CampaignFilter, CampaignStatus, ConnectionStatus, ContactFilter,
    PersonaKind,
};
use crate::repository::Repositories;

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct CampaignCounts {
    pub total: usize,
    pub draft: usize,
    pub active: usize,
    pub paused: usize,
    pub running: usize,
}

impl CampaignCounts {
    fn tally(campaigns: &[Campaign]) -> Self {
        let mut counts = CampaignCounts {
            total: campaigns.len(),
            ..Default::default()
        };
        for campaign in campaigns {
            match campaign.status {
                CampaignStatus::Draft => counts.draft += 1,
                CampaignStatus::Active => counts.active += 1,
                CampaignStatus::Paused => counts.paused += 1,
                CampaignStatus::Running => counts.running += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct AccountCounts {
    pub total: usize,
    pub connected: usize,
    pub failed: usize,
}

impl AccountCounts {
    fn tally(accounts: &[Account]) -> Self {
        let connected = accounts
            .iter()
            .filter(|a| a.status == ConnectionStatus::Connected)
            .count();
        AccountCounts {
            total: accounts.len(),
            connected,
            failed: accounts.len() - connected,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_contacts: usize,
    pub total_lists: usize,
    pub total_templates: usize,
    pub total_agents: usize,
    pub total_creators: usize,
    pub campaigns: CampaignCounts,
    pub accounts: AccountCounts,
}

pub struct DashboardService<'a> {
    repos: &'a Repositories,
}

impl<'a> DashboardService<'a> {
    pub fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    pub async fn get_stats(&self, owner_id: Uuid) -> Result<DashboardStats> {
        let contacts = self.repos.contacts.list(owner_id, &ContactFilter::default()).await?;
        let lists = self.repos.lists.list(owner_id).await?;
        let templates = self.repos.templates.list(owner_id, None).await?;
        let agents = self.repos.personas.list(owner_id, PersonaKind::Agent).await?;
        let creators = self.repos.personas.list(owner_id, PersonaKind::Creator).await?;
        let campaigns = self.repos.campaigns.list(owner_id, &CampaignFilter::default()).await?;
        let accounts = self.repos.accounts.list(owner_id, None).await?;

        Ok(DashboardStats {
            total_contacts: contacts.len(),
            total_lists: lists.len(),
            total_templates: templates.len(),
            total_agents: agents.len(),
            total_creators: creators.len(),
            campaigns: CampaignCounts::tally(&campaigns),
            accounts: AccountCounts::tally(&accounts),
        })
    }
}
