// In-process store used by the test suite and `DATABASE__BACKEND=memory`.
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AccountRepository, CampaignRepository, ContactRepository, ImportSummary, ImportTarget,
    ListRepository, PersonaRepository, TemplateRepository,
};
use crate::error::{AppError, Result};
use crate::models::{
    Account, Campaign, CampaignFilter, CampaignPatch, CampaignStats, CampaignStatus,
    ConnectionOutcome, Contact, ContactFilter, ContactList, ContactPatch, ListPatch, NewAccount,
    NewCampaign, NewContact, NewList, NewPersona, NewTemplate, Persona, PersonaKind,
    PersonaPatch, Platform, Template, TemplatePatch,
};

#[derive(Default)]
struct MemoryState {
    contacts: HashMap<Uuid, Contact>,
    lists: HashMap<Uuid, ContactList>,
    campaigns: HashMap<Uuid, Campaign>,
    accounts: HashMap<Uuid, Account>,
    templates: HashMap<Uuid, Template>,
    personas: HashMap<Uuid, Persona>,
}

impl MemoryState {
    fn contact_count(&self, list_id: Uuid) -> i64 {
        self.contacts
            .values()
            .filter(|c| c.list_id == Some(list_id))
            .count() as i64
    }

    fn list_with_count(&self, list: &ContactList) -> ContactList {
        let mut list = list.clone();
        list.contact_count = self.contact_count(list.id);
        list
    }

    fn owned_list(&self, owner_id: Uuid, id: Uuid) -> Result<&ContactList> {
        self.lists
            .get(&id)
            .filter(|l| l.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found("List", id))
    }
}

fn insert_contact(state: &mut MemoryState, owner_id: Uuid, contact: NewContact) -> Contact {
    let now = Utc::now();
    let contact = Contact {
        id: Uuid::new_v4(),
        owner_id,
        list_id: contact.list_id,
        name: contact.name,
        email: contact.email,
        phone: contact.phone,
        social: contact.social,
        segments: contact.segments,
        created_at: now,
        updated_at: now,
    };
    state.contacts.insert(contact.id, contact.clone());
    contact
}

/// Newest first, matching `ORDER BY created_at DESC` in the SQL repositories.
fn newest_first<T, F>(items: &mut [T], created_at: F)
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[async_trait]
impl ContactRepository for MemoryStore {
    async fn create(&self, owner_id: Uuid, contact: NewContact) -> Result<Contact> {
        let mut state = self.state.write().await;
        if let Some(list_id) = contact.list_id {
            state.owned_list(owner_id, list_id)?;
        }
        Ok(insert_contact(&mut state, owner_id, contact))
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Contact> {
        let state = self.state.read().await;
        state
            .contacts
            .get(&id)
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Contact", id))
    }

    async fn list(&self, owner_id: Uuid, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let state = self.state.read().await;
        let mut contacts: Vec<Contact> = state
            .contacts
            .values()
            .filter(|c| c.owner_id == owner_id && filter.matches(c))
            .cloned()
            .collect();
        newest_first(&mut contacts, |c| c.created_at);
        Ok(contacts)
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: ContactPatch) -> Result<Contact> {
        let mut state = self.state.write().await;
        if let Some(Some(list_id)) = patch.list_id {
            state.owned_list(owner_id, list_id)?;
        }
        let contact = state
            .contacts
            .get_mut(&id)
            .filter(|c| c.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found("Contact", id))?;
        patch.apply(contact);
        contact.updated_at = Utc::now();
        Ok(contact.clone())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let owned = state
            .contacts
            .get(&id)
            .is_some_and(|c| c.owner_id == owner_id);
        if !owned {
            return Err(AppError::not_found("Contact", id));
        }
        state.contacts.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ListRepository for MemoryStore {
    async fn create(&self, owner_id: Uuid, list: NewList) -> Result<ContactList> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let list = ContactList {
            id: Uuid::new_v4(),
            owner_id,
            name: list.name,
            segment: list.segment,
            contact_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<ContactList> {
        let state = self.state.read().await;
        let list = state.owned_list(owner_id, id)?;
        Ok(state.list_with_count(list))
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<ContactList>> {
        let state = self.state.read().await;
        let mut lists: Vec<ContactList> = state
            .lists
            .values()
            .filter(|l| l.owner_id == owner_id)
            .map(|l| state.list_with_count(l))
            .collect();
        newest_first(&mut lists, |l| l.created_at);
        Ok(lists)
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: ListPatch) -> Result<ContactList> {
        let mut state = self.state.write().await;
        state.owned_list(owner_id, id)?;
        let updated = {
            let list = state
                .lists
                .get_mut(&id)
                .ok_or_else(|| AppError::not_found("List", id))?;
            patch.apply(list);
            list.updated_at = Utc::now();
            list.clone()
        };
        Ok(state.list_with_count(&updated))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64> {
        let mut state = self.state.write().await;
        state.owned_list(owner_id, id)?;
        state.lists.remove(&id);

        let before = state.contacts.len();
        state.contacts.retain(|_, c| c.list_id != Some(id));
        Ok((before - state.contacts.len()) as u64)
    }

    async fn import(
        &self,
        owner_id: Uuid,
        target: ImportTarget,
        contacts: Vec<NewContact>,
    ) -> Result<ImportSummary> {
        // A single write guard makes the list creation and inserts atomic.
        let mut state = self.state.write().await;

        let list_id = match target {
            ImportTarget::Existing(id) => state.owned_list(owner_id, id)?.id,
            ImportTarget::NewList(new_list) => {
                let now = Utc::now();
                let list = ContactList {
                    id: Uuid::new_v4(),
                    owner_id,
                    name: new_list.name,
                    segment: new_list.segment,
                    contact_count: 0,
                    created_at: now,
                    updated_at: now,
                };
                let id = list.id;
                state.lists.insert(id, list);
                id
            }
        };

        let imported = contacts.len();
        for mut contact in contacts {
            contact.list_id = Some(list_id);
            insert_contact(&mut state, owner_id, contact);
        }

        let list = state.owned_list(owner_id, list_id)?;
        Ok(ImportSummary {
            list: state.list_with_count(list),
            imported,
        })
    }
}

#[async_trait]
impl CampaignRepository for MemoryStore {
    async fn create(&self, owner_id: Uuid, campaign: NewCampaign) -> Result<Campaign> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            owner_id,
            name: campaign.name,
            platform: campaign.platform,
            list_id: campaign.list_id,
            template_id: campaign.template_id,
            status: CampaignStatus::Draft,
            blocks: campaign.blocks,
            stats: CampaignStats::default(),
            created_at: now,
            updated_at: now,
        };
        state.campaigns.insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Campaign> {
        let state = self.state.read().await;
        state
            .campaigns
            .get(&id)
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Campaign", id))
    }

    async fn list(&self, owner_id: Uuid, filter: &CampaignFilter) -> Result<Vec<Campaign>> {
        let state = self.state.read().await;
        let mut campaigns: Vec<Campaign> = state
            .campaigns
            .values()
            .filter(|c| c.owner_id == owner_id && filter.matches(c))
            .cloned()
            .collect();
        newest_first(&mut campaigns, |c| c.created_at);
        Ok(campaigns)
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: CampaignPatch) -> Result<Campaign> {
        let mut state = self.state.write().await;
        let campaign = state
            .campaigns
            .get_mut(&id)
            .filter(|c| c.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found("Campaign", id))?;
        patch.apply(campaign);
        campaign.updated_at = Utc::now();
        Ok(campaign.clone())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let owned = state
            .campaigns
            .get(&id)
            .is_some_and(|c| c.owner_id == owner_id);
        if !owned {
            return Err(AppError::not_found("Campaign", id));
        }
        state.campaigns.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create(&self, owner_id: Uuid, account: NewAccount) -> Result<Account> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let connected_at = account.outcome.failure_reason.is_none().then_some(now);
        let account = Account {
            id: Uuid::new_v4(),
            owner_id,
            platform: account.platform,
            email: account.email,
            status: account.outcome.status,
            failure_reason: account.outcome.failure_reason,
            connected_at,
            created_at: now,
            updated_at: now,
        };
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Account> {
        let state = self.state.read().await;
        state
            .accounts
            .get(&id)
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Account", id))
    }

    async fn list(&self, owner_id: Uuid, platform: Option<Platform>) -> Result<Vec<Account>> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| a.owner_id == owner_id && platform.map_or(true, |p| a.platform == p))
            .cloned()
            .collect();
        newest_first(&mut accounts, |a| a.created_at);
        Ok(accounts)
    }

    async fn record_outcome(
        &self,
        owner_id: Uuid,
        id: Uuid,
        outcome: ConnectionOutcome,
    ) -> Result<Account> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get_mut(&id)
            .filter(|a| a.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found("Account", id))?;
        let now = Utc::now();
        if outcome.failure_reason.is_none() {
            account.connected_at = Some(now);
        }
        account.status = outcome.status;
        account.failure_reason = outcome.failure_reason;
        account.updated_at = now;
        Ok(account.clone())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let owned = state
            .accounts
            .get(&id)
            .is_some_and(|a| a.owner_id == owner_id);
        if !owned {
            return Err(AppError::not_found("Account", id));
        }
        state.accounts.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl TemplateRepository for MemoryStore {
    async fn create(&self, owner_id: Uuid, template: NewTemplate) -> Result<Template> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let template = Template {
            id: Uuid::new_v4(),
            owner_id,
            platform: template.platform,
            name: template.name,
            subject: template.subject,
            body: template.body,
            created_at: now,
            updated_at: now,
        };
        state.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Template> {
        let state = self.state.read().await;
        state
            .templates
            .get(&id)
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Template", id))
    }

    async fn list(&self, owner_id: Uuid, platform: Option<Platform>) -> Result<Vec<Template>> {
        let state = self.state.read().await;
        let mut templates: Vec<Template> = state
            .templates
            .values()
            .filter(|t| t.owner_id == owner_id && platform.map_or(true, |p| t.platform == p))
            .cloned()
            .collect();
        newest_first(&mut templates, |t| t.created_at);
        Ok(templates)
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: TemplatePatch) -> Result<Template> {
        let mut state = self.state.write().await;
        let template = state
            .templates
            .get_mut(&id)
            .filter(|t| t.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found("Template", id))?;
        patch.apply(template);
        template.updated_at = Utc::now();
        Ok(template.clone())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let owned = state
            .templates
            .get(&id)
            .is_some_and(|t| t.owner_id == owner_id);
        if !owned {
            return Err(AppError::not_found("Template", id));
        }
        state.templates.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl PersonaRepository for MemoryStore {
    async fn create(&self, owner_id: Uuid, persona: NewPersona) -> Result<Persona> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let persona = Persona {
            id: Uuid::new_v4(),
            owner_id,
            kind: persona.kind,
            name: persona.name,
            behavior: persona.behavior,
            goal: persona.goal,
            tone: persona.tone,
            style: persona.style,
            niche: persona.niche,
            triggers: persona.triggers,
            active: persona.active,
            created_at: now,
            updated_at: now,
        };
        state.personas.insert(persona.id, persona.clone());
        Ok(persona)
    }

    async fn get(&self, owner_id: Uuid, kind: PersonaKind, id: Uuid) -> Result<Persona> {
        let state = self.state.read().await;
        state
            .personas
            .get(&id)
            .filter(|p| p.owner_id == owner_id && p.kind == kind)
            .cloned()
            .ok_or_else(|| AppError::not_found(kind.label(), id))
    }

    async fn list(&self, owner_id: Uuid, kind: PersonaKind) -> Result<Vec<Persona>> {
        let state = self.state.read().await;
        let mut personas: Vec<Persona> = state
            .personas
            .values()
            .filter(|p| p.owner_id == owner_id && p.kind == kind)
            .cloned()
            .collect();
        newest_first(&mut personas, |p| p.created_at);
        Ok(personas)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        kind: PersonaKind,
        id: Uuid,
        patch: PersonaPatch,
    ) -> Result<Persona> {
        let mut state = self.state.write().await;
        let persona = state
            .personas
            .get_mut(&id)
            .filter(|p| p.owner_id == owner_id && p.kind == kind)
            .ok_or_else(|| AppError::not_found(kind.label(), id))?;
        patch.apply(persona);
        persona.updated_at = Utc::now();
        Ok(persona.clone())
    }

    async fn delete(&self, owner_id: Uuid, kind: PersonaKind, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let owned = state
            .personas
            .get(&id)
            .is_some_and(|p| p.owner_id == owner_id && p.kind == kind);
        if !owned {
            return Err(AppError::not_found(kind.label(), id));
        }
        state.personas.remove(&id);
        Ok(())
    }
}
