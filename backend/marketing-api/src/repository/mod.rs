//! Storage traits for every resource the API manages.
//!
//! Each trait is implemented twice: by the sqlx/PostgreSQL repositories in
//! [`postgres`] and by [`memory::MemoryStore`], which backs local runs and the
//! test suite. Every method is scoped to an owner; a record belonging to a
//! different owner is reported as not found.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Account, Campaign, CampaignFilter, CampaignPatch, ConnectionOutcome, Contact, ContactFilter,
    ContactList, ContactPatch, ListPatch, NewAccount, NewCampaign, NewContact, NewList,
    NewPersona, NewTemplate, Persona, PersonaKind, PersonaPatch, Platform, Template,
    TemplatePatch,
};

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, contact: NewContact) -> Result<Contact>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Contact>;

    async fn list(&self, owner_id: Uuid, filter: &ContactFilter) -> Result<Vec<Contact>>;

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: ContactPatch) -> Result<Contact>;

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()>;
}

/// Where an import lands: a list created in the same transaction, or an
/// existing list of the same owner.
#[derive(Debug, Clone)]
pub enum ImportTarget {
    NewList(NewList),
    Existing(Uuid),
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub list: ContactList,
    pub imported: usize,
}

#[async_trait]
pub trait ListRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, list: NewList) -> Result<ContactList>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<ContactList>;

    async fn list(&self, owner_id: Uuid) -> Result<Vec<ContactList>>;

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: ListPatch) -> Result<ContactList>;

    /// Deletes the list and every contact in it. Returns the number of
    /// contacts removed.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64>;

    /// Inserts all contacts into the target list or none of them.
    async fn import(
        &self,
        owner_id: Uuid,
        target: ImportTarget,
        contacts: Vec<NewContact>,
    ) -> Result<ImportSummary>;
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, campaign: NewCampaign) -> Result<Campaign>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Campaign>;

    async fn list(&self, owner_id: Uuid, filter: &CampaignFilter) -> Result<Vec<Campaign>>;

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: CampaignPatch) -> Result<Campaign>;

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, account: NewAccount) -> Result<Account>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Account>;

    async fn list(&self, owner_id: Uuid, platform: Option<Platform>) -> Result<Vec<Account>>;

    async fn record_outcome(
        &self,
        owner_id: Uuid,
        id: Uuid,
        outcome: ConnectionOutcome,
    ) -> Result<Account>;

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, template: NewTemplate) -> Result<Template>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Template>;

    async fn list(&self, owner_id: Uuid, platform: Option<Platform>) -> Result<Vec<Template>>;

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: TemplatePatch) -> Result<Template>;

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PersonaRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, persona: NewPersona) -> Result<Persona>;

    async fn get(&self, owner_id: Uuid, kind: PersonaKind, id: Uuid) -> Result<Persona>;

    async fn list(&self, owner_id: Uuid, kind: PersonaKind) -> Result<Vec<Persona>>;

    async fn update(
        &self,
        owner_id: Uuid,
        kind: PersonaKind,
        id: Uuid,
        patch: PersonaPatch,
    ) -> Result<Persona>;

    async fn delete(&self, owner_id: Uuid, kind: PersonaKind, id: Uuid) -> Result<()>;
}

/// Handles to every repository, shared through `AppState`.
#[derive(Clone)]
pub struct Repositories {
    pub contacts: Arc<dyn ContactRepository>,
    pub lists: Arc<dyn ListRepository>,
    pub campaigns: Arc<dyn CampaignRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub personas: Arc<dyn PersonaRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            contacts: Arc::new(postgres::PgContactRepository::new(pool.clone())),
            lists: Arc::new(postgres::PgListRepository::new(pool.clone())),
            campaigns: Arc::new(postgres::PgCampaignRepository::new(pool.clone())),
            accounts: Arc::new(postgres::PgAccountRepository::new(pool.clone())),
            templates: Arc::new(postgres::PgTemplateRepository::new(pool.clone())),
            personas: Arc::new(postgres::PgPersonaRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            contacts: store.clone(),
            lists: store.clone(),
            campaigns: store.clone(),
            accounts: store.clone(),
            templates: store.clone(),
            personas: store,
        }
    }
}
