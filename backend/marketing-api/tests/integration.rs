#[path = "integration/support.rs"]
mod support;

#[path = "integration/auth_test.rs"]
mod auth_test;

#[path = "integration/contacts_test.rs"]
mod contacts_test;

#[path = "integration/lists_test.rs"]
mod lists_test;

#[path = "integration/campaigns_test.rs"]
mod campaigns_test;

#[path = "integration/accounts_test.rs"]
mod accounts_test;

#[path = "integration/personas_test.rs"]
mod personas_test;
