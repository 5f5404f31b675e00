//! Disposable-email viewer for a mail.tm-compatible service.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::network::RestClient;
use crate::poll::Identified;
use crate::storage::{SnapshotStore, Tabular};

pub const ACCOUNT_SNAPSHOT: &str = "mail_account";

/// The service answers either a bare array or a JSON-LD collection,
/// depending on the `Accept` header it sees.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Collection<T> {
    Hydra {
        #[serde(rename = "hydra:member")]
        member: Vec<T>,
    },
    Plain(Vec<T>),
}

impl<T> Collection<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Collection::Hydra { member } => member,
            Collection::Plain(items) => items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Domain {
    domain: String,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct CreatedAccount {
    id: String,
    address: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// A disposable inbox and the credentials to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailAccount {
    pub id: String,
    pub address: String,
    pub password: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sender {
    pub address: String,
    pub name: String,
}

impl Sender {
    pub fn display(&self) -> String {
        if self.name.is_empty() {
            self.address.clone()
        } else {
            format!("{} <{}>", self.name, self.address)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    #[serde(default)]
    pub from: Sender,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub seen: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for MessageSummary {
    fn identifier(&self) -> String {
        self.id.clone()
    }
}

impl Tabular for MessageSummary {
    fn headers() -> &'static [&'static str] {
        &["Id", "Received", "From", "Subject"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            self.from.display(),
            self.subject.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(flatten)]
    pub summary: MessageSummary,
    #[serde(default)]
    pub text: String,
}

/// Session with the mail service for one account.
pub struct Mailbox {
    base_url: String,
    timeout: Duration,
    account: MailAccount,
    client: RestClient,
}

impl Mailbox {
    /// Register a new random address and open it.
    pub fn create(base_url: &str, timeout: Duration) -> Result<Self> {
        let account = create_account(&RestClient::new(base_url, timeout))?;
        Ok(Self::open(base_url, timeout, account))
    }

    /// Use an existing account and token.
    pub fn open(base_url: &str, timeout: Duration, account: MailAccount) -> Self {
        let client = RestClient::new(base_url, timeout).with_token(account.token.clone());
        Self {
            base_url: base_url.to_string(),
            timeout,
            account,
            client,
        }
    }

    pub fn account(&self) -> &MailAccount {
        &self.account
    }

    pub fn address(&self) -> &str {
        &self.account.address
    }

    /// Log in again with the stored password and replace the token.
    pub fn refresh_token(&mut self) -> Result<()> {
        let anon = RestClient::new(&self.base_url, self.timeout);
        self.account.token = fetch_token(&anon, &self.account.address, &self.account.password)?;
        self.client = RestClient::new(&self.base_url, self.timeout).with_token(self.account.token.clone());
        debug!("Refreshed token for {}", self.account.address);
        Ok(())
    }

    /// GET with one re-login on 401, since tokens expire.
    fn get_authed<T: DeserializeOwned>(&mut self, endpoint: &str) -> Result<T> {
        match self.client.get_json(endpoint) {
            Err(Error::RequestRejected { status: 401, .. }) => {
                self.refresh_token()?;
                self.client.get_json(endpoint)
            }
            other => other,
        }
    }

    pub fn messages(&mut self) -> Result<Vec<MessageSummary>> {
        let list: Collection<MessageSummary> = self.get_authed("messages")?;
        Ok(list.into_vec())
    }

    pub fn message(&mut self, id: &str) -> Result<Message> {
        self.get_authed(&format!("messages/{}", id))
    }

    pub fn save(&self, store: &SnapshotStore) -> Result<()> {
        store.save(ACCOUNT_SNAPSHOT, &self.account)?;
        Ok(())
    }

    /// Reopen the account saved by [`Mailbox::save`], if any.
    pub fn load(store: &SnapshotStore, base_url: &str, timeout: Duration) -> Result<Option<Self>> {
        let account: Option<MailAccount> = store.load(ACCOUNT_SNAPSHOT)?;
        Ok(account.map(|a| Self::open(base_url, timeout, a)))
    }
}

/// Register a random address on the first active domain and log in.
pub fn create_account(client: &RestClient) -> Result<MailAccount> {
    let domains: Collection<Domain> = client.get_json("domains")?;
    let domain = domains
        .into_vec()
        .into_iter()
        .find(|d| d.is_active)
        .ok_or_else(|| Error::MalformedResponse("no active mail domain".to_string()))?;

    let address = format!("{}@{}", random_string(10).to_lowercase(), domain.domain);
    let password = random_string(16);

    let created: CreatedAccount = client.post_json(
        "accounts",
        &json!({ "address": address, "password": password }),
    )?;
    let token = fetch_token(client, &created.address, &password)?;
    info!("Created mailbox {}", created.address);

    Ok(MailAccount {
        id: created.id,
        address: created.address,
        password,
        token,
    })
}

fn fetch_token(client: &RestClient, address: &str, password: &str) -> Result<String> {
    let response: TokenResponse =
        client.post_json("token", &json!({ "address": address, "password": password }))?;
    Ok(response.token)
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::testing::{Route, TestServer};
    use tempfile::TempDir;

    fn account() -> MailAccount {
        MailAccount {
            id: "acc1".to_string(),
            address: "abc@mail.example".to_string(),
            password: "pw".to_string(),
            token: "tok".to_string(),
        }
    }

    #[test]
    fn test_create_account() {
        let server = TestServer::start(vec![
            Route::json(
                "GET",
                "/domains",
                json!({"hydra:member": [
                    {"id": "d0", "domain": "old.example", "isActive": false},
                    {"id": "d1", "domain": "mail.example", "isActive": true}
                ]}),
            ),
            Route::new(
                "POST",
                "/accounts",
                201,
                r#"{"id":"acc1","address":"xyz@mail.example"}"#,
            ),
            Route::json("POST", "/token", json!({"id": "acc1", "token": "jwt"})),
        ]);

        let mailbox = Mailbox::create(&server.url(), Duration::from_secs(5)).unwrap();
        assert_eq!(mailbox.address(), "xyz@mail.example");
        assert_eq!(mailbox.account().token, "jwt");
        assert_eq!(mailbox.account().password.len(), 16);

        let requests = server.requests();
        let sent: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
        assert!(sent["address"].as_str().unwrap().ends_with("@mail.example"));
    }

    #[test]
    fn test_messages_accepts_plain_array() {
        let server = TestServer::start(vec![Route::json(
            "GET",
            "/messages",
            json!([{
                "id": "m1",
                "from": {"address": "noreply@riotgames.com", "name": "Riot"},
                "subject": "Verify",
                "intro": "Your code is 123456",
                "seen": false,
                "createdAt": "2026-03-01T10:00:00+00:00"
            }]),
        )]);

        let mut mailbox = Mailbox::open(&server.url(), Duration::from_secs(5), account());
        let messages = mailbox.messages().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from.display(), "Riot <noreply@riotgames.com>");
        assert_eq!(
            server.last_request().unwrap().header("authorization"),
            Some("Bearer tok")
        );
    }

    #[test]
    fn test_message_body() {
        let server = TestServer::start(vec![Route::json(
            "GET",
            "/messages/m1",
            json!({
                "id": "m1",
                "subject": "Verify",
                "createdAt": "2026-03-01T10:00:00Z",
                "text": "Your code is 123456"
            }),
        )]);

        let mut mailbox = Mailbox::open(&server.url(), Duration::from_secs(5), account());
        let message = mailbox.message("m1").unwrap();
        assert_eq!(message.summary.subject, "Verify");
        assert_eq!(message.text, "Your code is 123456");
    }

    #[test]
    fn test_expired_token_triggers_relogin() {
        let server = TestServer::start(vec![
            Route::new("GET", "/messages", 401, r#"{"message":"Expired JWT Token"}"#),
            Route::json("POST", "/token", json!({"token": "fresh"})),
        ]);

        let mut mailbox = Mailbox::open(&server.url(), Duration::from_secs(5), account());
        let err = mailbox.messages().unwrap_err();
        // The canned server keeps answering 401, but the token was renewed.
        assert!(matches!(err, Error::RequestRejected { status: 401, .. }));
        assert_eq!(mailbox.account().token, "fresh");
        assert_eq!(
            server.last_request().unwrap().header("authorization"),
            Some("Bearer fresh")
        );
    }

    #[test]
    fn test_save_and_load_account() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(
            Mailbox::load(&store, "http://localhost", Duration::from_secs(1))
                .unwrap()
                .is_none()
        );

        Mailbox::open("http://localhost", Duration::from_secs(1), account())
            .save(&store)
            .unwrap();
        let loaded = Mailbox::load(&store, "http://localhost", Duration::from_secs(1))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.account(), &account());
    }
}
