//! Routing users to one of several databases.
//!
//! Appointments are spread over independent databases. A user always lands
//! on the same one: the sum of the code points of their id, modulo the
//! number of databases.

use crate::client::AppointmentClient;

pub const DEFAULT_COLLECTION: &str = "appointments";

#[derive(Debug, Clone)]
pub struct ShardRouter {
    roots: Vec<String>,
    collection: String,
}

impl ShardRouter {
    /// Returns `None` when `roots` is empty. `collection` is one top-level
    /// name; `ClientConfig` refuses a nested one.
    pub fn new<I, S>(roots: I, collection: &str) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roots: Vec<String> = roots
            .into_iter()
            .map(|root| root.as_ref().trim_end_matches('/').to_string())
            .collect();
        if roots.is_empty() {
            return None;
        }
        Some(Self {
            roots,
            collection: collection.trim_matches('/').to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Always `false`: `new` refuses an empty root list.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn shard_index(&self, user_id: &str) -> usize {
        let sum: u64 = user_id.chars().map(|c| u64::from(u32::from(c))).sum();
        (sum % self.roots.len() as u64) as usize
    }

    pub fn root_for(&self, user_id: &str) -> &str {
        &self.roots[self.shard_index(user_id)]
    }

    /// Client for the appointment collection on the user's database.
    pub fn client_for(&self, user_id: &str) -> AppointmentClient {
        self.collection_client(self.root_for(user_id))
    }

    /// Clients for the appointment collection on every database, in order.
    pub fn clients(&self) -> Vec<AppointmentClient> {
        self.roots
            .iter()
            .map(|root| self.collection_client(root))
            .collect()
    }

    fn collection_client(&self, root: &str) -> AppointmentClient {
        AppointmentClient::new(&format!("{root}/{}", self.collection))
    }
}
