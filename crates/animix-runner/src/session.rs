//! Persisted user agents, one per account.
//!
//! Each account keeps the same user agent across runs. The mapping lives in
//! a JSON file keyed by session name; accounts without an entry get a
//! random agent from [`USER_AGENTS`] and the file is rewritten.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::error::RunnerError;

/// Mobile web-view user agents handed out to new accounts.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148",
    "Mozilla/5.0 (iPad; CPU OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8 Build/AP1A.240505.005; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/127.0.6533.64 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 13; SM-S918B Build/TP1A.220624.014; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/127.0.6533.103 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 12; M2102J20SG Build/SKQ1.211006.001; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/126.0.6478.134 Mobile Safari/537.36",
];

/// Client platform derived from a user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// iPhone or iPad.
    Ios,
    /// Android.
    Android,
    /// Anything else.
    Unknown,
}

impl Platform {
    /// Detect the platform from a user agent string.
    pub fn of(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ua.contains("iphone") || ua.contains("ipad") {
            Self::Ios
        } else if ua.contains("android") {
            Self::Android
        } else {
            Self::Unknown
        }
    }

    /// Name used in client hint headers.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Unknown => "Unknown",
        }
    }

    /// Value of the `sec-ch-ua` header for this platform.
    pub fn sec_ch_ua(self) -> String {
        format!(
            "\"Not)A;Brand\";v=\"99\", \"{} WebView\";v=\"127\", \"Chromium\";v=\"127\"",
            self.as_str()
        )
    }
}

/// The account to user agent mapping and where it is stored.
#[derive(Debug, Clone)]
pub struct UserAgentStore {
    path: PathBuf,
    agents: BTreeMap<String, String>,
    dirty: bool,
}

impl UserAgentStore {
    /// Load the store, starting empty when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Io`] for read failures other than a missing
    /// file and [`RunnerError::Serde`] if the file is not a JSON object of
    /// strings.
    pub async fn load(path: &Path) -> Result<Self, RunnerError> {
        let agents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_owned(),
            agents,
            dirty: false,
        })
    }

    /// The stored agent for a session, creating one if needed.
    pub fn user_agent_for<R: Rng>(&mut self, session_name: &str, rng: &mut R) -> String {
        if let Some(agent) = self.agents.get(session_name) {
            return agent.clone();
        }
        let agent = USER_AGENTS
            .choose(rng)
            .copied()
            .unwrap_or_default()
            .to_owned();
        info!(session = session_name, "assigned new user agent");
        self.agents.insert(session_name.to_owned(), agent.clone());
        self.dirty = true;
        agent
    }

    /// Write the file back if any agent was added since loading.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Io`] if the file cannot be written.
    pub async fn save(&mut self) -> Result<(), RunnerError> {
        if !self.dirty {
            return Ok(());
        }
        let contents = serde_json::to_string_pretty(&self.agents)?;
        tokio::fs::write(&self.path, contents).await?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn platform_detection() {
        assert_eq!(Platform::of(USER_AGENTS.first().copied().unwrap_or_default()), Platform::Ios);
        assert_eq!(Platform::of("Mozilla/5.0 (iPad; CPU OS 17_4)"), Platform::Ios);
        assert_eq!(Platform::of("Mozilla/5.0 (Linux; Android 14)"), Platform::Android);
        assert_eq!(Platform::of("curl/8.0"), Platform::Unknown);
        assert!(Platform::Android.sec_ch_ua().contains("android WebView"));
    }

    #[tokio::test]
    async fn agents_persist_per_session() {
        let path = std::env::temp_dir().join(format!("animix-ua-{}.json", std::process::id()));
        let _ = tokio::fs::remove_file(&path).await;
        let mut rng = SmallRng::seed_from_u64(11);

        let mut store = UserAgentStore::load(&path).await.unwrap();
        let first = store.user_agent_for("42", &mut rng);
        assert!(USER_AGENTS.contains(&first.as_str()));
        assert_eq!(store.user_agent_for("42", &mut rng), first);
        store.save().await.unwrap();

        let mut reloaded = UserAgentStore::load(&path).await.unwrap();
        assert_eq!(reloaded.user_agent_for("42", &mut rng), first);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
