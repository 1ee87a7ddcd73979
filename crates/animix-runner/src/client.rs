//! HTTP client for the Animix game API.
//!
//! One [`ApiClient`] per account. It carries the account's init data,
//! user agent, and optional proxy, and wraps every call in the same
//! bounded retry. Responses arrive as `{"result": ...}` and are unwrapped
//! into the shared types.
//!
//! The client also implements [`CommitGateway`] and [`ArenaGateway`], so
//! the allocation engine commits through it directly. Each commit waits a
//! random `delay_between_requests` first; attacks are spaced by
//! `features.attack_interval_secs`.

use std::time::Duration;

use animix_engine::{
    ArenaGateway, AttackPlan, CommitGateway, Matchup, MissionAssignment, Pairing,
};
use animix_types::{
    AchievementBook, AchievementId, AttackOutcome, BattleInfo, GachaBonus, GachaResult, Mission,
    MissionId, MixResult, MixedPet, OpponentResponse, Pet, PetCatalogEntry, PetDna, PetId,
    QuestBoard, SeasonPass, UserInfo,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::{BotConfig, DelayRange, RetryPolicy};
use crate::error::RunnerError;
use crate::session::Platform;

/// Web app origin the API expects requests from.
const ORIGIN: &str = "https://tele-game.animix.tech";

/// The envelope every API response is wrapped in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

/// Build the per-account header set.
///
/// # Errors
///
/// Returns [`RunnerError::Config`] if the init data or user agent contains
/// bytes not allowed in a header.
pub fn account_headers(init_data: &str, user_agent: &str) -> Result<HeaderMap, RunnerError> {
    let platform = Platform::of(user_agent);
    let pairs = [
        ("accept", "application/json, text/plain, */*".to_owned()),
        ("accept-language", "en-US,en;q=0.9".to_owned()),
        ("content-type", "application/json".to_owned()),
        ("origin", ORIGIN.to_owned()),
        ("referer", format!("{ORIGIN}/")),
        ("sec-ch-ua", platform.sec_ch_ua()),
        ("sec-ch-ua-mobile", "?1".to_owned()),
        ("sec-ch-ua-platform", platform.as_str().to_owned()),
        ("sec-fetch-dest", "empty".to_owned()),
        ("sec-fetch-mode", "cors".to_owned()),
        ("sec-fetch-site", "same-site".to_owned()),
        ("cache-control", "no-cache".to_owned()),
        ("user-agent", user_agent.to_owned()),
        ("tg-init-data", init_data.to_owned()),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let value = HeaderValue::from_str(&value)
            .map_err(|e| RunnerError::Config(format!("invalid {name} header: {e}")))?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

/// Game API client for one account.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    static_pets_url: String,
    retry: RetryPolicy,
    pacing: DelayRange,
    attack_interval: Duration,
}

impl ApiClient {
    /// Build a client for one account.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] for an invalid proxy URL or header
    /// value and [`RunnerError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(
        config: &BotConfig,
        init_data: &str,
        user_agent: &str,
        proxy: Option<&str>,
    ) -> Result<Self, RunnerError> {
        let mut builder = reqwest::Client::builder()
            .default_headers(account_headers(init_data, user_agent)?)
            .timeout(config.api.request_timeout());
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| RunnerError::Config(format!("invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|e| RunnerError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_owned(),
            static_pets_url: config.api.static_pets_url.clone(),
            retry: config.api.retry,
            pacing: config.scheduler.delay_between_requests,
            attack_interval: config.features.attack_interval(),
        })
    }

    /// Wait one random `delay_between_requests`.
    pub async fn pace(&self) {
        self.pacing.wait().await;
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RunnerError> {
        let url = format!("{}{path}", self.base_url);
        self.request(Method::GET, &url, None).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, RunnerError> {
        let url = format!("{}{path}", self.base_url);
        self.request(Method::POST, &url, Some(&body)).await
    }

    /// Send a request with bounded retry.
    ///
    /// Transport failures and timeouts are retried up to
    /// `retry.max_retries` times with a random delay between attempts;
    /// everything else is returned at once.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<T, RunnerError> {
        let mut attempt: u32 = 0;
        loop {
            match self.send_once(method.clone(), url, body).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt = attempt.saturating_add(1);
                    warn!(url = url, attempt = attempt, error = %e, "request failed, retrying");
                    self.retry.delay_secs.wait().await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<T, RunnerError> {
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RunnerError::Timeout(format!("{url}: {e}"))
            } else {
                RunnerError::Transport(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        debug!(url = url, status = status.as_u16(), "response received");
        if status == StatusCode::UNAUTHORIZED {
            return Err(RunnerError::Unauthorized);
        }
        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(RunnerError::Rejected(body));
        }
        if !status.is_success() {
            return Err(RunnerError::Transport(format!("{url} returned {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RunnerError::Transport(format!("{url}: {e}")))?;
        decode_result(&bytes)
    }

    // -----------------------------------------------------------------------
    // Account
    // -----------------------------------------------------------------------

    /// Profile, balance, and god power.
    pub async fn user_info(&self) -> Result<UserInfo, RunnerError> {
        self.get("/public/user/info").await
    }

    // -----------------------------------------------------------------------
    // Gacha
    // -----------------------------------------------------------------------

    /// Pull `amount` DNA items.
    pub async fn gacha(&self, amount: u32) -> Result<GachaResult, RunnerError> {
        self.post("/public/pet/dna/gacha", json!({ "amount": amount })).await
    }

    /// Progress of the gacha bonus track.
    pub async fn gacha_bonus(&self) -> Result<GachaBonus, RunnerError> {
        self.get("/public/pet/dna/gacha/bonus").await
    }

    /// Claim a gacha bonus reward (1 = god power, 2 = DNA).
    pub async fn claim_gacha_bonus(&self, reward_no: u8) -> Result<Value, RunnerError> {
        self.post("/public/pet/dna/gacha/bonus/claim", json!({ "reward_no": reward_no }))
            .await
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// Owned pet stacks.
    pub async fn pets(&self) -> Result<Vec<Pet>, RunnerError> {
        self.get("/public/pet/list").await
    }

    /// Owned DNA stacks.
    pub async fn dna(&self) -> Result<Vec<PetDna>, RunnerError> {
        self.get("/public/pet/dna/list").await
    }

    /// The static catalog mapping pet ids to class and star.
    pub async fn pet_catalog(&self) -> Result<Vec<PetCatalogEntry>, RunnerError> {
        self.request(Method::GET, &self.static_pets_url, None).await
    }

    // -----------------------------------------------------------------------
    // Missions
    // -----------------------------------------------------------------------

    /// All missions with their slot requirements and state.
    pub async fn missions(&self) -> Result<Vec<Mission>, RunnerError> {
        self.get("/public/mission/list").await
    }

    /// Claim a finished mission.
    pub async fn claim_mission(&self, mission_id: MissionId) -> Result<Value, RunnerError> {
        self.post("/public/mission/claim", json!({ "mission_id": mission_id }))
            .await
    }

    // -----------------------------------------------------------------------
    // Quests and rewards
    // -----------------------------------------------------------------------

    /// Daily quests.
    pub async fn quests(&self) -> Result<QuestBoard, RunnerError> {
        self.get("/public/quest/list").await
    }

    /// Check in a quest.
    pub async fn check_quest(&self, quest_code: &str) -> Result<Value, RunnerError> {
        self.post("/public/quest/check", json!({ "quest_code": quest_code }))
            .await
    }

    /// Achievements grouped by category.
    pub async fn achievements(&self) -> Result<AchievementBook, RunnerError> {
        self.get("/public/achievement/list").await
    }

    /// Claim a completed achievement.
    pub async fn claim_achievement(&self, quest_id: AchievementId) -> Result<Value, RunnerError> {
        self.post("/public/achievement/claim", json!({ "quest_id": quest_id }))
            .await
    }

    /// Join a clan.
    pub async fn join_clan(&self, clan_id: u64) -> Result<Value, RunnerError> {
        self.post("/public/clan/join", json!({ "clan_id": clan_id })).await
    }

    /// Leave a clan.
    pub async fn quit_clan(&self, clan_id: u64) -> Result<Value, RunnerError> {
        self.post("/public/clan/quit", json!({ "clan_id": clan_id })).await
    }

    /// Season passes.
    pub async fn season_passes(&self) -> Result<Vec<SeasonPass>, RunnerError> {
        self.get::<Option<Vec<SeasonPass>>>("/public/season-pass/list")
            .await
            .map(Option::unwrap_or_default)
    }

    /// Claim a free-track season pass reward.
    pub async fn claim_season_reward(&self, season_id: u64, step: u32) -> Result<Value, RunnerError> {
        self.post(
            "/public/season-pass/claim",
            json!({ "season_id": season_id, "type": "free", "step": step }),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // PvP
    // -----------------------------------------------------------------------

    /// Arena state.
    pub async fn battle_info(&self) -> Result<BattleInfo, RunnerError> {
        self.get("/public/battle/user/info").await
    }

    /// Replace the defense team.
    pub async fn set_defense_team(&self, team: [PetId; 3]) -> Result<Value, RunnerError> {
        let [first, second, third] = team;
        self.post(
            "/public/battle/user/defense-team",
            json!({ "pet_id_1": first, "pet_id_2": second, "pet_id_3": third }),
        )
        .await
    }

    /// Draw an opponent.
    pub async fn opponent(&self) -> Result<OpponentResponse, RunnerError> {
        self.get("/public/battle/user/opponents").await
    }
}

/// Unwrap the `result` field of a response body.
fn decode_result<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RunnerError> {
    serde_json::from_slice::<Envelope<T>>(bytes)
        .map(|envelope| envelope.result)
        .map_err(|e| RunnerError::Decode(e.to_string()))
}

impl CommitGateway for ApiClient {
    type Error = RunnerError;

    async fn commit_mission(&self, assignment: &MissionAssignment) -> Result<(), RunnerError> {
        self.pace().await;
        let [pet_1, pet_2, pet_3] = assignment.pet_ids;
        let _: Value = self
            .post(
                "/public/mission/enter",
                json!({
                    "mission_id": assignment.mission_id,
                    "pet_1_id": pet_1,
                    "pet_2_id": pet_2,
                    "pet_3_id": pet_3,
                }),
            )
            .await?;
        Ok(())
    }

    async fn commit_pairing(&self, pairing: &Pairing) -> Result<Option<MixedPet>, RunnerError> {
        self.pace().await;
        let result: Option<MixResult> = self
            .post(
                "/public/pet/mix",
                json!({ "dad_id": pairing.dad, "mom_id": pairing.mom }),
            )
            .await?;
        Ok(result.and_then(|r| r.pet))
    }

    async fn commit_attack(&self, plan: &AttackPlan) -> Result<AttackOutcome, RunnerError> {
        self.pace().await;
        let [first, second, third] = plan.pet_ids;
        self.post(
            "/public/battle/attack",
            json!({
                "opponent_id": plan.opponent_id,
                "pet_id_1": first,
                "pet_id_2": second,
                "pet_id_3": third,
            }),
        )
        .await
    }
}

impl ArenaGateway for ApiClient {
    async fn draw_matchup(&self) -> Result<Matchup, RunnerError> {
        self.pace().await;
        let drawn = self.opponent().await?;
        let own = self.pets().await?;
        Ok(Matchup {
            opponent: drawn.opponent,
            own,
        })
    }

    async fn rest(&self) {
        tokio::time::sleep(self.attack_interval).await;
    }

    fn is_fatal(&self, error: &RunnerError) -> bool {
        error.is_fatal()
    }
}
