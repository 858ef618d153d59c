use serde::Deserialize;

/// Per-channel opt-in flags. Absent flags read as opted out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelPreferences {
    #[serde(default)]
    pub email: bool,

    #[serde(default)]
    pub push: bool,
}

/// Recipient contact data owned by the profile service. Fetched fresh per
/// request, never cached or mutated here.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipientProfile {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub push_token: Option<String>,

    #[serde(default)]
    pub preferences: ChannelPreferences,
}
