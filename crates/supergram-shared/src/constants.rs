/// Application name
pub const APP_NAME: &str = "superGram";

/// Minimum phone-number length (in characters, not digits) accepted by the
/// registration wizard
pub const MIN_PHONE_LEN: usize = 10;

/// Key derivation context (BLAKE3) for promo-code digests
pub const KDF_CONTEXT_PROMO_CODE: &str = "supergram-promo-code-v1";

/// Preview shown in the chat list for a voice note
pub const VOICE_NOTE_PREVIEW: &str = "🎤 Голосовое сообщение";

/// Label of the badge unlocked by a successful redemption
pub const DEVELOPER_BADGE: &str = "Developer";
