//! User-facing wording for failures.

use crate::error::AdminError;

pub const SYSTEM_BUSY: &str = "System busy, please retry later or contact an administrator";
pub const USER_NOT_FOUND: &str =
    "No balance record found for this user, please check the phone number";
pub const CONFIG_SERVICE_ERROR: &str =
    "Configuration service error, please check the network or contact an administrator";
pub const NETWORK_ERROR: &str = "Network error, please check your network settings";
pub const SYSTEM_ERROR: &str = "System error, please retry later";
pub const NACOS_NOT_CONFIGURED: &str =
    "Configure the Nacos server first: the server address is required";

const BUSY_TOKENS: [&str; 4] = ["conn", "connection", "database", "数据库"];
const USER_NOT_FOUND_TOKENS: [&str; 3] = ["user not found", "user does not exist", "用户不存在"];
const NACOS_TOKENS: [&str; 1] = ["nacos"];

/// Map a backend `success:false` message to canned wording. Unknown messages
/// pass through unchanged.
pub fn friendly_message(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let has_any = |tokens: &[&str]| tokens.iter().any(|t| lowered.contains(t));

    if has_any(&BUSY_TOKENS) {
        SYSTEM_BUSY.to_owned()
    } else if has_any(&USER_NOT_FOUND_TOKENS) {
        USER_NOT_FOUND.to_owned()
    } else if has_any(&NACOS_TOKENS) {
        CONFIG_SERVICE_ERROR.to_owned()
    } else {
        raw.to_owned()
    }
}

/// Wording for a failed call that never produced an application response.
pub fn transport_message(err: &AdminError) -> String {
    match err {
        AdminError::Network(_) | AdminError::Timeout => NETWORK_ERROR.to_owned(),
        AdminError::Validation(msg) => msg.clone(),
        AdminError::Application(msg) => friendly_message(msg),
        _ => SYSTEM_ERROR.to_owned(),
    }
}
