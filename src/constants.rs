//! Defaults shared by the config layer, the scraper and the CLI.

// Catalog resource
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8000/_data/problems.json";
pub const DEFAULT_CATALOG_PATH: &str = "_data/problems.json";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

// Published artifacts
pub const DEFAULT_DATA_DIR: &str = "_data";
pub const DEFAULT_JS_DIR: &str = "data";
pub const CATALOG_JSON_FILE: &str = "problems.json";
pub const CATALOG_JS_FILE: &str = "problems.js";
/// Global name the JS literal assigns to.
pub const JS_GLOBAL: &str = "window.problems";

// Forum scraper
pub const DEFAULT_FORUM_URL: &str = "https://drive2.ru/forums/elektrooborudovanie.107/";
pub const DEFAULT_FORUM_BASE_URL: &str = "https://drive2.ru";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_THREAD_LIMIT: usize = 10;
pub const FORUM_SOURCE_TAG: &str = "drive2";

/// Title keywords that mark a thread as describing a typical fault.
pub const SYMPTOM_KEYWORDS: &[&str] = &[
    "не заводится",
    "check engine",
    "утечка",
    "нет зарядки",
    "троит",
    "стучит",
];

/// Brand names recognised in thread titles, in match priority order.
pub const KNOWN_BRANDS: &[&str] = &[
    "ваз", "лада", "toyota", "bmw", "audi", "ford", "opel", "renault", "kia", "hyundai",
];

// Environment overrides
pub const ENV_CATALOG_URL: &str = "AUTOFIX_CATALOG_URL";
pub const ENV_FORUM_URL: &str = "AUTOFIX_FORUM_URL";

// Logging
pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "autofix_catalog.log";

pub const CONFIG_FILE: &str = "config.toml";
