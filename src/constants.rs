// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const WS_PATH: &str = "ws";

// Rate limiting: messages admitted per sliding window
pub const DEFAULT_RATE_LIMIT: usize = 10;
pub const DEFAULT_RATE_WINDOW_MS: u64 = 60_000;

// Inbound frames larger than this are dropped before decoding
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;

pub const DEFAULT_BANNED_WORDS: &[&str] = &["spam", "abuse", "hate"];

// Alias building blocks
pub const ALIAS_ADJECTIVES: &[&str] = &[
    "Happy", "Clever", "Swift", "Brave", "Quiet", "Bold", "Kind", "Wise",
];
pub const ALIAS_ANIMALS: &[&str] = &["Fox", "Eagle", "Wolf", "Bear", "Lion", "Tiger", "Owl", "Hawk"];
pub const ALIAS_MAX_NUMBER: u32 = 999;

/// Named rooms available for the whole process lifetime: (id, name, description, capacity)
pub const DEFAULT_NAMED_ROOMS: &[(&str, &str, &str, usize)] = &[
    ("general", "General Chat", "Talk about anything and everything", 50),
    ("tech", "Tech Talk", "Programming, gadgets and the latest in tech", 30),
    ("gaming", "Gaming Lounge", "Find teammates and talk about games", 30),
    ("music", "Music Corner", "Share what you are listening to", 25),
    ("random", "Random", "Anything goes, within the rules", 40),
];

pub const WAITING_TEXT: &str = "Looking for someone to chat with...";
pub const PARTNER_LEFT_TEXT: &str = "Your chat partner has left the conversation.";
