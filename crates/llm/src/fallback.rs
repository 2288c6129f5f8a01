//! Canned user-facing strings for every failure class. These are the only
//! things a user ever sees when generation goes wrong.

pub const RATE_LIMITED: &str =
    "I'm currently handling too many requests. Please try again in a moment.";

pub const UNAVAILABLE: &str =
    "I'm temporarily unavailable. Please try again in a few minutes.";

pub const TIMED_OUT: &str = "The request took too long. Please try again.";

pub const CONNECTION: &str =
    "There seems to be a connection issue. Please check your internet connection and try again.";

pub const GENERIC: &str = "I apologize, but I'm having trouble connecting to my knowledge base right now. Please try:\n\n\
1. Waiting a few moments and trying again\n\
2. Browsing the opportunity listings directly\n\
3. Searching the listings for what you need";

/// Shown by the send pipeline when the generator itself errors; chat stays
/// usable and browsing is unaffected.
pub const TECHNICAL_DIFFICULTIES: &str = "I apologize, but I'm currently experiencing technical difficulties. In the meantime, you can:\n\n\
1. Browse the latest opportunity listings\n\
2. Use search to find specific opportunities\n\
3. Try asking your question again in a few minutes";
