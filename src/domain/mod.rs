mod enriched_word;
mod subscriber_email;
mod word_pool;

pub use enriched_word::EnrichedWord;
pub use subscriber_email::SubscriberEmail;
pub use word_pool::WordPool;
