//! fathom-feishu - Feishu Open API client and research card delivery
//!
//! Covers tenant-token auth, plain text messages, and interactive
//! research report cards (card 2.0 schema).

pub mod card;
pub mod client;
pub mod sender;

pub use card::build_research_card;
pub use client::FeishuClient;
pub use sender::FeishuCardSender;
