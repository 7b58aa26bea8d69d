//! HTML extraction for every insight category
//!
//! Extractors take raw HTML and parse it internally, so a parsed document
//! never outlives the synchronous call that built it. Category-specific
//! heuristics live in their own modules; [`strategy`] provides the shared
//! ordered-strategy runner and [`landmarks`] the footer/header link discovery.

pub mod contact_parser;
pub mod document;
pub mod error;
pub mod faq_parser;
pub mod landmarks;
pub mod policy_parser;
pub mod product_parser;
pub mod site_parser;
pub mod social_parser;
pub mod strategy;

// Re-export public types
pub use contact_parser::{extract_contact_details, extract_landmark_contacts};
pub use error::{ParsingError, ParsingResult};
pub use faq_parser::{extract_faqs, is_question};
pub use landmarks::{CONTACT_LINKS, FAQ_LINKS, Landmark, LinkPlan, PRIVACY_LINKS, RETURN_LINKS};
pub use policy_parser::{clean_policy_text, extract_policy};
pub use product_parser::{extract_hero_products, parse_product_feed};
pub use site_parser::{extract_brand_context, extract_important_links, extract_metadata};
pub use social_parser::extract_social_handles;
pub use strategy::{Extracted, Mergeable, StrategyChain};
