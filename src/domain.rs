//! Domain module - insight entities and validated value objects
//!
//! Each module is its own file in the domain/ directory; commonly used types
//! are re-exported here.

pub mod insights;
pub mod product;
pub mod value_objects;

pub use insights::{
    ContactDetails, Faq, HeroProduct, ImportantLinks, InsightRecord, LinkCategory, PolicySet,
    SocialHandles, SocialPlatform, StoreMetadata,
};
pub use product::{Product, ProductFeed, ProductImage, ProductOption, ProductVariant};
pub use value_objects::{EmailAddress, PhoneNumber, SocialHandle, StoreUrl, ValidationError};
