//! Silver trip table
//!
//! Unifies the bronze yellow and green tables into one analytical table
//! with Portuguese column names, vendor and payment descriptions, and
//! cancellation flags.

mod job;
mod transform;

pub use job::{SilverConfig, SilverJob, SilverReport, SilverSource};
pub use transform::{
    payment_description, to_silver, vendor_name, ServiceType, UNKNOWN_PAYMENT, UNKNOWN_VENDOR,
};
