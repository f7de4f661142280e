//! Visibility and authorization rules.
//!
//! Decides, for each (viewer, post) or (viewer, comment) pair, whether the
//! entity may be shown or changed, and which posts make up each listing.

mod authorization;
mod listing;
mod viewer;
mod visibility;

pub use authorization::{Decision, Operation, Redirect, Target, authorize, require_login};
pub use listing::{DEFAULT_PAGE_SIZE, Listing, ListingAssembler, ListingContext, PostListing};
pub use viewer::Viewer;
pub use visibility::{PostFilter, Visibility, can_view, is_publicly_visible};
