pub mod booking_request;
pub mod checkin;
pub mod comedian;
pub mod lineup;
pub mod member;
pub mod show;
pub mod user;

pub use booking_request::{BookingRequest, BookingRequestDetail, BookingStatus};
pub use checkin::Checkin;
pub use comedian::{Comedian, ComedianStatus};
pub use lineup::{LineupEntry, LineupEntryDetail};
pub use member::{Member, MemberStatus};
pub use show::{Show, ShowStatus, ShowSummary};
pub use user::{User, UserRole};
