//! Input bounds, enforced before anything is journaled.

pub const MAX_USERS: usize = 100_000;
pub const MAX_VENUES: usize = 10_000;
pub const MAX_BOOKINGS_PER_VENUE: usize = 50_000;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_LOCATION_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 4_000;
pub const MAX_AMENITIES: usize = 64;
pub const MAX_AMENITY_LEN: usize = 60;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PHONE_LEN: usize = 32;
pub const MAX_IMAGE_URL_LEN: usize = 2_048;
