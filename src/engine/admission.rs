use ulid::Ulid;

use crate::model::*;

use super::error::ConflictReason;

/// First committed reservation that collides with the request, if any.
///
/// Hourly and daily calendars are independent: a day booking never blocks
/// an hourly slot and vice versa. Hourly slots collide only on the same
/// calendar date, half-open — a slot ending exactly when another starts
/// is back-to-back, not a collision. Daily ranges are closed intervals:
/// sharing an endpoint date collides.
///
/// The calendar holds accepted rows only, so rejected (conflict-flagged)
/// attempts never factor into future admissions.
pub(crate) fn find_conflict(calendar: &[Booking], requested: &BookingKind) -> Option<Ulid> {
    calendar.iter().find_map(|existing| match (&existing.kind, requested) {
        (BookingKind::Hour { slot: held, .. }, BookingKind::Hour { slot: wanted, .. })
            if held.overlaps(wanted) =>
        {
            Some(existing.id)
        }
        (BookingKind::Day { span: held, .. }, BookingKind::Day { span: wanted, .. })
            if held.overlaps(wanted) =>
        {
            Some(existing.id)
        }
        _ => None,
    })
}

pub(crate) fn conflict_reason(requested: &BookingKind) -> ConflictReason {
    if requested.is_hourly() {
        ConflictReason::OverlappingTime
    } else {
        ConflictReason::OverlappingDates
    }
}
