use crate::model::id::{BookingId, ParkingLotId, UserId};
use chrono::{DateTime, Utc};
use strum::{AsRefStr, Display, EnumString};

pub mod event;

#[derive(Debug)]
pub struct Booking {
    pub booking_id: BookingId,
    pub booked_by: UserId,
    pub owner_name: String,
    pub mobile_no: String,
    pub vehicle_no: String,
    pub vehicle_type: String,
    pub timing_slot: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub parking_lot: BookingParkingLot,
}

#[derive(Debug)]
pub struct BookingParkingLot {
    pub parking_lot_id: ParkingLotId,
    pub name: String,
    pub address: String,
}

/// Lifecycle of a booking. PENDING is the initial state,
/// COMPLETED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match self {
            Pending => matches!(next, Confirmed | Cancelled),
            Confirmed => matches!(next, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// An active booking holds one capacity unit at its lot.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(Pending, Confirmed, true)]
    #[case(Pending, Cancelled, true)]
    #[case(Pending, Completed, false)]
    #[case(Pending, Pending, false)]
    #[case(Confirmed, Completed, true)]
    #[case(Confirmed, Cancelled, true)]
    #[case(Confirmed, Pending, false)]
    #[case(Completed, Cancelled, false)]
    #[case(Completed, Confirmed, false)]
    #[case(Cancelled, Pending, false)]
    #[case(Cancelled, Confirmed, false)]
    #[case(Cancelled, Completed, false)]
    fn transition_edges(
        #[case] from: BookingStatus,
        #[case] to: BookingStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(BookingStatus::from_str("confirmed").unwrap(), Confirmed);
        assert_eq!(BookingStatus::from_str("CANCELLED").unwrap(), Cancelled);
        assert_eq!(BookingStatus::from_str("Pending").unwrap(), Pending);
        assert!(BookingStatus::from_str("EXPIRED").is_err());
    }

    #[test]
    fn terminal_states_are_not_active() {
        assert!(Pending.is_active());
        assert!(Confirmed.is_active());
        assert!(!Completed.is_active());
        assert!(!Cancelled.is_active());
    }

    #[test]
    fn storage_representation_is_upper_case() {
        assert_eq!(Pending.as_ref(), "PENDING");
        assert_eq!(Cancelled.to_string(), "CANCELLED");
    }
}
