use super::reservation::{LifecycleState, Reservation};

/// Selection applied to the bookings table and its CSV export.
///
/// `search` is matched case-insensitively as a substring of the guest name,
/// email, phone number or room category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub status: Option<LifecycleState>,
    pub search: Option<String>,
}

impl ReservationFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        if let Some(status) = self.status
            && reservation.status() != status
        {
            return false;
        }
        let Some(search) = self.search.as_deref().map(str::trim) else {
            return true;
        };
        if search.is_empty() {
            return true;
        }
        let needle = search.to_lowercase();
        let guest = reservation.guest();
        [
            guest.name.as_str(),
            guest.email.as_str(),
            guest.phone.as_str(),
            reservation.room_category().as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
